// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles which can be assigned to a trip member.
///
/// Roles are ordered such that "higher" roles grant all permissions of "lower" ones.
///
/// Viewer < Participant < Organizer
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Participant,
    Organizer,
}

/// Capabilities which can be requested against a trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewTrip,
    EditTrip,
    DeleteTrip,
    InviteMembers,
    ManageMembers,
    ViewExpenses,
    EditExpenses,
}

impl Role {
    /// Return `true` if this role grants the given permission.
    ///
    /// The role to permission mapping is fixed at compile time and is the same for every process
    /// and every trip.
    pub const fn grants(&self, permission: Permission) -> bool {
        matches!(
            (self, permission),
            (Role::Organizer, _)
                | (
                    Role::Participant,
                    Permission::ViewTrip
                        | Permission::EditTrip
                        | Permission::ViewExpenses
                        | Permission::EditExpenses,
                )
                | (
                    Role::Viewer,
                    Permission::ViewTrip | Permission::ViewExpenses,
                )
        )
    }

    /// All permissions granted by this role.
    pub const fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Viewer => &[Permission::ViewTrip, Permission::ViewExpenses],
            Role::Participant => &[
                Permission::ViewTrip,
                Permission::EditTrip,
                Permission::ViewExpenses,
                Permission::EditExpenses,
            ],
            Role::Organizer => &[
                Permission::ViewTrip,
                Permission::EditTrip,
                Permission::DeleteTrip,
                Permission::InviteMembers,
                Permission::ManageMembers,
                Permission::ViewExpenses,
                Permission::EditExpenses,
            ],
        }
    }

    /// Role is Organizer.
    pub fn is_organizer(&self) -> bool {
        matches!(self, Role::Organizer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Participant => "participant",
            Role::Organizer => "organizer",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored role value outside the enumerated set.
///
/// Unrecognised roles are a data-integrity failure and are rejected rather than coerced to the
/// closest matching role, so a corrupted membership record can never grant access.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown role stored for membership: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "viewer" => Ok(Role::Viewer),
            "participant" => Ok(Role::Participant),
            "organizer" => Ok(Role::Organizer),
            unknown => Err(UnknownRoleError(unknown.to_string())),
        }
    }
}

impl Permission {
    /// All seven permissions, in table order.
    pub const ALL: [Permission; 7] = [
        Permission::ViewTrip,
        Permission::EditTrip,
        Permission::DeleteTrip,
        Permission::InviteMembers,
        Permission::ManageMembers,
        Permission::ViewExpenses,
        Permission::EditExpenses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewTrip => "view_trip",
            Permission::EditTrip => "edit_trip",
            Permission::DeleteTrip => "delete_trip",
            Permission::InviteMembers => "invite_members",
            Permission::ManageMembers => "manage_members",
            Permission::ViewExpenses => "view_expenses",
            Permission::EditExpenses => "edit_expenses",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
