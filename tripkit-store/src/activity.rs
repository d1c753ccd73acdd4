// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use tripkit_auth::Role;

/// A single entry in a trip's activity log.
///
/// Every successful mutation appends one entry. Entries are kept in mutation order and are
/// deleted together with the trip.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Activity<UID> {
    /// The user who performed the mutation.
    pub actor: UID,
    pub kind: ActivityKind<UID>,
}

/// The membership mutations recorded in a trip's activity log.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind<UID> {
    /// The trip was created; the actor is its first organizer.
    Created,
    MemberAdded { member: UID, role: Role },
    MemberRemoved { member: UID },
    RoleChanged { member: UID, role: Role },
}
