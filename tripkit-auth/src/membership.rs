// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use crate::Role;

/// A membership records that a user holds a specific role on a specific trip.
///
/// At most one membership exists per (user, trip) pair. A user without a membership record holds
/// no role and no access.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Membership<UID, TID> {
    pub user_id: UID,
    pub trip_id: TID,
    pub role: Role,
}

impl<UID, TID> Membership<UID, TID> {
    pub fn new(user_id: UID, trip_id: TID, role: Role) -> Self {
        Self {
            user_id,
            trip_id,
            role,
        }
    }

    /// Return `true` if this membership carries the organizer role.
    pub fn is_organizer(&self) -> bool {
        self.role.is_organizer()
    }
}
