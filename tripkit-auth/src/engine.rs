// SPDX-License-Identifier: MIT OR Apache-2.0

//! The trip authorization decision procedure.

use tracing::{debug, trace};

use crate::traits::{IdentityHandle, MembershipStore};
use crate::{Permission, Role};

/// Check whether a user may perform an action on a trip.
///
/// The membership lookup is the single suspension point; cancellation and timeouts propagate
/// straight through to the store. No retry happens here, as retrying a stale read could mask a
/// just-applied revocation.
///
/// A missing membership yields `Ok(false)` for any permission and any identities, known or not.
/// Callers are given no way to tell "trip does not exist" apart from "user is not a member", so
/// trip existence is not leaked to non-members. Store failures propagate verbatim as `Err`,
/// distinct from denial.
pub async fn check_permission<S, UID, TID>(
    store: &S,
    user_id: &UID,
    trip_id: &TID,
    permission: Permission,
) -> Result<bool, S::Error>
where
    S: MembershipStore<UID, TID>,
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    let Some(membership) = store.membership(user_id, trip_id).await? else {
        trace!(user_id = ?user_id, trip_id = ?trip_id, permission = %permission, "no membership, denying");
        return Ok(false);
    };

    let granted = membership.role.grants(permission);
    debug!(
        user_id = ?user_id,
        trip_id = ?trip_id,
        role = %membership.role,
        permission = %permission,
        granted,
        "checked trip permission"
    );
    Ok(granted)
}

/// Query the role a user holds on a trip, or `None` for non-members.
pub async fn member_role<S, UID, TID>(
    store: &S,
    user_id: &UID,
    trip_id: &TID,
) -> Result<Option<Role>, S::Error>
where
    S: MembershipStore<UID, TID>,
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    let membership = store.membership(user_id, trip_id).await?;
    Ok(membership.map(|membership| membership.role))
}

/// Return `true` if the user holds any membership on the trip.
pub async fn is_member<S, UID, TID>(
    store: &S,
    user_id: &UID,
    trip_id: &TID,
) -> Result<bool, S::Error>
where
    S: MembershipStore<UID, TID>,
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    let membership = store.membership(user_id, trip_id).await?;
    Ok(membership.is_some())
}
