// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for trip and membership persistence.

use std::fmt::{Debug, Display};

use thiserror::Error;

use tripkit_auth::traits::IdentityHandle;
use tripkit_auth::{Membership, Permission, Role};

use crate::activity::Activity;

/// Rule violations raised by membership mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TripStoreError<UID, TID> {
    #[error("trip already exists in the store: {0}")]
    TripAlreadyExists(TID),

    #[error("trip is not known to the store: {0}")]
    UnknownTrip(TID),

    #[error("actor is not a member of the trip: {0}")]
    UnrecognisedActor(UID),

    #[error("actor {actor} lacks the {permission} permission on the trip")]
    InsufficientAccess { actor: UID, permission: Permission },

    #[error("user is already a member of the trip: {0}")]
    AlreadyMember(UID),

    #[error("user is not a member of the trip: {0}")]
    UnknownMember(UID),

    #[error("cannot remove or demote the last organizer of the trip: {0}")]
    LastOrganizer(UID),
}

/// Interface for storing, mutating and querying trips and their memberships.
///
/// Two variants of the trait are provided: one which is thread-safe (implementing `Send`) and one
/// which is purely intended for single-threaded execution contexts.
///
/// Every mutation names the acting user and is checked against the role to permission table
/// before it applies, atomically with the write itself. Writes must be immediately visible to
/// subsequent membership lookups; authorization correctness depends on there being no
/// eventual-consistency window.
///
/// Read queries carry no actor and are not permission-checked; callers gate them through
/// [`tripkit_auth::check_permission`].
#[trait_variant::make(TripStore: Send)]
pub trait LocalTripStore<UID, TID>
where
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    type Error: Display + Debug;

    /// Create a trip, inserting the creator as its first organizer.
    ///
    /// Both writes happen atomically; there is no moment at which the trip exists without an
    /// organizer. Creating a trip under an existing identifier is an error.
    async fn create_trip(&mut self, trip_id: &TID, creator: &UID) -> Result<(), Self::Error>;

    /// Delete a trip along with all of its memberships and its activity log.
    ///
    /// Requires the actor to hold [`Permission::DeleteTrip`] on the trip.
    async fn delete_trip(&mut self, actor: &UID, trip_id: &TID) -> Result<(), Self::Error>;

    /// Add a member to the trip with the given role.
    ///
    /// Requires the actor to hold [`Permission::InviteMembers`] on the trip. At most one
    /// membership exists per (user, trip) pair, so adding a current member is an error.
    async fn add_member(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
        role: Role,
    ) -> Result<Membership<UID, TID>, Self::Error>;

    /// Remove a member from the trip.
    ///
    /// Requires the actor to hold [`Permission::ManageMembers`] on the trip. Removing the last
    /// organizer is refused; a trip keeps at least one organizer for its entire lifetime and
    /// only [`delete_trip`](LocalTripStore::delete_trip) ends that invariant.
    async fn remove_member(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
    ) -> Result<(), Self::Error>;

    /// Change a member's role.
    ///
    /// Requires the actor to hold [`Permission::ManageMembers`] on the trip. Demoting the last
    /// organizer is refused. The new role must be visible to the very next membership lookup.
    async fn change_role(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
        role: Role,
    ) -> Result<Membership<UID, TID>, Self::Error>;

    /// All memberships of a trip.
    ///
    /// Returns `None` when the trip is not known to the store.
    async fn members(&self, trip_id: &TID) -> Result<Option<Vec<Membership<UID, TID>>>, Self::Error>;

    /// IDs of all trips the user is a member of.
    async fn trips(&self, user_id: &UID) -> Result<Vec<TID>, Self::Error>;

    /// The trip's activity log, in mutation order.
    ///
    /// Returns `None` when the trip is not known to the store.
    async fn activities(&self, trip_id: &TID) -> Result<Option<Vec<Activity<UID>>>, Self::Error>;
}
