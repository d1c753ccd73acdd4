// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for identity types and the membership lookup required of the data layer.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::Membership;

/// Marker trait for opaque identity types used to address users and trips.
///
/// The embedding application decides what an identifier is (a UUID, an integer, a public key).
/// Authorization never inspects identities, it only compares them.
pub trait IdentityHandle: Copy + Debug + Eq + Hash {}

impl<T> IdentityHandle for T where T: Copy + Debug + Eq + Hash {}

/// Interface for looking up trip memberships.
///
/// Two variants of the trait are provided: one which is thread-safe (implementing `Send`) and one
/// which is purely intended for single-threaded execution contexts.
///
/// Implementations must be strongly consistent: a membership write must be visible to the very
/// next lookup, since authorization correctness depends on it. Any cache behind this interface
/// needs its own invalidation contract upholding that guarantee.
#[trait_variant::make(MembershipStore: Send)]
pub trait LocalMembershipStore<UID, TID>
where
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    type Error: Display + Debug;

    /// Look up the membership for the given user and trip.
    ///
    /// Returns `None` when no such membership exists, and only then. A transient failure (store
    /// unavailable, corrupted record) must surface as `Err` so that callers never mistake an
    /// infrastructure failure for a legitimate access denial.
    async fn membership(
        &self,
        user_id: &UID,
        trip_id: &TID,
    ) -> Result<Option<Membership<UID, TID>>, Self::Error>;
}
