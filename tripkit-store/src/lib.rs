// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces and implementations of persistence layers for trip memberships.
//!
//! `tripkit-store` owns every write path of the membership model: creating and deleting trips,
//! adding and removing members and changing their roles. Mutations are actor-checked inside the
//! store, against the same role to permission table the authorization engine consults, so that
//! the check and the write happen under one lock and a concurrent permission check can never
//! observe a half-applied change.
//!
//! Read queries (`members`, `trips`, `activities`) are not actor-checked here. Gating reads is
//! the caller's job, via [`tripkit_auth::check_permission`], which keeps the decision procedure
//! in one place.
//!
//! The [`MemoryStore`] implementation is strongly consistent: a completed mutation is visible to
//! the very next lookup. This is a hard requirement of the authorization model, not an
//! optimisation detail, and any alternative backend implementing [`TripStore`] must uphold it.

mod activity;
mod memory;
mod traits;

pub use activity::{Activity, ActivityKind};
pub use memory::{InnerMemoryStore, MemoryStore};
pub use traits::{LocalTripStore, TripStore, TripStoreError};
