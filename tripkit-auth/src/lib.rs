// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource-scoped authorization for collaborative trip access.
//!
//! Trips are shared between users, with every member holding exactly one [`Role`] which governs a
//! fixed set of [`Permission`]s. This crate answers one question: may this user perform this
//! action on this trip?
//!
//! The decision procedure ([`check_permission`]) is a pure function over the current membership
//! state. Membership state itself is owned by the embedding application and reached through the
//! [`MembershipStore`](traits::MembershipStore) trait, which is the single point of suspension
//! and the only collaborator of this crate. Lookups must be strongly consistent: a role change
//! must be visible to the very next permission check, which is why no cache sits at this layer.
//!
//! Denial is not an error. A missing membership results in `Ok(false)` without distinguishing
//! between "trip does not exist" and "user is not a member", so trip existence is never leaked
//! to non-members. Store failures propagate verbatim as `Err` and are never folded into a
//! denial.

mod access;
mod engine;
mod membership;
pub mod traits;

pub use access::{Permission, Role, UnknownRoleError};
pub use engine::{check_permission, is_member, member_role};
pub use membership::Membership;
