// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence for trips and their memberships.
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use tripkit_auth::traits::{IdentityHandle, MembershipStore};
use tripkit_auth::{Membership, Permission, Role};

use crate::activity::{Activity, ActivityKind};
use crate::traits::{TripStore, TripStoreError};

/// Per-trip membership map and activity log.
#[derive(Clone, Debug)]
struct TripRecord<UID> {
    members: HashMap<UID, Role>,
    activities: Vec<Activity<UID>>,
}

impl<UID> TripRecord<UID>
where
    UID: IdentityHandle,
{
    fn organizer_count(&self) -> usize {
        self.members.values().filter(|role| role.is_organizer()).count()
    }
}

/// An in-memory store for trips, memberships and activity logs.
#[derive(Clone, Debug)]
pub struct InnerMemoryStore<UID, TID> {
    trips: HashMap<TID, TripRecord<UID>>,
}

/// An in-memory store for trips, memberships and activity logs.
///
/// `MemoryStore` supports usage in asynchronous and multi-threaded contexts by wrapping an
/// `InnerMemoryStore` with an `RwLock` and `Arc`. Convenience methods are provided to obtain a
/// read- or write-lock on the underlying store.
///
/// Every mutation holds the write lock for its whole duration, so the permission check and the
/// write it guards are atomic, and a completed mutation is visible to the very next membership
/// lookup.
#[derive(Clone, Debug)]
pub struct MemoryStore<UID, TID> {
    inner: Arc<RwLock<InnerMemoryStore<UID, TID>>>,
}

impl<UID, TID> MemoryStore<UID, TID> {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        let inner = InnerMemoryStore {
            trips: HashMap::new(),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Obtain a read-lock on the store.
    pub fn read_store(&self) -> RwLockReadGuard<'_, InnerMemoryStore<UID, TID>> {
        self.inner
            .read()
            .expect("acquire shared read access on store")
    }

    /// Obtain a write-lock on the store.
    pub fn write_store(&self) -> RwLockWriteGuard<'_, InnerMemoryStore<UID, TID>> {
        self.inner
            .write()
            .expect("acquire exclusive write access on store")
    }
}

impl<UID, TID> Default for MemoryStore<UID, TID> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure the actor is a trip member whose role grants the given permission.
fn require_permission<UID, TID>(
    record: &TripRecord<UID>,
    actor: &UID,
    permission: Permission,
) -> Result<(), TripStoreError<UID, TID>>
where
    UID: IdentityHandle,
    TID: IdentityHandle,
{
    let Some(role) = record.members.get(actor) else {
        return Err(TripStoreError::UnrecognisedActor(*actor));
    };

    if !role.grants(permission) {
        return Err(TripStoreError::InsufficientAccess {
            actor: *actor,
            permission,
        });
    }

    Ok(())
}

impl<UID, TID> MembershipStore<UID, TID> for MemoryStore<UID, TID>
where
    UID: IdentityHandle + Send + Sync,
    TID: IdentityHandle + Send + Sync,
{
    type Error = Infallible;

    async fn membership(
        &self,
        user_id: &UID,
        trip_id: &TID,
    ) -> Result<Option<Membership<UID, TID>>, Self::Error> {
        let store = self.read_store();
        Ok(store
            .trips
            .get(trip_id)
            .and_then(|record| record.members.get(user_id))
            .map(|role| Membership::new(*user_id, *trip_id, *role)))
    }
}

impl<UID, TID> TripStore<UID, TID> for MemoryStore<UID, TID>
where
    UID: IdentityHandle + Display + Send + Sync,
    TID: IdentityHandle + Display + Send + Sync,
{
    type Error = TripStoreError<UID, TID>;

    async fn create_trip(&mut self, trip_id: &TID, creator: &UID) -> Result<(), Self::Error> {
        let mut store = self.write_store();

        if store.trips.contains_key(trip_id) {
            return Err(TripStoreError::TripAlreadyExists(*trip_id));
        }

        // Trip and organizer membership are inserted in one write; the trip never exists
        // without an organizer.
        let record = TripRecord {
            members: HashMap::from([(*creator, Role::Organizer)]),
            activities: vec![Activity {
                actor: *creator,
                kind: ActivityKind::Created,
            }],
        };
        store.trips.insert(*trip_id, record);

        debug!(trip_id = %trip_id, creator = %creator, "created trip");
        Ok(())
    }

    async fn delete_trip(&mut self, actor: &UID, trip_id: &TID) -> Result<(), Self::Error> {
        let mut store = self.write_store();

        let Some(record) = store.trips.get(trip_id) else {
            return Err(TripStoreError::UnknownTrip(*trip_id));
        };
        require_permission(record, actor, Permission::DeleteTrip)?;

        // Memberships and the activity log are dropped with the trip.
        store.trips.remove(trip_id);

        debug!(trip_id = %trip_id, actor = %actor, "deleted trip");
        Ok(())
    }

    async fn add_member(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
        role: Role,
    ) -> Result<Membership<UID, TID>, Self::Error> {
        let mut store = self.write_store();

        let Some(record) = store.trips.get_mut(trip_id) else {
            return Err(TripStoreError::UnknownTrip(*trip_id));
        };
        require_permission(record, actor, Permission::InviteMembers)?;

        if record.members.contains_key(user_id) {
            return Err(TripStoreError::AlreadyMember(*user_id));
        }

        record.members.insert(*user_id, role);
        record.activities.push(Activity {
            actor: *actor,
            kind: ActivityKind::MemberAdded {
                member: *user_id,
                role,
            },
        });

        debug!(trip_id = %trip_id, actor = %actor, member = %user_id, role = %role, "added trip member");
        Ok(Membership::new(*user_id, *trip_id, role))
    }

    async fn remove_member(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
    ) -> Result<(), Self::Error> {
        let mut store = self.write_store();

        let Some(record) = store.trips.get_mut(trip_id) else {
            return Err(TripStoreError::UnknownTrip(*trip_id));
        };
        require_permission(record, actor, Permission::ManageMembers)?;

        let Some(role) = record.members.get(user_id) else {
            return Err(TripStoreError::UnknownMember(*user_id));
        };

        // A trip keeps at least one organizer for its entire lifetime; only deleting the trip
        // ends that invariant.
        if role.is_organizer() && record.organizer_count() == 1 {
            return Err(TripStoreError::LastOrganizer(*user_id));
        }

        record.members.remove(user_id);
        record.activities.push(Activity {
            actor: *actor,
            kind: ActivityKind::MemberRemoved { member: *user_id },
        });

        debug!(trip_id = %trip_id, actor = %actor, member = %user_id, "removed trip member");
        Ok(())
    }

    async fn change_role(
        &mut self,
        actor: &UID,
        trip_id: &TID,
        user_id: &UID,
        role: Role,
    ) -> Result<Membership<UID, TID>, Self::Error> {
        let mut store = self.write_store();

        let Some(record) = store.trips.get_mut(trip_id) else {
            return Err(TripStoreError::UnknownTrip(*trip_id));
        };
        require_permission(record, actor, Permission::ManageMembers)?;

        let Some(current) = record.members.get(user_id) else {
            return Err(TripStoreError::UnknownMember(*user_id));
        };

        if current.is_organizer() && !role.is_organizer() && record.organizer_count() == 1 {
            return Err(TripStoreError::LastOrganizer(*user_id));
        }

        record.members.insert(*user_id, role);
        record.activities.push(Activity {
            actor: *actor,
            kind: ActivityKind::RoleChanged {
                member: *user_id,
                role,
            },
        });

        debug!(trip_id = %trip_id, actor = %actor, member = %user_id, role = %role, "changed member role");
        Ok(Membership::new(*user_id, *trip_id, role))
    }

    async fn members(
        &self,
        trip_id: &TID,
    ) -> Result<Option<Vec<Membership<UID, TID>>>, Self::Error> {
        let store = self.read_store();
        Ok(store.trips.get(trip_id).map(|record| {
            record
                .members
                .iter()
                .map(|(user_id, role)| Membership::new(*user_id, *trip_id, *role))
                .collect()
        }))
    }

    async fn trips(&self, user_id: &UID) -> Result<Vec<TID>, Self::Error> {
        let store = self.read_store();
        Ok(store
            .trips
            .iter()
            .filter_map(|(trip_id, record)| {
                record.members.contains_key(user_id).then_some(*trip_id)
            })
            .collect())
    }

    async fn activities(&self, trip_id: &TID) -> Result<Option<Vec<Activity<UID>>>, Self::Error> {
        let store = self.read_store();
        Ok(store
            .trips
            .get(trip_id)
            .map(|record| record.activities.clone()))
    }
}

#[cfg(test)]
mod tests {
    use tripkit_auth::traits::MembershipStore;
    use tripkit_auth::{Membership, Permission, Role};

    use crate::activity::ActivityKind;
    use crate::traits::{TripStore, TripStoreError};

    use super::MemoryStore;

    #[tokio::test]
    async fn create_trip_inserts_creator_as_organizer() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");

        let membership = store
            .membership(&alice, &trip)
            .await
            .expect("no errors")
            .expect("membership should exist");
        assert_eq!(membership, Membership::new(alice, trip, Role::Organizer));

        // The creation itself is the first activity.
        let activities = store
            .activities(&trip)
            .await
            .expect("no errors")
            .expect("trip should exist");
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].actor, alice);
        assert_eq!(activities[0].kind, ActivityKind::Created);
    }

    #[tokio::test]
    async fn create_trip_twice_fails() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");

        let result = store.create_trip(&trip, &bob).await;
        assert_eq!(result, Err(TripStoreError::TripAlreadyExists(trip)));

        // Alice's membership is untouched.
        let membership = store
            .membership(&alice, &trip)
            .await
            .expect("no errors")
            .expect("membership should exist");
        assert_eq!(membership.role, Role::Organizer);
    }

    #[tokio::test]
    async fn add_member_requires_invite_permission() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let claire = 'C';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Participant)
            .await
            .expect("no errors");

        // Participants cannot invite.
        let result = store.add_member(&bob, &trip, &claire, Role::Viewer).await;
        assert_eq!(
            result,
            Err(TripStoreError::InsufficientAccess {
                actor: bob,
                permission: Permission::InviteMembers,
            })
        );

        // Non-members cannot invite either.
        let result = store.add_member(&claire, &trip, &claire, Role::Viewer).await;
        assert_eq!(result, Err(TripStoreError::UnrecognisedActor(claire)));
    }

    #[tokio::test]
    async fn add_member_twice_fails() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Viewer)
            .await
            .expect("no errors");

        let result = store.add_member(&alice, &trip, &bob, Role::Participant).await;
        assert_eq!(result, Err(TripStoreError::AlreadyMember(bob)));

        // The original role is untouched.
        let membership = store
            .membership(&bob, &trip)
            .await
            .expect("no errors")
            .expect("membership should exist");
        assert_eq!(membership.role, Role::Viewer);
    }

    #[tokio::test]
    async fn remove_member_requires_manage_permission() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let claire = 'C';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Participant)
            .await
            .expect("no errors");
        store
            .add_member(&alice, &trip, &claire, Role::Viewer)
            .await
            .expect("no errors");

        let result = store.remove_member(&bob, &trip, &claire).await;
        assert_eq!(
            result,
            Err(TripStoreError::InsufficientAccess {
                actor: bob,
                permission: Permission::ManageMembers,
            })
        );

        store
            .remove_member(&alice, &trip, &claire)
            .await
            .expect("no errors");
        assert!(
            store
                .membership(&claire, &trip)
                .await
                .expect("no errors")
                .is_none()
        );
    }

    #[tokio::test]
    async fn removing_unknown_member_fails() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");

        let result = store.remove_member(&alice, &trip, &bob).await;
        assert_eq!(result, Err(TripStoreError::UnknownMember(bob)));
    }

    #[tokio::test]
    async fn last_organizer_cannot_be_removed_or_demoted() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Participant)
            .await
            .expect("no errors");

        // Alice is the only organizer: neither self-removal nor self-demotion may proceed.
        let result = store.remove_member(&alice, &trip, &alice).await;
        assert_eq!(result, Err(TripStoreError::LastOrganizer(alice)));

        let result = store
            .change_role(&alice, &trip, &alice, Role::Viewer)
            .await;
        assert_eq!(result, Err(TripStoreError::LastOrganizer(alice)));

        // Once bob is promoted to organizer, alice can step down.
        store
            .change_role(&alice, &trip, &bob, Role::Organizer)
            .await
            .expect("no errors");
        store
            .remove_member(&bob, &trip, &alice)
            .await
            .expect("no errors");

        assert!(
            store
                .membership(&alice, &trip)
                .await
                .expect("no errors")
                .is_none()
        );
    }

    #[tokio::test]
    async fn role_change_is_visible_to_the_next_lookup() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Viewer)
            .await
            .expect("no errors");

        store
            .change_role(&alice, &trip, &bob, Role::Organizer)
            .await
            .expect("no errors");

        let membership = store
            .membership(&bob, &trip)
            .await
            .expect("no errors")
            .expect("membership should exist");
        assert_eq!(membership.role, Role::Organizer);
    }

    #[tokio::test]
    async fn delete_trip_requires_delete_permission_and_cascades() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Participant)
            .await
            .expect("no errors");

        let result = store.delete_trip(&bob, &trip).await;
        assert_eq!(
            result,
            Err(TripStoreError::InsufficientAccess {
                actor: bob,
                permission: Permission::DeleteTrip,
            })
        );

        store.delete_trip(&alice, &trip).await.expect("no errors");

        // Memberships and the activity log are gone with the trip.
        assert!(
            store
                .membership(&alice, &trip)
                .await
                .expect("no errors")
                .is_none()
        );
        assert!(
            store
                .membership(&bob, &trip)
                .await
                .expect("no errors")
                .is_none()
        );
        assert!(store.members(&trip).await.expect("no errors").is_none());
        assert!(store.activities(&trip).await.expect("no errors").is_none());
        assert!(store.trips(&alice).await.expect("no errors").is_empty());
    }

    #[tokio::test]
    async fn members_and_trips_queries() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip_x = 'X';
        let trip_y = 'Y';

        store.create_trip(&trip_x, &alice).await.expect("no errors");
        store.create_trip(&trip_y, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip_x, &bob, Role::Viewer)
            .await
            .expect("no errors");

        let mut members = store
            .members(&trip_x)
            .await
            .expect("no errors")
            .expect("trip should exist");
        members.sort_by_key(|membership| membership.user_id);
        assert_eq!(
            members,
            vec![
                Membership::new(alice, trip_x, Role::Organizer),
                Membership::new(bob, trip_x, Role::Viewer),
            ]
        );

        // Unknown trips yield no member list at all.
        assert!(store.members(&'?').await.expect("no errors").is_none());

        let mut alice_trips = store.trips(&alice).await.expect("no errors");
        alice_trips.sort();
        assert_eq!(alice_trips, vec![trip_x, trip_y]);

        let bob_trips = store.trips(&bob).await.expect("no errors");
        assert_eq!(bob_trips, vec![trip_x]);
    }

    #[tokio::test]
    async fn activity_log_records_mutations_in_order() {
        let mut store = MemoryStore::new();
        let alice = 'A';
        let bob = 'B';
        let trip = 'X';

        store.create_trip(&trip, &alice).await.expect("no errors");
        store
            .add_member(&alice, &trip, &bob, Role::Viewer)
            .await
            .expect("no errors");
        store
            .change_role(&alice, &trip, &bob, Role::Participant)
            .await
            .expect("no errors");
        store
            .remove_member(&alice, &trip, &bob)
            .await
            .expect("no errors");

        let activities = store
            .activities(&trip)
            .await
            .expect("no errors")
            .expect("trip should exist");
        let kinds = activities
            .iter()
            .map(|activity| activity.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::Created,
                ActivityKind::MemberAdded {
                    member: bob,
                    role: Role::Viewer,
                },
                ActivityKind::RoleChanged {
                    member: bob,
                    role: Role::Participant,
                },
                ActivityKind::MemberRemoved { member: bob },
            ]
        );
        assert!(activities.iter().all(|activity| activity.actor == alice));

        // Failed mutations leave no trace in the log.
        let result = store.remove_member(&alice, &trip, &bob).await;
        assert_eq!(result, Err(TripStoreError::UnknownMember(bob)));
        let activities = store
            .activities(&trip)
            .await
            .expect("no errors")
            .expect("trip should exist");
        assert_eq!(activities.len(), 4);
    }
}
