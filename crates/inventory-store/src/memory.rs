use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{BookingId, EventId};
use domain::{Booking, EventInventory, Resource};
use tokio::sync::RwLock;

use crate::{
    BookingQuery, ChangeSet, Result, StoreError, Version, Versioned, store::ReservationStore,
};

#[derive(Default)]
struct State {
    inventories: HashMap<EventId, Versioned<EventInventory>>,
    bookings: HashMap<BookingId, Versioned<Booking>>,
}

/// In-memory reservation store.
///
/// Provides the same commit semantics as the PostgreSQL implementation: all
/// version checks of a commit happen under one write lock before any record is
/// replaced. Used by the tests and by the server when no database is
/// configured.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<RwLock<State>>,
    fail_on_commit: Arc<AtomicBool>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent non-empty commit fail with
    /// `StoreError::Unavailable` before touching any record.
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.fail_on_commit.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored inventories.
    pub async fn inventory_count(&self) -> usize {
        self.state.read().await.inventories.len()
    }

    /// Returns the number of stored bookings.
    pub async fn booking_count(&self) -> usize {
        self.state.read().await.bookings.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.inventories.clear();
        state.bookings.clear();
    }
}

fn check_version(
    resource: Resource,
    id: impl ToString,
    current: Option<Version>,
    expected: Version,
) -> Result<()> {
    let actual = current.unwrap_or(Version::initial());
    if actual != expected {
        return Err(StoreError::Conflict {
            resource,
            id: id.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn load_inventory(
        &self,
        event_id: EventId,
    ) -> Result<Option<Versioned<EventInventory>>> {
        Ok(self.state.read().await.inventories.get(&event_id).cloned())
    }

    async fn load_booking(&self, booking_id: BookingId) -> Result<Option<Versioned<Booking>>> {
        Ok(self.state.read().await.bookings.get(&booking_id).cloned())
    }

    #[tracing::instrument(skip(self, changes), fields(writes = changes.len()))]
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        if self.fail_on_commit.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "commit rejected by fault injection".to_string(),
            ));
        }

        let mut state = self.state.write().await;

        for write in changes.inventories() {
            let id = write.record.id();
            let current = state.inventories.get(&id).map(|r| r.version);
            check_version(Resource::Event, id, current, write.expected)?;
        }
        for write in changes.bookings() {
            let id = write.record.id();
            let current = state.bookings.get(&id).map(|r| r.version);
            check_version(Resource::Booking, id, current, write.expected)?;
        }
        for removal in changes.removals() {
            let current = state.inventories.get(&removal.event_id).map(|r| r.version);
            if current.is_none() {
                return Err(StoreError::Conflict {
                    resource: Resource::Event,
                    id: removal.event_id.to_string(),
                    expected: removal.expected,
                    actual: Version::initial(),
                });
            }
            check_version(Resource::Event, removal.event_id, current, removal.expected)?;
        }

        for write in changes.inventories() {
            state.inventories.insert(
                write.record.id(),
                Versioned::new(write.record.clone(), write.expected.next()),
            );
        }
        for write in changes.bookings() {
            state.bookings.insert(
                write.record.id(),
                Versioned::new(write.record.clone(), write.expected.next()),
            );
        }
        for removal in changes.removals() {
            state.inventories.remove(&removal.event_id);
        }

        Ok(())
    }

    async fn query_bookings(&self, query: BookingQuery) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|r| query.matches(&r.value))
            .map(|r| r.value.clone())
            .collect();

        bookings.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(bookings.into_iter().skip(offset).take(limit).collect())
    }

    async fn list_inventories(&self) -> Result<Vec<EventInventory>> {
        let state = self.state.read().await;
        let mut inventories: Vec<EventInventory> =
            state.inventories.values().map(|r| r.value.clone()).collect();
        inventories.sort_by_key(|inv| inv.id());
        Ok(inventories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReservationStoreExt;
    use chrono::{Duration, Utc};
    use common::OwnerId;
    use domain::{BookingStatus, Money, seats};

    fn inventory(total: u32) -> EventInventory {
        EventInventory::new(EventId::new(), total, Money::from_cents(2500)).unwrap()
    }

    fn booking_at(event_id: EventId, owner: OwnerId, minutes_ago: i64) -> Booking {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Booking::from_parts(
            BookingId::new(),
            owner,
            event_id,
            seats(["A-1"]),
            Money::from_cents(2500),
            BookingStatus::Confirmed,
            at,
            at,
        )
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let store = InMemoryReservationStore::new();
        let inv = inventory(10);
        let id = inv.id();

        store.insert_inventory(inv.clone()).await.unwrap();

        let loaded = store.load_inventory(id).await.unwrap().unwrap();
        assert_eq!(loaded.value, inv);
        assert_eq!(loaded.version, Version::first());
        assert_eq!(store.inventory_count().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = InMemoryReservationStore::new();
        let inv = inventory(10);

        store.insert_inventory(inv.clone()).await.unwrap();
        let err = store.insert_inventory(inv).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = InMemoryReservationStore::new();
        let inv = inventory(10);
        let event_id = inv.id();
        store.insert_inventory(inv.clone()).await.unwrap();

        let mut held = inv.clone();
        held.hold_seats(&seats(["A-1"])).unwrap();
        let booking = booking_at(event_id, OwnerId::new(), 0);

        // Inventory write is fine, but the booking claims to update a record
        // that does not exist.
        let mut changes = ChangeSet::new();
        changes.put_inventory(held, Version::first());
        changes.put_booking(booking.clone(), Version::first());

        let err = store.commit(changes).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                resource: Resource::Booking,
                ..
            }
        ));

        let stored = store.load_inventory(event_id).await.unwrap().unwrap();
        assert_eq!(stored.version, Version::first());
        assert_eq!(stored.value.available_seats(), 10);
        assert!(store.load_booking(booking.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_removal_of_missing_inventory_conflicts() {
        let store = InMemoryReservationStore::new();
        let inv = inventory(10);
        store.insert_inventory(inv.clone()).await.unwrap();

        let mut changes = ChangeSet::new();
        changes.remove_inventory(inv.id(), Version::first());
        store.commit(changes.clone()).await.unwrap();
        assert_eq!(store.inventory_count().await, 0);

        let err = store.commit(changes).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_fail_on_commit() {
        let store = InMemoryReservationStore::new();
        store.set_fail_on_commit(true);

        let err = store.insert_inventory(inventory(5)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.inventory_count().await, 0);

        store.set_fail_on_commit(false);
        store.insert_inventory(inventory(5)).await.unwrap();
        assert_eq!(store.inventory_count().await, 1);
    }

    #[tokio::test]
    async fn test_query_bookings_newest_first_with_paging() {
        let store = InMemoryReservationStore::new();
        let event_id = EventId::new();
        let owner = OwnerId::new();

        let oldest = booking_at(event_id, owner, 30);
        let middle = booking_at(event_id, owner, 20);
        let newest = booking_at(event_id, owner, 10);
        let other = booking_at(EventId::new(), OwnerId::new(), 5);

        let mut changes = ChangeSet::new();
        for b in [&oldest, &middle, &newest, &other] {
            changes.put_booking(b.clone(), Version::initial());
        }
        store.commit(changes).await.unwrap();

        let mine = store
            .query_bookings(BookingQuery::for_owner(owner))
            .await
            .unwrap();
        let ids: Vec<_> = mine.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![newest.id(), middle.id(), oldest.id()]);

        let page = store
            .query_bookings(BookingQuery::for_owner(owner).offset(1).limit(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), middle.id());

        let all = store.query_bookings(BookingQuery::new()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id(), other.id());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryReservationStore::new();
        store.insert_inventory(inventory(3)).await.unwrap();
        store.clear().await;
        assert_eq!(store.inventory_count().await, 0);
        assert!(store.list_inventories().await.unwrap().is_empty());
    }
}
