use async_trait::async_trait;
use common::{BookingId, EventId};
use domain::{Booking, EventInventory};

use crate::{BookingQuery, ChangeSet, Result, Scope, Versioned};

/// Core trait for reservation store implementations.
///
/// The store holds two kinds of records, event inventories and bookings, each
/// carrying a version. Reads are point lookups; all writes go through
/// [`ReservationStore::commit`], which is the only way to change state.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Reads an event inventory and its current version.
    async fn load_inventory(&self, event_id: EventId)
    -> Result<Option<Versioned<EventInventory>>>;

    /// Reads a booking and its current version.
    async fn load_booking(&self, booking_id: BookingId) -> Result<Option<Versioned<Booking>>>;

    /// Applies every write in `changes` atomically.
    ///
    /// Before anything is written, each record's stored version is compared
    /// with the write's expected version (`Version::initial()` meaning the
    /// record must not exist yet). Any mismatch fails the whole commit with
    /// `StoreError::Conflict` and leaves the store untouched. On success each
    /// written record's version advances by one.
    async fn commit(&self, changes: ChangeSet) -> Result<()>;

    /// Retrieves bookings matching a query, newest first.
    async fn query_bookings(&self, query: BookingQuery) -> Result<Vec<Booking>>;

    /// Retrieves every event inventory.
    async fn list_inventories(&self) -> Result<Vec<EventInventory>>;
}

/// Extension trait providing convenience methods for reservation stores.
#[async_trait]
pub trait ReservationStoreExt: ReservationStore {
    /// Opens an atomic scope against this store.
    fn begin(&self) -> Scope<'_, Self> {
        Scope::new(self)
    }

    /// Inserts a new event inventory.
    async fn insert_inventory(&self, inventory: EventInventory) -> Result<()> {
        let mut changes = ChangeSet::new();
        changes.put_inventory(inventory, crate::Version::initial());
        self.commit(changes).await
    }
}

// Blanket implementation for all ReservationStore implementations
impl<T: ReservationStore + ?Sized> ReservationStoreExt for T {}
