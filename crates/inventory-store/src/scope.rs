use std::collections::HashMap;

use common::{BookingId, EventId};
use domain::{Booking, EventInventory};

use crate::{ChangeSet, ReservationStore, Result, Version};

/// An atomic unit of work against a [`ReservationStore`].
///
/// Reads made through the scope record the version they observed. Staged
/// writes carry that version as their expectation, so the commit fails with a
/// conflict if any staged record changed after it was read. A record staged
/// without being read is expected not to exist.
///
/// Nothing reaches the store before [`Scope::commit`]; dropping the scope
/// aborts it.
pub struct Scope<'a, S: ReservationStore + ?Sized> {
    store: &'a S,
    inventory_reads: HashMap<EventId, Version>,
    booking_reads: HashMap<BookingId, Version>,
    changes: ChangeSet,
}

impl<'a, S: ReservationStore + ?Sized> Scope<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            inventory_reads: HashMap::new(),
            booking_reads: HashMap::new(),
            changes: ChangeSet::new(),
        }
    }

    /// Reads an event inventory inside this scope.
    pub async fn inventory(&mut self, event_id: EventId) -> Result<Option<EventInventory>> {
        let loaded = self.store.load_inventory(event_id).await?;
        let version = loaded
            .as_ref()
            .map_or(Version::initial(), |record| record.version);
        // The first observation is what the scope's decisions rest on.
        self.inventory_reads.entry(event_id).or_insert(version);
        Ok(loaded.map(|record| record.value))
    }

    /// Reads a booking inside this scope.
    pub async fn booking(&mut self, booking_id: BookingId) -> Result<Option<Booking>> {
        let loaded = self.store.load_booking(booking_id).await?;
        let version = loaded
            .as_ref()
            .map_or(Version::initial(), |record| record.version);
        self.booking_reads.entry(booking_id).or_insert(version);
        Ok(loaded.map(|record| record.value))
    }

    pub fn stage_inventory(&mut self, inventory: EventInventory) {
        let expected = self
            .inventory_reads
            .get(&inventory.id())
            .copied()
            .unwrap_or(Version::initial());
        self.changes.put_inventory(inventory, expected);
    }

    pub fn stage_booking(&mut self, booking: Booking) {
        let expected = self
            .booking_reads
            .get(&booking.id())
            .copied()
            .unwrap_or(Version::initial());
        self.changes.put_booking(booking, expected);
    }

    /// Stages deletion of an inventory read through this scope.
    pub fn remove_inventory(&mut self, event_id: EventId) {
        let expected = self
            .inventory_reads
            .get(&event_id)
            .copied()
            .unwrap_or(Version::initial());
        self.changes.remove_inventory(event_id, expected);
    }

    /// Returns the writes staged so far.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Commits every staged write atomically.
    pub async fn commit(self) -> Result<()> {
        if self.changes.is_empty() {
            return Ok(());
        }
        self.store.commit(self.changes).await
    }

    /// Discards every staged write.
    pub fn abort(self) {
        tracing::debug!(staged = self.changes.len(), "scope aborted");
    }
}
