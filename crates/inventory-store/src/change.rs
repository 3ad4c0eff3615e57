use common::EventId;
use domain::{Booking, EventInventory};

use crate::Version;

/// A record staged for commit, with the version it must still be at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write<T> {
    pub record: T,
    pub expected: Version,
}

impl<T> Write<T> {
    /// True if the write creates the record rather than updating it.
    pub fn is_insert(&self) -> bool {
        self.expected == Version::initial()
    }
}

/// An event inventory staged for deletion at its expected version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub event_id: EventId,
    pub expected: Version,
}

/// The writes of one atomic scope.
///
/// A commit applies every write or none of them. Each record appears at most
/// once; staging it again replaces the earlier write but keeps the first
/// expected version. Removing an inventory drops any staged write for it.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    inventories: Vec<Write<EventInventory>>,
    bookings: Vec<Write<Booking>>,
    removals: Vec<Removal>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_inventory(&mut self, record: EventInventory, expected: Version) {
        match self
            .inventories
            .iter_mut()
            .find(|w| w.record.id() == record.id())
        {
            Some(existing) => existing.record = record,
            None => self.inventories.push(Write { record, expected }),
        }
    }

    pub fn put_booking(&mut self, record: Booking, expected: Version) {
        match self.bookings.iter_mut().find(|w| w.record.id() == record.id()) {
            Some(existing) => existing.record = record,
            None => self.bookings.push(Write { record, expected }),
        }
    }

    pub fn remove_inventory(&mut self, event_id: EventId, expected: Version) {
        let expected = match self
            .inventories
            .iter()
            .position(|w| w.record.id() == event_id)
        {
            Some(index) => self.inventories.remove(index).expected,
            None => expected,
        };
        if !self.removals.iter().any(|r| r.event_id == event_id) {
            self.removals.push(Removal { event_id, expected });
        }
    }

    pub fn inventories(&self) -> &[Write<EventInventory>] {
        &self.inventories
    }

    pub fn bookings(&self) -> &[Write<Booking>] {
        &self.bookings
    }

    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }

    pub fn len(&self) -> usize {
        self.inventories.len() + self.bookings.len() + self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EventId;
    use domain::{Money, seats};

    #[test]
    fn restaging_replaces_record_and_keeps_expected_version() {
        let mut inv = EventInventory::new(EventId::new(), 5, Money::zero()).unwrap();
        let mut changes = ChangeSet::new();

        changes.put_inventory(inv.clone(), Version::new(3));
        inv.hold_seats(&seats(["A-1"])).unwrap();
        changes.put_inventory(inv.clone(), Version::new(7));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes.inventories()[0].expected, Version::new(3));
        assert_eq!(changes.inventories()[0].record.available_seats(), 4);
    }

    #[test]
    fn removal_replaces_staged_write() {
        let mut inv = EventInventory::new(EventId::new(), 5, Money::zero()).unwrap();
        let mut changes = ChangeSet::new();

        changes.put_inventory(inv.clone(), Version::new(2));
        inv.hold_seats(&seats(["A-1"])).unwrap();
        changes.remove_inventory(inv.id(), Version::new(9));
        changes.remove_inventory(inv.id(), Version::new(9));

        assert!(changes.inventories().is_empty());
        assert_eq!(
            changes.removals(),
            &[Removal {
                event_id: inv.id(),
                expected: Version::new(2)
            }]
        );
        assert_eq!(changes.len(), 1);
    }
}
