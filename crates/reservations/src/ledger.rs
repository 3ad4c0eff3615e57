//! Booking ledger queries.

use common::OwnerId;
use domain::{Booking, Money, ReservationError};
use inventory_store::{BookingQuery, ReservationStore};
use serde::Serialize;

/// How many bookings the summary lists as recent activity.
const RECENT_BOOKINGS: usize = 5;

/// Dashboard figures over the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingSummary {
    pub total_events: usize,
    pub total_bookings: usize,
    pub confirmed_bookings: usize,
    pub cancelled_bookings: usize,
    /// Seats held by confirmed bookings.
    pub seats_sold: u64,
    /// Sum of the amounts of confirmed bookings only.
    pub revenue: Money,
}

/// Read-only view of the booking ledger.
#[derive(Clone)]
pub struct BookingLedger<S: ReservationStore> {
    store: S,
}

impl<S: ReservationStore> BookingLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the bookings owned by `owner_id`, newest first.
    pub async fn my_bookings(&self, owner_id: OwnerId) -> Result<Vec<Booking>, ReservationError> {
        Ok(self
            .store
            .query_bookings(BookingQuery::for_owner(owner_id))
            .await?)
    }

    /// Returns the bookings matching `query`, newest first.
    pub async fn bookings(&self, query: BookingQuery) -> Result<Vec<Booking>, ReservationError> {
        Ok(self.store.query_bookings(query).await?)
    }

    /// Returns the most recent bookings across all owners.
    pub async fn recent(&self) -> Result<Vec<Booking>, ReservationError> {
        self.bookings(BookingQuery::new().limit(RECENT_BOOKINGS))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn summary(&self) -> Result<BookingSummary, ReservationError> {
        let total_events = self.store.list_inventories().await?.len();
        let bookings = self.store.query_bookings(BookingQuery::new()).await?;

        let confirmed: Vec<&Booking> = bookings.iter().filter(|b| b.is_confirmed()).collect();

        Ok(BookingSummary {
            total_events,
            total_bookings: bookings.len(),
            confirmed_bookings: confirmed.len(),
            cancelled_bookings: bookings.len() - confirmed.len(),
            seats_sold: confirmed.iter().map(|b| u64::from(b.seats_booked())).sum(),
            revenue: confirmed.iter().map(|b| b.total_amount()).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EventId;
    use domain::{Caller, EventInventory, ReservationRequest};
    use inventory_store::{InMemoryReservationStore, ReservationStoreExt};

    use crate::{CancellationCoordinator, ReservationCoordinator};

    #[tokio::test]
    async fn summary_counts_revenue_of_confirmed_only() {
        let store = InMemoryReservationStore::new();
        let inv = EventInventory::new(EventId::new(), 10, Money::from_cents(2000)).unwrap();
        let event_id = inv.id();
        store.insert_inventory(inv).await.unwrap();

        let reserve = ReservationCoordinator::new(store.clone());
        let owner = OwnerId::new();
        let kept = reserve
            .reserve(owner, ReservationRequest::new(event_id, 2, ["A-1", "A-2"]))
            .await
            .unwrap();
        let dropped = reserve
            .reserve(owner, ReservationRequest::new(event_id, 1, ["B-1"]))
            .await
            .unwrap();
        CancellationCoordinator::new(store.clone())
            .cancel(&Caller::user(owner), dropped.id())
            .await
            .unwrap();

        let ledger = BookingLedger::new(store);
        let summary = ledger.summary().await.unwrap();

        assert_eq!(summary.total_events, 1);
        assert_eq!(summary.total_bookings, 2);
        assert_eq!(summary.confirmed_bookings, 1);
        assert_eq!(summary.cancelled_bookings, 1);
        assert_eq!(summary.seats_sold, 2);
        assert_eq!(summary.revenue, kept.total_amount());

        let mine = ledger.my_bookings(owner).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(ledger.my_bookings(OwnerId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_ledger_summary() {
        let ledger = BookingLedger::new(InMemoryReservationStore::new());
        let summary = ledger.summary().await.unwrap();
        assert_eq!(summary.total_bookings, 0);
        assert_eq!(summary.revenue, Money::zero());
        assert!(ledger.recent().await.unwrap().is_empty());
    }
}
