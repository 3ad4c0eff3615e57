//! Cancellation coordinator.

use chrono::Utc;
use common::BookingId;
use domain::{Booking, Caller, ReservationError};
use inventory_store::{ReservationStore, ReservationStoreExt};

use crate::outcome::record_rejection;

/// Cancels bookings and returns their seats to the event inventory.
#[derive(Clone)]
pub struct CancellationCoordinator<S: ReservationStore> {
    store: S,
}

impl<S: ReservationStore> CancellationCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Cancels `booking_id` on behalf of `caller`.
    ///
    /// The owner may cancel their own booking; an admin may cancel any. The
    /// booking flips to `CANCELLED` and exactly its seat ids go back to the
    /// inventory in the same commit. A second cancel is rejected with
    /// `AlreadyCancelled` and changes nothing.
    #[tracing::instrument(
        skip(self, caller),
        fields(caller_id = %caller.id, admin = caller.is_admin)
    )]
    pub async fn cancel(
        &self,
        caller: &Caller,
        booking_id: BookingId,
    ) -> Result<Booking, ReservationError> {
        let result = self.try_cancel(caller, booking_id).await;

        match &result {
            Ok(booking) => {
                metrics::counter!("cancellations_total").increment(1);
                tracing::info!(
                    event_id = %booking.event_id(),
                    seats = booking.seats_booked(),
                    "booking cancelled"
                );
            }
            Err(err) => record_rejection("cancel", err),
        }
        result
    }

    async fn try_cancel(
        &self,
        caller: &Caller,
        booking_id: BookingId,
    ) -> Result<Booking, ReservationError> {
        let mut scope = self.store.begin();

        let mut booking = scope
            .booking(booking_id)
            .await?
            .ok_or_else(|| ReservationError::booking_not_found(booking_id))?;

        if !caller.may_manage(&booking) {
            return Err(ReservationError::Unauthorized { booking_id });
        }
        if !booking.status().can_cancel() {
            return Err(ReservationError::AlreadyCancelled(booking_id));
        }

        let event_id = booking.event_id();
        let mut inventory = scope
            .inventory(event_id)
            .await?
            .ok_or_else(|| ReservationError::event_not_found(event_id))?;

        inventory.release_seats(booking.seat_ids())?;
        booking.cancel(Utc::now())?;

        scope.stage_inventory(inventory);
        scope.stage_booking(booking.clone());
        scope.commit().await?;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{EventId, OwnerId};
    use domain::{BookingStatus, ErrorKind, EventInventory, Money, ReservationRequest};
    use inventory_store::InMemoryReservationStore;

    use crate::ReservationCoordinator;

    async fn booked(seat_ids: &[&str]) -> (InMemoryReservationStore, Booking) {
        let store = InMemoryReservationStore::new();
        let inv = EventInventory::new(EventId::new(), 10, Money::from_cents(100)).unwrap();
        let event_id = inv.id();
        store.insert_inventory(inv).await.unwrap();

        let booking = ReservationCoordinator::new(store.clone())
            .reserve(
                OwnerId::new(),
                ReservationRequest::new(event_id, seat_ids.len() as i64, seat_ids.iter().copied()),
            )
            .await
            .unwrap();
        (store, booking)
    }

    #[tokio::test]
    async fn owner_cancel_releases_seats() {
        let (store, booking) = booked(&["C-1", "C-2"]).await;
        let coordinator = CancellationCoordinator::new(store.clone());

        let cancelled = coordinator
            .cancel(&Caller::user(booking.owner_id()), booking.id())
            .await
            .unwrap();
        assert_eq!(cancelled.status(), BookingStatus::Cancelled);

        let inv = store
            .load_inventory(booking.event_id())
            .await
            .unwrap()
            .unwrap()
            .value;
        assert_eq!(inv.available_seats(), 10);
        assert!(inv.booked_seat_ids().is_empty());
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (store, _) = booked(&["C-1"]).await;
        let coordinator = CancellationCoordinator::new(store);

        let err = coordinator
            .cancel(&Caller::admin(OwnerId::new()), BookingId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn missing_inventory_fails_without_cancelling() {
        let (store, booking) = booked(&["C-1"]).await;
        // Drop the inventory but keep the ledger.
        let kept = store.load_booking(booking.id()).await.unwrap().unwrap();
        store.clear().await;
        let mut changes = inventory_store::ChangeSet::new();
        changes.put_booking(kept.value, inventory_store::Version::initial());
        store.commit(changes).await.unwrap();

        let err = CancellationCoordinator::new(store.clone())
            .cancel(&Caller::user(booking.owner_id()), booking.id())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let stored = store.load_booking(booking.id()).await.unwrap().unwrap();
        assert!(stored.value.is_confirmed());
    }
}
