//! Reservation transaction coordinator.

use std::time::Instant;

use chrono::Utc;
use common::OwnerId;
use domain::{Booking, ReservationError, ReservationRequest, validate};
use inventory_store::{ReservationStore, ReservationStoreExt};

use crate::outcome::record_rejection;

/// Turns validated reservation requests into confirmed bookings.
///
/// The inventory is re-read inside the scope on every call; there is no
/// cached state and no in-process lock.
#[derive(Clone)]
pub struct ReservationCoordinator<S: ReservationStore> {
    store: S,
}

impl<S: ReservationStore> ReservationCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserves the requested seats for `owner_id`.
    ///
    /// On success the inventory has the seats marked booked and the ledger
    /// holds a new `CONFIRMED` booking. On any error the store is unchanged.
    #[tracing::instrument(
        skip(self, request),
        fields(event_id = %request.event_id, seats = request.seat_ids.len())
    )]
    pub async fn reserve(
        &self,
        owner_id: OwnerId,
        request: ReservationRequest,
    ) -> Result<Booking, ReservationError> {
        let start = Instant::now();
        let result = self.try_reserve(owner_id, &request).await;
        metrics::histogram!("reservation_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(booking) => {
                metrics::counter!("reservations_total").increment(1);
                tracing::info!(
                    booking_id = %booking.id(),
                    amount = %booking.total_amount(),
                    "booking confirmed"
                );
            }
            Err(err) => record_rejection("reserve", err),
        }
        result
    }

    async fn try_reserve(
        &self,
        owner_id: OwnerId,
        request: &ReservationRequest,
    ) -> Result<Booking, ReservationError> {
        let mut scope = self.store.begin();

        let inventory = scope.inventory(request.event_id).await?;
        let reservation = validate(request, inventory.as_ref())?;
        let Some(mut inventory) = inventory else {
            return Err(ReservationError::event_not_found(request.event_id));
        };

        let total_amount = inventory
            .price_for(reservation.seats_booked())
            .ok_or_else(|| ReservationError::invalid("Total amount is out of range"))?;

        inventory.hold_seats(reservation.seat_ids())?;
        let booking = Booking::confirm(owner_id, &reservation, total_amount, Utc::now());

        scope.stage_inventory(inventory);
        scope.stage_booking(booking.clone());
        scope.commit().await?;

        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::EventId;
    use domain::{ErrorKind, EventInventory, Money};
    use inventory_store::InMemoryReservationStore;

    async fn setup(total: u32, cents: i64) -> (InMemoryReservationStore, EventId) {
        let store = InMemoryReservationStore::new();
        let inv = EventInventory::new(EventId::new(), total, Money::from_cents(cents)).unwrap();
        let id = inv.id();
        store.insert_inventory(inv).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn reserve_snapshots_total_amount() {
        let (store, event_id) = setup(10, 1250).await;
        let coordinator = ReservationCoordinator::new(store.clone());

        let booking = coordinator
            .reserve(
                OwnerId::new(),
                ReservationRequest::new(event_id, 3, ["A-1", "A-2", "A-3"]),
            )
            .await
            .unwrap();

        assert_eq!(booking.total_amount(), Money::from_cents(3750));
        assert_eq!(booking.seats_booked(), 3);
        assert!(booking.is_confirmed());
        assert_eq!(store.booking_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (store, _) = setup(10, 100).await;
        let coordinator = ReservationCoordinator::new(store.clone());

        let err = coordinator
            .reserve(
                OwnerId::new(),
                ReservationRequest::new(EventId::new(), 1, ["A-1"]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.booking_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_request_does_not_touch_store() {
        let (store, event_id) = setup(10, 100).await;
        let coordinator = ReservationCoordinator::new(store.clone());
        let before = store.load_inventory(event_id).await.unwrap();

        let err = coordinator
            .reserve(
                OwnerId::new(),
                ReservationRequest::new(event_id, 2, ["A-1"]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(store.load_inventory(event_id).await.unwrap(), before);
    }
}
