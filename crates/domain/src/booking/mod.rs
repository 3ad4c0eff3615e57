//! Booking ledger records.

mod status;

pub use status::{BookingStatus, InvalidTransition};

use chrono::{DateTime, Utc};
use common::{BookingId, EventId, OwnerId};

use crate::{Money, ReservationError, SeatId, ValidatedReservation};

/// One entry in the booking ledger.
///
/// The seat count is the length of `seat_ids`, so the two can never disagree.
/// The amount is fixed when the booking is confirmed and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: BookingId,
    owner_id: OwnerId,
    event_id: EventId,
    seat_ids: Vec<SeatId>,
    total_amount: Money,
    status: BookingStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a confirmed booking for an accepted reservation.
    pub fn confirm(
        owner_id: OwnerId,
        reservation: &ValidatedReservation,
        total_amount: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BookingId::new(),
            owner_id,
            event_id: reservation.event_id(),
            seat_ids: reservation.seat_ids().to_vec(),
            total_amount,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a booking from persisted fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: BookingId,
        owner_id: OwnerId,
        event_id: EventId,
        seat_ids: Vec<SeatId>,
        total_amount: Money,
        status: BookingStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            event_id,
            seat_ids,
            total_amount,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn seat_ids(&self) -> &[SeatId] {
        &self.seat_ids
    }

    pub fn seats_booked(&self) -> u32 {
        self.seat_ids.len() as u32
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the booking to `Cancelled`.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), ReservationError> {
        self.status = self
            .status
            .transition(BookingStatus::Cancelled)
            .map_err(|_| ReservationError::AlreadyCancelled(self.id))?;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventInventory, ReservationRequest, validate};

    fn confirmed_booking() -> Booking {
        let inventory =
            EventInventory::new(EventId::new(), 10, Money::from_cents(1500)).unwrap();
        let request = ReservationRequest::new(inventory.id(), 2, ["A-1", "A-2"]);
        let reservation = validate(&request, Some(&inventory)).unwrap();
        Booking::confirm(OwnerId::new(), &reservation, Money::from_cents(3000), Utc::now())
    }

    #[test]
    fn confirm_copies_reservation() {
        let booking = confirmed_booking();
        assert_eq!(booking.status(), BookingStatus::Confirmed);
        assert_eq!(booking.seats_booked(), 2);
        assert_eq!(booking.seat_ids()[0].as_str(), "A-1");
        assert_eq!(booking.total_amount().cents(), 3000);
    }

    #[test]
    fn cancel_is_one_way() {
        let mut booking = confirmed_booking();
        booking.cancel(Utc::now()).unwrap();
        assert_eq!(booking.status(), BookingStatus::Cancelled);

        let snapshot = booking.clone();
        assert_eq!(
            booking.cancel(Utc::now()),
            Err(ReservationError::AlreadyCancelled(booking.id()))
        );
        assert_eq!(booking, snapshot);
    }
}
