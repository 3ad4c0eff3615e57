//! Reservation request types.

use common::EventId;

use crate::{ReservationError, SeatId};

/// A reservation request as received from a caller.
///
/// The seat count stays a signed integer here: range checks belong to the
/// validator so that rejections come out in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub event_id: EventId,
    pub seats_booked: i64,
    pub seat_ids: Vec<SeatId>,
}

impl ReservationRequest {
    pub fn new<I, S>(event_id: EventId, seats_booked: i64, seat_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SeatId>,
    {
        Self {
            event_id,
            seats_booked,
            seat_ids: seat_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a request from raw transport fields.
    ///
    /// A malformed event id can never name an existing event, so it is
    /// reported as `NotFound`.
    pub fn parse(
        event_id: &str,
        seats_booked: i64,
        seat_ids: Vec<String>,
    ) -> Result<Self, ReservationError> {
        let event_id: EventId = event_id
            .parse()
            .map_err(|_| ReservationError::event_not_found(event_id))?;
        Ok(Self::new(event_id, seats_booked, seat_ids))
    }
}

/// A request that passed every validator check against a fresh inventory read.
///
/// Only [`crate::validate`] constructs this type, so the mutation path cannot
/// be handed an unchecked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReservation {
    event_id: EventId,
    seat_ids: Vec<SeatId>,
}

impl ValidatedReservation {
    pub(crate) fn new(event_id: EventId, seat_ids: Vec<SeatId>) -> Self {
        Self { event_id, seat_ids }
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
}
