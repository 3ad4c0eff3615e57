//! Reservation checks run against an inventory snapshot before any mutation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. the event exists (`NotFound`)
//! 2. the request is well formed (`InvalidRequest`)
//! 3. no requested seat is already booked (`SeatConflict`)
//! 4. enough seats remain (`InsufficientInventory`)
//! 5. the event is not sold out (`SoldOut`)

use crate::inventory::duplicate_seats;
use crate::{
    EventInventory, ReservationError, ReservationRequest, SeatId, ValidatedReservation,
    describe_seats,
};

/// Checks `request` against `inventory`, the snapshot read for its event.
///
/// Pure: calling it again on a re-read snapshot is always safe.
pub fn validate(
    request: &ReservationRequest,
    inventory: Option<&EventInventory>,
) -> Result<ValidatedReservation, ReservationError> {
    let inventory = match inventory {
        Some(inv) if inv.id() == request.event_id => inv,
        _ => return Err(ReservationError::event_not_found(request.event_id)),
    };

    check_shape(request)?;
    check_conflicts(request, inventory)?;

    let requested = request.seat_ids.len() as u32;
    if inventory.available_seats() < requested {
        return Err(ReservationError::InsufficientInventory {
            requested,
            remaining: inventory.available_seats(),
        });
    }

    if inventory.is_sold_out() {
        return Err(ReservationError::SoldOut {
            event_id: inventory.id(),
        });
    }

    Ok(ValidatedReservation::new(
        request.event_id,
        request.seat_ids.clone(),
    ))
}

fn check_shape(request: &ReservationRequest) -> Result<(), ReservationError> {
    if request.seat_ids.is_empty() {
        return Err(ReservationError::invalid("Seat IDs must be a non-empty array"));
    }
    if request.seats_booked != request.seat_ids.len() as i64 {
        return Err(ReservationError::invalid(
            "Seats count must match seat IDs length",
        ));
    }
    if request.seats_booked < 1 {
        return Err(ReservationError::invalid("Seats must be a positive integer"));
    }
    if request.seat_ids.iter().any(SeatId::is_blank) {
        return Err(ReservationError::invalid("Seat IDs cannot be blank"));
    }

    let duplicates = duplicate_seats(&request.seat_ids);
    if !duplicates.is_empty() {
        return Err(ReservationError::invalid(format!(
            "Seat IDs listed more than once: {}",
            describe_seats(&duplicates)
        )));
    }

    Ok(())
}

fn check_conflicts(
    request: &ReservationRequest,
    inventory: &EventInventory,
) -> Result<(), ReservationError> {
    let conflicting: Vec<SeatId> = request
        .seat_ids
        .iter()
        .filter(|seat| inventory.is_booked(seat))
        .cloned()
        .collect();

    if conflicting.is_empty() {
        Ok(())
    } else {
        Err(ReservationError::SeatConflict { seats: conflicting })
    }
}
