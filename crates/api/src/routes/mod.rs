//! HTTP route handlers.

pub mod admin;
pub mod bookings;
pub mod events;
pub mod health;
pub mod metrics;

use common::{BookingId, EventId};
use domain::{Booking, EventInventory, ReservationError};
use serde::Serialize;

// -- Response types shared across handlers --

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub event_id: String,
    pub total_seats: u32,
    pub available_seats: u32,
    pub booked_seat_ids: Vec<String>,
    pub unit_price_cents: i64,
    pub sold_out: bool,
}

impl From<EventInventory> for InventoryResponse {
    fn from(inv: EventInventory) -> Self {
        Self {
            event_id: inv.id().to_string(),
            total_seats: inv.total_seats(),
            available_seats: inv.available_seats(),
            booked_seat_ids: inv
                .booked_seat_ids()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unit_price_cents: inv.unit_price().cents(),
            sold_out: inv.is_sold_out(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub owner_id: String,
    pub event_id: String,
    pub seat_ids: Vec<String>,
    pub seats_booked: u32,
    pub total_amount_cents: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id().to_string(),
            owner_id: b.owner_id().to_string(),
            event_id: b.event_id().to_string(),
            seat_ids: b.seat_ids().iter().map(|s| s.to_string()).collect(),
            seats_booked: b.seats_booked(),
            total_amount_cents: b.total_amount().cents(),
            status: b.status().to_string(),
            created_at: b.created_at().to_rfc3339(),
            updated_at: b.updated_at().to_rfc3339(),
        }
    }
}

/// A malformed id can never name a stored record.
fn parse_event_id(id: &str) -> Result<EventId, ReservationError> {
    id.parse()
        .map_err(|_| ReservationError::event_not_found(id))
}

fn parse_booking_id(id: &str) -> Result<BookingId, ReservationError> {
    id.parse()
        .map_err(|_| ReservationError::booking_not_found(id))
}
