//! Domain model for the seat reservation engine.
//!
//! This crate holds the pure parts of the engine:
//! - `EventInventory`, the per-event seat record and its invariant
//! - `Booking` and its two-state `BookingStatus` machine
//! - the reservation validator and the validated reservation it produces
//! - `ReservationError`, the failure vocabulary every operation returns

pub mod booking;
pub mod caller;
pub mod error;
pub mod inventory;
pub mod money;
pub mod request;
pub mod seat;
pub mod validator;

pub use booking::{Booking, BookingStatus, InvalidTransition};
pub use caller::Caller;
pub use error::{ErrorKind, ReservationError, Resource};
pub use inventory::{EventInventory, InventoryError, MAX_TOTAL_SEATS};
pub use money::Money;
pub use request::{ReservationRequest, ValidatedReservation};
pub use seat::{SeatId, describe_seats, seats};
pub use validator::validate;
