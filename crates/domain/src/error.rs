//! Failure vocabulary shared by every reservation and cancellation operation.

use common::{BookingId, EventId};
use serde::Serialize;
use thiserror::Error;

use crate::{SeatId, describe_seats};

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Resource {
    Event,
    Booking,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Event => f.write_str("Event"),
            Resource::Booking => f.write_str("Booking"),
        }
    }
}

/// Stable tag for a [`ReservationError`], suitable for branching and for
/// mapping onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    SeatConflict,
    InsufficientInventory,
    SoldOut,
    Unauthorized,
    AlreadyCancelled,
    Contention,
    StoreFailure,
}

impl ErrorKind {
    /// Returns true if resubmitting the same request may succeed.
    ///
    /// Every other kind is a semantic rejection that reproduces on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Contention | ErrorKind::StoreFailure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::SeatConflict => "SeatConflict",
            ErrorKind::InsufficientInventory => "InsufficientInventory",
            ErrorKind::SoldOut => "SoldOut",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::AlreadyCancelled => "AlreadyCancelled",
            ErrorKind::Contention => "Contention",
            ErrorKind::StoreFailure => "StoreFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by reservation, cancellation and inventory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// The referenced event or booking does not exist, or its id is malformed.
    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: String },

    /// The request is malformed or internally inconsistent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Some requested seats are already held by a confirmed booking.
    #[error("Seats already booked: {}", describe_seats(.seats))]
    SeatConflict { seats: Vec<SeatId> },

    /// Fewer seats remain than were requested.
    #[error("Not enough seats available. Only {remaining} seats left")]
    InsufficientInventory { requested: u32, remaining: u32 },

    /// The event has no seats left.
    #[error("Event {event_id} is sold out")]
    SoldOut { event_id: EventId },

    /// The caller neither owns the booking nor holds admin rights.
    #[error("Not authorized to cancel booking {booking_id}")]
    Unauthorized { booking_id: BookingId },

    /// The booking has already reached its terminal state.
    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(BookingId),

    /// A concurrent commit touched the same record; re-read and resubmit.
    #[error("Concurrent update to {resource} {id}")]
    Contention { resource: Resource, id: String },

    /// The store could not complete the operation. Nothing was committed.
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl ReservationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::NotFound { .. } => ErrorKind::NotFound,
            ReservationError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            ReservationError::SeatConflict { .. } => ErrorKind::SeatConflict,
            ReservationError::InsufficientInventory { .. } => ErrorKind::InsufficientInventory,
            ReservationError::SoldOut { .. } => ErrorKind::SoldOut,
            ReservationError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ReservationError::AlreadyCancelled(_) => ErrorKind::AlreadyCancelled,
            ReservationError::Contention { .. } => ErrorKind::Contention,
            ReservationError::StoreFailure(_) => ErrorKind::StoreFailure,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub fn event_not_found(id: impl ToString) -> Self {
        ReservationError::NotFound {
            resource: Resource::Event,
            id: id.to_string(),
        }
    }

    pub fn booking_not_found(id: impl ToString) -> Self {
        ReservationError::NotFound {
            resource: Resource::Booking,
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ReservationError::InvalidRequest(message.into())
    }
}
