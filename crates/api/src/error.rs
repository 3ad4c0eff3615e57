//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{ErrorKind, ReservationError};
use serde_json::{Value, json};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No verified caller identity accompanied the request.
    #[error("{0}")]
    Unauthenticated(String),

    /// The caller is known but lacks admin rights.
    #[error("Admin access required")]
    Forbidden,

    /// A reservation engine operation failed.
    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Reservation(err) => kind_status(err.kind()),
        }
    }
}

/// One distinct status per error kind.
pub fn kind_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::SeatConflict => StatusCode::CONFLICT,
        ErrorKind::SoldOut => StatusCode::GONE,
        ErrorKind::AlreadyCancelled => StatusCode::PRECONDITION_FAILED,
        ErrorKind::InsufficientInventory => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Contention => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn detail(err: &ReservationError) -> Value {
    match err {
        ReservationError::NotFound { resource, id } => json!({ "resource": resource, "id": id }),
        ReservationError::SeatConflict { seats } => json!({ "seats": seats }),
        ReservationError::InsufficientInventory {
            requested,
            remaining,
        } => json!({ "requested": requested, "remaining": remaining }),
        ReservationError::SoldOut { event_id } => json!({ "event_id": event_id }),
        ReservationError::Unauthorized { booking_id } => json!({ "booking_id": booking_id }),
        ReservationError::AlreadyCancelled(booking_id) => json!({ "booking_id": booking_id }),
        ReservationError::Contention { resource, id } => json!({ "resource": resource, "id": id }),
        ReservationError::InvalidRequest(_) | ReservationError::StoreFailure(_) => Value::Null,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        metrics::counter!("api_errors_total", "status" => status.as_str().to_string()).increment(1);

        let body = match &self {
            ApiError::Unauthenticated(_) => json!({
                "kind": "Unauthenticated",
                "message": message,
                "retryable": false,
                "detail": Value::Null,
            }),
            ApiError::Forbidden => json!({
                "kind": ErrorKind::Unauthorized.as_str(),
                "message": message,
                "retryable": false,
                "detail": Value::Null,
            }),
            ApiError::Reservation(err) => {
                if err.kind() == ErrorKind::StoreFailure {
                    tracing::error!(error = %err, "internal server error");
                }
                json!({
                    "kind": err.kind().as_str(),
                    "message": message,
                    "retryable": err.is_retryable(),
                    "detail": detail(err),
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Reservation(ReservationError::invalid(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Reservation(ReservationError::invalid(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::seats;

    #[test]
    fn every_kind_has_a_distinct_status() {
        let kinds = [
            ErrorKind::NotFound,
            ErrorKind::InvalidRequest,
            ErrorKind::SeatConflict,
            ErrorKind::InsufficientInventory,
            ErrorKind::SoldOut,
            ErrorKind::Unauthorized,
            ErrorKind::AlreadyCancelled,
            ErrorKind::Contention,
            ErrorKind::StoreFailure,
        ];
        let mut statuses: Vec<u16> = kinds.iter().map(|k| kind_status(*k).as_u16()).collect();
        statuses.sort();
        statuses.dedup();
        assert_eq!(statuses.len(), kinds.len());
    }

    #[test]
    fn seat_conflict_detail_lists_seats() {
        let err = ReservationError::SeatConflict {
            seats: seats(["A-2", "A-3"]),
        };
        assert_eq!(detail(&err), json!({ "seats": ["A-2", "A-3"] }));
        assert_eq!(ApiError::from(err).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failure_is_500() {
        let err = ApiError::from(ReservationError::StoreFailure("down".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
