//! Booking endpoints for authenticated users.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::ReservationRequest;
use inventory_store::ReservationStore;
use serde::Deserialize;

use super::{BookingResponse, parse_booking_id};
use crate::auth::CurrentCaller;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

/// Reservation body. Missing seat fields default to empty so the validator
/// reports them with its usual messages.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub event_id: String,
    #[serde(default)]
    pub seats_booked: i64,
    #[serde(default)]
    pub seat_ids: Vec<String>,
}

// -- Handlers --

/// POST /bookings: reserve seats for the caller.
#[tracing::instrument(skip(state, payload), fields(caller_id = %caller.id))]
pub async fn reserve<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(req) = payload?;
    let request = ReservationRequest::parse(&req.event_id, req.seats_booked, req.seat_ids)?;

    let booking = state.reservations.reserve(caller.id, request).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /bookings/my: the caller's bookings, newest first.
#[tracing::instrument(skip(state), fields(caller_id = %caller.id))]
pub async fn mine<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentCaller(caller): CurrentCaller,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.ledger.my_bookings(caller.id).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// DELETE /bookings/{id} or POST /bookings/{id}/cancel: cancel a booking.
///
/// Owners cancel their own bookings; callers with the admin role may cancel
/// any booking.
#[tracing::instrument(skip(state), fields(caller_id = %caller.id))]
pub async fn cancel<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentCaller(caller): CurrentCaller,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let booking = state.cancellations.cancel(&caller, booking_id).await?;
    Ok(Json(booking.into()))
}
