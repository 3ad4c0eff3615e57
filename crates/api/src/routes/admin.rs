//! Admin-only ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use domain::{BookingStatus, ReservationError};
use inventory_store::{BookingQuery, ReservationStore};
use serde::{Deserialize, Serialize};

use super::{BookingResponse, parse_booking_id, parse_event_id};
use crate::auth::AdminCaller;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub event_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl BookingFilter {
    fn into_query(self) -> Result<BookingQuery, ReservationError> {
        let mut query = BookingQuery::new();
        if let Some(status) = self.status {
            let status: BookingStatus = status.parse().map_err(ReservationError::invalid)?;
            query = query.status(status);
        }
        if let Some(event_id) = self.event_id {
            query = query.event_id(parse_event_id(&event_id)?);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        Ok(query)
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_events: usize,
    pub total_bookings: usize,
    pub confirmed_bookings: usize,
    pub cancelled_bookings: usize,
    pub seats_sold: u64,
    pub total_revenue_cents: i64,
    pub recent_bookings: Vec<BookingResponse>,
}

// -- Handlers --

/// GET /admin/bookings: every booking, newest first.
#[tracing::instrument(skip(state, filter))]
pub async fn list<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
    filter: Result<Query<BookingFilter>, QueryRejection>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let Query(filter) = filter?;
    let bookings = state.ledger.bookings(filter.into_query()?).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// DELETE /admin/bookings/{id}: cancel any booking.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(admin): AdminCaller,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let booking = state.cancellations.cancel(&admin, booking_id).await?;
    Ok(Json(booking.into()))
}

/// GET /admin/stats: dashboard summary.
#[tracing::instrument(skip(state))]
pub async fn stats<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
) -> Result<Json<StatsResponse>, ApiError> {
    let summary = state.ledger.summary().await?;
    let recent = state.ledger.recent().await?;

    Ok(Json(StatsResponse {
        total_events: summary.total_events,
        total_bookings: summary.total_bookings,
        confirmed_bookings: summary.confirmed_bookings,
        cancelled_bookings: summary.cancelled_bookings,
        seats_sold: summary.seats_sold,
        total_revenue_cents: summary.revenue.cents(),
        recent_bookings: recent.into_iter().map(Into::into).collect(),
    }))
}
