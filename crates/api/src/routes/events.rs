//! Event inventory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::EventId;
use domain::Money;
use inventory_store::ReservationStore;
use serde::Deserialize;

use super::{InventoryResponse, parse_event_id};
use crate::auth::AdminCaller;
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateInventoryRequest {
    /// Id of the event the inventory belongs to; a fresh id is assigned if absent.
    pub event_id: Option<String>,
    pub total_seats: u32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReviseSeatsRequest {
    pub total_seats: u32,
}

#[derive(Debug, Deserialize)]
pub struct RevisePriceRequest {
    pub unit_price_cents: i64,
}

// -- Handlers --

/// POST /events: create the seat inventory for an event.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
    payload: Result<Json<CreateInventoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InventoryResponse>), ApiError> {
    let Json(req) = payload?;
    let event_id = match req.event_id.as_deref() {
        Some(id) => id
            .parse::<EventId>()
            .map_err(|_| domain::ReservationError::invalid(format!("Invalid event id: {id}")))?,
        None => EventId::new(),
    };

    let inventory = state
        .inventory
        .create(
            event_id,
            req.total_seats,
            Money::from_cents(req.unit_price_cents),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(inventory.into())))
}

/// GET /events: list every event inventory.
#[tracing::instrument(skip(state))]
pub async fn list<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<InventoryResponse>>, ApiError> {
    let inventories = state.inventory.list().await?;
    Ok(Json(inventories.into_iter().map(Into::into).collect()))
}

/// GET /events/{id}: current inventory snapshot.
#[tracing::instrument(skip(state))]
pub async fn get<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    let inventory = state.inventory.get(event_id).await?;
    Ok(Json(inventory.into()))
}

/// PUT /events/{id}/seats: revise the total seat count.
#[tracing::instrument(skip(state, payload))]
pub async fn revise_seats<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
    Path(id): Path<String>,
    payload: Result<Json<ReviseSeatsRequest>, JsonRejection>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    let Json(req) = payload?;
    let inventory = state
        .inventory
        .revise_total_seats(event_id, req.total_seats)
        .await?;
    Ok(Json(inventory.into()))
}

/// PUT /events/{id}/price: change the unit price for future bookings.
#[tracing::instrument(skip(state, payload))]
pub async fn revise_price<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
    Path(id): Path<String>,
    payload: Result<Json<RevisePriceRequest>, JsonRejection>,
) -> Result<Json<InventoryResponse>, ApiError> {
    let event_id = parse_event_id(&id)?;
    let Json(req) = payload?;
    let inventory = state
        .inventory
        .revise_unit_price(event_id, Money::from_cents(req.unit_price_cents))
        .await?;
    Ok(Json(inventory.into()))
}

/// DELETE /events/{id}: remove an event inventory with no confirmed bookings.
#[tracing::instrument(skip(state))]
pub async fn delete<S: ReservationStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminCaller(_admin): AdminCaller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let event_id = parse_event_id(&id)?;
    state.inventory.delete(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
