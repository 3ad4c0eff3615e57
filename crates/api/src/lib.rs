//! HTTP API server for the seat reservation engine.
//!
//! Exposes reservation, cancellation, inventory admin and ledger endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use inventory_store::ReservationStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ReservationStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/events",
            post(routes::events::create::<S>).get(routes::events::list::<S>),
        )
        .route(
            "/events/{id}",
            get(routes::events::get::<S>).delete(routes::events::delete::<S>),
        )
        .route("/events/{id}/seats", put(routes::events::revise_seats::<S>))
        .route("/events/{id}/price", put(routes::events::revise_price::<S>))
        .route("/bookings", post(routes::bookings::reserve::<S>))
        .route("/bookings/my", get(routes::bookings::mine::<S>))
        .route("/bookings/{id}", delete(routes::bookings::cancel::<S>))
        .route("/bookings/{id}/cancel", post(routes::bookings::cancel::<S>))
        .route("/admin/bookings", get(routes::admin::list::<S>))
        .route("/admin/bookings/{id}", delete(routes::admin::cancel::<S>))
        .route("/admin/stats", get(routes::admin::stats::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over `store`.
pub fn create_state<S: ReservationStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
