//! NCS API Library
//!
//! HTTP surface for the GridPass Charging Negotiation Service.

mod config;
mod negotiate;
mod state;
mod station;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use crate::config::{AppConfig, OracleConfig};
pub use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stations", get(station::list_stations))
        .route("/stations/{station_id}", get(station::get_station))
        .route(
            "/stations/{station_id}/occupy",
            post(station::occupy_connector),
        )
        .route(
            "/stations/{station_id}/release",
            post(station::release_connector),
        )
        .route("/negotiator/plan", post(negotiate::negotiate_plan))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
