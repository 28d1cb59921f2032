use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use ncs_core::{Connector, RegistryError, StationSnapshot};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    pub connector_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupyResponse {
    pub connector: Connector,
}

fn registry_error_to_response(error: RegistryError) -> impl IntoResponse {
    let status = match &error {
        RegistryError::StationNotFound { .. } | RegistryError::ConnectorNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        RegistryError::NoConnectorAvailable { .. } => StatusCode::CONFLICT,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// List every known station with its connector availability
pub async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationSnapshot>> {
    tracing::info!("Listing stations");
    let registry = state.registry.lock().unwrap();
    Json(registry.snapshots())
}

/// Get one station snapshot
pub async fn get_station(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> impl IntoResponse {
    let registry = state.registry.lock().unwrap();
    match registry.snapshot(&station_id) {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Station {station_id} not found"),
            }),
        )
            .into_response(),
    }
}

/// Occupy the first available connector at a station
pub async fn occupy_connector(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> impl IntoResponse {
    let mut registry = state.registry.lock().unwrap();
    match registry.occupy_any(&station_id) {
        Ok(connector) => (StatusCode::OK, Json(OccupyResponse { connector })).into_response(),
        Err(error) => registry_error_to_response(error).into_response(),
    }
}

/// Release a connector; it immediately becomes available again
pub async fn release_connector(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Json(payload): Json<ReleaseRequest>,
) -> impl IntoResponse {
    let mut registry = state.registry.lock().unwrap();
    match registry.release(&station_id, &payload.connector_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => registry_error_to_response(error).into_response(),
    }
}
