use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use ncs_core::{Coordinate, Strategy};
use ncs_engine::{NegotiationError, NegotiationRequest};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::station::ErrorResponse;

fn default_target_soc_percent() -> f64 {
    80.0
}

fn default_vehicle_vin() -> String {
    "W1KAH5EB2PF093797".to_string()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Driver latitude in decimal degrees
    pub user_lat: f64,
    /// Driver longitude in decimal degrees
    pub user_lng: f64,
    /// Desired SoC in percent, e.g. 80 for 80%
    #[serde(default = "default_target_soc_percent")]
    pub target_soc_percent: f64,
    /// When the driver needs to depart; defaults to now+2h
    #[serde(default)]
    pub ready_by: Option<DateTime<Utc>>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Vehicle VIN used for SoC history lookup
    #[serde(default = "default_vehicle_vin")]
    pub vehicle_vin: String,
}

fn negotiation_error_to_response(error: NegotiationError) -> impl IntoResponse {
    let status = match &error {
        NegotiationError::DeadlineTooSoon { .. }
        | NegotiationError::DeadlineTooLate { .. }
        | NegotiationError::TargetSocOutOfRange { .. } => StatusCode::BAD_REQUEST,
        NegotiationError::Selection(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

/// Negotiate a charging plan for the requesting vehicle
pub async fn negotiate_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanRequest>,
) -> impl IntoResponse {
    let request = NegotiationRequest {
        requester: Coordinate {
            latitude: payload.user_lat,
            longitude: payload.user_lng,
        },
        target_soc_percent: payload.target_soc_percent,
        ready_by: payload.ready_by,
        strategy: payload.strategy,
        vehicle_vin: payload.vehicle_vin,
    };

    match state.negotiator.negotiate(request, Utc::now()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => negotiation_error_to_response(error).into_response(),
    }
}
