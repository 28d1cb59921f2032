use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::PricingResult;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLocation {
    pub city: String,
    pub country: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "CCS2")]
    Ccs2,
    #[serde(rename = "Type2")]
    Type2,
    #[serde(rename = "CHAdeMO")]
    Chademo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorStatus {
    Available,
    Occupied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub connector_id: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    pub power_kw: f64,
    pub status: ConnectorStatus,
}

impl Connector {
    pub fn is_available(&self) -> bool {
        self.status == ConnectorStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub operator: String,
    pub location: StationLocation,
    pub connectors: Vec<Connector>,
}

/// A station together with its connector availability counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    #[serde(flatten)]
    pub station: Station,
    pub total_connectors: usize,
    pub available_connectors: usize,
    pub occupied_connectors: usize,
}

/// Optimization strategy requested by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Cost,
    Speed,
    #[default]
    Balanced,
}

/// Everything the downstream agents need to know about the battery,
/// computed fresh per negotiation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySummary {
    pub vin: String,
    pub battery_id: Option<String>,
    /// Current state of charge as a fraction in [0, 1].
    pub soc_now: f64,
    /// Target state of charge as a fraction in [0, 1].
    pub target_soc: f64,
    pub soh_percent: f64,
    pub impedance_ohm: f64,
    pub rated_capacity_kwh: f64,
    pub effective_capacity_kwh: f64,
    /// Energy required to reach the target, floored at zero.
    pub energy_needed_kwh: f64,
    pub max_safe_power_kw: f64,
    pub health_notes: Vec<String>,
}

/// One (station, connector) pairing evaluated for a negotiation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub station_id: String,
    pub station_name: String,
    pub distance_km: f64,
    pub available_connectors: usize,
    pub total_connectors: usize,
    pub connector_id: String,
    pub connector_type: ConnectorType,
    pub connector_power_kw: f64,
    /// Connector power clamped by the battery's safe-power ceiling.
    pub effective_power_kw: f64,
    pub session_duration_h: f64,
    /// Whether the session fits before the ready-by deadline.
    pub can_meet_ready_by: bool,
    pub pricing: PricingResult,
    pub total_cost_eur: f64,
}

/// The selector's verdict: one candidate plus the charge it actually plans
/// to deliver. The baseline strategy may clamp the session to the deadline
/// and deliver a partial charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub candidate: Candidate,
    pub duration_h: f64,
    pub delivered_energy_kwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    pub strategy_used: Strategy,
    /// Normalized multi-objective score, 0-100.
    pub match_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStation {
    pub station_id: String,
    pub station_name: String,
    pub distance_km: f64,
    pub max_power_kw: f64,
    pub available_connectors: usize,
    pub total_connectors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChargingDetails {
    pub current_level_percent: u8,
    pub target_level_percent: u8,
    pub energy_needed_kwh: f64,
    /// Energy the plan actually delivers; lower than the deficit when the
    /// session is clamped to the deadline.
    pub planned_energy_kwh: f64,
    pub ready_by: DateTime<Utc>,
    pub recommended_start: DateTime<Utc>,
    pub estimated_duration_min: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPricing {
    pub original_price_eur: f64,
    pub negotiated_price_eur: f64,
    pub savings_eur: f64,
}

/// Presentation-ready charging plan for one negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Session identifier; downstream anchoring keys on it.
    pub plan_id: uuid::Uuid,
    pub meta: PlanMeta,
    pub station: PlanStation,
    pub charging_details: PlanChargingDetails,
    pub pricing: PlanPricing,
}
