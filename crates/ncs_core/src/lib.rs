mod battery;
mod candidates;
mod geo;
mod models;
mod plan;
mod pricing;
mod score;
mod telemetry;

pub use crate::battery::{
    DEFAULT_SOC_FRACTION, DERATED_POWER_CEILING_KW, HEALTHY_POWER_CEILING_KW,
    IMPEDANCE_DERATE_THRESHOLD, SOH_DERATE_THRESHOLD_PERCENT, build_summary,
};
pub use crate::candidates::{evaluate_candidates, time_budget_hours};
pub use crate::geo::haversine_km;
pub use crate::models::*;
pub use crate::plan::{COMPARISON_MARKUP_EUR, InfeasiblePlan, PlanOutcome, format_plan};
pub use crate::pricing::{
    CapacityContext, CapacitySource, DEFAULT_SESSION_ENERGY_KWH, EnergyEstimation, EnergyMethod,
    POWER_PRICING_TIERS, PricingEngine, PricingResult, RateTier, SESSION_ACTIVATION_FEE_EUR,
    SohContext,
};
pub use crate::score::match_score;
pub use crate::telemetry::{
    DEFAULT_NAMEPLATE_CAPACITY_KWH, HealthRecord, SocSample, TelemetryStore,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Station {station_id} not found")]
    StationNotFound { station_id: String },
    #[error("Connector {connector_id} does not exist at station {station_id}")]
    ConnectorNotFound {
        station_id: String,
        connector_id: String,
    },
    #[error("Station {station_id} has no available connector")]
    NoConnectorAvailable { station_id: String },
}

/// Owned registry of stations and their connector states.
///
/// Stations keep their insertion order; connector state is the only mutable
/// part. Callers that share the registry across tasks wrap it in a mutex
/// handle; state transitions themselves are single-writer.
#[derive(Debug, Clone)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    pub fn new(stations: Vec<Station>) -> Self {
        StationRegistry { stations }
    }

    pub fn station(&self, station_id: &str) -> Option<&Station> {
        self.stations
            .iter()
            .find(|station| station.station_id == station_id)
    }

    /// Station plus connector availability counts, or `None` for an unknown
    /// id. A miss never aborts a scan; callers skip and move on.
    pub fn snapshot(&self, station_id: &str) -> Option<StationSnapshot> {
        self.station(station_id).map(Self::snapshot_of)
    }

    /// All stations in insertion order.
    pub fn snapshots(&self) -> Vec<StationSnapshot> {
        self.stations.iter().map(Self::snapshot_of).collect()
    }

    fn snapshot_of(station: &Station) -> StationSnapshot {
        let total = station.connectors.len();
        let available = station
            .connectors
            .iter()
            .filter(|connector| connector.is_available())
            .count();
        StationSnapshot {
            station: station.clone(),
            total_connectors: total,
            available_connectors: available,
            occupied_connectors: total - available,
        }
    }

    /// Occupy the first available connector of the station, in declaration
    /// order.
    pub fn occupy_any(&mut self, station_id: &str) -> Result<Connector, RegistryError> {
        tracing::info!("Occupying a connector at station {}", station_id);
        let station = self
            .stations
            .iter_mut()
            .find(|station| station.station_id == station_id)
            .ok_or_else(|| RegistryError::StationNotFound {
                station_id: station_id.to_string(),
            })?;

        let Some(connector) = station
            .connectors
            .iter_mut()
            .find(|connector| connector.is_available())
        else {
            return Err(RegistryError::NoConnectorAvailable {
                station_id: station_id.to_string(),
            });
        };

        connector.status = ConnectorStatus::Occupied;
        Ok(connector.clone())
    }

    /// Release a connector. The connector immediately becomes available to
    /// any requester; there is no queue or reservation expiry.
    pub fn release(&mut self, station_id: &str, connector_id: &str) -> Result<(), RegistryError> {
        tracing::info!(
            "Releasing connector {} at station {}",
            connector_id,
            station_id
        );
        let station = self
            .stations
            .iter_mut()
            .find(|station| station.station_id == station_id)
            .ok_or_else(|| RegistryError::StationNotFound {
                station_id: station_id.to_string(),
            })?;

        let Some(connector) = station
            .connectors
            .iter_mut()
            .find(|connector| connector.connector_id == connector_id)
        else {
            return Err(RegistryError::ConnectorNotFound {
                station_id: station_id.to_string(),
                connector_id: connector_id.to_string(),
            });
        };

        connector.status = ConnectorStatus::Available;
        Ok(())
    }
}
