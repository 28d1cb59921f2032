use serde::{Deserialize, Serialize};

use crate::models::{Connector, StationSnapshot};
use crate::telemetry::TelemetryStore;

/// Energy assumed for a session when no usable history exists.
pub const DEFAULT_SESSION_ENERGY_KWH: f64 = 28.0;
/// Flat activation fee added to every estimate.
pub const SESSION_ACTIVATION_FEE_EUR: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
pub struct RateTier {
    pub name: &'static str,
    /// Upper bound of the tier; the top tier is unbounded.
    pub max_power_kw: f64,
    pub rate_eur_per_kwh: f64,
}

/// Power-ordered tiers; the first tier whose bound covers the connector's
/// rated power applies.
pub const POWER_PRICING_TIERS: [RateTier; 4] = [
    RateTier {
        name: "AC urban ≤25kW",
        max_power_kw: 25.0,
        rate_eur_per_kwh: 0.25,
    },
    RateTier {
        name: "Fast DC 26-150kW",
        max_power_kw: 150.0,
        rate_eur_per_kwh: 0.34,
    },
    RateTier {
        name: "HPC 151-350kW",
        max_power_kw: 350.0,
        rate_eur_per_kwh: 0.42,
    },
    RateTier {
        name: "Ultra HPC 351kW+",
        max_power_kw: f64::INFINITY,
        rate_eur_per_kwh: 0.47,
    },
];

/// How the session energy figure was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyMethod {
    SocHistory,
    Override,
    DefaultFallback,
}

/// Where the capacity figure behind the estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySource {
    BatterySoh,
    VehicleSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SohContext {
    pub battery_id: String,
    pub soh_percent: f64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityContext {
    pub source: CapacitySource,
    pub capacity_kwh: f64,
    /// SoH snapshot backing the capacity figure, when source is battery_soh.
    pub battery_soh: Option<SohContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyEstimation {
    pub energy_method: EnergyMethod,
    pub capacity_context: CapacityContext,
    pub estimated_energy_kwh: f64,
    pub soc_delta_percent: Option<f64>,
    pub override_value_kwh: Option<f64>,
}

/// Full cost breakdown for one estimated session. Carries provenance so a
/// negotiated price can always be explained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub currency: String,
    pub connector_id: Option<String>,
    pub power_kw: f64,
    pub pricing_tier: Option<String>,
    pub rate_eur_per_kwh: f64,
    pub energy_kwh: f64,
    pub energy_component_eur: f64,
    pub session_fee_eur: f64,
    pub total_eur: f64,
    pub estimation_context: Option<EnergyEstimation>,
    pub reason: Option<String>,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Estimates charging costs by combining connector power, battery health
/// data and SoC history. Absence of data never fails a request; estimates
/// degrade to defaults and say so in the provenance.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    default_energy_kwh: f64,
    session_fee_eur: f64,
}

impl Default for PricingEngine {
    fn default() -> Self {
        PricingEngine {
            default_energy_kwh: DEFAULT_SESSION_ENERGY_KWH,
            session_fee_eur: SESSION_ACTIVATION_FEE_EUR,
        }
    }
}

impl PricingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_capacity_context(
        &self,
        telemetry: &TelemetryStore,
        vin: &str,
        battery_id: Option<&str>,
    ) -> CapacityContext {
        if let Some(battery_id) = battery_id
            && let Some(record) = telemetry.latest_health_record_for(battery_id)
        {
            return CapacityContext {
                source: CapacitySource::BatterySoh,
                capacity_kwh: record.rated_capacity_kwh * record.soh_percent / 100.0,
                battery_soh: Some(SohContext {
                    battery_id: record.battery_id.clone(),
                    soh_percent: record.soh_percent,
                    recorded_at: record.recorded_at,
                }),
            };
        }

        CapacityContext {
            source: CapacitySource::VehicleSpecs,
            capacity_kwh: telemetry.nameplate_capacity_kwh(vin),
            battery_soh: None,
        }
    }

    fn estimate_energy(
        &self,
        telemetry: &TelemetryStore,
        vin: &str,
        battery_id: Option<&str>,
    ) -> EnergyEstimation {
        let capacity_context = self.resolve_capacity_context(telemetry, vin, battery_id);
        let mut estimation = EnergyEstimation {
            energy_method: EnergyMethod::DefaultFallback,
            estimated_energy_kwh: self.default_energy_kwh,
            soc_delta_percent: None,
            override_value_kwh: None,
            capacity_context,
        };

        let history = telemetry.soc_history(vin);
        if history.len() < 2 {
            return estimation;
        }

        let delta_percent = (history[history.len() - 1].value - history[0].value).max(0.0);
        let estimated = estimation.capacity_context.capacity_kwh * delta_percent / 100.0;
        if estimated <= 0.0 {
            return estimation;
        }

        estimation.energy_method = EnergyMethod::SocHistory;
        estimation.estimated_energy_kwh = round2(estimated);
        estimation.soc_delta_percent = Some(round2(delta_percent));
        estimation
    }

    fn determine_rate(power_kw: f64) -> &'static RateTier {
        POWER_PRICING_TIERS
            .iter()
            .find(|tier| power_kw <= tier.max_power_kw)
            .unwrap_or(&POWER_PRICING_TIERS[POWER_PRICING_TIERS.len() - 1])
    }

    fn select_connector<'a>(
        station: &'a StationSnapshot,
        reserved_connector: Option<&'a Connector>,
    ) -> Option<&'a Connector> {
        if reserved_connector.is_some() {
            return reserved_connector;
        }
        station
            .station
            .connectors
            .iter()
            .max_by(|a, b| a.power_kw.total_cmp(&b.power_kw))
    }

    /// Estimate the cost of a session at the given station.
    ///
    /// If a connector is reserved it is priced as-is; otherwise the highest
    /// rated connector is assumed. An explicit energy override takes
    /// precedence over any history-derived estimate.
    pub fn estimate(
        &self,
        telemetry: &TelemetryStore,
        vin: &str,
        station: &StationSnapshot,
        battery_id: Option<&str>,
        reserved_connector: Option<&Connector>,
        energy_override_kwh: Option<f64>,
    ) -> PricingResult {
        let Some(connector) = Self::select_connector(station, reserved_connector) else {
            return PricingResult {
                currency: "EUR".into(),
                connector_id: None,
                power_kw: 0.0,
                pricing_tier: None,
                rate_eur_per_kwh: 0.0,
                energy_kwh: 0.0,
                energy_component_eur: 0.0,
                session_fee_eur: 0.0,
                total_eur: 0.0,
                estimation_context: None,
                reason: Some("no_connectors_available".into()),
            };
        };

        let tier = Self::determine_rate(connector.power_kw);
        let mut estimation = self.estimate_energy(telemetry, vin, battery_id);

        if let Some(override_kwh) = energy_override_kwh {
            let override_kwh = round2(override_kwh);
            estimation.energy_method = EnergyMethod::Override;
            estimation.estimated_energy_kwh = override_kwh;
            estimation.override_value_kwh = Some(override_kwh);
        }

        let energy_kwh = estimation.estimated_energy_kwh;
        let energy_component = round2(energy_kwh * tier.rate_eur_per_kwh);
        let total = round2(energy_component + self.session_fee_eur);

        PricingResult {
            currency: "EUR".into(),
            connector_id: Some(connector.connector_id.clone()),
            power_kw: connector.power_kw,
            pricing_tier: Some(tier.name.into()),
            rate_eur_per_kwh: tier.rate_eur_per_kwh,
            energy_kwh,
            energy_component_eur: energy_component,
            session_fee_eur: self.session_fee_eur,
            total_eur: total,
            estimation_context: Some(estimation),
            reason: None,
        }
    }
}
