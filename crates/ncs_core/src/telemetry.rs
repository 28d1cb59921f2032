use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nameplate capacity assumed for vehicles with no known capacity entry.
pub const DEFAULT_NAMEPLATE_CAPACITY_KWH: f64 = 64.0;

/// One state-of-charge sample from the vehicle data gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocSample {
    pub timestamp: DateTime<Utc>,
    /// State of charge in percent.
    pub value: f64,
}

/// A state-of-health measurement for one battery pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub battery_id: String,
    pub soh_percent: f64,
    /// Pack impedance as reported by the gateway, in milliohms.
    pub impedance_milliohm: f64,
    pub rated_capacity_kwh: f64,
    pub charge_cycles: u32,
    /// ISO 8601 duration, e.g. "P2Y6M".
    pub battery_age: String,
    pub recorded_at: DateTime<Utc>,
}

/// Snapshot store for battery and vehicle telemetry. All inputs are
/// snapshots loaded at startup; nothing is ingested at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetryStore {
    /// Ordered SoC history per VIN.
    pub soc_history: HashMap<String, Vec<SocSample>>,
    /// SoH records in the order the gateway delivered them.
    pub health_records: Vec<HealthRecord>,
    /// Externally reported current SoC in percent, if any.
    pub battery_status_soc: Option<f64>,
    /// Nameplate capacity per VIN in kWh.
    pub vehicle_capacity_kwh: HashMap<String, f64>,
    /// Battery id from the pack's birth certificate.
    pub active_battery_id: Option<String>,
}

impl TelemetryStore {
    pub fn soc_history(&self, vin: &str) -> &[SocSample] {
        self.soc_history.get(vin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent health record for the given battery id.
    pub fn latest_health_record_for(&self, battery_id: &str) -> Option<&HealthRecord> {
        self.health_records
            .iter()
            .rev()
            .find(|record| record.battery_id == battery_id)
    }

    /// Most recent health record on file, regardless of battery id.
    ///
    /// TODO: match by battery id once the fleet carries more than one pack;
    /// the demo data set has a single active battery.
    pub fn newest_health_record(&self) -> Option<&HealthRecord> {
        self.health_records.last()
    }

    pub fn nameplate_capacity_kwh(&self, vin: &str) -> f64 {
        self.vehicle_capacity_kwh
            .get(vin)
            .copied()
            .unwrap_or(DEFAULT_NAMEPLATE_CAPACITY_KWH)
    }
}
