use std::sync::{Arc, Mutex};
use std::time::Duration;

use ncs_core::{Station, StationRegistry, TelemetryStore};
use ncs_engine::{
    BaselineSelector, HttpDecisionOracle, Negotiator, OracleError, OracleSelector, Selector,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Service configuration loaded from a JSON file at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub stations: Vec<Station>,
    #[serde(default)]
    pub telemetry: TelemetryStore,
    /// External decision oracle; the deterministic baseline applies when
    /// absent.
    #[serde(default)]
    pub oracle: Option<OracleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleConfig {
    pub endpoint: String,
    /// Round-trip budget in seconds; expiry counts as an oracle failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Build the shared application state, wiring the selector named by the
    /// configuration.
    pub fn into_state(self) -> Result<AppState, OracleError> {
        let selector: Box<dyn Selector> = match &self.oracle {
            Some(oracle) => Box::new(OracleSelector::new(HttpDecisionOracle::new(
                oracle.endpoint.clone(),
                Duration::from_secs(oracle.timeout_secs),
            )?)),
            None => Box::new(BaselineSelector),
        };

        let registry = Arc::new(Mutex::new(StationRegistry::new(self.stations)));
        let negotiator = Negotiator::new(
            Arc::clone(&registry),
            Arc::new(self.telemetry),
            selector,
        );

        Ok(AppState {
            registry,
            negotiator: Arc::new(negotiator),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_deserialization() {
        let json = r#"
        {
          "stations": [
            {
              "stationId": "did:itn:charger:fleet-01",
              "name": "GridPass Demo Station",
              "operator": "GridPass Demo Ops",
              "location": {
                "city": "Helsinki",
                "country": "FI",
                "address": "Examplekatu 1",
                "latitude": 60.1699,
                "longitude": 24.9384
              },
              "connectors": [
                {"connectorId": "connector-1", "type": "CCS2", "powerKw": 150, "status": "available"},
                {"connectorId": "connector-2", "type": "CHAdeMO", "powerKw": 50, "status": "occupied"}
              ]
            }
          ],
          "telemetry": {
            "socHistory": {
              "W1KAH5EB2PF093797": [
                {"timestamp": "2025-09-30T05:07:57Z", "value": 0.0},
                {"timestamp": "2025-09-30T06:49:26Z", "value": 100.0}
              ]
            },
            "healthRecords": [
              {
                "batteryId": "did:itn:883c83bd37b342a9b8dda5",
                "sohPercent": 94.2,
                "impedanceMilliohm": 5.52,
                "ratedCapacityKwh": 74.7,
                "chargeCycles": 834,
                "batteryAge": "P2Y6M",
                "recordedAt": "2025-05-06T18:07:49Z"
              }
            ],
            "activeBatteryId": "did:itn:883c83bd37b342a9b8dda5"
          },
          "oracle": {
            "endpoint": "http://localhost:9090/decide"
          }
        }
        "#;

        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.stations.len(), 1);
        assert_eq!(config.stations[0].connectors.len(), 2);
        assert_eq!(config.telemetry.health_records.len(), 1);
        assert_eq!(
            config.telemetry.active_battery_id.as_deref(),
            Some("did:itn:883c83bd37b342a9b8dda5")
        );
        let oracle = config.oracle.unwrap();
        assert_eq!(oracle.endpoint, "http://localhost:9090/decide");
        assert_eq!(oracle.timeout_secs, 10);
    }

    #[test]
    fn test_minimal_config_defaults_to_baseline() {
        let json = r#"{ "stations": [] }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(config.oracle.is_none());
        assert!(config.telemetry.health_records.is_empty());
        assert!(config.into_state().is_ok());
    }
}
