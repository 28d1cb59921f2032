use chrono::{DateTime, Utc};

use crate::StationRegistry;
use crate::geo::haversine_km;
use crate::models::{BatterySummary, Candidate, Coordinate};
use crate::pricing::PricingEngine;
use crate::telemetry::TelemetryStore;

/// Hours left until the deadline, floored at zero.
pub fn time_budget_hours(now: DateTime<Utc>, ready_by: DateTime<Utc>) -> f64 {
    ((ready_by - now).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
}

/// Enumerate every available connector across every known station and
/// evaluate it against the battery's deficit and the ready-by deadline.
///
/// The returned order is station order times connector order; ranking is
/// the selector's job. A zero deficit short-circuits to an empty list.
pub fn evaluate_candidates(
    registry: &StationRegistry,
    telemetry: &TelemetryStore,
    pricing: &PricingEngine,
    battery: &BatterySummary,
    requester: Coordinate,
    now: DateTime<Utc>,
    ready_by: DateTime<Utc>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if battery.energy_needed_kwh <= 0.0 {
        return candidates;
    }

    let time_budget_h = time_budget_hours(now, ready_by);

    for snapshot in registry.snapshots() {
        let distance_km = haversine_km(requester, snapshot.station.location.coordinate());

        for connector in &snapshot.station.connectors {
            if !connector.is_available() {
                continue;
            }

            // Respect both the connector rating and the battery's safe limit
            let effective_power_kw = connector.power_kw.min(battery.max_safe_power_kw);
            if effective_power_kw <= 0.0 {
                continue;
            }

            let session_duration_h = battery.energy_needed_kwh / effective_power_kw;
            let can_meet_ready_by = session_duration_h <= time_budget_h;

            // Price against the exact energy this candidate would deliver
            let cost = pricing.estimate(
                telemetry,
                &battery.vin,
                &snapshot,
                battery.battery_id.as_deref(),
                Some(connector),
                Some(battery.energy_needed_kwh),
            );

            candidates.push(Candidate {
                station_id: snapshot.station.station_id.clone(),
                station_name: snapshot.station.name.clone(),
                distance_km,
                available_connectors: snapshot.available_connectors,
                total_connectors: snapshot.total_connectors,
                connector_id: connector.connector_id.clone(),
                connector_type: connector.connector_type,
                connector_power_kw: connector.power_kw,
                effective_power_kw,
                session_duration_h,
                can_meet_ready_by,
                total_cost_eur: cost.total_eur,
                pricing: cost,
            });
        }
    }

    tracing::debug!(
        candidate_count = candidates.len(),
        time_budget_h,
        "evaluated stations for negotiation"
    );
    candidates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{
        Connector, ConnectorStatus, ConnectorType, Station, StationLocation,
    };
    use chrono::{Duration, TimeZone};

    fn connector(id: &str, power_kw: f64, status: ConnectorStatus) -> Connector {
        Connector {
            connector_id: id.into(),
            connector_type: ConnectorType::Ccs2,
            power_kw,
            status,
        }
    }

    fn station(id: &str, connectors: Vec<Connector>) -> Station {
        Station {
            station_id: id.into(),
            name: format!("{id} hub"),
            operator: "GridPass Demo Ops".into(),
            location: StationLocation {
                city: "Helsinki".into(),
                country: "FI".into(),
                address: "Examplekatu 1".into(),
                latitude: 60.1699,
                longitude: 24.9384,
            },
            connectors,
        }
    }

    fn battery(energy_needed_kwh: f64, max_safe_power_kw: f64) -> BatterySummary {
        BatterySummary {
            vin: "VIN-1".into(),
            battery_id: None,
            soc_now: 0.4,
            target_soc: 0.7,
            soh_percent: 94.0,
            impedance_ohm: 0.005,
            rated_capacity_kwh: 60.0,
            effective_capacity_kwh: 56.4,
            energy_needed_kwh,
            max_safe_power_kw,
            health_notes: vec![],
        }
    }

    fn requester() -> Coordinate {
        Coordinate {
            latitude: 60.1699,
            longitude: 24.9384,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_deficit_yields_no_candidates() {
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![connector("c1", 150.0, ConnectorStatus::Available)],
        )]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(0.0, 150.0),
            requester(),
            now,
            now + Duration::hours(2),
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_occupied_connectors_are_skipped() {
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![
                connector("free", 150.0, ConnectorStatus::Available),
                connector("busy", 300.0, ConnectorStatus::Occupied),
            ],
        )]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 150.0),
            requester(),
            now,
            now + Duration::hours(2),
        );

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].connector_id, "free");
    }

    #[test]
    fn test_effective_power_clamped_by_safe_ceiling() {
        // 150 kW connector clamped to 80 kW: 16.92 kWh takes ~12.7 min
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![connector("c1", 150.0, ConnectorStatus::Available)],
        )]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 80.0),
            requester(),
            now,
            now + Duration::hours(2),
        );

        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.effective_power_kw, 80.0);
        assert!((candidate.session_duration_h - 0.2115).abs() < 1e-4);
        assert!(candidate.can_meet_ready_by);
    }

    #[test]
    fn test_zero_effective_power_emits_no_candidate() {
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![connector("c1", 150.0, ConnectorStatus::Available)],
        )]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 0.0),
            requester(),
            now,
            now + Duration::hours(2),
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_feasibility_tracks_time_budget() {
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![connector("c1", 10.0, ConnectorStatus::Available)],
        )]);
        let now = fixed_now();
        // 16.92 kWh at 10 kW needs ~1.69 h; one hour is not enough
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 150.0),
            requester(),
            now,
            now + Duration::hours(1),
        );

        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].can_meet_ready_by);
    }

    #[test]
    fn test_pricing_uses_deficit_override() {
        let registry = StationRegistry::new(vec![station(
            "st-1",
            vec![connector("c1", 150.0, ConnectorStatus::Available)],
        )]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 150.0),
            requester(),
            now,
            now + Duration::hours(2),
        );

        let pricing = &candidates[0].pricing;
        assert_eq!(pricing.energy_kwh, 16.92);
        assert_eq!(pricing.connector_id.as_deref(), Some("c1"));
        assert_eq!(pricing.total_eur, 6.5);
        assert_eq!(candidates[0].total_cost_eur, 6.5);
    }

    #[test]
    fn test_insertion_order_across_stations() {
        let registry = StationRegistry::new(vec![
            station(
                "st-1",
                vec![
                    connector("a", 150.0, ConnectorStatus::Available),
                    connector("b", 22.0, ConnectorStatus::Available),
                ],
            ),
            station("st-2", vec![connector("c", 300.0, ConnectorStatus::Available)]),
        ]);
        let now = fixed_now();
        let candidates = evaluate_candidates(
            &registry,
            &TelemetryStore::default(),
            &PricingEngine::new(),
            &battery(16.92, 150.0),
            requester(),
            now,
            now + Duration::hours(2),
        );

        let order: Vec<&str> = candidates
            .iter()
            .map(|c| c.connector_id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
