use crate::models::BatterySummary;
use crate::telemetry::TelemetryStore;

/// Packs at or below this state of health get the reduced power ceiling.
pub const SOH_DERATE_THRESHOLD_PERCENT: f64 = 85.0;
/// Derate threshold applied to the impedance figure as stored (milliohms).
pub const IMPEDANCE_DERATE_THRESHOLD: f64 = 8.0;
/// Ceiling for aging packs.
pub const DERATED_POWER_CEILING_KW: f64 = 80.0;
/// Ceiling for healthy packs.
pub const HEALTHY_POWER_CEILING_KW: f64 = 150.0;
/// Assumed state of charge when neither history nor a status reading exists.
pub const DEFAULT_SOC_FRACTION: f64 = 0.5;

fn current_soc_fraction(telemetry: &TelemetryStore, vin: &str) -> f64 {
    let history = telemetry.soc_history(vin);
    if let Some(last) = history.last()
        && last.value > 0.0
        && last.value < 100.0
    {
        return last.value / 100.0;
    }

    if let Some(status_percent) = telemetry.battery_status_soc {
        return (status_percent / 100.0).clamp(0.0, 1.0);
    }

    DEFAULT_SOC_FRACTION
}

/// Derive the per-request battery summary from telemetry and health records.
///
/// `target_soc` is a fraction in [0, 1]. A target at or below the current
/// state of charge yields a zero energy deficit, which downstream means
/// "nothing to charge".
pub fn build_summary(telemetry: &TelemetryStore, vin: &str, target_soc: f64) -> BatterySummary {
    let soc_now = current_soc_fraction(telemetry, vin);
    let record = telemetry.newest_health_record();

    let (battery_id, soh_percent, impedance_milliohm, rated_capacity_kwh, mut health_notes) =
        match record {
            Some(record) => (
                Some(record.battery_id.clone()),
                record.soh_percent,
                record.impedance_milliohm,
                record.rated_capacity_kwh,
                Vec::new(),
            ),
            None => (
                telemetry.active_battery_id.clone(),
                100.0,
                0.0,
                telemetry.nameplate_capacity_kwh(vin),
                vec!["No health record on file; using nameplate capacity".to_string()],
            ),
        };

    let effective_capacity_kwh = rated_capacity_kwh * soh_percent / 100.0;
    let energy_needed_kwh = (target_soc - soc_now).max(0.0) * effective_capacity_kwh;

    let max_safe_power_kw = if soh_percent < SOH_DERATE_THRESHOLD_PERCENT
        || impedance_milliohm > IMPEDANCE_DERATE_THRESHOLD
    {
        health_notes.push("Battery aging; reduce fast charging power".to_string());
        DERATED_POWER_CEILING_KW
    } else {
        health_notes.push("Battery in good condition".to_string());
        HEALTHY_POWER_CEILING_KW
    };

    BatterySummary {
        vin: vin.to_string(),
        battery_id,
        soc_now,
        target_soc,
        soh_percent,
        impedance_ohm: impedance_milliohm / 1000.0,
        rated_capacity_kwh,
        effective_capacity_kwh,
        energy_needed_kwh,
        max_safe_power_kw,
        health_notes,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::telemetry::{HealthRecord, SocSample};
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn sample(value: f64) -> SocSample {
        SocSample {
            timestamp: Utc.with_ymd_and_hms(2025, 9, 30, 9, 36, 49).unwrap(),
            value,
        }
    }

    fn record(soh_percent: f64, impedance_milliohm: f64, rated_capacity_kwh: f64) -> HealthRecord {
        HealthRecord {
            battery_id: "battery-a".into(),
            soh_percent,
            impedance_milliohm,
            rated_capacity_kwh,
            charge_cycles: 500,
            battery_age: "P2Y".into(),
            recorded_at: Utc.with_ymd_and_hms(2025, 5, 6, 18, 7, 49).unwrap(),
        }
    }

    fn telemetry(records: Vec<HealthRecord>, history: Vec<SocSample>) -> TelemetryStore {
        let mut soc_history = HashMap::new();
        soc_history.insert("VIN-1".to_string(), history);
        TelemetryStore {
            soc_history,
            health_records: records,
            ..TelemetryStore::default()
        }
    }

    #[test]
    fn test_effective_capacity_and_deficit() {
        // 60 kWh at 94% SoH -> 56.4 kWh effective; 40% -> 70% needs 16.92 kWh
        let telemetry = telemetry(vec![record(94.0, 5.0, 60.0)], vec![sample(40.0)]);
        let summary = build_summary(&telemetry, "VIN-1", 0.7);

        assert!((summary.effective_capacity_kwh - 56.4).abs() < 1e-9);
        assert!((summary.energy_needed_kwh - 16.92).abs() < 1e-9);
        assert_eq!(summary.max_safe_power_kw, HEALTHY_POWER_CEILING_KW);
        assert_eq!(summary.battery_id.as_deref(), Some("battery-a"));
    }

    #[test]
    fn test_target_below_current_floors_deficit_at_zero() {
        let telemetry = telemetry(vec![record(94.0, 5.0, 60.0)], vec![sample(80.0)]);
        let summary = build_summary(&telemetry, "VIN-1", 0.7);

        assert_eq!(summary.energy_needed_kwh, 0.0);
    }

    #[test]
    fn test_low_soh_derates_power_ceiling() {
        let telemetry = telemetry(vec![record(82.0, 5.0, 60.0)], vec![sample(40.0)]);
        let summary = build_summary(&telemetry, "VIN-1", 0.7);

        assert_eq!(summary.max_safe_power_kw, DERATED_POWER_CEILING_KW);
        assert!(
            summary
                .health_notes
                .iter()
                .any(|note| note.contains("aging"))
        );
    }

    #[test]
    fn test_high_impedance_derates_power_ceiling() {
        let telemetry = telemetry(vec![record(95.0, 9.1, 60.0)], vec![sample(40.0)]);
        let summary = build_summary(&telemetry, "VIN-1", 0.7);

        assert_eq!(summary.max_safe_power_kw, DERATED_POWER_CEILING_KW);
    }

    #[test]
    fn test_soc_resolution_order() {
        // Full-battery samples (>= 100) are not trusted; the status reading
        // takes over, and without one the default applies.
        let with_status = TelemetryStore {
            battery_status_soc: Some(64.0),
            ..telemetry(vec![record(94.0, 5.0, 60.0)], vec![sample(100.0)])
        };
        assert_eq!(build_summary(&with_status, "VIN-1", 0.7).soc_now, 0.64);

        let without_status = telemetry(vec![record(94.0, 5.0, 60.0)], vec![sample(100.0)]);
        assert_eq!(
            build_summary(&without_status, "VIN-1", 0.7).soc_now,
            DEFAULT_SOC_FRACTION
        );
    }

    #[test]
    fn test_status_reading_clamped_to_valid_range() {
        let telemetry = TelemetryStore {
            battery_status_soc: Some(130.0),
            ..TelemetryStore::default()
        };
        let summary = build_summary(&telemetry, "VIN-1", 0.7);
        assert_eq!(summary.soc_now, 1.0);
    }

    #[test]
    fn test_missing_health_record_degrades_to_nameplate() {
        let telemetry = TelemetryStore {
            active_battery_id: Some("battery-x".into()),
            ..TelemetryStore::default()
        };
        let summary = build_summary(&telemetry, "VIN-1", 0.7);

        assert_eq!(summary.soh_percent, 100.0);
        assert_eq!(
            summary.rated_capacity_kwh,
            crate::telemetry::DEFAULT_NAMEPLATE_CAPACITY_KWH
        );
        assert_eq!(summary.battery_id.as_deref(), Some("battery-x"));
        assert!(
            summary
                .health_notes
                .iter()
                .any(|note| note.contains("nameplate"))
        );
    }
}
