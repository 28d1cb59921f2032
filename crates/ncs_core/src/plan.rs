use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    BatterySummary, Plan, PlanChargingDetails, PlanMeta, PlanPricing, PlanStation, Selection,
    Strategy,
};
use crate::pricing::round2;

/// Markup the "original" price carries over the negotiated one. The
/// before/after framing exists for the demo UI, not as a second pricing
/// model.
pub const COMPARISON_MARKUP_EUR: f64 = 0.75;

/// Either a formatted plan or an explicit statement of why there is none.
/// Infeasibility is a business outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanOutcome {
    Planned(Plan),
    Infeasible(InfeasiblePlan),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfeasiblePlan {
    pub error: String,
}

impl PlanOutcome {
    pub fn infeasible(reason: impl Into<String>) -> Self {
        PlanOutcome::Infeasible(InfeasiblePlan {
            error: reason.into(),
        })
    }
}

/// Convert the selected candidate into the presentation-ready plan.
pub fn format_plan(
    selection: &Selection,
    battery: &BatterySummary,
    strategy: Strategy,
    ready_by: DateTime<Utc>,
    match_score: u8,
) -> Plan {
    let candidate = &selection.candidate;
    let duration_ms = (selection.duration_h * 3_600_000.0).round() as i64;
    let recommended_start = ready_by - Duration::milliseconds(duration_ms);

    let original_price = round2(candidate.pricing.energy_component_eur + COMPARISON_MARKUP_EUR);
    let negotiated_price = candidate.total_cost_eur;

    Plan {
        plan_id: uuid::Uuid::new_v4(),
        meta: PlanMeta {
            strategy_used: strategy,
            match_score,
        },
        station: PlanStation {
            station_id: candidate.station_id.clone(),
            station_name: candidate.station_name.clone(),
            distance_km: candidate.distance_km,
            max_power_kw: candidate.connector_power_kw,
            available_connectors: candidate.available_connectors,
            total_connectors: candidate.total_connectors,
        },
        charging_details: PlanChargingDetails {
            current_level_percent: (battery.soc_now * 100.0).round() as u8,
            target_level_percent: (battery.target_soc * 100.0).round() as u8,
            energy_needed_kwh: round2(battery.energy_needed_kwh),
            planned_energy_kwh: round2(selection.delivered_energy_kwh),
            ready_by,
            recommended_start,
            estimated_duration_min: (selection.duration_h * 60.0).round() as u32,
        },
        pricing: PlanPricing {
            original_price_eur: original_price,
            negotiated_price_eur: negotiated_price,
            savings_eur: round2(original_price - negotiated_price),
        },
    }
}
