use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use ncs_core::{
    BatterySummary, Candidate, Coordinate, PlanOutcome, PricingEngine, StationRegistry, Strategy,
    TelemetryStore, build_summary, evaluate_candidates, format_plan, match_score,
    time_budget_hours,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selector::{SelectionError, Selector};

/// A ready-by deadline must be more than this far in the future.
pub const MIN_DEADLINE_LEAD_MINUTES: i64 = 5;
/// A ready-by deadline must be at most this far in the future.
pub const MAX_DEADLINE_LEAD_HOURS: i64 = 12;
/// Deadline assumed when the request carries none.
pub const DEFAULT_DEADLINE_LEAD_HOURS: i64 = 2;

#[derive(Error, Debug)]
pub enum NegotiationError {
    #[error("Ready-by time must be more than 5 minutes in the future")]
    DeadlineTooSoon { ready_by: DateTime<Utc> },
    #[error("Ready-by time must be within the next 12 hours")]
    DeadlineTooLate { ready_by: DateTime<Utc> },
    #[error("Target state of charge must be between 1 and 100 percent, got {value}")]
    TargetSocOutOfRange { value: f64 },
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// One negotiation request, already past transport-level parsing.
#[derive(Debug, Clone)]
pub struct NegotiationRequest {
    pub requester: Coordinate,
    /// Desired state of charge in percent, 1-100.
    pub target_soc_percent: f64,
    /// Defaults to now plus two hours when absent.
    pub ready_by: Option<DateTime<Utc>>,
    pub strategy: Strategy,
    pub vehicle_vin: String,
}

/// Everything a caller gets back: the battery view, the full candidate
/// list, and the plan (or the explicit reason there is none).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationReport {
    pub battery: BatterySummary,
    pub candidate_count: usize,
    pub candidates: Vec<Candidate>,
    pub plan: PlanOutcome,
}

/// Runs the candidate generation, feasibility filtering and selection
/// pipeline for one request. All computation is synchronous within the
/// request's scope except the selector, which may call out.
pub struct Negotiator {
    registry: Arc<Mutex<StationRegistry>>,
    telemetry: Arc<TelemetryStore>,
    pricing: PricingEngine,
    selector: Box<dyn Selector>,
}

impl Negotiator {
    pub fn new(
        registry: Arc<Mutex<StationRegistry>>,
        telemetry: Arc<TelemetryStore>,
        selector: Box<dyn Selector>,
    ) -> Self {
        Negotiator {
            registry,
            telemetry,
            pricing: PricingEngine::new(),
            selector,
        }
    }

    fn resolve_ready_by(
        now: DateTime<Utc>,
        requested: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, NegotiationError> {
        let ready_by =
            requested.unwrap_or_else(|| now + Duration::hours(DEFAULT_DEADLINE_LEAD_HOURS));

        if ready_by <= now + Duration::minutes(MIN_DEADLINE_LEAD_MINUTES) {
            return Err(NegotiationError::DeadlineTooSoon { ready_by });
        }
        if ready_by > now + Duration::hours(MAX_DEADLINE_LEAD_HOURS) {
            return Err(NegotiationError::DeadlineTooLate { ready_by });
        }
        Ok(ready_by)
    }

    pub async fn negotiate(
        &self,
        request: NegotiationRequest,
        now: DateTime<Utc>,
    ) -> Result<NegotiationReport, NegotiationError> {
        if !(1.0..=100.0).contains(&request.target_soc_percent) {
            return Err(NegotiationError::TargetSocOutOfRange {
                value: request.target_soc_percent,
            });
        }
        let ready_by = Self::resolve_ready_by(now, request.ready_by)?;

        let battery = build_summary(
            &self.telemetry,
            &request.vehicle_vin,
            request.target_soc_percent / 100.0,
        );

        // Scope the lock so it is released before the selector's round trip
        let candidates = {
            let registry = self.registry.lock().unwrap();
            evaluate_candidates(
                &registry,
                &self.telemetry,
                &self.pricing,
                &battery,
                request.requester,
                now,
                ready_by,
            )
        };
        let candidate_count = candidates.len();
        tracing::info!(
            vin = %request.vehicle_vin,
            candidate_count,
            strategy = ?request.strategy,
            "negotiating charging plan"
        );

        if battery.energy_needed_kwh <= 0.0 {
            return Ok(NegotiationReport {
                battery,
                candidate_count,
                candidates,
                plan: PlanOutcome::infeasible("Target state of charge already reached"),
            });
        }
        if candidates.is_empty() {
            return Ok(NegotiationReport {
                battery,
                candidate_count,
                candidates,
                plan: PlanOutcome::infeasible("No stations can meet the ready-by constraint"),
            });
        }

        let time_budget_h = time_budget_hours(now, ready_by);
        let selection = self
            .selector
            .select(request.strategy, &battery, &candidates, time_budget_h)
            .await?;
        let score = match_score(request.strategy, &selection.candidate);
        let plan = format_plan(&selection, &battery, request.strategy, ready_by, score);

        Ok(NegotiationReport {
            battery,
            candidate_count,
            candidates,
            plan: PlanOutcome::Planned(plan),
        })
    }
}
