use async_trait::async_trait;
use ncs_core::{BatterySummary, Candidate, Selection, Strategy};
use thiserror::Error;

use crate::oracle::{CompactCandidate, DecisionOracle, DecisionRequest, OracleError};

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Selection requires at least one candidate")]
    EmptyCandidateSet,
    #[error(
        "Decision oracle chose {station_id}/{connector_id}, which is not in the offered candidate set"
    )]
    OracleContractViolation {
        station_id: String,
        connector_id: String,
    },
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Reduces a candidate list to one choice. The negotiation pipeline is
/// agnostic to which implementation is active.
#[async_trait]
pub trait Selector: Send + Sync {
    async fn select(
        &self,
        strategy: Strategy,
        battery: &BatterySummary,
        candidates: &[Candidate],
        time_budget_h: f64,
    ) -> Result<Selection, SelectionError>;
}

/// Deterministic rule: take the highest-rated available connector and
/// charge linearly until the deficit is met or the deadline lands,
/// whichever comes first. A deadline cut-off means a partial charge, not a
/// failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineSelector;

#[async_trait]
impl Selector for BaselineSelector {
    async fn select(
        &self,
        _strategy: Strategy,
        _battery: &BatterySummary,
        candidates: &[Candidate],
        time_budget_h: f64,
    ) -> Result<Selection, SelectionError> {
        let candidate = candidates
            .iter()
            .max_by(|a, b| a.connector_power_kw.total_cmp(&b.connector_power_kw))
            .ok_or(SelectionError::EmptyCandidateSet)?
            .clone();

        let duration_h = candidate.session_duration_h.min(time_budget_h);
        let delivered_energy_kwh = candidate.effective_power_kw * duration_h;

        tracing::debug!(
            station_id = %candidate.station_id,
            connector_id = %candidate.connector_id,
            duration_h,
            "baseline selector picked highest-power connector"
        );
        Ok(Selection {
            candidate,
            duration_h,
            delivered_energy_kwh,
        })
    }
}

/// Delegates the pick to an external decision oracle, constrained to the
/// offered candidate set. A response that names a pair outside the set
/// fails the selection outright; silently substituting a fallback would
/// mask oracle malfunction.
pub struct OracleSelector<O> {
    oracle: O,
}

impl<O: DecisionOracle> OracleSelector<O> {
    pub fn new(oracle: O) -> Self {
        OracleSelector { oracle }
    }
}

#[async_trait]
impl<O: DecisionOracle> Selector for OracleSelector<O> {
    async fn select(
        &self,
        strategy: Strategy,
        battery: &BatterySummary,
        candidates: &[Candidate],
        _time_budget_h: f64,
    ) -> Result<Selection, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::EmptyCandidateSet);
        }

        let request = DecisionRequest {
            strategy,
            battery: battery.clone(),
            candidates: candidates.iter().map(CompactCandidate::from).collect(),
        };
        let decision = self.oracle.decide(&request).await?;

        let Some(candidate) = candidates.iter().find(|candidate| {
            candidate.station_id == decision.station_id
                && candidate.connector_id == decision.connector_id
        }) else {
            return Err(SelectionError::OracleContractViolation {
                station_id: decision.station_id,
                connector_id: decision.connector_id,
            });
        };

        tracing::debug!(
            station_id = %candidate.station_id,
            connector_id = %candidate.connector_id,
            "oracle selected candidate"
        );
        Ok(Selection {
            candidate: candidate.clone(),
            duration_h: candidate.session_duration_h,
            delivered_energy_kwh: battery.energy_needed_kwh,
        })
    }
}
