use std::time::Duration;

use async_trait::async_trait;
use ncs_core::{BatterySummary, Candidate, Strategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Decision oracle request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Decision oracle returned an unusable payload: {0}")]
    InvalidPayload(String),
}

/// Reduced projection of a candidate, all the oracle gets to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactCandidate {
    pub station_id: String,
    pub connector_id: String,
    pub total_cost_eur: f64,
    pub duration_h: f64,
    pub distance_km: f64,
    pub can_meet_ready_by: bool,
}

impl From<&Candidate> for CompactCandidate {
    fn from(candidate: &Candidate) -> Self {
        CompactCandidate {
            station_id: candidate.station_id.clone(),
            connector_id: candidate.connector_id.clone(),
            total_cost_eur: candidate.total_cost_eur,
            duration_h: candidate.session_duration_h,
            distance_km: candidate.distance_km,
            can_meet_ready_by: candidate.can_meet_ready_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub strategy: Strategy,
    pub battery: BatterySummary,
    pub candidates: Vec<CompactCandidate>,
}

/// Exactly one selected candidate identifier pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub station_id: String,
    pub connector_id: String,
}

/// External decision-making service invoked to pick among candidates.
/// Responses must be validated against the offered set before acting on
/// them.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionResponse, OracleError>;
}

/// Oracle reached over HTTP. One blocking round trip, no retry; the client
/// timeout bounds the call and its expiry surfaces as an oracle failure.
#[derive(Debug, Clone)]
pub struct HttpDecisionOracle {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpDecisionOracle {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpDecisionOracle {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl DecisionOracle for HttpDecisionOracle {
    async fn decide(&self, request: &DecisionRequest) -> Result<DecisionResponse, OracleError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
