//! Negotiation engine: reduces the candidate list to one choice and runs
//! the end-to-end pipeline for a request.
//!
//! Selection is a capability. The deterministic baseline needs nothing
//! beyond the candidate list; the oracle-assisted variant calls out to an
//! external decision service and hard-fails on any answer outside the
//! offered set.

mod negotiation;
mod oracle;
mod selector;

pub use crate::negotiation::{
    DEFAULT_DEADLINE_LEAD_HOURS, MAX_DEADLINE_LEAD_HOURS, MIN_DEADLINE_LEAD_MINUTES,
    NegotiationError, NegotiationReport, NegotiationRequest, Negotiator,
};
pub use crate::oracle::{
    CompactCandidate, DecisionOracle, DecisionRequest, DecisionResponse, HttpDecisionOracle,
    OracleError,
};
pub use crate::selector::{BaselineSelector, OracleSelector, SelectionError, Selector};
