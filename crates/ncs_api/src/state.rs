use std::sync::{Arc, Mutex};

use ncs_core::StationRegistry;
use ncs_engine::Negotiator;

/// Shared handles behind the HTTP surface. The registry is the only
/// mutable state; reservation handlers and the candidate scan both go
/// through the same mutex-guarded handle.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<StationRegistry>>,
    pub negotiator: Arc<Negotiator>,
}
