use crate::models::{Candidate, Strategy};

/// Cost above this many EUR scores zero.
const COST_SCALE_EUR: f64 = 10.0;
/// Sessions longer than this many hours score zero on speed.
const DURATION_SCALE_H: f64 = 2.0;
/// Stations farther than this many kilometers score zero on distance.
const DISTANCE_SCALE_KM: f64 = 10.0;

struct Weights {
    cost: f64,
    speed: f64,
    distance: f64,
}

const COST_WEIGHTS: Weights = Weights {
    cost: 0.7,
    speed: 0.2,
    distance: 0.1,
};
const SPEED_WEIGHTS: Weights = Weights {
    cost: 0.3,
    speed: 0.6,
    distance: 0.1,
};
const BALANCED_WEIGHTS: Weights = Weights {
    cost: 0.4,
    speed: 0.4,
    distance: 0.2,
};

/// Normalized multi-objective score for UI display, 0-100.
///
/// The weights are a product choice, not a derived optimum.
pub fn match_score(strategy: Strategy, candidate: &Candidate) -> u8 {
    let cost_norm = (1.0 - candidate.total_cost_eur / COST_SCALE_EUR).max(0.0);
    let speed_norm = (1.0 - candidate.session_duration_h / DURATION_SCALE_H).max(0.0);
    let distance_norm = (1.0 - candidate.distance_km / DISTANCE_SCALE_KM).max(0.0);

    let weights = match strategy {
        Strategy::Cost => COST_WEIGHTS,
        Strategy::Speed => SPEED_WEIGHTS,
        Strategy::Balanced => BALANCED_WEIGHTS,
    };

    let score =
        weights.cost * cost_norm + weights.speed * speed_norm + weights.distance * distance_norm;
    (score * 100.0).round() as u8
}
