//! Exploration - scouting radius from walking and passive patrols.

use std::ops::RangeInclusive;

use crate::components::SimulationState;
use crate::tuning::SimTuning;

use super::events::{self as journal, MAX_LOG_LINES};

/// Kilometres gained in one tick, before the tech multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationGain {
    pub steps_km: f64,
    pub passive_km: f64,
    /// Applied to the sum of both sources
    pub tech_multiplier: f64,
}

impl ExplorationGain {
    pub fn total_km(&self) -> f64 {
        (self.steps_km + self.passive_km) * self.tech_multiplier
    }
}

/// Steps are already a delta and are not scaled by `fraction`.
pub fn exploration_gain(
    tuning: &SimTuning,
    steps: f64,
    fraction: f64,
    technology_level: f64,
) -> ExplorationGain {
    ExplorationGain {
        steps_km: tuning.exploration_from_steps_scale * tuning.step_length_km_per_step * steps.max(0.0),
        passive_km: tuning.passive_exploration_km_per_day * tuning.exploration_passive_scale * fraction,
        tech_multiplier: 1.0 + tuning.exploration_tech_multiplier_per_level * technology_level,
    }
}

/// Whole-kilometre marks passed when the radius moved from `before` to `after`.
///
/// Only the last `MAX_LOG_LINES` marks are returned; the journal could not
/// keep more of them anyway.
pub fn crossed_km_marks(before: f64, after: f64) -> RangeInclusive<i64> {
    let first = before.floor();
    let last = after.floor();
    if !(last > first) {
        return RangeInclusive::new(1, 0);
    }
    let to = last as i64;
    let newest = to.saturating_sub(MAX_LOG_LINES as i64 - 1);
    let from = (first as i64).saturating_add(1).max(newest);
    from..=to
}

/// Grow the explored radius. Logs one milestone per whole kilometre crossed
/// and a live progress line when the tick covered at least a kilometre.
pub fn run_exploration(
    state: &mut SimulationState,
    tuning: &SimTuning,
    steps: f64,
    fraction: f64,
) -> ExplorationGain {
    let gain = exploration_gain(tuning, steps, fraction, state.technology_level);
    let before = state.explored_radius_km;
    state.explored_radius_km += gain.total_km().max(0.0);

    let day = state.current_day_index;
    for km in crossed_km_marks(before, state.explored_radius_km) {
        journal::exploration_milestone(&mut state.event_log, day, km);
    }

    let delta = state.explored_radius_km - before;
    if delta >= 1.0 {
        let total = state.explored_radius_km;
        journal::exploration_progress(&mut state.event_log, day, delta, total, None);
    }
    gain
}
