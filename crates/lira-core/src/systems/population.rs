//! Population - births gated by free beds and food.
//!
//! Nobody dies. An empty pantry pauses births until food comes back.

use crate::components::SimulationState;
use crate::tuning::SimTuning;

use super::clamp01;
use super::events as journal;
use super::food::FoodBalance;

/// Share of the population that still has room to grow into.
pub fn capacity_factor(effective_beds: f64, effective_pop: f64) -> f64 {
    clamp01((effective_beds - effective_pop) / effective_pop.max(1.0))
}

/// Food gate from the clamped surplus ratio in [-1, 1].
pub fn food_factor(surplus_ratio: f64, tuning: &SimTuning) -> f64 {
    clamp01(tuning.food_factor_base + tuning.food_factor_slope * surplus_ratio.clamp(-1.0, 1.0))
}

/// Birth bonus that ramps in linearly between the buffer target and the
/// comfort level.
pub fn comfort_multiplier(buffer_days: f64, tuning: &SimTuning) -> f64 {
    let t0 = tuning.food_buffer_target_days;
    let t_max = tuning.births_comfort_at_days.max(t0 + 0.1);
    let progress = clamp01((buffer_days - t0) / (t_max - t0));
    1.0 + tuning.births_comfort_bonus_max * progress
}

/// Inputs captured before construction can change beds this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationGates {
    pub effective_pop: f64,
    pub effective_beds: f64,
}

impl PopulationGates {
    pub fn capture(state: &SimulationState) -> Self {
        Self {
            effective_pop: state.effective_population(),
            effective_beds: state.effective_beds(),
        }
    }
}

/// Births for `fraction` of a day.
pub fn births(
    state: &SimulationState,
    tuning: &SimTuning,
    gates: &PopulationGates,
    food: &FoodBalance,
    fraction: f64,
) -> f64 {
    if food.shortage {
        return 0.0;
    }
    let base = tuning.base_population_growth_rate
        * (state.population / 2.0)
        * capacity_factor(gates.effective_beds, gates.effective_pop)
        * food_factor(food.surplus_ratio(), tuning);

    let buffer_days = if gates.effective_pop > 0.0 {
        state.food_stock_rations / (gates.effective_pop * tuning.ration_per_person_per_day).max(0.0001)
    } else {
        0.0
    };
    (base * comfort_multiplier(buffer_days, tuning) * fraction).max(0.0)
}

/// Grow the population and announce every whole colonist gained.
/// Returns the number of new whole colonists.
pub fn run_population(
    state: &mut SimulationState,
    tuning: &SimTuning,
    gates: &PopulationGates,
    food: &FoodBalance,
    fraction: f64,
) -> i64 {
    let born = births(state, tuning, gates, food, fraction);
    let before = state.population;
    state.population = (state.population + born).max(0.0);

    let arrived = (state.population.floor() - before.floor()) as i64;
    if arrived > 0 {
        let day = state.current_day_index;
        journal::arrivals(&mut state.event_log, day, arrived);
    }
    arrived
}
