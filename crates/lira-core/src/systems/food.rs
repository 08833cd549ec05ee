//! Food - greenhouse yield, rations eaten, and the pantry soft cap.

use crate::components::SimulationState;
use crate::tuning::SimTuning;

use super::events as journal;

/// Crop variety grows asymptotically with explored radius.
pub fn crop_variety_multiplier(radius_km: f64, tuning: &SimTuning) -> f64 {
    let scale = tuning.crop_variety_radius_scale_km.max(0.0001);
    1.0 + tuning.crop_variety_max_uplift * (1.0 - (-radius_km.max(0.0) / scale).exp())
}

/// Daylight bonus on yield. Never below 1.0, so missing data costs nothing.
pub fn sunlight_multiplier(daylight_minutes: f64, tuning: &SimTuning) -> f64 {
    let minutes = daylight_minutes.max(0.0);
    let denom = (minutes + tuning.sunlight_half_saturation_minutes).max(0.0001);
    let raw = 1.0 + tuning.sunlight_multiplier_alpha * (minutes / denom);
    raw.max(1.0)
}

/// Yield damping once stored rations per capita pass the soft-cap start.
/// Never drops below the configured floor.
pub fn soft_cap_factor(buffer_per_capita: f64, tuning: &SimTuning) -> f64 {
    let start = tuning.food_soft_cap_start_days.max(1.0);
    if buffer_per_capita <= start {
        return 1.0;
    }
    let alpha = tuning.food_soft_cap_strength.max(0.0);
    let damped = 1.0 / (1.0 + alpha * ((buffer_per_capita - start) / start));
    damped.max(tuning.food_soft_cap_floor)
}

/// Daily figures behind one food step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodBalance {
    pub yield_per_day: f64,
    pub consumption_per_day: f64,
    pub soft_cap_factor: f64,
    /// Stock is exactly zero after this tick
    pub shortage: bool,
    /// Stock went from positive to zero during this tick
    pub shortage_started: bool,
}

impl FoodBalance {
    pub fn net_per_day(&self) -> f64 {
        self.yield_per_day - self.consumption_per_day
    }

    /// Net balance relative to consumption, clamped to [-1, 1].
    pub fn surplus_ratio(&self) -> f64 {
        (self.net_per_day() / self.consumption_per_day.max(1.0)).clamp(-1.0, 1.0)
    }
}

/// Compute today's yield and consumption for the current state.
pub fn food_balance(state: &SimulationState, tuning: &SimTuning, sunlight: f64) -> FoodBalance {
    let effective_pop = state.effective_population();
    let buffer_per_capita = if effective_pop > 0.0 {
        state.food_stock_rations / effective_pop
    } else {
        state.food_stock_rations
    };
    let soft_cap = soft_cap_factor(buffer_per_capita, tuning);
    let tech_bonus = 1.0 + tuning.yield_tech_bonus_per_level * state.technology_level;
    let variety = crop_variety_multiplier(state.explored_radius_km, tuning);

    FoodBalance {
        yield_per_day: state.greenhouse_count
            * tuning.base_yield_per_greenhouse
            * tech_bonus
            * variety
            * sunlight
            * soft_cap,
        consumption_per_day: effective_pop * tuning.ration_per_person_per_day,
        soft_cap_factor: soft_cap,
        shortage: false,
        shortage_started: false,
    }
}

/// Apply `fraction` of a day's net food to the pantry. Logs the shortage
/// transition once, and surplus/deficit beyond the log threshold.
pub fn run_food(
    state: &mut SimulationState,
    tuning: &SimTuning,
    sunlight: f64,
    fraction: f64,
) -> FoodBalance {
    let mut balance = food_balance(state, tuning, sunlight);
    let previous = state.food_stock_rations;
    state.food_stock_rations = (previous + balance.net_per_day() * fraction).max(0.0);

    balance.shortage = state.food_stock_rations <= 0.0;
    balance.shortage_started = previous > 0.0 && balance.shortage;

    let day = state.current_day_index;
    if balance.shortage_started {
        journal::growth_paused_for_food(&mut state.event_log, day);
    }

    let net = balance.net_per_day() * fraction;
    if net > tuning.food_log_threshold {
        journal::food_surplus(&mut state.event_log, day, net.round() as i64);
    } else if net < -tuning.food_log_threshold {
        journal::food_deficit(&mut state.event_log, day, (-net).round() as i64);
    }
    balance
}
