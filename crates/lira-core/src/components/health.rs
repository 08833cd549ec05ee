//! Health inputs and the per-source breakdown of what they produced.

use serde::{Deserialize, Serialize};

/// Activity metrics accrued since the previous advance call.
///
/// Steps, daylight and exercise are deltas. Sleep is the full previous-night
/// value; the engine applies it at most once per in-game day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyHealthMetrics {
    pub steps: f64,
    pub daylight_minutes: f64,
    pub exercise_minutes: f64,
    pub sleep_hours: f64,
}

impl DailyHealthMetrics {
    pub const ZERO: Self = Self {
        steps: 0.0,
        daylight_minutes: 0.0,
        exercise_minutes: 0.0,
        sleep_hours: 0.0,
    };

    pub fn new(steps: f64, daylight_minutes: f64, exercise_minutes: f64, sleep_hours: f64) -> Self {
        Self {
            steps,
            daylight_minutes,
            exercise_minutes,
            sleep_hours,
        }
    }

    /// Copy with negative and non-finite values replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            steps: non_negative(self.steps),
            daylight_minutes: non_negative(self.daylight_minutes),
            exercise_minutes: non_negative(self.exercise_minutes),
            sleep_hours: non_negative(self.sleep_hours),
        }
    }

    /// Split the accrued deltas into `parts` equal slices. Sleep is a
    /// previous-night value, so every slice keeps it whole.
    pub fn split(&self, parts: u32) -> Self {
        let n = f64::from(parts.max(1));
        Self {
            steps: self.steps / n,
            daylight_minutes: self.daylight_minutes / n,
            exercise_minutes: self.exercise_minutes / n,
            sleep_hours: self.sleep_hours,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// What each health channel contributed over the current in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthContributions {
    pub steps_exploration_km: f64,
    pub passive_exploration_km: f64,
    pub exercise_build_points: f64,
    pub passive_build_points: f64,
    pub sleep_science: f64,
    pub daylight_science: f64,
    pub passive_science: f64,
    /// Latest sunlight multiplier applied to crop yield (1.0 = no bonus)
    pub sunlight_yield_multiplier: f64,
}

impl HealthContributions {
    pub const ZERO: Self = Self {
        steps_exploration_km: 0.0,
        passive_exploration_km: 0.0,
        exercise_build_points: 0.0,
        passive_build_points: 0.0,
        sleep_science: 0.0,
        daylight_science: 0.0,
        passive_science: 0.0,
        sunlight_yield_multiplier: 1.0,
    };

    /// Add one tick's contributions. Sums every channel and keeps the
    /// latest sunlight multiplier.
    pub fn accumulate(&mut self, tick: &HealthContributions) {
        self.steps_exploration_km += tick.steps_exploration_km;
        self.passive_exploration_km += tick.passive_exploration_km;
        self.exercise_build_points += tick.exercise_build_points;
        self.passive_build_points += tick.passive_build_points;
        self.sleep_science += tick.sleep_science;
        self.daylight_science += tick.daylight_science;
        self.passive_science += tick.passive_science;
        self.sunlight_yield_multiplier = tick.sunlight_yield_multiplier;
    }

    /// Move `share` of every summed channel into a new record for the next
    /// day. Sleep science stays whole with this day; both keep the sunlight
    /// multiplier.
    pub fn split_off(&mut self, share: f64) -> HealthContributions {
        let share = if share.is_finite() { share.clamp(0.0, 1.0) } else { 0.0 };
        let next = HealthContributions {
            steps_exploration_km: self.steps_exploration_km * share,
            passive_exploration_km: self.passive_exploration_km * share,
            exercise_build_points: self.exercise_build_points * share,
            passive_build_points: self.passive_build_points * share,
            sleep_science: 0.0,
            daylight_science: self.daylight_science * share,
            passive_science: self.passive_science * share,
            sunlight_yield_multiplier: self.sunlight_yield_multiplier,
        };
        self.steps_exploration_km -= next.steps_exploration_km;
        self.passive_exploration_km -= next.passive_exploration_km;
        self.exercise_build_points -= next.exercise_build_points;
        self.passive_build_points -= next.passive_build_points;
        self.daylight_science -= next.daylight_science;
        self.passive_science -= next.passive_science;
        next
    }

    pub fn total_exploration_km(&self) -> f64 {
        self.steps_exploration_km + self.passive_exploration_km
    }

    pub fn total_build_points(&self) -> f64 {
        self.exercise_build_points + self.passive_build_points
    }

    pub fn total_science(&self) -> f64 {
        self.sleep_science + self.daylight_science + self.passive_science
    }
}

impl Default for HealthContributions {
    fn default() -> Self {
        Self::ZERO
    }
}
