//! Simulation engine - main entry point for advancing a colony.
//!
//! The engine is a transition function over a `SimulationState`: each call
//! advances every counter by a fraction of an in-game day and appends
//! journal lines. Aside from flavor text it is deterministic. Inputs are
//! clamped rather than rejected, so a call always produces a valid state.
//!
//! The engine keeps a small carry-over (`EngineCarry`) between calls:
//! fractional construction days, progress through the current day, and the
//! day-to-date health contributions. The carry belongs to one state; switch
//! states only through `reset`, `restore_carry` or `load`.

use std::io::{Read, Write};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog::BuildingCatalog;
use crate::components::{initial, DailyHealthMetrics, HealthContributions, SimulationState};
use crate::persistence::{self, SaveError};
use crate::systems::*;
use crate::tuning::SimTuning;

/// Slack for deciding that accumulated fractions add up to a whole day
const DAY_EPSILON: f64 = 1e-9;

/// Per-state accumulators carried between advance calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineCarry {
    /// Fractional days of construction work not yet counted
    pub build_day_accumulator: f64,
    /// How much of the current in-game day has been simulated
    pub day_progress: f64,
    pub todays_contributions: HealthContributions,
    /// Last night's sleep has already been turned into science today
    pub sleep_applied_today: bool,
    pub idle_logged_today: bool,
    /// Explored radius when the current day began
    pub explored_at_day_start: Option<f64>,
}

impl EngineCarry {
    fn start_new_day(&mut self, explored_radius_km: f64, leftover_progress: f64) {
        self.day_progress = leftover_progress;
        self.todays_contributions = HealthContributions::ZERO;
        self.sleep_applied_today = false;
        self.idle_logged_today = false;
        self.explored_at_day_start = Some(explored_radius_km);
    }
}

/// Summary of one advance call
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Fraction actually simulated after clamping
    pub fraction: f64,
    pub day_closed: bool,
    pub plan: Option<PlanOutcome>,
    pub construction: Option<ConstructionOutcome>,
    /// New tech level when a breakthrough happened
    pub breakthrough: Option<f64>,
    pub arrivals: i64,
    pub food: Option<FoodBalance>,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            fraction: 0.0,
            day_closed: false,
            plan: None,
            construction: None,
            breakthrough: None,
            arrivals: 0,
            food: None,
        }
    }
}

/// Main simulation engine
pub struct SimulationEngine {
    tuning: SimTuning,
    catalog: BuildingCatalog,
    carry: EngineCarry,
    rng: StdRng,
    /// Weather, rumors, prologue and other cosmetic lines
    ambient_events: bool,
}

impl SimulationEngine {
    /// Engine with default tuning, the standard catalog and an entropy-seeded RNG
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Engine whose flavor text is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            tuning: SimTuning::default(),
            catalog: BuildingCatalog::standard(),
            carry: EngineCarry::default(),
            rng,
            ambient_events: true,
        }
    }

    pub fn with_tuning(mut self, tuning: SimTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_catalog(mut self, catalog: BuildingCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn set_ambient_events(&mut self, enabled: bool) {
        self.ambient_events = enabled;
    }

    pub fn tuning(&self) -> &SimTuning {
        &self.tuning
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    pub fn carry(&self) -> &EngineCarry {
        &self.carry
    }

    /// Pair the engine with a state restored from storage.
    pub fn restore_carry(&mut self, carry: EngineCarry) {
        self.carry = carry;
    }

    pub fn reset_carry(&mut self) {
        self.carry = EngineCarry::default();
    }

    /// Start over with a freshly landed colony.
    pub fn reset(&mut self, state: &mut SimulationState) {
        *state = SimulationState::new_colony(&self.catalog);
        self.reset_carry();
        info!("colony reset to initial state");
    }

    /// Advance exactly one in-game day. `None` means no health data.
    pub fn advance_one_day(
        &mut self,
        state: &mut SimulationState,
        health: Option<&DailyHealthMetrics>,
    ) -> TickReport {
        let metrics = health.copied().unwrap_or(DailyHealthMetrics::ZERO);
        self.advance_fraction_of_day(state, &metrics, 1.0, true)
    }

    /// Advance the colony by `fraction` of a day.
    ///
    /// `health` holds deltas accrued since the previous call (sleep is last
    /// night's total). `fraction` is clamped to [0, 1]; zero is a no-op.
    /// The day closes, and `current_day_index` advances by one, when
    /// `emit_daily_summary` is set or the simulated fractions add up to a
    /// whole day. When a call runs past the end of the day, the overrun
    /// share of its contributions is credited to the next day; the state
    /// counters and the closing summary still take the whole call.
    pub fn advance_fraction_of_day(
        &mut self,
        state: &mut SimulationState,
        health: &DailyHealthMetrics,
        fraction: f64,
        emit_daily_summary: bool,
    ) -> TickReport {
        let f = clamp01(fraction);
        if f <= 0.0 {
            return TickReport::skipped();
        }
        let metrics = health.sanitized();
        let tuning = &self.tuning;

        if self.ambient_events
            && state.current_day_index == initial::DAY_INDEX
            && state.event_log.is_empty()
        {
            journal::prologue(&mut state.event_log, state.current_day_index, &mut self.rng);
        }
        self.carry
            .explored_at_day_start
            .get_or_insert(state.explored_radius_km);

        let mut contrib = HealthContributions::ZERO;

        // 1. Exploration
        let exploration = run_exploration(state, tuning, metrics.steps, f);
        contrib.steps_exploration_km = exploration.steps_km;
        contrib.passive_exploration_km = exploration.passive_km;

        // 2. Food; population gates are read before construction can add beds
        let gates = PopulationGates::capture(state);
        let sunlight = sunlight_multiplier(metrics.daylight_minutes, tuning);
        contrib.sunlight_yield_multiplier = sunlight;
        let food = run_food(state, tuning, sunlight, f);

        // 3. Planning
        let plan = plan_construction(state, &self.catalog, tuning);
        if plan == PlanOutcome::Idle && !self.carry.idle_logged_today {
            journal::idle_builders(&mut state.event_log, state.current_day_index);
            self.carry.idle_logged_today = true;
        }

        // 4. Construction
        let build_gain = build_point_gain(
            tuning,
            f,
            metrics.exercise_minutes,
            state.technology_level,
        );
        contrib.passive_build_points = build_gain.passive;
        contrib.exercise_build_points = build_gain.exercise;
        let construction = run_construction(
            state,
            tuning,
            &build_gain,
            f,
            &mut self.carry.build_day_accumulator,
        );

        // 5. Science; sleep counts once per in-game day
        let sleep = if self.carry.sleep_applied_today {
            0.0
        } else {
            sleep_science(metrics.sleep_hours, tuning)
        };
        if sleep > 0.0 {
            self.carry.sleep_applied_today = true;
        }
        let science = ScienceGain {
            passive: tuning.passive_science_points_per_day * f,
            sleep,
            daylight: daylight_science(
                metrics.daylight_minutes,
                self.carry.todays_contributions.daylight_science,
                tuning,
            ),
        };
        contrib.passive_science = science.passive;
        contrib.sleep_science = science.sleep;
        contrib.daylight_science = science.daylight;
        let breakthrough = run_science(state, tuning, &science);
        if let Some(level) = breakthrough {
            let mastered = if self.ambient_events {
                journal::roll_mastery(&mut self.rng, level.floor() as i64)
            } else {
                None
            };
            journal::breakthrough(
                &mut state.event_log,
                state.current_day_index,
                level.floor() as i64,
                mastered,
            );
            info!("day {}: breakthrough, tech level {level}", state.current_day_index);
        }

        // 6. Population
        let arrivals = run_population(state, tuning, &gates, &food, f);

        // 7. Day bookkeeping; a call that runs past the end of the day
        // credits the overrun share of its contributions to the next day
        self.carry.day_progress += f;
        let day_closed = emit_daily_summary || self.carry.day_progress >= 1.0 - DAY_EPSILON;
        if day_closed {
            let leftover = if emit_daily_summary {
                0.0
            } else {
                (self.carry.day_progress - 1.0).clamp(0.0, f)
            };
            let next_day = contrib.split_off(leftover / f);
            self.carry.todays_contributions.accumulate(&contrib);
            self.close_day(state, leftover);
            if leftover > 0.0 {
                self.carry.todays_contributions.accumulate(&next_day);
            }
        } else {
            self.carry.todays_contributions.accumulate(&contrib);
            state.last_contributions = self.carry.todays_contributions;
        }

        TickReport {
            fraction: f,
            day_closed,
            plan: Some(plan),
            construction: Some(construction),
            breakthrough,
            arrivals,
            food: Some(food),
        }
    }

    /// End-of-day summary, ambience, and the day counter.
    fn close_day(&mut self, state: &mut SimulationState, leftover_progress: f64) {
        let day = state.current_day_index;
        let radius = state.explored_radius_km;
        let start = self.carry.explored_at_day_start.unwrap_or(radius);

        let discovery = if self.ambient_events {
            journal::roll_discovery(&mut self.rng)
        } else {
            None
        };
        journal::exploration_progress(
            &mut state.event_log,
            day,
            (radius - start).max(0.0),
            radius,
            discovery,
        );
        if state.effective_beds() <= state.effective_population() {
            journal::housing_at_capacity(&mut state.event_log, day);
        }
        if self.ambient_events {
            journal::ambient_daily(&mut state.event_log, day, &mut self.rng);
        }

        state.current_day_index = state.current_day_index.saturating_add(1);
        state.last_contributions = self.carry.todays_contributions;
        self.carry.start_new_day(radius, leftover_progress);

        debug!(
            "day {day} closed: pop {:.2}, food {:.1}, beds {:.0}, tech {:.1}, radius {:.2} km",
            state.population,
            state.food_stock_rations,
            state.housing_capacity,
            state.technology_level,
            radius
        );
    }

    /// Save the state and this engine's carry to a writer
    pub fn save<W: Write>(&self, writer: W, state: &SimulationState) -> Result<(), SaveError> {
        persistence::save_simulation(writer, state, &self.carry)
    }

    /// Load a state from a reader and pair this engine with it
    pub fn load<R: Read>(&mut self, reader: R) -> Result<SimulationState, SaveError> {
        let loaded = persistence::load_simulation(reader)?;
        self.carry = loaded.carry;
        Ok(loaded.state)
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_engine() -> SimulationEngine {
        let mut engine = SimulationEngine::with_seed(7);
        engine.set_ambient_events(false);
        engine
    }

    #[test]
    fn test_first_day_scenario() {
        let mut engine = SimulationEngine::with_seed(1);
        let mut state = SimulationState::new();
        let report = engine.advance_one_day(&mut state, None);

        assert!(report.day_closed);
        assert_eq!(state.current_day_index, 2);
        assert!(state.explored_radius_km > 0.0);
        // roughly 3 rations grown, 8 eaten
        let food = report.food.unwrap();
        assert!((state.food_stock_rations - (55.0 + food.net_per_day())).abs() < 1e-9);
        assert!((state.food_stock_rations - 50.0).abs() < 0.05);
        assert!(state.event_log.contains("Day 1"));
        assert!(state.event_log.contains("Touchdown successful"));
    }

    #[test]
    fn test_zero_fraction_is_noop() {
        let mut engine = SimulationEngine::with_seed(1);
        let mut state = SimulationState::new();
        let before = state.clone();
        let report = engine.advance_fraction_of_day(
            &mut state,
            &DailyHealthMetrics::new(5000.0, 60.0, 30.0, 8.0),
            0.0,
            true,
        );
        assert_eq!(report, TickReport::skipped());
        assert_eq!(state, before);
    }

    #[test]
    fn test_fraction_clamped() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let report = engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 3.0, false);
        assert_eq!(report.fraction, 1.0);
        assert_eq!(state.current_day_index, 2);

        let report = engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, -1.0, false);
        assert_eq!(report.fraction, 0.0);
        assert_eq!(state.current_day_index, 2);
    }

    #[test]
    fn test_day_index_once_per_whole_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        for _ in 0..3 {
            engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.25, false);
        }
        assert_eq!(state.current_day_index, 1);
        engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.25, false);
        assert_eq!(state.current_day_index, 2);
        assert_eq!(engine.carry().day_progress, 0.0);
    }

    #[test]
    fn test_summary_closes_partial_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.3, true);
        assert_eq!(state.current_day_index, 2);
        assert!(state.event_log.contains("Day 1: 🔎 Explored surroundings"));
        engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.3, false);
        assert_eq!(state.current_day_index, 2);
    }

    #[test]
    fn test_sleep_science_once_per_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let metrics = DailyHealthMetrics::new(0.0, 0.0, 0.0, 7.5);
        for _ in 0..4 {
            engine.advance_fraction_of_day(&mut state, &metrics, 0.2, false);
        }
        assert!((engine.carry().todays_contributions.sleep_science - 1.0).abs() < 1e-12);
        // passive 1.5 * 0.8 + sleep 1.0
        assert!((state.science_points - 2.2).abs() < 1e-9);

        // The next day applies it again
        engine.advance_fraction_of_day(&mut state, &metrics, 0.2, false);
        assert_eq!(state.current_day_index, 2);
        engine.advance_fraction_of_day(&mut state, &metrics, 0.2, false);
        assert!((engine.carry().todays_contributions.sleep_science - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contributions_finalized_at_day_close() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let metrics = DailyHealthMetrics::new(1000.0, 0.0, 0.0, 0.0);
        engine.advance_fraction_of_day(&mut state, &metrics, 0.5, false);
        assert!((state.last_contributions.steps_exploration_km - 0.42).abs() < 1e-9);

        engine.advance_fraction_of_day(&mut state, &metrics, 0.5, false);
        assert!((state.last_contributions.steps_exploration_km - 0.84).abs() < 1e-9);
        assert!((state.last_contributions.passive_build_points - 3.0).abs() < 1e-9);
        assert_eq!(engine.carry().todays_contributions, HealthContributions::ZERO);
    }

    #[test]
    fn test_overrun_contributions_go_to_next_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let metrics = DailyHealthMetrics::new(1000.0, 0.0, 0.0, 0.0);
        engine.advance_fraction_of_day(&mut state, &metrics, 0.6, false);
        engine.advance_fraction_of_day(&mut state, &metrics, 0.6, false);

        assert_eq!(state.current_day_index, 2);
        // 0.42 + two thirds of the second call's 0.42
        assert!((state.last_contributions.steps_exploration_km - 0.70).abs() < 1e-9);
        assert!((state.last_contributions.passive_build_points - 3.0).abs() < 1e-9);

        let carry = engine.carry();
        assert!((carry.day_progress - 0.2).abs() < 1e-9);
        assert!((carry.todays_contributions.steps_exploration_km - 0.14).abs() < 1e-9);
        assert!((carry.todays_contributions.passive_build_points - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_idle_builders_logged_once_per_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        for _ in 0..4 {
            engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.2, false);
        }
        assert_eq!(state.event_log.count_matching("Builders idle"), 1);
    }

    #[test]
    fn test_negative_metrics_treated_as_zero() {
        let mut a = SimulationState::new();
        let mut b = SimulationState::new();
        quiet_engine().advance_one_day(&mut a, Some(&DailyHealthMetrics::new(-100.0, -5.0, -9.0, -1.0)));
        quiet_engine().advance_one_day(&mut b, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = SimulationState::new_colony(&BuildingCatalog::standard());
        let mut b = a.clone();
        let mut ea = SimulationEngine::with_seed(42);
        let mut eb = SimulationEngine::with_seed(42);
        let metrics = DailyHealthMetrics::new(6000.0, 90.0, 25.0, 7.0);
        for _ in 0..20 {
            ea.advance_one_day(&mut a, Some(&metrics));
            eb.advance_one_day(&mut b, Some(&metrics));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_restores_fresh_colony() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new_colony(engine.catalog());
        for _ in 0..5 {
            engine.advance_one_day(&mut state, None);
        }
        engine.reset(&mut state);
        assert_eq!(state, SimulationState::new_colony(engine.catalog()));
        assert_eq!(engine.carry(), &EngineCarry::default());
    }

    #[test]
    fn test_save_load_pairs_carry() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new_colony(engine.catalog());
        engine.advance_fraction_of_day(&mut state, &DailyHealthMetrics::ZERO, 0.4, false);

        let mut buffer = Vec::new();
        engine.save(&mut buffer, &state).unwrap();

        let mut restored = quiet_engine();
        let loaded = restored.load(&buffer[..]).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(restored.carry(), engine.carry());
    }
}
