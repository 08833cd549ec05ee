//! Real-time driver: turns wall-clock time and cumulative health readings
//! into engine advances.
//!
//! Health sources report today-so-far totals that reset at local midnight.
//! The driver remembers what it already consumed (the baselines) and feeds
//! the engine only the new part. Days that passed while nothing was running
//! are finished passively, up to each midnight, with no activity.

use chrono::{Duration, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::{DailyHealthMetrics, SimulationState};
use crate::engine::{SimulationEngine, TickReport};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Cumulative readings for the current local day, plus last night's sleep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub steps: f64,
    pub daylight_minutes: f64,
    pub exercise_minutes: f64,
    pub sleep_hours: f64,
}

impl HealthSnapshot {
    pub fn new(steps: f64, daylight_minutes: f64, exercise_minutes: f64, sleep_hours: f64) -> Self {
        Self {
            steps,
            daylight_minutes,
            exercise_minutes,
            sleep_hours,
        }
    }

    /// Whole snapshot as one day's worth of metrics.
    pub fn as_day_totals(&self) -> DailyHealthMetrics {
        DailyHealthMetrics::new(
            self.steps,
            self.daylight_minutes,
            self.exercise_minutes,
            self.sleep_hours,
        )
    }
}

/// Timing and baselines persisted next to the colony state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverMeta {
    /// Local wall-clock time of the last advance
    pub last_update: NaiveDateTime,
    pub steps_baseline: f64,
    pub exercise_baseline: f64,
    pub daylight_baseline: f64,
}

impl DriverMeta {
    /// Fresh metadata: nothing before `now` counts toward the colony.
    pub fn starting_at(now: NaiveDateTime, snapshot: &HealthSnapshot) -> Self {
        Self {
            last_update: now,
            steps_baseline: snapshot.steps,
            exercise_baseline: snapshot.exercise_minutes,
            daylight_baseline: snapshot.daylight_minutes,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn deltas(&self, snapshot: &HealthSnapshot) -> DailyHealthMetrics {
        DailyHealthMetrics::new(
            (snapshot.steps - self.steps_baseline).max(0.0),
            (snapshot.daylight_minutes - self.daylight_baseline).max(0.0),
            (snapshot.exercise_minutes - self.exercise_baseline).max(0.0),
            snapshot.sleep_hours,
        )
    }

    fn consume(&mut self, snapshot: &HealthSnapshot) {
        self.steps_baseline = snapshot.steps;
        self.exercise_baseline = snapshot.exercise_minutes;
        self.daylight_baseline = snapshot.daylight_minutes;
    }

    fn reset_baselines(&mut self) {
        self.steps_baseline = 0.0;
        self.exercise_baseline = 0.0;
        self.daylight_baseline = 0.0;
    }
}

/// What a real-time tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchUp {
    pub midnights_crossed: u32,
    /// Fraction of the current day simulated after the last midnight
    pub partial_fraction: f64,
    pub breakthroughs: u32,
    pub arrivals: i64,
}

impl CatchUp {
    fn absorb(&mut self, report: &TickReport) {
        if report.breakthrough.is_some() {
            self.breakthroughs += 1;
        }
        self.arrivals += report.arrivals;
    }
}

/// Drives one colony from wall-clock time
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeDriver {
    meta: DriverMeta,
}

impl RealtimeDriver {
    pub fn new(meta: DriverMeta) -> Self {
        Self { meta }
    }

    pub fn meta(&self) -> &DriverMeta {
        &self.meta
    }

    /// Advance the colony up to `now`.
    ///
    /// Each midnight crossed since the last update closes that day with no
    /// activity (sleep still counts) and resets the baselines. The rest of
    /// today is then advanced with the snapshot's growth since the last tick.
    pub fn tick(
        &mut self,
        engine: &mut SimulationEngine,
        state: &mut SimulationState,
        snapshot: &HealthSnapshot,
        now: NaiveDateTime,
    ) -> CatchUp {
        let mut catch_up = CatchUp::default();
        let mut cursor = self.meta.last_update;
        if now <= cursor {
            return catch_up;
        }

        while cursor.date() != now.date() {
            let Some(midnight) = next_midnight(cursor) else {
                break;
            };
            let f = fraction_of_day(midnight - cursor);
            let idle = DailyHealthMetrics::new(0.0, 0.0, 0.0, snapshot.sleep_hours);
            let report = engine.advance_fraction_of_day(state, &idle, f, true);
            catch_up.absorb(&report);
            catch_up.midnights_crossed += 1;
            self.meta.reset_baselines();
            cursor = midnight;
        }

        let f = fraction_of_day(now - cursor);
        if f > 0.0 {
            let deltas = self.meta.deltas(snapshot);
            let report = engine.advance_fraction_of_day(state, &deltas, f, false);
            catch_up.absorb(&report);
            catch_up.partial_fraction = report.fraction;
            self.meta.consume(snapshot);
        }

        self.meta.last_update = now;
        if catch_up.midnights_crossed > 0 {
            debug!(
                "caught up {} day(s), now on day {}",
                catch_up.midnights_crossed, state.current_day_index
            );
        }
        catch_up
    }
}

/// Accelerated mode: one full in-game day per call, using the snapshot as
/// that day's totals.
pub fn advance_dev_day(
    engine: &mut SimulationEngine,
    state: &mut SimulationState,
    snapshot: &HealthSnapshot,
) -> TickReport {
    engine.advance_one_day(state, Some(&snapshot.as_day_totals()))
}

fn next_midnight(t: NaiveDateTime) -> Option<NaiveDateTime> {
    t.date().succ_opt()?.and_hms_opt(0, 0, 0)
}

fn fraction_of_day(span: Duration) -> f64 {
    let seconds = span.num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn quiet_engine() -> SimulationEngine {
        let mut engine = SimulationEngine::with_seed(11);
        engine.set_ambient_events(false);
        engine
    }

    #[test]
    fn test_tick_in_the_past_is_noop() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let snapshot = HealthSnapshot::new(500.0, 0.0, 0.0, 0.0);
        let mut driver = RealtimeDriver::new(DriverMeta::starting_at(at(5, 12), &snapshot));
        let before = state.clone();

        let report = driver.tick(&mut engine, &mut state, &snapshot, at(5, 12));
        assert_eq!(report, CatchUp::default());
        let report = driver.tick(&mut engine, &mut state, &snapshot, at(5, 9));
        assert_eq!(report, CatchUp::default());
        assert_eq!(state, before);
        assert_eq!(driver.meta().last_update, at(5, 12));
    }

    #[test]
    fn test_same_day_uses_deltas() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let start = HealthSnapshot::new(1000.0, 0.0, 0.0, 0.0);
        let mut driver = RealtimeDriver::new(DriverMeta::starting_at(at(5, 8), &start));

        let later = HealthSnapshot::new(3000.0, 0.0, 0.0, 0.0);
        let report = driver.tick(&mut engine, &mut state, &later, at(5, 14));

        assert_eq!(report.midnights_crossed, 0);
        assert!((report.partial_fraction - 0.25).abs() < 1e-12);
        // 2000 new steps * 0.0007 km * 0.6
        assert!((state.last_contributions.steps_exploration_km - 0.84).abs() < 1e-9);
        assert_eq!(driver.meta().steps_baseline, 3000.0);
        assert_eq!(state.current_day_index, 1);
    }

    #[test]
    fn test_catch_up_across_midnights() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let snapshot = HealthSnapshot::new(2000.0, 30.0, 10.0, 7.0);
        let mut driver = RealtimeDriver::new(DriverMeta::starting_at(at(5, 18), &snapshot));

        let report = driver.tick(&mut engine, &mut state, &snapshot, at(7, 6));

        assert_eq!(report.midnights_crossed, 2);
        assert!((report.partial_fraction - 0.25).abs() < 1e-12);
        assert_eq!(state.current_day_index, 3);
        // Baselines were zeroed at midnight, so the whole snapshot counted today
        assert!((state.last_contributions.steps_exploration_km - 0.84).abs() < 1e-9);
        assert_eq!(driver.meta().last_update, at(7, 6));
        assert_eq!(driver.meta().steps_baseline, 2000.0);
        assert_eq!(state.event_log.count_matching("Explored surroundings"), 2);
    }

    #[test]
    fn test_reading_below_baseline_counts_as_zero() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let start = HealthSnapshot::new(5000.0, 60.0, 20.0, 0.0);
        let mut driver = RealtimeDriver::new(DriverMeta::starting_at(at(5, 8), &start));

        let lower = HealthSnapshot::new(1000.0, 10.0, 5.0, 0.0);
        driver.tick(&mut engine, &mut state, &lower, at(5, 10));
        assert_eq!(state.last_contributions.steps_exploration_km, 0.0);
        assert_eq!(state.last_contributions.exercise_build_points, 0.0);
    }

    #[test]
    fn test_meta_json_shape() {
        let json = r#"{
            "last_update": "2025-03-05T18:30:00",
            "steps_baseline": 1200.0,
            "exercise_baseline": 15.0,
            "daylight_baseline": 40.0
        }"#;
        let meta = DriverMeta::from_json(json).unwrap();
        assert_eq!(meta.last_update.date(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(meta.steps_baseline, 1200.0);
        assert_eq!(DriverMeta::from_json(&meta.to_json().unwrap()).unwrap(), meta);
    }

    #[test]
    fn test_dev_day_advances_one_day() {
        let mut engine = quiet_engine();
        let mut state = SimulationState::new();
        let snapshot = HealthSnapshot::new(10_000.0, 0.0, 0.0, 0.0);
        let report = advance_dev_day(&mut engine, &mut state, &snapshot);
        assert!(report.day_closed);
        assert_eq!(state.current_day_index, 2);
        assert!((state.last_contributions.steps_exploration_km - 4.2).abs() < 1e-9);
    }
}
