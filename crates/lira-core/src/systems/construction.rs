//! Construction - planning, build points, and the active-build countdown.

use log::info;

use crate::catalog::{plan_next_build, BuildingCatalog};
use crate::components::{BuildKind, Building, SimulationState};
use crate::tuning::SimTuning;

use super::events as journal;

/// Completion fractions that get a progress line
const PROGRESS_MARKS: [f64; 3] = [0.25, 0.5, 0.75];

/// Build points earned in one tick, before the tech bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildPointGain {
    pub passive: f64,
    pub exercise: f64,
    pub tech_multiplier: f64,
}

impl BuildPointGain {
    pub fn total(&self) -> f64 {
        (self.passive + self.exercise) * self.tech_multiplier
    }
}

/// Exercise minutes are already a delta and are not scaled by `fraction`.
pub fn build_point_gain(
    tuning: &SimTuning,
    fraction: f64,
    exercise_minutes: f64,
    technology_level: f64,
) -> BuildPointGain {
    BuildPointGain {
        passive: tuning.base_build_points_per_day * fraction,
        exercise: tuning.build_per_sqrt_exercise * exercise_minutes.max(0.0).sqrt(),
        tech_multiplier: 1.0 + tuning.build_tech_bonus_per_level * technology_level,
    }
}

/// Result of a planning pass
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// Queue already has work
    Busy,
    /// Nothing needed (or nothing unlocked)
    Idle,
    Queued(Building),
}

/// With an empty queue, enqueue the best unlocked building of the kind the
/// colony needs most. Journal lines are left to the caller.
pub fn plan_construction(
    state: &mut SimulationState,
    catalog: &BuildingCatalog,
    tuning: &SimTuning,
) -> PlanOutcome {
    if !state.build_queue.is_empty() {
        return PlanOutcome::Busy;
    }
    let Some(kind) = plan_next_build(state, catalog, tuning) else {
        return PlanOutcome::Idle;
    };
    let Some(spec) = catalog.best_unlocked(kind, state.technology_level) else {
        return PlanOutcome::Idle;
    };
    let id = state.allocate_building_id();
    let building = spec.instantiate(id);
    state.build_queue.push(building.clone());

    let day = state.current_day_index;
    journal::construction_planned(&mut state.event_log, day, &building.display_name);
    PlanOutcome::Queued(building)
}

/// Result of one construction step
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructionOutcome {
    Waiting,
    Started(Building),
    Progressed,
    Completed(Building),
}

/// Accrue build points, then either start the next affordable plan or move
/// the active build along.
///
/// `day_carry` holds fractional days of work not yet turned into a whole
/// day; it belongs to the state being advanced and persists across calls.
pub fn run_construction(
    state: &mut SimulationState,
    tuning: &SimTuning,
    gain: &BuildPointGain,
    fraction: f64,
    day_carry: &mut f64,
) -> ConstructionOutcome {
    state.build_points += gain.total().max(0.0);
    let day = state.current_day_index;

    let Some(active) = state.active_build.clone() else {
        return try_start_next(state);
    };

    let total = state.active_build_total_days.max(1);
    let before = state.active_build_days_remaining;
    *day_carry += fraction;
    let mut remaining = before;
    while *day_carry >= 1.0 && remaining > 0 {
        remaining -= 1;
        *day_carry -= 1.0;
    }
    state.active_build_days_remaining = remaining;

    let done_before = 1.0 - f64::from(before) / f64::from(total);
    let done_after = 1.0 - f64::from(remaining) / f64::from(total);
    for mark in PROGRESS_MARKS {
        if done_before < mark && done_after >= mark {
            let percent = (mark * 100.0).round() as u32;
            journal::construction_progress(&mut state.event_log, day, &active.display_name, percent);
        }
    }

    if remaining > 0 {
        return ConstructionOutcome::Progressed;
    }

    complete_build(state, tuning, &active);
    state.active_build = None;
    state.active_build_total_days = 0;
    ConstructionOutcome::Completed(active)
}

fn try_start_next(state: &mut SimulationState) -> ConstructionOutcome {
    let affordable = state
        .build_queue
        .first()
        .is_some_and(|next| state.build_points >= next.cost_points);
    if !affordable {
        return ConstructionOutcome::Waiting;
    }

    let next = state.build_queue.remove(0);
    state.build_points = (state.build_points - next.cost_points).max(0.0);
    let days = next.build_days();
    state.active_build = Some(next.clone());
    state.active_build_total_days = days;
    state.active_build_days_remaining = days;

    let day = state.current_day_index;
    journal::construction_started(&mut state.event_log, day, &next.display_name, days);
    info!("day {day}: started {} ({days} days)", next.display_name);
    ConstructionOutcome::Started(next)
}

/// Apply a finished building's effect and announce it.
pub fn complete_build(state: &mut SimulationState, tuning: &SimTuning, building: &Building) {
    let day = state.current_day_index;
    match building.kind {
        BuildKind::House => {
            let beds = tuning.house_beds_per_tier * (1.0 + building.min_tech_level);
            state.housing_capacity += beds;
            journal::built_house(&mut state.event_log, day, &building.display_name, beds as i64);
        }
        BuildKind::Greenhouse => {
            state.greenhouse_count += 1.0;
            journal::built_greenhouse(&mut state.event_log, day, &building.display_name);
        }
        BuildKind::School => {
            state.technology_level += tuning.school_tech_gain;
            state.school_count += 1.0;
            journal::opened_school(&mut state.event_log, day, &building.display_name);
        }
    }
    info!("day {day}: completed {}", building.display_name);
}
