//! Science - research points from routine work, sleep and daylight.

use crate::components::SimulationState;
use crate::tuning::SimTuning;

/// Gaussian sleep quality in (0, 1], peaking at the optimal hours.
pub fn sleep_quality(sleep_hours: f64, tuning: &SimTuning) -> f64 {
    let sigma = tuning.sleep_sigma.max(0.0001);
    let d = sleep_hours - tuning.sleep_optimal_hours;
    (-(d * d) / (2.0 * sigma * sigma)).exp()
}

/// Science from last night's sleep. Zero when no sleep was reported.
pub fn sleep_science(sleep_hours: f64, tuning: &SimTuning) -> f64 {
    if sleep_hours <= 0.0 {
        return 0.0;
    }
    tuning.science_per_sleep_quality * sleep_quality(sleep_hours, tuning)
}

/// Daylight drip, limited by what is left of today's cap.
pub fn daylight_science(daylight_minutes: f64, earned_today: f64, tuning: &SimTuning) -> f64 {
    let remaining_cap = (tuning.daylight_science_cap_per_day - earned_today).max(0.0);
    let hours = daylight_minutes.max(0.0) / 60.0;
    (tuning.daylight_science_per_hour * hours).min(remaining_cap)
}

/// Raw science inputs for one tick, before the tech bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScienceGain {
    pub passive: f64,
    pub sleep: f64,
    pub daylight: f64,
}

impl ScienceGain {
    pub fn raw_total(&self) -> f64 {
        self.passive + self.sleep + self.daylight
    }
}

/// Add science and wrap at most one breakthrough. Returns the new tech
/// level when a breakthrough happened.
pub fn run_science(state: &mut SimulationState, tuning: &SimTuning, gain: &ScienceGain) -> Option<f64> {
    let bonus = 1.0 + tuning.science_tech_bonus_per_level * state.technology_level;
    state.science_points += gain.raw_total().max(0.0) * bonus;

    let threshold = tuning.science_breakthrough_threshold;
    if threshold > 0.0 && state.science_points >= threshold {
        state.science_points -= threshold;
        state.technology_level += tuning.breakthrough_tech_gain;
        Some(state.technology_level)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_quality_peaks_at_optimum() {
        let tuning = SimTuning::default();
        assert!((sleep_quality(7.5, &tuning) - 1.0).abs() < 1e-12);
        assert!(sleep_quality(6.0, &tuning) < 1.0);
        assert!((sleep_quality(6.0, &tuning) - sleep_quality(9.0, &tuning)).abs() < 1e-12);
    }

    #[test]
    fn test_no_sleep_no_science() {
        assert_eq!(sleep_science(0.0, &SimTuning::default()), 0.0);
    }

    #[test]
    fn test_daylight_drip_capped() {
        let tuning = SimTuning::default();
        // 2 h * 0.2 = 0.4
        assert!((daylight_science(120.0, 0.0, &tuning) - 0.4).abs() < 1e-12);
        // 10 h would be 2.0, capped at 0.8
        assert!((daylight_science(600.0, 0.0, &tuning) - 0.8).abs() < 1e-12);
        // cap already spent
        assert_eq!(daylight_science(600.0, 0.8, &tuning), 0.0);
    }

    #[test]
    fn test_breakthrough_wraps_once() {
        let tuning = SimTuning::default();
        let mut state = SimulationState {
            science_points: 29.0,
            ..SimulationState::new()
        };
        let gain = ScienceGain {
            passive: 1.5,
            ..ScienceGain::default()
        };
        let level = run_science(&mut state, &tuning, &gain);
        assert_eq!(level, Some(1.0));
        assert!((state.science_points - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tech_bonus_scales_gain() {
        let tuning = SimTuning::default();
        let mut state = SimulationState {
            technology_level: 2.0,
            ..SimulationState::new()
        };
        let gain = ScienceGain {
            passive: 1.0,
            sleep: 1.0,
            daylight: 0.0,
        };
        assert!(run_science(&mut state, &tuning, &gain).is_none());
        assert!((state.science_points - 2.2).abs() < 1e-12);
    }
}
