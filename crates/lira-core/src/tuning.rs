//! Balance knobs for the colony simulation.
//!
//! `SimTuning` is a flat record of named rates, curve parameters and policy
//! thresholds. The engine reads it and never hardcodes any of these values,
//! so tests and balancing passes can swap a whole table without touching
//! code. JSON overrides may name any subset of fields; the rest keep their
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration data
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Rates, curves and thresholds that drive the daily simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTuning {
    // Passive progress, earned even with zero health metrics
    pub passive_exploration_km_per_day: f64,
    pub exploration_passive_scale: f64,
    pub passive_science_points_per_day: f64,
    pub base_build_points_per_day: f64,

    // Exploration
    /// Real-world stride length in km
    pub step_length_km_per_step: f64,
    /// Share of walked distance that counts as scouting
    pub exploration_from_steps_scale: f64,
    pub exploration_tech_multiplier_per_level: f64,

    // Sunlight -> crops (zero daylight never penalizes)
    pub sunlight_multiplier_alpha: f64,
    pub sunlight_half_saturation_minutes: f64,

    // Building
    pub build_per_sqrt_exercise: f64,
    pub build_tech_bonus_per_level: f64,
    /// Beds per house are this times (1 + house tier)
    pub house_beds_per_tier: f64,
    pub school_tech_gain: f64,

    // Science
    pub science_per_sleep_quality: f64,
    pub sleep_optimal_hours: f64,
    /// Gaussian width around optimal sleep
    pub sleep_sigma: f64,
    pub daylight_science_per_hour: f64,
    pub daylight_science_cap_per_day: f64,
    pub science_tech_bonus_per_level: f64,
    pub science_breakthrough_threshold: f64,
    pub breakthrough_tech_gain: f64,

    // Food and yields
    pub ration_per_person_per_day: f64,
    pub base_yield_per_greenhouse: f64,
    pub yield_tech_bonus_per_level: f64,
    /// Asymptotic crop boost from exploration
    pub crop_variety_max_uplift: f64,
    pub crop_variety_radius_scale_km: f64,
    /// Stored rations per capita above which yield is damped
    pub food_soft_cap_start_days: f64,
    pub food_soft_cap_strength: f64,
    /// Lowest the soft cap may push yield
    pub food_soft_cap_floor: f64,
    /// Net daily surplus/deficit (in rations) worth a log line
    pub food_log_threshold: f64,

    // Population
    /// Births per day at ideal gates
    pub base_population_growth_rate: f64,
    pub food_factor_base: f64,
    pub food_factor_slope: f64,
    pub births_comfort_bonus_max: f64,
    /// Buffer (days of rations) at which the comfort bonus is full
    pub births_comfort_at_days: f64,

    // Planning
    pub food_buffer_target_days: f64,
    /// Houses are only planned while beds < population + this
    pub housing_overbuild_beds: f64,
    pub greenhouses_per_capita_target: f64,
    pub students_per_school: f64,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            passive_exploration_km_per_day: 0.15,
            exploration_passive_scale: 0.5,
            passive_science_points_per_day: 1.5,
            base_build_points_per_day: 3.0,

            step_length_km_per_step: 0.0007,
            exploration_from_steps_scale: 0.6,
            exploration_tech_multiplier_per_level: 0.03,

            sunlight_multiplier_alpha: 0.6,
            sunlight_half_saturation_minutes: 120.0,

            build_per_sqrt_exercise: 0.7,
            build_tech_bonus_per_level: 0.08,
            house_beds_per_tier: 4.0,
            school_tech_gain: 0.5,

            science_per_sleep_quality: 1.0,
            sleep_optimal_hours: 7.5,
            sleep_sigma: 1.2,
            daylight_science_per_hour: 0.2,
            daylight_science_cap_per_day: 0.8,
            science_tech_bonus_per_level: 0.05,
            science_breakthrough_threshold: 30.0,
            breakthrough_tech_gain: 1.0,

            ration_per_person_per_day: 1.0,
            base_yield_per_greenhouse: 3.0,
            yield_tech_bonus_per_level: 0.05,
            crop_variety_max_uplift: 0.5,
            crop_variety_radius_scale_km: 10.0,
            food_soft_cap_start_days: 10.0,
            food_soft_cap_strength: 0.6,
            food_soft_cap_floor: 0.5,
            food_log_threshold: 2.0,

            base_population_growth_rate: 0.15,
            food_factor_base: 0.55,
            food_factor_slope: 0.45,
            births_comfort_bonus_max: 0.25,
            births_comfort_at_days: 12.0,

            food_buffer_target_days: 1.3,
            housing_overbuild_beds: 6.0,
            greenhouses_per_capita_target: 2.0,
            students_per_school: 12.0,
        }
    }
}

impl SimTuning {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: SimTuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Reject values the curves cannot digest.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not finite"),
                });
            }
            if value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is negative"),
                });
            }
        }
        if self.sleep_sigma <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sleep_sigma",
                reason: "must be positive".into(),
            });
        }
        if self.science_breakthrough_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "science_breakthrough_threshold",
                reason: "must be positive".into(),
            });
        }
        if self.food_soft_cap_floor > 1.0 {
            return Err(ConfigError::Invalid {
                field: "food_soft_cap_floor",
                reason: "cannot boost yield above 1.0".into(),
            });
        }
        Ok(())
    }

    fn named_values(&self) -> [(&'static str, f64); 39] {
        [
            ("passive_exploration_km_per_day", self.passive_exploration_km_per_day),
            ("exploration_passive_scale", self.exploration_passive_scale),
            ("passive_science_points_per_day", self.passive_science_points_per_day),
            ("base_build_points_per_day", self.base_build_points_per_day),
            ("step_length_km_per_step", self.step_length_km_per_step),
            ("exploration_from_steps_scale", self.exploration_from_steps_scale),
            ("exploration_tech_multiplier_per_level", self.exploration_tech_multiplier_per_level),
            ("sunlight_multiplier_alpha", self.sunlight_multiplier_alpha),
            ("sunlight_half_saturation_minutes", self.sunlight_half_saturation_minutes),
            ("build_per_sqrt_exercise", self.build_per_sqrt_exercise),
            ("build_tech_bonus_per_level", self.build_tech_bonus_per_level),
            ("house_beds_per_tier", self.house_beds_per_tier),
            ("school_tech_gain", self.school_tech_gain),
            ("science_per_sleep_quality", self.science_per_sleep_quality),
            ("sleep_optimal_hours", self.sleep_optimal_hours),
            ("sleep_sigma", self.sleep_sigma),
            ("daylight_science_per_hour", self.daylight_science_per_hour),
            ("daylight_science_cap_per_day", self.daylight_science_cap_per_day),
            ("science_tech_bonus_per_level", self.science_tech_bonus_per_level),
            ("science_breakthrough_threshold", self.science_breakthrough_threshold),
            ("breakthrough_tech_gain", self.breakthrough_tech_gain),
            ("ration_per_person_per_day", self.ration_per_person_per_day),
            ("base_yield_per_greenhouse", self.base_yield_per_greenhouse),
            ("yield_tech_bonus_per_level", self.yield_tech_bonus_per_level),
            ("crop_variety_max_uplift", self.crop_variety_max_uplift),
            ("crop_variety_radius_scale_km", self.crop_variety_radius_scale_km),
            ("food_soft_cap_start_days", self.food_soft_cap_start_days),
            ("food_soft_cap_strength", self.food_soft_cap_strength),
            ("food_soft_cap_floor", self.food_soft_cap_floor),
            ("food_log_threshold", self.food_log_threshold),
            ("base_population_growth_rate", self.base_population_growth_rate),
            ("food_factor_base", self.food_factor_base),
            ("food_factor_slope", self.food_factor_slope),
            ("births_comfort_bonus_max", self.births_comfort_bonus_max),
            ("births_comfort_at_days", self.births_comfort_at_days),
            ("food_buffer_target_days", self.food_buffer_target_days),
            ("housing_overbuild_beds", self.housing_overbuild_beds),
            ("greenhouses_per_capita_target", self.greenhouses_per_capita_target),
            ("students_per_school", self.students_per_school),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = SimTuning::from_json(r#"{ "base_yield_per_greenhouse": 5.5 }"#).unwrap();
        assert_eq!(tuning.base_yield_per_greenhouse, 5.5);
        assert_eq!(tuning.ration_per_person_per_day, 1.0);
        assert_eq!(tuning.students_per_school, 12.0);
    }

    #[test]
    fn test_negative_value_rejected() {
        let err = SimTuning::from_json(r#"{ "base_build_points_per_day": -1.0 }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "base_build_points_per_day"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_sigma_rejected() {
        let tuning = SimTuning {
            sleep_sigma: 0.0,
            ..SimTuning::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimTuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimTuning::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
