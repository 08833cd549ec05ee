//! Building catalog and construction planning.
//!
//! The catalog is a static table of what the builders can raise and at
//! which technology level each tier unlocks. Planning picks the kind of
//! building the colony needs next with an ordered list of guards, then the
//! catalog supplies the best tier of that kind the colony can build.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{BuildKind, Building, SimulationState};
use crate::tuning::{ConfigError, SimTuning};

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub kind: BuildKind,
    pub display_name: String,
    pub cost_points: f64,
    pub min_tech_level: f64,
}

impl BuildingSpec {
    pub fn new(kind: BuildKind, display_name: &str, cost_points: f64, min_tech_level: f64) -> Self {
        Self {
            kind,
            display_name: display_name.to_string(),
            cost_points,
            min_tech_level,
        }
    }

    pub fn is_unlocked(&self, technology_level: f64) -> bool {
        self.min_tech_level <= technology_level
    }

    /// Create a queue item from this row.
    pub fn instantiate(&self, id: u64) -> Building {
        Building::new(
            id,
            self.kind,
            self.display_name.clone(),
            self.cost_points,
            self.min_tech_level,
        )
    }
}

/// Everything the builders know how to raise, plus the opening plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    pub buildings: Vec<BuildingSpec>,
    /// Plans queued on a fresh colony, in order
    #[serde(default = "standard_starter")]
    pub starter: Vec<BuildingSpec>,
}

fn standard_starter() -> Vec<BuildingSpec> {
    vec![
        BuildingSpec::new(BuildKind::Greenhouse, "Greenhouse", 20.0, 0.0),
        BuildingSpec::new(BuildKind::House, "House", 15.0, 0.0),
        BuildingSpec::new(BuildKind::School, "School", 40.0, 0.0),
    ]
}

impl BuildingCatalog {
    /// The shipping table.
    pub fn standard() -> Self {
        Self {
            buildings: vec![
                BuildingSpec::new(BuildKind::House, "House", 15.0, 0.0),
                BuildingSpec::new(BuildKind::House, "Stone House", 28.0, 1.0),
                BuildingSpec::new(BuildKind::House, "Longhouse", 48.0, 2.0),
                BuildingSpec::new(BuildKind::House, "Terrace Block", 85.0, 4.0),
                BuildingSpec::new(BuildKind::Greenhouse, "Greenhouse", 20.0, 0.0),
                BuildingSpec::new(BuildKind::Greenhouse, "Glass Greenhouse", 38.0, 2.0),
                BuildingSpec::new(BuildKind::Greenhouse, "Hydroponic Tower", 70.0, 4.0),
                BuildingSpec::new(BuildKind::School, "School", 40.0, 0.0),
                BuildingSpec::new(BuildKind::School, "Library Hall", 65.0, 2.0),
                BuildingSpec::new(BuildKind::School, "Academy", 110.0, 3.0),
            ],
            starter: standard_starter(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: BuildingCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in self.buildings.iter().chain(&self.starter) {
            if spec.display_name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "display_name",
                    reason: format!("empty name for a {} entry", spec.kind),
                });
            }
            if !spec.cost_points.is_finite() || spec.cost_points < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "cost_points",
                    reason: format!("{} costs {}", spec.display_name, spec.cost_points),
                });
            }
            if !spec.min_tech_level.is_finite() || spec.min_tech_level < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "min_tech_level",
                    reason: format!("{} unlocks at {}", spec.display_name, spec.min_tech_level),
                });
            }
        }
        Ok(())
    }

    pub fn starter_queue(&self) -> &[BuildingSpec] {
        &self.starter
    }

    /// Whether any tier of `kind` is buildable at this tech level.
    pub fn is_unlocked(&self, kind: BuildKind, technology_level: f64) -> bool {
        self.buildings
            .iter()
            .any(|s| s.kind == kind && s.is_unlocked(technology_level))
    }

    /// Highest-tier unlocked building of `kind`. Ties go to the earlier row.
    pub fn best_unlocked(&self, kind: BuildKind, technology_level: f64) -> Option<&BuildingSpec> {
        self.buildings
            .iter()
            .filter(|s| s.kind == kind && s.is_unlocked(technology_level))
            .fold(None, |best: Option<&BuildingSpec>, spec| match best {
                Some(b) if b.min_tech_level >= spec.min_tech_level => Some(b),
                _ => Some(spec),
            })
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decide which kind of building the colony needs next.
///
/// Guards are checked in priority order and the first match wins:
/// 1. Greenhouse when the pantry is below the buffer target and the
///    greenhouse-per-capita target is not met.
/// 2. House when fewer than two beds are free and the overbuild guard
///    still allows more beds.
/// 3. School when there are fewer schools than one per `students_per_school`.
///
/// Each guard also requires that some tier of the kind is unlocked.
pub fn plan_next_build(
    state: &SimulationState,
    catalog: &BuildingCatalog,
    tuning: &SimTuning,
) -> Option<BuildKind> {
    let tech = state.technology_level;
    let effective_pop = state.effective_population().max(1.0);
    let buffer_days = state.buffer_days(tuning.ration_per_person_per_day);
    let free_beds = state.free_beds();

    if buffer_days < tuning.food_buffer_target_days
        && state.greenhouse_count < tuning.greenhouses_per_capita_target * effective_pop
        && catalog.is_unlocked(BuildKind::Greenhouse, tech)
    {
        return Some(BuildKind::Greenhouse);
    }

    let below_overbuild = state.housing_capacity < effective_pop + tuning.housing_overbuild_beds;
    if free_beds < 2 && below_overbuild && catalog.is_unlocked(BuildKind::House, tech) {
        return Some(BuildKind::House);
    }

    let target_schools = (effective_pop / tuning.students_per_school.max(1.0)).floor();
    if state.school_count < target_schools && catalog.is_unlocked(BuildKind::School, tech) {
        return Some(BuildKind::School);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(pop: f64, food: f64, beds: f64) -> SimulationState {
        SimulationState {
            population: pop,
            food_stock_rations: food,
            housing_capacity: beds,
            ..SimulationState::new()
        }
    }

    #[test]
    fn test_standard_catalog_validates() {
        assert!(BuildingCatalog::standard().validate().is_ok());
    }

    #[test]
    fn test_best_unlocked_picks_highest_tier() {
        let catalog = BuildingCatalog::standard();
        let spec = catalog.best_unlocked(BuildKind::House, 2.5).unwrap();
        assert_eq!(spec.display_name, "Longhouse");
        let spec = catalog.best_unlocked(BuildKind::House, 0.0).unwrap();
        assert_eq!(spec.display_name, "House");
    }

    #[test]
    fn test_best_unlocked_none_when_locked() {
        let catalog = BuildingCatalog {
            buildings: vec![BuildingSpec::new(BuildKind::School, "Academy", 90.0, 3.0)],
            starter: Vec::new(),
        };
        assert!(catalog.best_unlocked(BuildKind::School, 2.0).is_none());
        assert!(catalog.best_unlocked(BuildKind::House, 9.0).is_none());
    }

    #[test]
    fn test_plan_greenhouse_when_pantry_low() {
        let state = state_with(8.0, 5.0, 12.0);
        let plan = plan_next_build(&state, &BuildingCatalog::standard(), &SimTuning::default());
        assert_eq!(plan, Some(BuildKind::Greenhouse));
    }

    #[test]
    fn test_plan_house_when_beds_tight() {
        let state = state_with(11.0, 55.0, 12.0);
        let plan = plan_next_build(&state, &BuildingCatalog::standard(), &SimTuning::default());
        assert_eq!(plan, Some(BuildKind::House));
    }

    #[test]
    fn test_overbuild_guard_blocks_houses() {
        let tuning = SimTuning {
            housing_overbuild_beds: 0.5,
            ..SimTuning::default()
        };
        let state = state_with(11.0, 55.0, 12.0);
        let plan = plan_next_build(&state, &BuildingCatalog::standard(), &tuning);
        assert_eq!(plan, None);
    }

    #[test]
    fn test_plan_school_when_population_outgrows_schools() {
        let state = state_with(13.0, 100.0, 30.0);
        let plan = plan_next_build(&state, &BuildingCatalog::standard(), &SimTuning::default());
        assert_eq!(plan, Some(BuildKind::School));
    }

    #[test]
    fn test_plan_nothing_for_fresh_colony() {
        let state = SimulationState::new();
        let plan = plan_next_build(&state, &BuildingCatalog::standard(), &SimTuning::default());
        assert_eq!(plan, None);
    }

    #[test]
    fn test_locked_kind_falls_through() {
        let catalog = BuildingCatalog {
            buildings: vec![BuildingSpec::new(BuildKind::House, "House", 15.0, 0.0)],
            starter: Vec::new(),
        };
        // Pantry is low but no greenhouse is buildable, and beds are tight.
        let state = state_with(11.0, 2.0, 12.0);
        let plan = plan_next_build(&state, &catalog, &SimTuning::default());
        assert_eq!(plan, Some(BuildKind::House));
    }

    #[test]
    fn test_catalog_json_roundtrip_with_default_starter() {
        let json = r#"{ "buildings": [
            { "kind": "house", "display_name": "Hut", "cost_points": 9.0, "min_tech_level": 0.0 }
        ] }"#;
        let catalog = BuildingCatalog::from_json(json).unwrap();
        assert_eq!(catalog.buildings.len(), 1);
        assert_eq!(catalog.starter.len(), 3);
    }

    #[test]
    fn test_catalog_rejects_negative_cost() {
        let json = r#"{ "buildings": [
            { "kind": "school", "display_name": "Bad", "cost_points": -1.0, "min_tech_level": 0.0 }
        ] }"#;
        assert!(BuildingCatalog::from_json(json).is_err());
    }
}
