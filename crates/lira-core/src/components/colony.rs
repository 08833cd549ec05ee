//! The persisted colony snapshot.

use serde::{Deserialize, Serialize};

use super::{Building, HealthContributions};
use crate::catalog::BuildingCatalog;
use crate::systems::EventLog;

/// Starting values for a freshly landed colony
pub mod initial {
    pub const DAY_INDEX: u32 = 1;
    pub const POPULATION: f64 = 8.0;
    pub const FOOD_STOCK_RATIONS: f64 = 55.0;
    pub const HOUSING_CAPACITY: f64 = 12.0;
    pub const GREENHOUSE_COUNT: f64 = 1.0;
    pub const BUILD_POINTS: f64 = 10.0;
}

/// Every counter the colony tracks. Mutated only by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Starts at 1, never decreases
    pub current_day_index: u32,
    /// Fractional; only whole colonists eat, sleep and count
    pub population: f64,
    pub housing_capacity: f64,
    pub food_stock_rations: f64,
    pub greenhouse_count: f64,
    pub school_count: f64,
    pub technology_level: f64,
    pub explored_radius_km: f64,
    pub build_points: f64,
    pub science_points: f64,
    /// Pending plans, first in first out
    pub build_queue: Vec<Building>,
    pub active_build: Option<Building>,
    pub active_build_total_days: u32,
    pub active_build_days_remaining: u32,
    pub event_log: EventLog,
    pub last_contributions: HealthContributions,
    /// Next id handed to a queued building
    #[serde(default = "first_building_id")]
    pub next_building_id: u64,
}

fn first_building_id() -> u64 {
    1
}

impl SimulationState {
    /// Fresh colony with an empty build queue.
    pub fn new() -> Self {
        Self {
            current_day_index: initial::DAY_INDEX,
            population: initial::POPULATION,
            housing_capacity: initial::HOUSING_CAPACITY,
            food_stock_rations: initial::FOOD_STOCK_RATIONS,
            greenhouse_count: initial::GREENHOUSE_COUNT,
            school_count: 0.0,
            technology_level: 0.0,
            explored_radius_km: 0.0,
            build_points: initial::BUILD_POINTS,
            science_points: 0.0,
            build_queue: Vec::new(),
            active_build: None,
            active_build_total_days: 0,
            active_build_days_remaining: 0,
            event_log: EventLog::new(),
            last_contributions: HealthContributions::ZERO,
            next_building_id: first_building_id(),
        }
    }

    /// Fresh colony with the catalog's starter plans queued.
    pub fn new_colony(catalog: &BuildingCatalog) -> Self {
        let mut state = Self::new();
        for spec in catalog.starter_queue() {
            let id = state.allocate_building_id();
            state.build_queue.push(spec.instantiate(id));
        }
        state
    }

    pub fn allocate_building_id(&mut self) -> u64 {
        let id = self.next_building_id;
        self.next_building_id = self.next_building_id.saturating_add(1);
        id
    }

    /// Whole colonists
    pub fn effective_population(&self) -> f64 {
        self.population.floor()
    }

    /// Whole beds
    pub fn effective_beds(&self) -> f64 {
        self.housing_capacity.floor()
    }

    /// Whole beds left over after housing every whole colonist
    pub fn free_beds(&self) -> i64 {
        (self.housing_capacity - self.effective_population().max(1.0)).floor() as i64
    }

    /// Stored food expressed as days of consumption at current population.
    pub fn buffer_days(&self, ration_per_person: f64) -> f64 {
        let daily = self.effective_population().max(1.0) * ration_per_person;
        self.food_stock_rations / daily.max(0.0001)
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}
