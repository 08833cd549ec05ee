//! Lira Core - Health-Driven Colony Simulation Engine
//!
//! A small colony of Liri survives on a new planet. Each day the colony
//! explores, grows food, builds, researches and grows, and how well it does
//! is steered by the player's real-world health metrics: steps widen the
//! explored radius, exercise feeds construction, daylight boosts crops and
//! research, and a good night's sleep yields science.
//!
//! # Architecture
//!
//! The engine is a deterministic transition function over plain data:
//! - **Components**: The persisted colony snapshot, buildings, health inputs
//! - **Systems**: One module per concern, each a handful of pure curves plus
//!   a `run_*` step that mutates the state and writes journal lines
//! - **Engine**: Orders the systems and tracks partial-day progress
//! - **Driver**: Maps wall-clock time and cumulative health readings onto
//!   engine advances
//!
//! # Example
//!
//! ```rust,no_run
//! use lira_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new();
//! let mut state = SimulationState::new_colony(engine.catalog());
//!
//! let today = DailyHealthMetrics::new(8_000.0, 45.0, 30.0, 7.5);
//! for _ in 0..30 {
//!     engine.advance_one_day(&mut state, Some(&today));
//! }
//! for line in state.event_log.recent(5) {
//!     println!("{line}");
//! }
//! ```

pub mod catalog;
pub mod components;
pub mod driver;
pub mod engine;
pub mod persistence;
pub mod systems;
pub mod tuning;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::{BuildingCatalog, BuildingSpec};
    pub use crate::components::*;
    pub use crate::driver::{DriverMeta, HealthSnapshot, RealtimeDriver};
    pub use crate::engine::{EngineCarry, SimulationEngine, TickReport};
    pub use crate::systems::{EventKind, EventLog};
    pub use crate::tuning::SimTuning;
}
