//! Systems - the per-tick rules that advance colony counters.
//!
//! Each system owns one step of the daily advance. The curve helpers are
//! pure functions of their inputs; the `run_*` entry points apply them to a
//! `SimulationState` and write journal lines.

mod construction;
mod events;
mod exploration;
mod food;
mod population;
mod science;

pub use construction::*;
pub use events::{EventKind, EventLog, MAX_LOG_LINES};
pub use exploration::*;
pub use food::*;
pub use population::*;
pub use science::*;

/// Journal emitters, grouped so callers read `journal::arrivals(..)`.
pub mod journal {
    pub use super::events::*;
}

/// Clamp to [0, 1]; NaN maps to 0.
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
