//! Data model for the colony simulation.
//!
//! Components are plain data records. They carry no simulation behavior;
//! that lives in the systems and the engine.

mod building;
mod colony;
mod health;

pub use building::*;
pub use colony::*;
pub use health::*;
