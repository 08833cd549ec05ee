//! Save/Load for colony state
//!
//! Uses bincode for compact binary snapshots. A save pairs the state with the
//! engine carry so a restored colony resumes mid-day exactly where it left off.

use std::io::{Read, Write};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::BuildingCatalog;
use crate::components::SimulationState;
use crate::engine::EngineCarry;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of one colony
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub state: SimulationState,
    pub carry: EngineCarry,
}

/// Result of loading a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSimulation {
    pub state: SimulationState,
    pub carry: EngineCarry,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Save a colony and its carry to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    state: &SimulationState,
    carry: &EngineCarry,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        state: state.clone(),
        carry: carry.clone(),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a colony and its carry from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    Ok(LoadedSimulation {
        state: save_data.state,
        carry: save_data.carry,
    })
}

/// Encode the bare state, without the engine carry.
pub fn state_to_bytes(state: &SimulationState) -> Result<Vec<u8>, SaveError> {
    Ok(bincode::serialize(state)?)
}

pub fn state_from_bytes(bytes: &[u8]) -> Result<SimulationState, SaveError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Decode a stored state, or start a fresh colony when there is nothing
/// usable. Corrupt data is logged and discarded.
pub fn load_or_fresh(bytes: Option<&[u8]>, catalog: &BuildingCatalog) -> SimulationState {
    let Some(bytes) = bytes else {
        return SimulationState::new_colony(catalog);
    };
    match state_from_bytes(bytes) {
        Ok(state) => state,
        Err(e) => {
            warn!("discarding unreadable colony state: {e}");
            SimulationState::new_colony(catalog)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DailyHealthMetrics;
    use crate::engine::SimulationEngine;

    fn played_state() -> (SimulationState, EngineCarry) {
        let mut engine = SimulationEngine::with_seed(3);
        let mut state = SimulationState::new_colony(engine.catalog());
        let metrics = DailyHealthMetrics::new(8000.0, 45.0, 30.0, 7.0);
        for _ in 0..12 {
            engine.advance_one_day(&mut state, Some(&metrics));
        }
        engine.advance_fraction_of_day(&mut state, &metrics.split(4), 0.25, false);
        (state, engine.carry().clone())
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (state, carry) = played_state();

        let mut save_buffer = Vec::new();
        save_simulation(&mut save_buffer, &state, &carry).expect("Save failed");

        let loaded = load_simulation(&save_buffer[..]).expect("Load failed");
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.carry, carry);
        assert!(loaded.carry.day_progress > 0.0);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let (state, carry) = played_state();
        let data = SaveData {
            version: SAVE_VERSION + 1,
            state,
            carry,
        };
        let bytes = bincode::serialize(&data).unwrap();
        match load_simulation(&bytes[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_state_bytes_roundtrip() {
        let (state, _) = played_state();
        let bytes = state_to_bytes(&state).unwrap();
        assert_eq!(state_from_bytes(&bytes).unwrap(), state);
    }

    #[test]
    fn test_load_or_fresh_falls_back() {
        let catalog = BuildingCatalog::standard();
        let fresh = SimulationState::new_colony(&catalog);

        assert_eq!(load_or_fresh(None, &catalog), fresh);
        assert_eq!(load_or_fresh(Some(&[0xffu8, 0x01, 0x02][..]), &catalog), fresh);

        let (state, _) = played_state();
        let bytes = state_to_bytes(&state).unwrap();
        assert_eq!(load_or_fresh(Some(bytes.as_slice()), &catalog), state);
    }

    #[test]
    fn test_truncated_save_is_an_error() {
        let (state, carry) = played_state();
        let mut buffer = Vec::new();
        save_simulation(&mut buffer, &state, &carry).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(load_simulation(&buffer[..]).is_err());
    }
}
