//! Per-cell fertility state

use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;

/// Stored baseline of one soil cell
///
/// The values are exact at `last_update`; anything later is a projection
/// (see [`crate::fertility::recovery`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilityRecord {
    /// Never below the configured floor; may sit above the resting cap while
    /// fertilizer keeps the bonus ceiling in reach
    pub base_fertility: i32,

    /// Residual fertilizer strength, never negative
    pub concentration: f64,

    pub last_update: Timestamp,
}

impl FertilityRecord {
    pub fn new(base_fertility: i32, last_update: Timestamp) -> Self {
        Self {
            base_fertility,
            concentration: 0.0,
            last_update,
        }
    }
}
