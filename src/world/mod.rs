//! Host world boundary
//!
//! The farming core never owns blocks. It reads soil and crop state through
//! [`FarmWorld`] and asks the host for direct one-stage growth advances.

pub mod field;

pub use field::MemoryField;

use serde::{Deserialize, Serialize};

use crate::core::types::{BlockPos, Timestamp};

/// Farmland state of one soil cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Soil {
    /// 0 is dry; any positive level counts as wet
    pub moisture: u8,
}

impl Soil {
    pub fn wet() -> Self {
        Self { moisture: 7 }
    }

    pub fn dry() -> Self {
        Self { moisture: 0 }
    }

    pub fn is_wet(&self) -> bool {
        self.moisture > 0
    }
}

/// Host crop type; equal kinds crowd each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropKind(pub u32);

/// Growth-capable cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub kind: CropKind,
    pub stage: u8,
    pub max_stage: u8,
}

impl Crop {
    pub fn new(kind: CropKind, max_stage: u8) -> Self {
        Self {
            kind,
            stage: 0,
            max_stage,
        }
    }

    pub fn is_mature(&self) -> bool {
        self.stage >= self.max_stage
    }
}

/// What the farming core needs from the host
pub trait FarmWorld {
    /// Wall clock in milliseconds
    fn now_millis(&self) -> Timestamp;

    /// Farmland at `pos`; `None` for any other block
    fn soil(&self, pos: BlockPos) -> Option<Soil>;

    /// Growth-capable crop at `pos`
    fn crop(&self, pos: BlockPos) -> Option<Crop>;

    /// Advance a crop by one stage outside the host's own growth stream
    ///
    /// Returns false when there is no crop or it is already mature.
    fn advance_stage(&mut self, pos: BlockPos) -> bool;

    /// Random-tick samples per section per host tick
    fn random_tick_speed(&self) -> u32 {
        3
    }

    /// Ambient temperature in Celsius, if the host models it
    fn temperature(&self, _pos: BlockPos) -> Option<f64> {
        None
    }
}
