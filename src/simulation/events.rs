//! Values reported back to the host

use serde::{Deserialize, Serialize};

use crate::core::types::{BlockPos, ChunkKey};
use crate::genetics::Genotype;

/// Fertilizer items the host can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FertilizerKind {
    Organic,
    Chemical,
}

/// Why a tracked crop left the registry during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// The cell no longer holds a growth-capable crop
    NotACrop,
    /// The crop no longer stands on farmland
    NoFarmland,
}

/// Result of harvesting one crop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarvestOutcome {
    /// Genotype copied onto the produce; `None` for crops without gene data
    pub produce: Option<Genotype>,
    /// Genotype carried by the dropped seeds, crossed with pollen if any
    pub seed: Option<Genotype>,
    pub mature: bool,
    /// Extra produce items from the yield trait
    pub bonus_items: u32,
    /// Soil fertility after the harvest cost, if any was charged
    pub fertility: Option<i32>,
}

/// Diagnostics emitted by the simulation
///
/// Drained with [`crate::simulation::FarmSimulation::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum FarmEvent {
    /// A host growth attempt was suppressed
    GrowthVetoed {
        crop: BlockPos,
        efficiency: f64,
    },
    /// The acceleration pass advanced a crop
    ExtraGrowth {
        crop: BlockPos,
        stages: u32,
        efficiency: f64,
    },
    CropPruned {
        crop: BlockPos,
        reason: PruneReason,
    },
    Pollinated {
        crop: BlockPos,
    },
    Harvested {
        crop: BlockPos,
        mature: bool,
        bonus_items: u32,
    },
    /// Chunk data was written back on unload
    ChunkFlushed {
        chunk: ChunkKey,
    },
}
