//! Pollen collection and cross-pollination of planted crops

use rand::Rng;

use crate::core::error::{FarmError, Result};
use crate::core::types::BlockPos;
use crate::genetics::engine::GeneticsEngine;
use crate::genetics::genotype::Genotype;
use crate::genetics::store::ChunkGeneStore;
use crate::storage::ChunkStorage;

/// Copy a planted crop's genotype as pollen
///
/// Only identified crops with stored gene data yield pollen.
pub fn collect_pollen(
    crop: BlockPos,
    genes: &mut ChunkGeneStore,
    storage: &dyn ChunkStorage,
) -> Result<Genotype> {
    let genotype = genes.genotype(crop, storage).ok_or(FarmError::NoGeneData(crop))?;
    if !genotype.identified {
        return Err(FarmError::Unidentified);
    }
    tracing::debug!("Collected pollen from {}", crop);
    Ok(genotype)
}

/// Apply identified pollen to a crop; each crop accepts pollen once
pub fn pollinate(
    crop: BlockPos,
    pollen: Genotype,
    genes: &mut ChunkGeneStore,
    storage: &dyn ChunkStorage,
) -> Result<()> {
    if !pollen.identified {
        return Err(FarmError::Unidentified);
    }
    if genes.pollen(crop, storage).is_some() {
        return Err(FarmError::AlreadyPollinated(crop));
    }
    genes.set_pollen(crop, pollen, storage);
    tracing::info!("Pollinated crop at {}", crop);
    Ok(())
}

/// Genotype carried by the seeds of a harvested crop
///
/// A pollinated crop crosses with its pollen; otherwise seeds inherit the
/// crop's genotype unchanged.
pub fn harvest_seed<R: Rng + ?Sized>(
    engine: &GeneticsEngine,
    crop: &Genotype,
    pollen: Option<&Genotype>,
    rng: &mut R,
) -> Genotype {
    match pollen {
        Some(pollen) => engine.hybridize(crop, pollen, engine.mutation_rate(), rng),
        None => *crop,
    }
}
