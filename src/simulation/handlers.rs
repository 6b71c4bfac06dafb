//! Host event entry points

use crate::core::error::{FarmError, Result};
use crate::core::types::{BlockPos, ChunkKey};
use crate::genetics::{pollination, GeneticsEngine, Genotype};
use crate::growth::{throttle, GrowthDecision};
use crate::simulation::{FarmEvent, FarmSimulation, FertilizerKind, HarvestOutcome};
use crate::storage::ChunkStorage;
use crate::world::FarmWorld;

impl<S: ChunkStorage> FarmSimulation<S> {
    /// Soil was tilled into farmland
    ///
    /// Creates the fertility record if it does not exist yet. Returns false
    /// when the cell is not farmland.
    pub fn on_till<W: FarmWorld + ?Sized>(&mut self, world: &W, soil: BlockPos) -> bool {
        if world.soil(soil).is_none() {
            return false;
        }
        self.fertility.till(soil, world.now_millis(), &self.storage);
        true
    }

    /// A seed was planted; `seed` is the genotype carried by the item
    pub fn on_plant<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        crop: BlockPos,
        seed: Option<Genotype>,
    ) -> Result<()> {
        if world.crop(crop).is_none() || world.soil(crop.below()).is_none() {
            return Err(FarmError::NotACrop(crop));
        }
        self.scheduler.register(crop);
        self.bonemealed.remove(&crop);
        self.genes
            .set_genotype(crop, seed.unwrap_or_default(), &self.storage);
        Ok(())
    }

    /// The host is about to grow a crop by one stage
    ///
    /// Below efficiency 1.0 the attempt may be vetoed. Every allowed attempt
    /// costs the growth fertility charge unless the crop was bonemealed.
    pub fn on_growth_attempt<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        crop: BlockPos,
    ) -> GrowthDecision {
        if self.bonemealed.contains(&crop) {
            return GrowthDecision::Allow;
        }
        let Some(soil) = world.soil(crop.below()) else {
            return GrowthDecision::Allow;
        };
        self.scheduler.register(crop);

        let efficiency = self.breakdown_on(world, crop, soil).total;
        if throttle(efficiency, &mut self.rng) == GrowthDecision::Veto {
            tracing::debug!("Vetoed growth at {} (efficiency {:.2})", crop, efficiency);
            self.emit(FarmEvent::GrowthVetoed { crop, efficiency });
            return GrowthDecision::Veto;
        }

        self.fertility.consume(
            crop.below(),
            self.config.consumption.growth,
            world.now_millis(),
            soil.is_wet(),
            &self.storage,
        );
        GrowthDecision::Allow
    }

    /// Cells grown with bone meal; their growth and harvest are free
    pub fn on_bonemeal<I: IntoIterator<Item = BlockPos>>(&mut self, cells: I) {
        self.bonemealed.extend(cells);
    }

    /// A crop is being harvested; call before the host removes the block
    pub fn on_harvest<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        crop: BlockPos,
    ) -> Result<HarvestOutcome> {
        let state = world.crop(crop).ok_or(FarmError::NotACrop(crop))?;
        let mature = state.is_mature();
        let bonemealed = self.bonemealed.remove(&crop);
        self.scheduler.unregister(crop);

        let (produce, pollen) = self.genes.remove(crop, &self.storage);
        let seed = produce
            .map(|g| pollination::harvest_seed(&self.engine, &g, pollen.as_ref(), &mut self.rng));
        let bonus_items = match produce {
            Some(g) if mature => GeneticsEngine::roll_bonus_yield(&g, &mut self.rng),
            _ => 0,
        };

        let soil = world.soil(crop.below());
        let fertility = match soil {
            Some(soil) if mature && !bonemealed => Some(self.fertility.consume(
                crop.below(),
                self.config.consumption.harvest,
                world.now_millis(),
                soil.is_wet(),
                &self.storage,
            )),
            _ => None,
        };

        tracing::debug!(
            "Harvested {} (mature: {}, bonus: {}, crossed: {})",
            crop,
            mature,
            bonus_items,
            pollen.is_some()
        );
        self.emit(FarmEvent::Harvested {
            crop,
            mature,
            bonus_items,
        });
        Ok(HarvestOutcome {
            produce,
            seed,
            mature,
            bonus_items,
            fertility,
        })
    }

    /// A crop was destroyed without a harvest
    pub fn on_break(&mut self, crop: BlockPos) {
        self.scheduler.unregister(crop);
        self.bonemealed.remove(&crop);
        self.genes.remove(crop, &self.storage);
    }

    /// Fertilizer applied to soil, or to a crop standing on it
    ///
    /// Returns the new concentration.
    pub fn on_fertilize<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        cell: BlockPos,
        kind: FertilizerKind,
    ) -> Result<f64> {
        let soil = Self::fertilizer_target(world, cell)?;
        let amount = match kind {
            FertilizerKind::Organic => self.config.fertilizer.organic,
            FertilizerKind::Chemical => self.config.fertilizer.chemical,
        };
        let wet = Self::is_wet(world, soil);
        Ok(self
            .fertility
            .apply_fertilizer(soil, amount, world.now_millis(), wet, &self.storage))
    }

    /// Farmland moisture changed; turning wet restarts the recovery clock
    pub fn on_moisture_change<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        soil: BlockPos,
        was_wet: bool,
        now_wet: bool,
    ) {
        if !was_wet && now_wet {
            self.fertility
                .reset_recovery_timer(soil, world.now_millis(), &self.storage);
        }
    }

    /// Chunk data loads lazily on first touch
    pub fn on_chunk_load(&mut self, chunk: ChunkKey) {
        tracing::debug!("Chunk {} loaded", chunk);
    }

    /// Flush and evict everything held for a chunk
    pub fn on_chunk_unload(&mut self, chunk: ChunkKey) {
        let fertility = self.fertility.unload(chunk, &mut self.storage);
        let genes = self.genes.unload(chunk, &mut self.storage);
        self.scheduler.drop_chunk(chunk);
        self.bonemealed.retain(|pos| pos.chunk() != chunk);
        if fertility || genes {
            self.emit(FarmEvent::ChunkFlushed { chunk });
        }
    }
}
