//! Farm simulation context
//!
//! [`FarmSimulation`] is the explicit handle a host creates once and feeds
//! its events into. It owns every chunk-scoped store, the seeded RNG and the
//! growth scheduler; the host keeps ownership of its blocks and passes a
//! [`FarmWorld`] view into each call.
//!
//! All calls are synchronous and run to completion on the host's tick
//! thread. A settle-then-mutate sequence is never interleaved with another
//! call.

pub mod events;
pub mod handlers;
pub mod tick;

pub use events::{FarmEvent, FertilizerKind, HarvestOutcome, PruneReason};

use std::collections::{BTreeSet, VecDeque};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::FarmingConfig;
use crate::core::error::{FarmError, Result};
use crate::core::types::BlockPos;
use crate::fertility::FertilityStore;
use crate::genetics::{pollination, ChunkGeneStore, GeneticsEngine, Genotype};
use crate::growth::{BonusProvider, EfficiencyBreakdown, EfficiencyCalculator, EfficiencyInput, GrowthScheduler};
use crate::storage::{ChunkStorage, MemoryChunkStorage};
use crate::world::{FarmWorld, Soil};

/// Events kept between drains; the oldest are dropped past this
pub const MAX_BUFFERED_EVENTS: usize = 1024;

#[derive(Debug)]
pub struct FarmSimulation<S = MemoryChunkStorage> {
    config: FarmingConfig,
    rng: ChaCha8Rng,
    storage: S,
    fertility: FertilityStore,
    genes: ChunkGeneStore,
    engine: GeneticsEngine,
    efficiency: EfficiencyCalculator,
    scheduler: GrowthScheduler,
    /// Crops grown artificially since planting; they never cost fertility
    bonemealed: BTreeSet<BlockPos>,
    events: VecDeque<FarmEvent>,
}

impl FarmSimulation<MemoryChunkStorage> {
    /// Simulation over in-memory chunk storage
    pub fn new(config: FarmingConfig, seed: u64) -> Result<Self> {
        Self::with_storage(config, seed, MemoryChunkStorage::new())
    }
}

impl<S: ChunkStorage> FarmSimulation<S> {
    pub fn with_storage(config: FarmingConfig, seed: u64, storage: S) -> Result<Self> {
        config.validate()?;
        tracing::info!("Farm simulation created (seed {})", seed);
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            storage,
            fertility: FertilityStore::new(config.fertility.clone()),
            genes: ChunkGeneStore::new(),
            engine: GeneticsEngine::new(config.genetics.clone()),
            efficiency: EfficiencyCalculator::new(config.efficiency.clone()),
            scheduler: GrowthScheduler::new(config.scheduler.clone()),
            bonemealed: BTreeSet::new(),
            events: VecDeque::new(),
            config,
        })
    }

    pub fn config(&self) -> &FarmingConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn engine(&self) -> &GeneticsEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &GrowthScheduler {
        &self.scheduler
    }

    pub fn set_biome_provider(&mut self, provider: Option<Box<dyn BonusProvider>>) {
        self.efficiency.set_biome_provider(provider);
    }

    pub fn set_locale_provider(&mut self, provider: Option<Box<dyn BonusProvider>>) {
        self.efficiency.set_locale_provider(provider);
    }

    /// Take the buffered events, oldest first
    ///
    /// At most [`MAX_BUFFERED_EVENTS`] are kept between drains.
    pub fn drain_events(&mut self) -> Vec<FarmEvent> {
        self.events.drain(..).collect()
    }

    /// Number of events waiting to be drained
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn emit(&mut self, event: FarmEvent) {
        if self.events.len() >= MAX_BUFFERED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn is_registered(&self, crop: BlockPos) -> bool {
        self.scheduler.is_registered(crop)
    }

    pub fn is_bonemealed(&self, crop: BlockPos) -> bool {
        self.bonemealed.contains(&crop)
    }

    /// Stored genotype of a planted crop
    pub fn genotype(&mut self, crop: BlockPos) -> Option<Genotype> {
        self.genes.genotype(crop, &self.storage)
    }

    /// Pollen applied to a crop, if any
    pub fn pollen(&mut self, crop: BlockPos) -> Option<Genotype> {
        self.genes.pollen(crop, &self.storage)
    }

    pub fn fertility<W: FarmWorld + ?Sized>(&mut self, world: &W, soil: BlockPos) -> i32 {
        let wet = Self::is_wet(world, soil);
        self.fertility.fertility(soil, world.now_millis(), wet, &self.storage)
    }

    pub fn concentration<W: FarmWorld + ?Sized>(&mut self, world: &W, soil: BlockPos) -> f64 {
        let wet = Self::is_wet(world, soil);
        self.fertility.concentration(soil, world.now_millis(), wet, &self.storage)
    }

    /// Drop chance bonus for external drop systems
    pub fn drop_bonus<W: FarmWorld + ?Sized>(&mut self, world: &W, soil: BlockPos) -> f64 {
        let wet = Self::is_wet(world, soil);
        self.fertility.drop_bonus(soil, world.now_millis(), wet, &self.storage)
    }

    /// Efficiency of a crop and every contribution to it
    ///
    /// `None` when the cell is not standing on farmland.
    pub fn efficiency_breakdown<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        crop: BlockPos,
    ) -> Option<EfficiencyBreakdown> {
        let soil = world.soil(crop.below())?;
        Some(self.breakdown_on(world, crop, soil))
    }

    fn breakdown_on<W: FarmWorld + ?Sized>(
        &mut self,
        world: &W,
        crop: BlockPos,
        soil: Soil,
    ) -> EfficiencyBreakdown {
        let projection =
            self.fertility
                .projection(crop.below(), world.now_millis(), soil.is_wet(), &self.storage);
        let genotype = self.genes.genotype(crop, &self.storage).unwrap_or_default();
        self.efficiency.breakdown(&EfficiencyInput {
            crop,
            fertility: projection.fertility,
            concentration: projection.concentration,
            genotype: &genotype,
            temperature: world.temperature(crop),
        })
    }

    fn is_wet<W: FarmWorld + ?Sized>(world: &W, soil: BlockPos) -> bool {
        world.soil(soil).is_some_and(|s| s.is_wet())
    }

    /// Copy an identified crop's genotype as pollen
    pub fn collect_pollen(&mut self, crop: BlockPos) -> Result<Genotype> {
        pollination::collect_pollen(crop, &mut self.genes, &self.storage)
    }

    pub fn pollinate(&mut self, crop: BlockPos, pollen: Genotype) -> Result<()> {
        pollination::pollinate(crop, pollen, &mut self.genes, &self.storage)?;
        self.emit(FarmEvent::Pollinated { crop });
        Ok(())
    }

    /// Seed analyzer: randomizes wild seeds, always returns an identified genotype
    pub fn analyze_seed(&mut self, seed: Option<Genotype>) -> Genotype {
        self.engine.analyze(seed, &mut self.rng)
    }

    /// Loot seed drawn from the randomizer table
    pub fn random_seed(&mut self) -> Genotype {
        self.engine.random_genotype(&mut self.rng)
    }

    /// Flush every dirty chunk without evicting anything
    pub fn save_all(&mut self) -> usize {
        let flushed =
            self.fertility.save_all(&mut self.storage) + self.genes.save_all(&mut self.storage);
        tracing::info!("Saved {} chunk slots", flushed);
        flushed
    }

    /// Position of the soil a fertilizer click lands on
    fn fertilizer_target<W: FarmWorld + ?Sized>(world: &W, cell: BlockPos) -> Result<BlockPos> {
        if world.soil(cell).is_some() {
            return Ok(cell);
        }
        if world.crop(cell).is_some() && world.soil(cell.below()).is_some() {
            return Ok(cell.below());
        }
        Err(FarmError::NotACrop(cell))
    }
}
