//! Active growth scheduler
//!
//! The host fires growth attempts at a rate the farming core does not
//! control. The scheduler corrects that stream toward the crop's efficiency:
//! - below 1.0, each observed attempt passes with probability `efficiency`
//! - at or above 1.0, every attempt passes and a periodic pass adds the
//!   missing `efficiency - 1` share as direct stage advances
//!
//! The registry of tracked crops is bucketed per chunk so a chunk unload
//! drops its whole bucket.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::core::config::SchedulerConfig;
use crate::core::types::{BlockPos, ChunkKey, Tick};

/// Outcome of one observed host growth attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthDecision {
    Allow,
    Veto,
}

impl GrowthDecision {
    pub fn is_allowed(self) -> bool {
        self == GrowthDecision::Allow
    }
}

/// Throttle decision for efficiencies below 1.0; always allows otherwise
pub fn throttle<R: Rng + ?Sized>(efficiency: f64, rng: &mut R) -> GrowthDecision {
    if !(efficiency < 1.0) {
        return GrowthDecision::Allow;
    }
    let keep = efficiency.clamp(0.0, 1.0);
    if rng.gen::<f64>() < keep {
        GrowthDecision::Allow
    } else {
        GrowthDecision::Veto
    }
}

/// Bernoulli catch-up loop
///
/// Draws `u` in [0, 1); while `u < extra`, calls `advance` and lowers
/// `extra` by one. Stops on the first failed draw, when `extra` runs out or
/// when `advance` reports it could not grow. The expected number of
/// advances is `extra`, and at most `ceil(extra)` draws are made.
pub fn roll_catch_up<R, F>(extra: f64, rng: &mut R, mut advance: F) -> u32
where
    R: Rng + ?Sized,
    F: FnMut() -> bool,
{
    if !extra.is_finite() {
        return 0;
    }
    let mut remaining = extra;
    let mut advanced = 0;
    while remaining > 0.0 {
        if rng.gen::<f64>() >= remaining || !advance() {
            break;
        }
        advanced += 1;
        remaining -= 1.0;
    }
    advanced
}

#[derive(Debug, Clone)]
pub struct GrowthScheduler {
    config: SchedulerConfig,
    registry: BTreeMap<ChunkKey, BTreeSet<BlockPos>>,
    ticks: Tick,
}

impl GrowthScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            registry: BTreeMap::new(),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start tracking a crop; false if it was already tracked
    pub fn register(&mut self, crop: BlockPos) -> bool {
        let added = self.registry.entry(crop.chunk()).or_default().insert(crop);
        if added {
            tracing::debug!("Tracking crop at {}", crop);
        }
        added
    }

    pub fn unregister(&mut self, crop: BlockPos) -> bool {
        let chunk = crop.chunk();
        let Some(bucket) = self.registry.get_mut(&chunk) else {
            return false;
        };
        let removed = bucket.remove(&crop);
        if bucket.is_empty() {
            self.registry.remove(&chunk);
        }
        removed
    }

    pub fn is_registered(&self, crop: BlockPos) -> bool {
        self.registry
            .get(&crop.chunk())
            .is_some_and(|bucket| bucket.contains(&crop))
    }

    /// Forget every crop of an unloading chunk
    pub fn drop_chunk(&mut self, chunk: ChunkKey) -> usize {
        let dropped = self.registry.remove(&chunk).map_or(0, |bucket| bucket.len());
        if dropped > 0 {
            tracing::debug!("Dropped {} tracked crops with chunk {}", dropped, chunk);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.registry.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Snapshot of tracked crops in chunk then position order
    pub fn tracked(&self) -> Vec<BlockPos> {
        self.registry.values().flatten().copied().collect()
    }

    /// Count one host tick; true when an acceleration pass is due
    pub fn advance_tick(&mut self) -> bool {
        self.ticks += 1;
        self.ticks % self.config.period_ticks.max(1) == 0
    }

    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    /// Chance that the host random-ticks a given cell at least once per
    /// period: `speed / section_volume * period`
    pub fn period_tick_chance(&self, random_tick_speed: u32) -> f64 {
        random_tick_speed as f64 / self.config.section_volume * self.config.period_ticks as f64
    }

    /// Expected extra stage advances this period for one crop
    pub fn extra_chance(&self, efficiency: f64, random_tick_speed: u32, growth_chance: f64) -> f64 {
        if !(efficiency > 1.0) {
            return 0.0;
        }
        (efficiency - 1.0) * self.period_tick_chance(random_tick_speed) * growth_chance
    }
}

impl Default for GrowthScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
