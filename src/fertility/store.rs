//! Fertility store - settle-then-mutate operations over chunk records
//!
//! Every mutation first settles the record to `now` (writes the projection
//! back as the new baseline) and then applies its change, so a later
//! projection never counts the same interval twice.

use crate::core::config::FertilityConfig;
use crate::core::types::{BlockPos, ChunkKey, Timestamp};
use crate::fertility::chunk::ChunkFertilityStore;
use crate::fertility::record::FertilityRecord;
use crate::fertility::recovery::{self, Projection};
use crate::storage::{ChunkCache, ChunkStorage};

#[derive(Debug)]
pub struct FertilityStore {
    config: FertilityConfig,
    chunks: ChunkCache<ChunkFertilityStore>,
}

impl FertilityStore {
    pub fn new(config: FertilityConfig) -> Self {
        Self {
            config,
            chunks: ChunkCache::new(),
        }
    }

    pub fn config(&self) -> &FertilityConfig {
        &self.config
    }

    /// Stored record of a soil cell, if it was ever touched
    pub fn record(&mut self, soil: BlockPos, storage: &dyn ChunkStorage) -> Option<FertilityRecord> {
        self.chunks.get_or_load(soil.chunk(), storage).get(soil.local()).copied()
    }

    /// Create the record of freshly tilled soil; an existing record is kept
    pub fn till(&mut self, soil: BlockPos, now: Timestamp, storage: &dyn ChunkStorage) {
        let initial = self.config.initial;
        let chunk = self.chunks.get_mut_or_load(soil.chunk(), storage);
        if chunk.get(soil.local()).is_none() {
            chunk.set(soil.local(), FertilityRecord::new(initial, now));
            tracing::debug!("Initialized fertility at {}", soil);
        }
    }

    /// Projected values at `now`; untouched soil reads as initial fertility
    /// with no fertilizer
    pub fn projection(
        &mut self,
        soil: BlockPos,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> Projection {
        match self.record(soil, storage) {
            Some(record) => recovery::project(&record, now, wet, &self.config),
            None => Projection {
                fertility: self.config.initial,
                concentration: 0.0,
            },
        }
    }

    pub fn fertility(
        &mut self,
        soil: BlockPos,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> i32 {
        self.projection(soil, now, wet, storage).fertility
    }

    pub fn concentration(
        &mut self,
        soil: BlockPos,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> f64 {
        self.projection(soil, now, wet, storage).concentration
    }

    /// Write settled values back as the new baseline
    fn commit(&mut self, soil: BlockPos, settled: Projection, now: Timestamp, storage: &dyn ChunkStorage) {
        let record = FertilityRecord {
            base_fertility: settled.fertility.max(self.config.min_base),
            concentration: settled.concentration.max(0.0),
            last_update: now,
        };
        self.chunks.get_mut_or_load(soil.chunk(), storage).set(soil.local(), record);
    }

    /// Charge a farming operation against the soil
    ///
    /// The cost scales with current fertility: `base * (1 + f / 200)`,
    /// truncated. Returns the new fertility.
    pub fn consume(
        &mut self,
        soil: BlockPos,
        base_cost: i32,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> i32 {
        let mut settled = self.projection(soil, now, wet, storage);
        let cost = (base_cost as f64 * (1.0 + settled.fertility as f64 / 200.0)) as i32;
        settled.fertility = (settled.fertility - cost).max(self.config.min_base);
        self.commit(soil, settled, now, storage);
        tracing::debug!("Consumed {} fertility at {} -> {}", cost, soil, settled.fertility);
        settled.fertility
    }

    /// Add fertilizer; there is no upper limit. Returns the new concentration.
    pub fn apply_fertilizer(
        &mut self,
        soil: BlockPos,
        amount: f64,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> f64 {
        let mut settled = self.projection(soil, now, wet, storage);
        if !(amount.is_finite() && amount >= 0.0) {
            tracing::warn!("Ignoring fertilizer amount {} at {}", amount, soil);
            return settled.concentration;
        }
        settled.concentration += amount;
        self.commit(soil, settled, now, storage);
        tracing::debug!("Fertilized {} (+{}) -> {:.1}", soil, amount, settled.concentration);
        settled.concentration
    }

    /// Restart the recovery clock without changing stored values
    ///
    /// Called when dry soil turns wet so the dry spell never counts as
    /// recovery time.
    pub fn reset_recovery_timer(&mut self, soil: BlockPos, now: Timestamp, storage: &dyn ChunkStorage) {
        let initial = self.config.initial;
        let chunk = self.chunks.get_mut_or_load(soil.chunk(), storage);
        if !chunk.touch(soil.local(), now) {
            chunk.set(soil.local(), FertilityRecord::new(initial, now));
        }
    }

    /// Extra drop chance for external drop systems, zero up to the threshold
    pub fn drop_bonus(
        &mut self,
        soil: BlockPos,
        now: Timestamp,
        wet: bool,
        storage: &dyn ChunkStorage,
    ) -> f64 {
        let fertility = self.fertility(soil, now, wet, storage);
        let threshold = self.config.drop_bonus_threshold;
        if fertility > threshold {
            (fertility - threshold) as f64 * self.config.drop_bonus_per_point
        } else {
            0.0
        }
    }

    pub fn is_loaded(&self, chunk: ChunkKey) -> bool {
        self.chunks.is_loaded(chunk)
    }

    pub fn unload(&mut self, chunk: ChunkKey, storage: &mut dyn ChunkStorage) -> bool {
        self.chunks.unload(chunk, storage)
    }

    pub fn save_all(&mut self, storage: &mut dyn ChunkStorage) -> usize {
        self.chunks.flush_all(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldId;
    use crate::storage::MemoryChunkStorage;

    const MINUTE: Timestamp = 60_000;

    fn soil() -> BlockPos {
        BlockPos::new(WorldId(0), 17, 63, -4)
    }

    fn store() -> FertilityStore {
        FertilityStore::new(FertilityConfig::default())
    }

    #[test]
    fn test_untouched_soil_reads_initial() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        assert_eq!(store.fertility(soil(), 10 * MINUTE, true, &storage), 0);
        assert_eq!(store.concentration(soil(), 10 * MINUTE, true, &storage), 0.0);
        assert!(store.record(soil(), &storage).is_none());
    }

    #[test]
    fn test_till_keeps_existing_record() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        store.consume(soil(), 10, 0, true, &storage);
        store.till(soil(), MINUTE, &storage);
        assert_eq!(store.record(soil(), &storage).unwrap().base_fertility, -10);
    }

    #[test]
    fn test_consume_scales_with_fertility() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        // f = 0: cost 15 * 1.0
        assert_eq!(store.consume(soil(), 15, 0, true, &storage), -15);
        // f = -15: cost trunc(15 * 0.925) = 13
        assert_eq!(store.consume(soil(), 15, 0, true, &storage), -28);
    }

    #[test]
    fn test_consume_clamps_at_floor() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        for _ in 0..50 {
            store.consume(soil(), 15, 0, false, &storage);
        }
        assert_eq!(store.fertility(soil(), 0, false, &storage), -100);
    }

    #[test]
    fn test_fertilizer_settles_then_adds() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        assert_eq!(store.apply_fertilizer(soil(), 30.0, 0, true, &storage), 30.0);
        // ten moist minutes remove 10, then +20
        let c = store.apply_fertilizer(soil(), 20.0, 10 * MINUTE, true, &storage);
        assert!((c - 40.0).abs() < 1e-9);
        assert_eq!(store.record(soil(), &storage).unwrap().last_update, 10 * MINUTE);
    }

    #[test]
    fn test_invalid_fertilizer_amount_ignored() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        store.apply_fertilizer(soil(), 40.0, 0, true, &storage);
        for amount in [f64::NAN, f64::INFINITY, -10.0] {
            assert_eq!(store.apply_fertilizer(soil(), amount, 0, true, &storage), 40.0);
        }
        assert_eq!(store.record(soil(), &storage).unwrap().concentration, 40.0);
    }

    #[test]
    fn test_dry_consume_does_not_bank_recovery() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        store.consume(soil(), 40, 0, true, &storage);
        // A dry hour settles nothing, but the clock still moves on
        store.consume(soil(), 0, 60 * MINUTE, false, &storage);
        let record = store.record(soil(), &storage).unwrap();
        assert_eq!(record.base_fertility, -40);
        assert_eq!(record.last_update, 60 * MINUTE);
    }

    #[test]
    fn test_reset_recovery_timer() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        store.consume(soil(), 40, 0, true, &storage);
        store.reset_recovery_timer(soil(), 30 * MINUTE, &storage);
        // Nothing recovered for the half hour before the reset
        assert_eq!(store.fertility(soil(), 30 * MINUTE, true, &storage), -40);
        assert!(store.fertility(soil(), 40 * MINUTE, true, &storage) > -40);
    }

    #[test]
    fn test_drop_bonus() {
        let storage = MemoryChunkStorage::new();
        let mut store = store();
        assert_eq!(store.drop_bonus(soil(), 0, true, &storage), 0.0);
        store.till(soil(), 0, &storage);
        store.apply_fertilizer(soil(), 100.0, 0, true, &storage);
        // Long enough to approach the bonus ceiling
        let bonus = store.drop_bonus(soil(), 20 * MINUTE, true, &storage);
        assert!(bonus > 0.0 && bonus <= 0.1 + 1e-12, "bonus {}", bonus);
    }

    #[test]
    fn test_unload_persists_and_reloads() {
        let mut storage = MemoryChunkStorage::new();
        let mut store = store();
        store.till(soil(), 0, &storage);
        store.apply_fertilizer(soil(), 50.0, 0, true, &storage);
        let before = store.record(soil(), &storage);

        assert!(store.unload(soil().chunk(), &mut storage));
        assert!(!store.is_loaded(soil().chunk()));
        assert_eq!(store.record(soil(), &storage), before);
        assert!(!store.unload(ChunkKey::new(WorldId(9), 0, 0), &mut storage));
    }
}
