//! In-memory farm field
//!
//! A minimal host: soil and crop maps, a settable clock and an emulation of
//! the host's random-tick growth stream. Used by tests, the benchmark and the
//! `farm_sim` binary.

use ahash::AHashMap;
use rand::Rng;

use crate::core::types::{BlockPos, Timestamp};
use crate::growth::points;
use crate::world::{Crop, CropKind, FarmWorld, Soil};

#[derive(Debug, Clone)]
pub struct MemoryField {
    soils: AHashMap<BlockPos, Soil>,
    crops: AHashMap<BlockPos, Crop>,
    now: Timestamp,
    random_tick_speed: u32,
    temperature: Option<f64>,
}

impl Default for MemoryField {
    fn default() -> Self {
        Self {
            soils: AHashMap::new(),
            crops: AHashMap::new(),
            now: 0,
            random_tick_speed: 3,
            temperature: None,
        }
    }
}

impl MemoryField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_random_tick_speed(mut self, speed: u32) -> Self {
        self.random_tick_speed = speed;
        self
    }

    pub fn set_soil(&mut self, pos: BlockPos, soil: Soil) {
        self.soils.insert(pos, soil);
    }

    /// Revert farmland to plain ground
    pub fn clear_soil(&mut self, pos: BlockPos) {
        self.soils.remove(&pos);
    }

    pub fn plant(&mut self, pos: BlockPos, kind: CropKind, max_stage: u8) {
        self.crops.insert(pos, Crop::new(kind, max_stage));
    }

    pub fn remove_crop(&mut self, pos: BlockPos) -> Option<Crop> {
        self.crops.remove(&pos)
    }

    pub fn set_time(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn advance_time(&mut self, millis: Timestamp) {
        self.now += millis;
    }

    pub fn set_temperature(&mut self, temperature: Option<f64>) {
        self.temperature = temperature;
    }

    /// Crop positions in a stable order
    pub fn crop_positions(&self) -> Vec<BlockPos> {
        let mut positions: Vec<BlockPos> = self.crops.keys().copied().collect();
        positions.sort();
        positions
    }

    /// Cells the host's own random ticks try to grow this tick
    ///
    /// Each crop is sampled with probability `speed / section_volume`, then
    /// succeeds with the host's growth chance for its growth points.
    pub fn host_growth_attempts<R: Rng + ?Sized>(
        &self,
        section_volume: f64,
        growth_points_numerator: f64,
        rng: &mut R,
    ) -> Vec<BlockPos> {
        let p_tick = (self.random_tick_speed as f64 / section_volume).clamp(0.0, 1.0);
        let mut attempts = Vec::new();
        for pos in self.crop_positions() {
            if self.crops.get(&pos).map_or(true, Crop::is_mature) || !rng.gen_bool(p_tick) {
                continue;
            }
            let g = points::growth_points(self, pos);
            if rng.gen_bool(points::growth_chance(g, growth_points_numerator)) {
                attempts.push(pos);
            }
        }
        attempts
    }
}

impl FarmWorld for MemoryField {
    fn now_millis(&self) -> Timestamp {
        self.now
    }

    fn soil(&self, pos: BlockPos) -> Option<Soil> {
        self.soils.get(&pos).copied()
    }

    fn crop(&self, pos: BlockPos) -> Option<Crop> {
        self.crops.get(&pos).copied()
    }

    fn advance_stage(&mut self, pos: BlockPos) -> bool {
        match self.crops.get_mut(&pos) {
            Some(crop) if !crop.is_mature() => {
                crop.stage += 1;
                true
            }
            _ => false,
        }
    }

    fn random_tick_speed(&self) -> u32 {
        self.random_tick_speed
    }

    fn temperature(&self, _pos: BlockPos) -> Option<f64> {
        self.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pos(x: i32, z: i32) -> BlockPos {
        BlockPos::new(WorldId(0), x, 64, z)
    }

    #[test]
    fn test_advance_stops_at_maturity() {
        let mut field = MemoryField::new();
        field.plant(pos(0, 0), CropKind(1), 2);
        assert!(field.advance_stage(pos(0, 0)));
        assert!(field.advance_stage(pos(0, 0)));
        assert!(!field.advance_stage(pos(0, 0)));
        assert!(field.crop(pos(0, 0)).unwrap().is_mature());
        assert!(!field.advance_stage(pos(5, 5)));
    }

    #[test]
    fn test_host_attempts_skip_mature_crops() {
        // Speed equal to the section volume samples every crop every tick
        let mut field = MemoryField::new().with_random_tick_speed(4096);
        field.set_soil(pos(0, 0).below(), Soil::wet());
        field.plant(pos(0, 0), CropKind(1), 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(field.host_growth_attempts(4096.0, 25.0, &mut rng).is_empty());
        }
    }
}
