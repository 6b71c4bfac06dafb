//! Periodic acceleration pass
//!
//! The host calls [`FarmSimulation::tick`] once per host tick. Every
//! `period_ticks` ticks the pass walks the tracked crops and grants the
//! growth share the host's own random ticks leave out for crops with an
//! efficiency above 1.0.

use crate::core::types::BlockPos;
use crate::growth::{growth_chance, growth_points, roll_catch_up};
use crate::simulation::{FarmEvent, FarmSimulation, PruneReason};
use crate::storage::ChunkStorage;
use crate::world::FarmWorld;

impl<S: ChunkStorage> FarmSimulation<S> {
    /// Count one host tick; returns the stages advanced by a due pass
    pub fn tick<W: FarmWorld + ?Sized>(&mut self, world: &mut W) -> u32 {
        if !self.scheduler.advance_tick() {
            return 0;
        }
        self.acceleration_pass(world)
    }

    /// Run the pass now, regardless of the tick counter
    pub fn acceleration_pass<W: FarmWorld + ?Sized>(&mut self, world: &mut W) -> u32 {
        let mut advanced = 0;
        for crop in self.scheduler.tracked() {
            advanced += self.accelerate(world, crop);
        }
        if advanced > 0 {
            tracing::debug!(
                "Acceleration pass at tick {}: {} extra stages",
                self.scheduler.ticks(),
                advanced
            );
        }
        advanced
    }

    fn accelerate<W: FarmWorld + ?Sized>(&mut self, world: &mut W, crop: BlockPos) -> u32 {
        let Some(state) = world.crop(crop) else {
            self.prune(crop, PruneReason::NotACrop);
            return 0;
        };
        let Some(soil) = world.soil(crop.below()) else {
            self.prune(crop, PruneReason::NoFarmland);
            return 0;
        };
        if state.is_mature() {
            return 0;
        }

        let efficiency = self.breakdown_on(&*world, crop, soil).total;
        if !(efficiency > 1.0) {
            return 0;
        }
        let chance = growth_chance(
            growth_points(&*world, crop),
            self.scheduler.config().growth_points_numerator,
        );
        let extra = self
            .scheduler
            .extra_chance(efficiency, world.random_tick_speed(), chance);

        let stages = roll_catch_up(extra, &mut self.rng, || world.advance_stage(crop));
        if stages == 0 {
            return 0;
        }
        if !self.bonemealed.contains(&crop) {
            for _ in 0..stages {
                self.fertility.consume(
                    crop.below(),
                    self.config.consumption.growth,
                    world.now_millis(),
                    soil.is_wet(),
                    &self.storage,
                );
            }
        }
        self.emit(FarmEvent::ExtraGrowth {
            crop,
            stages,
            efficiency,
        });
        stages
    }

    fn prune(&mut self, crop: BlockPos, reason: PruneReason) {
        self.scheduler.unregister(crop);
        self.bonemealed.remove(&crop);
        tracing::debug!("Pruned {} from growth registry ({:?})", crop, reason);
        self.emit(FarmEvent::CropPruned { crop, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FarmingConfig;
    use crate::core::types::WorldId;
    use crate::genetics::{Allele, GenePair, Genotype, Trait};
    use crate::world::{CropKind, MemoryField, Soil};

    fn crop() -> BlockPos {
        BlockPos::new(WorldId(0), 8, 64, 8)
    }

    fn fast_grower() -> Genotype {
        Genotype::neutral()
            .with_identified(true)
            .with_pair(Trait::GrowthSpeed, GenePair::homozygous(Allele::Dominant4))
    }

    /// One wet crop; 4096 random ticks per section so every cell is sampled
    /// about once per host tick
    fn setup(seed: Option<Genotype>) -> (FarmSimulation, MemoryField) {
        let mut field = MemoryField::new().with_random_tick_speed(4096);
        field.set_soil(crop().below(), Soil::wet());
        field.plant(crop(), CropKind(1), 7);
        let mut sim = FarmSimulation::new(FarmingConfig::default(), 5).unwrap();
        sim.on_till(&field, crop().below());
        sim.on_plant(&field, crop(), seed).unwrap();
        (sim, field)
    }

    fn stage(field: &MemoryField) -> u8 {
        field.crop(crop()).map_or(0, |c| c.stage)
    }

    #[test]
    fn test_pass_runs_every_period() {
        let (mut sim, mut field) = setup(Some(fast_grower()));
        let mut advanced = 0;
        for i in 1..=200u64 {
            let n = sim.tick(&mut field);
            if i % 5 != 0 {
                assert_eq!(n, 0);
            }
            advanced += n;
        }
        assert!(advanced > 0);
        assert_eq!(advanced, stage(&field) as u32);
    }

    #[test]
    fn test_extra_growth_costs_fertility() {
        let (mut sim, mut field) = setup(Some(fast_grower()));
        for _ in 0..200 {
            sim.tick(&mut field);
        }
        assert!(stage(&field) > 0);
        assert!(sim.fertility(&field, crop().below()) < 0);

        let reported: u32 = sim
            .drain_events()
            .iter()
            .map(|e| match e {
                FarmEvent::ExtraGrowth { stages, .. } => *stages,
                _ => 0,
            })
            .sum();
        assert_eq!(reported, stage(&field) as u32);
    }

    #[test]
    fn test_bonemealed_extra_growth_is_free() {
        let (mut sim, mut field) = setup(Some(fast_grower()));
        sim.on_bonemeal([crop()]);
        for _ in 0..200 {
            sim.tick(&mut field);
        }
        assert!(stage(&field) > 0);
        assert_eq!(sim.fertility(&field, crop().below()), 0);
    }

    #[test]
    fn test_neutral_crop_gets_no_extra_growth() {
        let (mut sim, mut field) = setup(None);
        for _ in 0..200 {
            assert_eq!(sim.tick(&mut field), 0);
        }
        assert_eq!(stage(&field), 0);
        assert!(sim.is_registered(crop()));
    }

    #[test]
    fn test_mature_crop_stops_growing() {
        let (mut sim, mut field) = setup(Some(fast_grower()));
        for _ in 0..7 {
            field.advance_stage(crop());
        }
        assert_eq!(sim.acceleration_pass(&mut field), 0);
        assert_eq!(stage(&field), 7);
    }

    #[test]
    fn test_prune_removed_crop() {
        let (mut sim, mut field) = setup(None);
        field.remove_crop(crop());
        sim.acceleration_pass(&mut field);
        assert!(!sim.is_registered(crop()));
        assert_eq!(
            sim.drain_events(),
            vec![FarmEvent::CropPruned {
                crop: crop(),
                reason: PruneReason::NotACrop
            }]
        );
    }

    #[test]
    fn test_prune_crop_without_farmland() {
        let (mut sim, mut field) = setup(Some(fast_grower()));
        sim.on_bonemeal([crop()]);
        field.clear_soil(crop().below());
        sim.acceleration_pass(&mut field);
        assert!(!sim.is_registered(crop()));
        assert!(!sim.is_bonemealed(crop()));
        assert!(sim.drain_events().contains(&FarmEvent::CropPruned {
            crop: crop(),
            reason: PruneReason::NoFarmland
        }));
    }
}
