//! Growth points of a crop cell and the host's growth chance
//!
//! Mirrors how the host scores a crop's surroundings:
//! - base 1
//! - soil under the crop: +3 wet, +1 dry
//! - each of the 8 soil cells around it: +0.75 wet, +0.25 dry
//! - halved when the same crop kind sits diagonally, or both east/west and
//!   north/south

use crate::core::types::BlockPos;
use crate::world::FarmWorld;

const DIAGONALS: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const EAST_WEST: [(i32, i32); 2] = [(-1, 0), (1, 0)];
const NORTH_SOUTH: [(i32, i32); 2] = [(0, -1), (0, 1)];

pub fn growth_points<W: FarmWorld + ?Sized>(world: &W, crop: BlockPos) -> f64 {
    let soil = crop.below();
    let mut points = 1.0;

    if let Some(under) = world.soil(soil) {
        points += if under.is_wet() { 3.0 } else { 1.0 };
    }
    for dx in -1..=1 {
        for dz in -1..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            if let Some(neighbour) = world.soil(soil.offset(dx, 0, dz)) {
                points += if neighbour.is_wet() { 0.75 } else { 0.25 };
            }
        }
    }

    let Some(kind) = world.crop(crop).map(|c| c.kind) else {
        return points;
    };
    let same = |offsets: &[(i32, i32)]| {
        offsets
            .iter()
            .any(|&(dx, dz)| world.crop(crop.offset(dx, 0, dz)).is_some_and(|c| c.kind == kind))
    };
    if same(&DIAGONALS[..]) || (same(&EAST_WEST[..]) && same(&NORTH_SOUTH[..])) {
        points /= 2.0;
    }
    points
}

/// Host success chance for growth points `g`: `1 / (floor(n / g) + 1)`
///
/// `g` is floored at 1.
pub fn growth_chance(g: f64, numerator: f64) -> f64 {
    let g = if g.is_finite() { g.max(1.0) } else { 1.0 };
    1.0 / ((numerator / g).floor() + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldId;
    use crate::world::{CropKind, MemoryField, Soil};

    fn pos(x: i32, z: i32) -> BlockPos {
        BlockPos::new(WorldId(0), x, 64, z)
    }

    fn farmland(field: &mut MemoryField, soil: Soil) {
        for x in -2..=2 {
            for z in -2..=2 {
                field.set_soil(pos(x, z).below(), soil);
            }
        }
    }

    #[test]
    fn test_lone_crop_on_wet_field() {
        let mut field = MemoryField::new();
        farmland(&mut field, Soil::wet());
        field.plant(pos(0, 0), CropKind(1), 7);
        // 1 + 3 + 8 * 0.75
        assert_eq!(growth_points(&field, pos(0, 0)), 10.0);
    }

    #[test]
    fn test_dry_field() {
        let mut field = MemoryField::new();
        farmland(&mut field, Soil::dry());
        field.plant(pos(0, 0), CropKind(1), 7);
        // 1 + 1 + 8 * 0.25
        assert_eq!(growth_points(&field, pos(0, 0)), 4.0);
    }

    #[test]
    fn test_diagonal_neighbour_halves() {
        let mut field = MemoryField::new();
        farmland(&mut field, Soil::wet());
        field.plant(pos(0, 0), CropKind(1), 7);
        field.plant(pos(1, 1), CropKind(1), 7);
        assert_eq!(growth_points(&field, pos(0, 0)), 5.0);
    }

    #[test]
    fn test_single_row_is_not_crowded() {
        let mut field = MemoryField::new();
        farmland(&mut field, Soil::wet());
        for x in -1..=1 {
            field.plant(pos(x, 0), CropKind(1), 7);
        }
        field.plant(pos(0, 1), CropKind(2), 7);
        assert_eq!(growth_points(&field, pos(0, 0)), 10.0);

        field.plant(pos(0, 1), CropKind(1), 7);
        assert_eq!(growth_points(&field, pos(0, 0)), 5.0);
    }

    #[test]
    fn test_growth_chance() {
        assert!((growth_chance(10.0, 25.0) - 1.0 / 3.0).abs() < 1e-12);
        assert!((growth_chance(5.0, 25.0) - 1.0 / 6.0).abs() < 1e-12);
        // Degenerate points floor at 1
        assert!((growth_chance(0.0, 25.0) - 1.0 / 26.0).abs() < 1e-12);
    }
}
