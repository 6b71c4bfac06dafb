//! Allele ladder - the eight discrete heritable values of one trait
//!
//! The ladder is totally ordered from `Recessive4` to `Dominant4`. Mutation
//! moves one rung at a time and saturates at both ends.

use serde::{Deserialize, Serialize};

/// One rung of the allele ladder
///
/// Declaration order is ladder order, so the derived `Ord` matches `value()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Allele {
    Recessive4,
    Recessive3,
    Recessive2,
    Recessive1,
    Dominant1,
    Dominant2,
    Dominant3,
    Dominant4,
}

impl Allele {
    /// All alleles in ladder order
    pub const LADDER: [Allele; 8] = [
        Allele::Recessive4,
        Allele::Recessive3,
        Allele::Recessive2,
        Allele::Recessive1,
        Allele::Dominant1,
        Allele::Dominant2,
        Allele::Dominant3,
        Allele::Dominant4,
    ];

    /// Signed value: -4..=-1 for recessive tiers, 1..=4 for dominant tiers
    pub fn value(self) -> i32 {
        match self {
            Allele::Recessive4 => -4,
            Allele::Recessive3 => -3,
            Allele::Recessive2 => -2,
            Allele::Recessive1 => -1,
            Allele::Dominant1 => 1,
            Allele::Dominant2 => 2,
            Allele::Dominant3 => 3,
            Allele::Dominant4 => 4,
        }
    }

    /// Tier 1..=4 regardless of direction
    pub fn tier(self) -> u8 {
        self.value().unsigned_abs() as u8
    }

    pub fn is_dominant(self) -> bool {
        self.value() > 0
    }

    /// Position on the ladder, 0 (`Recessive4`) to 7 (`Dominant4`)
    pub fn rung(self) -> usize {
        self as usize
    }

    /// Allele at a ladder position, clamped into range
    pub fn from_rung(rung: isize) -> Self {
        Self::LADDER[rung.clamp(0, 7) as usize]
    }

    /// Build an allele from direction and tier; `None` for tier 0 or > 4
    pub fn from_parts(dominant: bool, tier: u8) -> Option<Self> {
        if !(1..=4).contains(&tier) {
            return None;
        }
        let rung = if dominant {
            3 + tier as isize
        } else {
            4 - tier as isize
        };
        Some(Self::from_rung(rung))
    }

    /// One rung toward the dominant end, saturating at `Dominant4`
    pub fn step_up(self) -> Self {
        Self::from_rung(self.rung() as isize + 1)
    }

    /// One rung toward the recessive end, saturating at `Recessive4`
    pub fn step_down(self) -> Self {
        Self::from_rung(self.rung() as isize - 1)
    }

    /// Move `steps` rungs (negative = toward recessive), saturating
    pub fn shifted(self, steps: isize) -> Self {
        Self::from_rung(self.rung() as isize + steps)
    }
}
