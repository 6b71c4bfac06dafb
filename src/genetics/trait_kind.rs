//! Heritable trait axes
//!
//! Six independent axes. Each has a gene letter used in allele codes:
//! uppercase for dominant alleles, lowercase for recessive ones, followed by
//! the tier digit (`A2` is dominant tier 2 of growth speed, `a1` is
//! recessive tier 1).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::genetics::allele::Allele;

/// One heritable axis; axes are inherited with no linkage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trait {
    GrowthSpeed,
    Yield,
    TemperatureTolerance,
    SoilTolerance,
    Luck,
    Quality,
}

impl Trait {
    /// All traits in canonical order
    pub const ALL: [Trait; 6] = [
        Trait::GrowthSpeed,
        Trait::Yield,
        Trait::TemperatureTolerance,
        Trait::SoilTolerance,
        Trait::Luck,
        Trait::Quality,
    ];

    /// Stable storage name (`GROWTH_SPEED`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Trait::GrowthSpeed => "GROWTH_SPEED",
            Trait::Yield => "YIELD",
            Trait::TemperatureTolerance => "TEMPERATURE_TOLERANCE",
            Trait::SoilTolerance => "SOIL_TOLERANCE",
            Trait::Luck => "LUCK",
            Trait::Quality => "QUALITY",
        }
    }

    /// Gene letter used in allele codes
    pub fn gene_letter(self) -> char {
        match self {
            Trait::GrowthSpeed => 'A',
            Trait::Yield => 'B',
            Trait::TemperatureTolerance => 'C',
            Trait::SoilTolerance => 'D',
            Trait::Luck => 'E',
            Trait::Quality => 'F',
        }
    }

    /// Player-facing name of the morphological feature the trait controls
    pub fn display_name(self) -> &'static str {
        match self {
            Trait::GrowthSpeed => "Vigor",
            Trait::Yield => "Fruit Set",
            Trait::TemperatureTolerance => "Epidermis",
            Trait::SoilTolerance => "Root System",
            Trait::Luck => "Companion Trait",
            Trait::Quality => "Texture",
        }
    }

    /// Adjectives for tiers 1..=4: (positive, negative)
    fn adjectives(self) -> ([&'static str; 4], [&'static str; 4]) {
        match self {
            Trait::GrowthSpeed => (
                ["Sprouting", "Vigorous", "Restless", "Rampant"],
                ["Sluggish", "Dormant", "Stiff", "Petrified"],
            ),
            Trait::Yield => (
                ["Plump", "Heavy", "Brimming", "Bursting"],
                ["Light", "Shriveled", "Hollow", "Dusty"],
            ),
            Trait::TemperatureTolerance => (
                ["Thick-skinned", "Rough", "Downy", "Armored"],
                ["Thin-skinned", "Tender", "Translucent", "Blistered"],
            ),
            Trait::SoilTolerance => (
                ["Sturdy", "Dark", "Greedy", "Gluttonous"],
                ["Frail", "Pale", "Sensitive", "Scorched"],
            ),
            Trait::Luck => (
                ["Glossy", "Crystalline", "Gilded", "Iridescent"],
                ["Dull", "Mottled", "Moldy", "Pitch-black"],
            ),
            Trait::Quality => (
                ["Fragrant", "Honeyed", "Aromatic", "Glowing"],
                ["Astringent", "Bitter", "Rank", "Rotten"],
            ),
        }
    }

    /// Descriptive adjective for a phenotype score, `None` when |score| < 3
    pub fn adjective(self, score: f64) -> Option<&'static str> {
        let abs = score.abs();
        if abs < 3.0 {
            return None;
        }
        let tier = if abs >= 11.0 {
            3
        } else if abs >= 8.0 {
            2
        } else if abs >= 5.0 {
            1
        } else {
            0
        };
        let (positive, negative) = self.adjectives();
        Some(if score > 0.0 { positive[tier] } else { negative[tier] })
    }

    /// Two-character code of an allele for this trait
    pub fn allele_code(self, allele: Allele) -> String {
        let letter = if allele.is_dominant() {
            self.gene_letter()
        } else {
            self.gene_letter().to_ascii_lowercase()
        };
        format!("{}{}", letter, allele.tier())
    }

    /// Parse a code produced by [`Trait::allele_code`]
    ///
    /// The letter must belong to this trait; its case gives the direction.
    pub fn parse_allele_code(self, code: &str) -> Option<Allele> {
        let mut chars = code.chars();
        let letter = chars.next()?;
        let digit = chars.next()?.to_digit(10)?;
        if chars.next().is_some() || letter.to_ascii_uppercase() != self.gene_letter() {
            return None;
        }
        Allele::from_parts(letter.is_ascii_uppercase(), digit as u8)
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Trait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trait::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| format!("unknown trait: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele_codes() {
        assert_eq!(Trait::GrowthSpeed.allele_code(Allele::Dominant2), "A2");
        assert_eq!(Trait::Quality.allele_code(Allele::Recessive4), "f4");
    }

    #[test]
    fn test_allele_code_round_trip() {
        for t in Trait::ALL {
            for allele in Allele::LADDER {
                let code = t.allele_code(allele);
                assert_eq!(t.parse_allele_code(&code), Some(allele));
            }
        }
    }

    #[test]
    fn test_allele_code_rejects_other_trait() {
        assert_eq!(Trait::Yield.parse_allele_code("A2"), None);
        assert_eq!(Trait::Yield.parse_allele_code("B0"), None);
        assert_eq!(Trait::Yield.parse_allele_code("B22"), None);
        assert_eq!(Trait::Yield.parse_allele_code(""), None);
    }

    #[test]
    fn test_trait_key_round_trip() {
        for t in Trait::ALL {
            assert_eq!(t.key().parse::<Trait>(), Ok(t));
        }
        assert!("SPEED".parse::<Trait>().is_err());
    }

    #[test]
    fn test_adjective_thresholds() {
        assert_eq!(Trait::Yield.adjective(2.0), None);
        assert_eq!(Trait::Yield.adjective(4.0), Some("Plump"));
        assert_eq!(Trait::Yield.adjective(6.0), Some("Heavy"));
        assert_eq!(Trait::Yield.adjective(-8.0), Some("Hollow"));
        assert_eq!(Trait::Yield.adjective(14.0), Some("Bursting"));
    }
}
