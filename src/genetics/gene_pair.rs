//! GenePair - the two alleles an organism carries for one trait

use serde::{Deserialize, Deserializer, Serialize};

use crate::genetics::allele::Allele;
use crate::genetics::trait_kind::Trait;

/// Unordered allele pair, stored higher allele first
///
/// `GenePair::new(a, b) == GenePair::new(b, a)` and both hash the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GenePair {
    first: Allele,
    second: Allele,
}

impl GenePair {
    pub fn new(a: Allele, b: Allele) -> Self {
        if a >= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// `{Dominant1, Recessive1}`, phenotype score 0
    pub fn neutral() -> Self {
        Self::new(Allele::Dominant1, Allele::Recessive1)
    }

    pub fn homozygous(allele: Allele) -> Self {
        Self::new(allele, allele)
    }

    /// The higher allele
    pub fn first(&self) -> Allele {
        self.first
    }

    /// The lower allele
    pub fn second(&self) -> Allele {
        self.second
    }

    pub fn alleles(&self) -> [Allele; 2] {
        [self.first, self.second]
    }

    pub fn is_heterozygous(&self) -> bool {
        self.first != self.second
    }

    /// Sum of allele values, doubled for heterozygous pairs (hybrid vigor)
    pub fn phenotype_score(&self) -> f64 {
        let sum = (self.first.value() + self.second.value()) as f64;
        if self.is_heterozygous() {
            sum * 2.0
        } else {
            sum
        }
    }

    /// `[A2, a1]`
    pub fn display(&self, t: Trait) -> String {
        format!("[{}, {}]", t.allele_code(self.first), t.allele_code(self.second))
    }
}

impl Default for GenePair {
    fn default() -> Self {
        Self::neutral()
    }
}

// Re-canonicalize on the way in so hand-edited data keeps the invariant
impl<'de> Deserialize<'de> for GenePair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            first: Allele,
            second: Allele,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(GenePair::new(raw.first, raw.second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(pair: &GenePair) -> u64 {
        let mut hasher = DefaultHasher::new();
        pair.hash(&mut hasher);
        hasher.finish()
    }

    fn any_allele() -> impl Strategy<Value = Allele> {
        (0usize..8).prop_map(|i| Allele::LADDER[i])
    }

    proptest! {
        #[test]
        fn prop_pair_is_symmetric(a in any_allele(), b in any_allele()) {
            let ab = GenePair::new(a, b);
            let ba = GenePair::new(b, a);
            prop_assert_eq!(ab, ba);
            prop_assert_eq!(hash_of(&ab), hash_of(&ba));
            prop_assert!(ab.first() >= ab.second());
        }

        #[test]
        fn prop_heterosis_doubles_sum(a in any_allele(), b in any_allele()) {
            let pair = GenePair::new(a, b);
            let sum = (a.value() + b.value()) as f64;
            if a == b {
                prop_assert_eq!(pair.phenotype_score(), sum);
            } else {
                prop_assert_eq!(pair.phenotype_score(), sum * 2.0);
            }
        }
    }

    #[test]
    fn test_neutral_scores_zero() {
        assert_eq!(GenePair::neutral().phenotype_score(), 0.0);
        assert!(GenePair::neutral().is_heterozygous());
    }

    #[test]
    fn test_hybrid_beats_homozygous() {
        // A3 + A2 hybrid outscores A3 + A3
        let hybrid = GenePair::new(Allele::Dominant3, Allele::Dominant2);
        let pure = GenePair::homozygous(Allele::Dominant3);
        assert_eq!(hybrid.phenotype_score(), 10.0);
        assert_eq!(pure.phenotype_score(), 6.0);
    }

    #[test]
    fn test_display() {
        let pair = GenePair::new(Allele::Recessive1, Allele::Dominant2);
        assert_eq!(pair.display(Trait::GrowthSpeed), "[A2, a1]");
    }

    #[test]
    fn test_deserialize_recanonicalizes() {
        let pair: GenePair =
            serde_json::from_str(r#"{"first":"Recessive2","second":"Dominant3"}"#).unwrap();
        assert_eq!(pair.first(), Allele::Dominant3);
        assert_eq!(pair.second(), Allele::Recessive2);
    }
}
