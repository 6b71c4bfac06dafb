//! Genetics engine - randomizer, hybridizer and yield derivations
//!
//! All operations are total: every input produces a genotype, nothing fails.
//! Randomness always comes from the caller's RNG so runs are reproducible.

use rand::Rng;

use crate::core::config::GeneticsConfig;
use crate::genetics::allele::Allele;
use crate::genetics::gene_pair::GenePair;
use crate::genetics::genotype::Genotype;
use crate::genetics::trait_kind::Trait;

/// Loot-table band for one randomized trait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    /// 60%: the neutral pair
    Neutral,
    /// 20%: one allele one rung away from neutral
    Mild,
    /// 15%: one allele two rungs away
    Strong,
    /// 5%: one allele pushed to tier 4, sometimes both
    Extreme,
}

impl Deviation {
    /// Map a uniform roll in [0, 1) onto the weighted table
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.60 {
            Deviation::Neutral
        } else if roll < 0.80 {
            Deviation::Mild
        } else if roll < 0.95 {
            Deviation::Strong
        } else {
            Deviation::Extreme
        }
    }

    fn rungs(self) -> isize {
        match self {
            Deviation::Neutral => 0,
            Deviation::Mild => 1,
            Deviation::Strong => 2,
            Deviation::Extreme => 3,
        }
    }
}

/// Chance that an extreme roll comes out homozygous
const EXTREME_HOMOZYGOUS_CHANCE: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct GeneticsEngine {
    config: GeneticsConfig,
}

impl GeneticsEngine {
    pub fn new(config: GeneticsConfig) -> Self {
        Self { config }
    }

    /// Default per-allele mutation rate
    pub fn mutation_rate(&self) -> f64 {
        self.config.mutation_rate
    }

    /// Draw a gene pair from the loot table
    pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> GenePair {
        let deviation = Deviation::from_roll(rng.gen::<f64>());
        if deviation == Deviation::Neutral {
            return GenePair::neutral();
        }

        // Upward deviations push the dominant allele, downward ones the recessive
        let upward = rng.gen_bool(0.5);
        let steps = if upward { deviation.rungs() } else { -deviation.rungs() };
        let (moved, kept) = if upward {
            (Allele::Dominant1.shifted(steps), Allele::Recessive1)
        } else {
            (Allele::Recessive1.shifted(steps), Allele::Dominant1)
        };

        if deviation == Deviation::Extreme && rng.gen_bool(EXTREME_HOMOZYGOUS_CHANCE) {
            GenePair::homozygous(moved)
        } else {
            GenePair::new(moved, kept)
        }
    }

    /// Populate every trait of `target` from the loot table
    ///
    /// The identified flag is left untouched.
    pub fn randomize<R: Rng + ?Sized>(&self, target: &mut Genotype, rng: &mut R) {
        for t in Trait::ALL {
            target.set_pair(t, Self::random_pair(rng));
        }
    }

    /// Fresh randomized genotype, unidentified
    pub fn random_genotype<R: Rng + ?Sized>(&self, rng: &mut R) -> Genotype {
        let mut genotype = Genotype::neutral();
        self.randomize(&mut genotype, rng);
        genotype
    }

    /// One allele after a mutation check: with probability `rate` it moves one
    /// rung up or down (even odds), saturating at the ladder ends
    pub fn mutate<R: Rng + ?Sized>(allele: Allele, rate: f64, rng: &mut R) -> Allele {
        if !(rate > 0.0) || !rng.gen_bool(rate.min(1.0)) {
            return allele;
        }
        if rng.gen_bool(0.5) {
            allele.step_up()
        } else {
            allele.step_down()
        }
    }

    /// Cross two parents trait by trait
    ///
    /// Each parent contributes one uniformly chosen allele per trait, each
    /// drawn allele then mutates independently. Offspring are never
    /// identified.
    pub fn hybridize<R: Rng + ?Sized>(
        &self,
        parent_a: &Genotype,
        parent_b: &Genotype,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Genotype {
        let mut child = Genotype::neutral();
        for t in Trait::ALL {
            let from_a = parent_a.pair(t).alleles()[rng.gen_range(0..2)];
            let from_b = parent_b.pair(t).alleles()[rng.gen_range(0..2)];
            let from_a = Self::mutate(from_a, mutation_rate, rng);
            let from_b = Self::mutate(from_b, mutation_rate, rng);
            child.set_pair(t, GenePair::new(from_a, from_b));
        }
        child.identified = false;
        child
    }

    /// `hybridize(parent, parent, rate)`
    pub fn self_pollinate<R: Rng + ?Sized>(
        &self,
        parent: &Genotype,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Genotype {
        self.hybridize(parent, parent, mutation_rate, rng)
    }

    /// Harvest multiplier from the yield trait: 1.0 unless the score is
    /// positive, then `1 + score / 10`
    pub fn yield_multiplier(genotype: &Genotype) -> f64 {
        Self::multiplier_for_score(genotype.score(Trait::Yield))
    }

    /// Yield multiplier for a raw phenotype score
    pub fn multiplier_for_score(score: f64) -> f64 {
        if !(score > 0.0) {
            1.0
        } else {
            1.0 + score / 10.0
        }
    }

    /// Extra produce for a mature harvest
    ///
    /// The part of the multiplier above 1.0 is consumed in slices of at most
    /// 1.0; each slice awards one item with probability `slice / 2`.
    pub fn roll_bonus_yield<R: Rng + ?Sized>(genotype: &Genotype, rng: &mut R) -> u32 {
        let mut remaining = Self::yield_multiplier(genotype) - 1.0;
        let mut extra = 0;
        while remaining > 0.0 {
            let slice = remaining.min(1.0);
            if rng.gen::<f64>() < slice / 2.0 {
                extra += 1;
            }
            remaining -= slice;
        }
        extra
    }

    /// Seed analyzer: wild seeds without gene data are randomized first, the
    /// result is always identified
    pub fn analyze<R: Rng + ?Sized>(&self, seed: Option<Genotype>, rng: &mut R) -> Genotype {
        let mut genotype = match seed {
            Some(genotype) => genotype,
            None => self.random_genotype(rng),
        };
        genotype.identified = true;
        genotype
    }
}

impl Default for GeneticsEngine {
    fn default() -> Self {
        Self::new(GeneticsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn with_yield(pair: GenePair) -> Genotype {
        Genotype::neutral().with_pair(Trait::Yield, pair)
    }

    #[test]
    fn test_deviation_table() {
        assert_eq!(Deviation::from_roll(0.0), Deviation::Neutral);
        assert_eq!(Deviation::from_roll(0.59), Deviation::Neutral);
        assert_eq!(Deviation::from_roll(0.6), Deviation::Mild);
        assert_eq!(Deviation::from_roll(0.85), Deviation::Strong);
        assert_eq!(Deviation::from_roll(0.97), Deviation::Extreme);
    }

    #[test]
    fn test_random_pair_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let samples = 20_000;
        let neutral = (0..samples)
            .filter(|_| GeneticsEngine::random_pair(&mut rng) == GenePair::neutral())
            .count();
        let share = neutral as f64 / samples as f64;
        assert!((share - 0.60).abs() < 0.02, "neutral share {}", share);
    }

    #[test]
    fn test_random_pair_scores_by_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..5_000 {
            let score = GeneticsEngine::random_pair(&mut rng).phenotype_score();
            // neutral 0, mild +/-2, strong +/-4, extreme +/-6 or homozygous +/-8
            assert!(
                [0.0, 2.0, 4.0, 6.0, 8.0].contains(&score.abs()),
                "unexpected score {}",
                score
            );
        }
    }

    #[test]
    fn test_randomize_keeps_identified_flag() {
        let engine = GeneticsEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut g = Genotype::neutral().with_identified(true);
        engine.randomize(&mut g, &mut rng);
        assert!(g.identified);
    }

    #[test]
    fn test_mutation_never_fires_at_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for allele in Allele::LADDER {
            for _ in 0..200 {
                assert_eq!(GeneticsEngine::mutate(allele, 0.0, &mut rng), allele);
            }
        }
    }

    #[test]
    fn test_mutation_at_one_moves_one_rung() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let m = GeneticsEngine::mutate(Allele::Dominant2, 1.0, &mut rng);
            assert!(m == Allele::Dominant1 || m == Allele::Dominant3);
        }
    }

    #[test]
    fn test_mutation_saturates_at_ends() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..200 {
            let m = GeneticsEngine::mutate(Allele::Dominant4, 1.0, &mut rng);
            assert!(m == Allele::Dominant4 || m == Allele::Dominant3);
        }
    }

    #[test]
    fn test_offspring_unidentified() {
        let engine = GeneticsEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let parent = Genotype::neutral().with_identified(true);
        assert!(!engine.hybridize(&parent, &parent, 0.5, &mut rng).identified);
    }

    #[test]
    fn test_hybrid_draws_one_allele_from_each_parent() {
        let engine = GeneticsEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let a = with_yield(GenePair::homozygous(Allele::Dominant4));
        let b = with_yield(GenePair::homozygous(Allele::Recessive4));
        for _ in 0..100 {
            let child = engine.hybridize(&a, &b, 0.0, &mut rng);
            assert_eq!(
                child.pair(Trait::Yield),
                GenePair::new(Allele::Dominant4, Allele::Recessive4)
            );
        }
    }

    #[test]
    fn test_yield_multiplier() {
        // (D4 + D1) * 2 = 10
        assert_eq!(
            GeneticsEngine::yield_multiplier(&with_yield(GenePair::new(Allele::Dominant4, Allele::Dominant1))),
            2.0
        );
        // (D1 + R4) * 2 = -6
        assert_eq!(
            GeneticsEngine::yield_multiplier(&with_yield(GenePair::new(Allele::Dominant1, Allele::Recessive4))),
            1.0
        );
        assert_eq!(GeneticsEngine::yield_multiplier(&Genotype::neutral()), 1.0);
    }

    #[test]
    fn test_bonus_yield_needs_positive_score() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(GeneticsEngine::roll_bonus_yield(&Genotype::neutral(), &mut rng), 0);
        }
    }

    #[test]
    fn test_bonus_yield_expectation() {
        // multiplier 2.0: one full slice, expected 0.5 extra items
        let g = with_yield(GenePair::new(Allele::Dominant4, Allele::Dominant1));
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let trials = 20_000;
        let total: u32 = (0..trials)
            .map(|_| GeneticsEngine::roll_bonus_yield(&g, &mut rng))
            .sum();
        let mean = total as f64 / trials as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean {}", mean);
    }

    #[test]
    fn test_analyze_randomizes_wild_seed() {
        let engine = GeneticsEngine::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let known = Genotype::neutral();
        assert_eq!(engine.analyze(Some(known), &mut rng), known.with_identified(true));
        assert!(engine.analyze(None, &mut rng).identified);
    }
}
