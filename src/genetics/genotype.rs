//! Genotype - one gene pair per trait plus the display-only identified flag

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::core::error::Result;
use crate::genetics::gene_pair::GenePair;
use crate::genetics::trait_kind::Trait;

/// Full genome of one seed or crop
///
/// `identified` only controls what a player is shown; it never changes
/// mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Genotype {
    pairs: [GenePair; 6],
    pub identified: bool,
}

impl Genotype {
    /// Neutral pair on every trait, unidentified
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn pair(&self, t: Trait) -> GenePair {
        self.pairs[t as usize]
    }

    pub fn set_pair(&mut self, t: Trait, pair: GenePair) {
        self.pairs[t as usize] = pair;
    }

    /// Builder-style [`Genotype::set_pair`]
    pub fn with_pair(mut self, t: Trait, pair: GenePair) -> Self {
        self.set_pair(t, pair);
        self
    }

    pub fn with_identified(mut self, identified: bool) -> Self {
        self.identified = identified;
        self
    }

    pub fn score(&self, t: Trait) -> f64 {
        self.pair(t).phenotype_score()
    }

    /// Iterate `(trait, pair)` in canonical trait order
    pub fn iter(&self) -> impl Iterator<Item = (Trait, GenePair)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self.pair(t)))
    }

    /// Mean phenotype score across all traits
    pub fn mean_score(&self) -> f64 {
        let total: f64 = self.iter().map(|(_, p)| p.phenotype_score()).sum();
        total / Trait::ALL.len() as f64
    }

    /// Overall star rating 1..=5 from the mean phenotype score
    pub fn star_rating(&self) -> u8 {
        let mean = self.mean_score();
        if mean >= 8.0 {
            5
        } else if mean >= 6.0 {
            4
        } else if mean >= 4.0 {
            3
        } else if mean >= 3.0 {
            2
        } else {
            1
        }
    }

    /// Chunk text fields: `ID=1,GROWTH_SPEED=A1:a1,...`
    pub fn encode_fields(&self) -> String {
        let mut out = format!("ID={}", u8::from(self.identified));
        for (t, pair) in self.iter() {
            let _ = write!(
                out,
                ",{}={}:{}",
                t.key(),
                t.allele_code(pair.first()),
                t.allele_code(pair.second())
            );
        }
        out
    }

    /// JSON tag for item-local storage
    pub fn to_item_tag(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an item tag; absent or unreadable tags mean a plain seed
    pub fn from_item_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::neutral();
        };
        serde_json::from_str(tag).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable gene tag: {}", e);
            Self::neutral()
        })
    }

    /// One-line diagnostic, e.g. for a seed analyzer readout
    pub fn summary(&self) -> String {
        if !self.identified {
            return "Unidentified seed".to_string();
        }
        let stars: String = (0..5)
            .map(|i| if i < self.star_rating() { '★' } else { '☆' })
            .collect();
        let mut out = stars;
        for (t, pair) in self.iter() {
            let score = pair.phenotype_score();
            let _ = write!(out, " | {} {} {:+}", t.display_name(), pair.display(t), score);
            if let Some(adjective) = t.adjective(score) {
                let _ = write!(out, " ({})", adjective);
            }
        }
        out
    }
}
