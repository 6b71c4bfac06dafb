//! Growth efficiency - additive composition onto a baseline of 1.0
//!
//! | term | value |
//! |------|-------|
//! | fertility | `clamp(f, -100, 100) * 0.005` |
//! | soil tolerance | `0.01 * C * (1 - C / 2R)`, `R = max(1, score * 40)` |
//! | growth speed | `score / 8` |
//! | temperature | `-max(0, 0.01 * abs(T - 20) - score / 20)` |
//! | biome, locale | external providers, 0.0 on failure |
//!
//! Below 1.0 the scheduler throttles the host's growth stream, above 1.0 it
//! tops it up.

use std::fmt;

use thiserror::Error;

use crate::core::config::EfficiencyConfig;
use crate::core::types::BlockPos;
use crate::genetics::{Genotype, Trait};

/// Failure of an external bonus lookup
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BonusError {
    #[error("bonus provider unavailable")]
    Unavailable,

    #[error("bonus lookup failed: {0}")]
    Failed(String),
}

/// External additive efficiency contribution keyed by crop position
pub trait BonusProvider {
    fn bonus(&self, pos: BlockPos) -> Result<f64, BonusError>;
}

impl<F> BonusProvider for F
where
    F: Fn(BlockPos) -> Result<f64, BonusError>,
{
    fn bonus(&self, pos: BlockPos) -> Result<f64, BonusError> {
        self(pos)
    }
}

/// Every named contribution plus the sum
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EfficiencyBreakdown {
    pub fertility_bonus: f64,
    /// `1.0 + fertility_bonus`
    pub base_efficiency: f64,
    pub resistance_bonus: f64,
    pub growth_bonus: f64,
    /// Subtracted from the total; never negative
    pub temperature_penalty: f64,
    pub biome_bonus: f64,
    pub locale_bonus: f64,
    pub total: f64,
}

/// Inputs for one crop at one instant
#[derive(Debug, Clone, Copy)]
pub struct EfficiencyInput<'a> {
    pub crop: BlockPos,
    pub fertility: i32,
    pub concentration: f64,
    pub genotype: &'a Genotype,
    pub temperature: Option<f64>,
}

pub struct EfficiencyCalculator {
    config: EfficiencyConfig,
    biome: Option<Box<dyn BonusProvider>>,
    locale: Option<Box<dyn BonusProvider>>,
}

impl fmt::Debug for EfficiencyCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EfficiencyCalculator")
            .field("config", &self.config)
            .field("biome", &self.biome.is_some())
            .field("locale", &self.locale.is_some())
            .finish()
    }
}

impl EfficiencyCalculator {
    pub fn new(config: EfficiencyConfig) -> Self {
        Self {
            config,
            biome: None,
            locale: None,
        }
    }

    pub fn set_biome_provider(&mut self, provider: Option<Box<dyn BonusProvider>>) {
        self.biome = provider;
    }

    pub fn set_locale_provider(&mut self, provider: Option<Box<dyn BonusProvider>>) {
        self.locale = provider;
    }

    pub fn fertility_bonus(&self, fertility: i32) -> f64 {
        let clamp = self.config.fertility_clamp.max(0);
        fertility.clamp(-clamp, clamp) as f64 * self.config.fertility_factor
    }

    /// Concentration the genotype tolerates best, at least 1.0
    pub fn resistance(&self, genotype: &Genotype) -> f64 {
        (genotype.score(Trait::SoilTolerance) * self.config.resistance_scale).max(1.0)
    }

    /// Concave in concentration: zero at 0, peak at `R`, negative beyond `2R`
    pub fn resistance_bonus(concentration: f64, resistance: f64) -> f64 {
        let resistance = resistance.max(1.0);
        0.01 * concentration * (1.0 - concentration / (2.0 * resistance))
    }

    pub fn growth_bonus(&self, genotype: &Genotype) -> f64 {
        genotype.score(Trait::GrowthSpeed) / self.config.growth_speed_divisor
    }

    /// Penalty for ambient temperature away from the reference, reduced by
    /// temperature tolerance; zero when the host has no temperature
    pub fn temperature_penalty(&self, genotype: &Genotype, temperature: Option<f64>) -> f64 {
        let Some(temperature) = temperature.filter(|t| t.is_finite()) else {
            return 0.0;
        };
        let deviation = (temperature - self.config.reference_temperature).abs();
        let raw = deviation * self.config.temperature_penalty_per_degree;
        let relief = genotype.score(Trait::TemperatureTolerance) / self.config.tolerance_divisor;
        (raw - relief).max(0.0)
    }

    /// Query a provider; absence, errors and non-finite values all read 0.0
    fn external(provider: Option<&dyn BonusProvider>, pos: BlockPos, name: &str) -> f64 {
        let Some(provider) = provider else {
            return 0.0;
        };
        match provider.bonus(pos) {
            Ok(bonus) if bonus.is_finite() => bonus,
            Ok(bonus) => {
                tracing::debug!("Ignoring non-finite {} bonus {} at {}", name, bonus, pos);
                0.0
            }
            Err(e) => {
                tracing::debug!("{} bonus unavailable at {}: {}", name, pos, e);
                0.0
            }
        }
    }

    pub fn breakdown(&self, input: &EfficiencyInput<'_>) -> EfficiencyBreakdown {
        let fertility_bonus = self.fertility_bonus(input.fertility);
        let base_efficiency = 1.0 + fertility_bonus;
        let resistance_bonus =
            Self::resistance_bonus(input.concentration, self.resistance(input.genotype));
        let growth_bonus = self.growth_bonus(input.genotype);
        let temperature_penalty = self.temperature_penalty(input.genotype, input.temperature);
        let biome_bonus = Self::external(self.biome.as_deref(), input.crop, "biome");
        let locale_bonus = Self::external(self.locale.as_deref(), input.crop, "locale");

        EfficiencyBreakdown {
            fertility_bonus,
            base_efficiency,
            resistance_bonus,
            growth_bonus,
            temperature_penalty,
            biome_bonus,
            locale_bonus,
            total: base_efficiency + resistance_bonus + growth_bonus - temperature_penalty
                + biome_bonus
                + locale_bonus,
        }
    }

    pub fn efficiency(&self, input: &EfficiencyInput<'_>) -> f64 {
        self.breakdown(input).total
    }
}

impl Default for EfficiencyCalculator {
    fn default() -> Self {
        Self::new(EfficiencyConfig::default())
    }
}
