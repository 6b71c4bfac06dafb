//! Farming configuration with documented constants
//!
//! All magic numbers of the fertility model, the efficiency formula and the
//! growth scheduler are collected here. Every section deserializes from TOML
//! with per-field defaults, so a config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{FarmError, Result};

/// Top-level configuration handed to [`crate::simulation::FarmSimulation`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmingConfig {
    pub fertility: FertilityConfig,
    pub efficiency: EfficiencyConfig,
    pub genetics: GeneticsConfig,
    pub scheduler: SchedulerConfig,
    pub fertilizer: FertilizerConfig,
    pub consumption: ConsumptionConfig,
}

/// Soil fertility and fertilizer concentration model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilityConfig {
    /// Resting cap for base fertility without fertilizer
    pub max_base: i32,

    /// Floor for base fertility; overdosed soil decays toward it
    pub min_base: i32,

    /// Fertility of freshly tilled soil
    pub initial: i32,

    /// Recovery target while fertilizer is present but below the toxic threshold
    ///
    /// Moderate fertilizer use unlocks headroom above `max_base`.
    pub bonus_ceiling: i32,

    /// Linear concentration decay per second of moist soil
    ///
    /// At 1/60, one unit of concentration disappears per minute.
    pub concentration_decay_per_sec: f64,

    /// Average concentration at or below which fertilizer accelerates recovery
    pub safe_threshold: f64,

    /// Average concentration at or above which the bonus ceiling is withdrawn
    pub toxic_threshold: f64,

    /// Recovery rate constant of untreated soil (per second)
    pub k_base: f64,

    /// Extra recovery rate per unit of average concentration (safe range)
    ///
    /// At 0.0001, a concentration of 100 adds 0.01, five times `k_base`.
    pub k_bonus_per_unit: f64,

    /// Penalty slope per unit of concentration above the safe threshold
    ///
    /// Twice the bonus slope: overdosing by 56 units cancels the whole
    /// safe-range rate and the dynamic flips from recovery to decay.
    pub k_penalty_per_unit: f64,

    /// Fertility above which external drop systems get a bonus
    pub drop_bonus_threshold: i32,

    /// Drop bonus per fertility point above `drop_bonus_threshold`
    pub drop_bonus_per_point: f64,
}

impl Default for FertilityConfig {
    fn default() -> Self {
        Self {
            max_base: 100,
            min_base: -100,
            initial: 0,
            bonus_ceiling: 150,
            concentration_decay_per_sec: 1.0 / 60.0,
            safe_threshold: 100.0,
            toxic_threshold: 200.0,
            k_base: 0.002,
            k_bonus_per_unit: 0.0001,
            k_penalty_per_unit: 0.0002,
            drop_bonus_threshold: 100,
            drop_bonus_per_point: 0.002,
        }
    }
}

/// Growth efficiency composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyConfig {
    /// Efficiency per point of (clamped) fertility
    pub fertility_factor: f64,

    /// Fertility is clamped to +/- this value before scaling
    pub fertility_clamp: i32,

    /// Soil-tolerance phenotype score to resistance scale
    pub resistance_scale: f64,

    /// Growth-speed phenotype score divisor
    pub growth_speed_divisor: f64,

    /// Ambient temperature with no penalty (Celsius)
    pub reference_temperature: f64,

    /// Penalty per degree of deviation from the reference
    pub temperature_penalty_per_degree: f64,

    /// Temperature-tolerance phenotype score divisor for the penalty reduction
    pub tolerance_divisor: f64,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            fertility_factor: 0.005,
            fertility_clamp: 100,
            resistance_scale: 40.0,
            growth_speed_divisor: 8.0,
            reference_temperature: 20.0,
            temperature_penalty_per_degree: 0.01,
            tolerance_divisor: 20.0,
        }
    }
}

/// Inheritance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticsConfig {
    /// Per-allele mutation probability during hybridization
    pub mutation_rate: f64,
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self { mutation_rate: 0.05 }
    }
}

/// Active growth scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Host ticks between acceleration passes
    ///
    /// 5 ticks (0.25s) is fast enough to look random while running the
    /// pass a fifth as often as every tick.
    pub period_ticks: u64,

    /// Cells per random-tick section; one section is 16x16x16
    pub section_volume: f64,

    /// Constant in the host's growth chance `1 / (floor(N / g) + 1)`
    pub growth_points_numerator: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_ticks: 5,
            section_volume: 4096.0,
            growth_points_numerator: 25.0,
        }
    }
}

/// Concentration added per fertilizer application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilizerConfig {
    pub organic: f64,
    pub chemical: f64,
}

impl Default for FertilizerConfig {
    fn default() -> Self {
        Self {
            organic: 20.0,
            chemical: 50.0,
        }
    }
}

/// Base fertility cost of farming operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionConfig {
    /// Charged on every accepted growth stage
    pub growth: i32,
    /// Charged when a mature crop is harvested
    pub harvest: i32,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            growth: 2,
            harvest: 15,
        }
    }
}

impl FarmingConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FarmingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let f = &self.fertility;
        if f.min_base >= f.max_base || f.max_base > f.bonus_ceiling {
            return Err(FarmError::InvalidConfig(format!(
                "expected min_base ({}) < max_base ({}) <= bonus_ceiling ({})",
                f.min_base, f.max_base, f.bonus_ceiling
            )));
        }
        if f.initial < f.min_base || f.initial > f.max_base {
            return Err(FarmError::InvalidConfig(format!(
                "initial fertility ({}) outside [{}, {}]",
                f.initial, f.min_base, f.max_base
            )));
        }
        // The binary format stores fertility in one byte
        if f.min_base < -105 || f.bonus_ceiling > 150 {
            return Err(FarmError::InvalidConfig(
                "fertility range must fit in [-105, 150]".into(),
            ));
        }
        if f.safe_threshold >= f.toxic_threshold {
            return Err(FarmError::InvalidConfig(format!(
                "safe_threshold ({}) should be < toxic_threshold ({})",
                f.safe_threshold, f.toxic_threshold
            )));
        }
        if !positive(f.concentration_decay_per_sec) || !(f.k_base.is_finite() && f.k_base >= 0.0) {
            return Err(FarmError::InvalidConfig(format!(
                "decay ({}) must be positive and k_base ({}) non-negative",
                f.concentration_decay_per_sec, f.k_base
            )));
        }
        let e = &self.efficiency;
        if !positive(e.growth_speed_divisor) || !positive(e.tolerance_divisor) {
            return Err(FarmError::InvalidConfig(format!(
                "divisors must be positive, got {} and {}",
                e.growth_speed_divisor, e.tolerance_divisor
            )));
        }
        if e.fertility_clamp < 0 {
            return Err(FarmError::InvalidConfig(format!(
                "fertility_clamp ({}) must not be negative",
                e.fertility_clamp
            )));
        }
        if !e.fertility_factor.is_finite() {
            return Err(FarmError::InvalidConfig("fertility_factor must be finite".into()));
        }
        if !(0.0..=1.0).contains(&self.genetics.mutation_rate) {
            return Err(FarmError::InvalidConfig(format!(
                "mutation_rate ({}) outside [0, 1]",
                self.genetics.mutation_rate
            )));
        }
        if self.scheduler.period_ticks == 0 || !positive(self.scheduler.section_volume) {
            return Err(FarmError::InvalidConfig(
                "scheduler period and section volume must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

/// Finite and strictly greater than zero
fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
