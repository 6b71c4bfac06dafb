//! Fertility recovery model
//!
//! Pure projections of a stored [`FertilityRecord`] to a later time. Nothing
//! here mutates state; the store settles records by writing a projection back.
//!
//! While the soil is moist:
//! - concentration decays linearly
//! - fertility converges exponentially on a target, with rate and target set
//!   by the average concentration over the interval
//!
//! While dry, both are frozen.

use crate::core::config::FertilityConfig;
use crate::core::types::Timestamp;
use crate::fertility::record::FertilityRecord;

/// Settled values of a record at some instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fertility: i32,
    pub concentration: f64,
}

/// Seconds of moist time between the record's last update and `now`
fn elapsed_secs(record: &FertilityRecord, now: Timestamp, wet: bool) -> Option<f64> {
    if !wet || now <= record.last_update {
        return None;
    }
    Some((now - record.last_update) as f64 / 1000.0)
}

/// Concentration after `dt` seconds of linear decay, floored at zero
fn decayed(concentration: f64, dt: f64, config: &FertilityConfig) -> f64 {
    (concentration - config.concentration_decay_per_sec * dt).max(0.0)
}

/// Rate constant and target for a given average concentration
///
/// A negative rate means overdosed soil decaying toward the floor.
pub fn recovery_rate(avg_concentration: f64, config: &FertilityConfig) -> (f64, i32) {
    let k = if avg_concentration <= config.safe_threshold {
        config.k_base + avg_concentration * config.k_bonus_per_unit
    } else {
        let excess = avg_concentration - config.safe_threshold;
        config.k_base + config.safe_threshold * config.k_bonus_per_unit
            - excess * config.k_penalty_per_unit
    };
    let target = if avg_concentration > 0.0 && avg_concentration < config.toxic_threshold {
        config.bonus_ceiling
    } else {
        config.max_base
    };
    (k, target)
}

/// `target - trunc((target - current) * e^(-k t))`
fn converge(current: i32, target: i32, k: f64, t: f64) -> i32 {
    if current == target {
        return current;
    }
    let deficit = (target - current) as f64;
    target - (deficit * (-k * t).exp()) as i32
}

/// Concentration at `now`
pub fn concentration_at(
    record: &FertilityRecord,
    now: Timestamp,
    wet: bool,
    config: &FertilityConfig,
) -> f64 {
    match elapsed_secs(record, now, wet) {
        Some(dt) => decayed(record.concentration, dt, config),
        None => record.concentration,
    }
}

/// Fertility at `now`
pub fn fertility_at(
    record: &FertilityRecord,
    now: Timestamp,
    wet: bool,
    config: &FertilityConfig,
) -> i32 {
    let Some(dt) = elapsed_secs(record, now, wet) else {
        return record.base_fertility;
    };

    let end = decayed(record.concentration, dt, config);
    let avg = (record.concentration + end) / 2.0;
    let (k, target) = recovery_rate(avg, config);

    let current = if k >= 0.0 {
        converge(record.base_fertility, target, k, dt)
    } else {
        converge(record.base_fertility, config.min_base, -k, dt)
    };
    current.max(config.min_base)
}

/// Both values at `now`
pub fn project(
    record: &FertilityRecord,
    now: Timestamp,
    wet: bool,
    config: &FertilityConfig,
) -> Projection {
    Projection {
        fertility: fertility_at(record, now, wet, config),
        concentration: concentration_at(record, now, wet, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> FertilityConfig {
        FertilityConfig::default()
    }

    fn record(base_fertility: i32, concentration: f64) -> FertilityRecord {
        FertilityRecord {
            base_fertility,
            concentration,
            last_update: 0,
        }
    }

    const MINUTE: Timestamp = 60_000;
    const HOUR: Timestamp = 60 * MINUTE;

    #[test]
    fn test_rate_in_safe_range() {
        let (k, target) = recovery_rate(0.0, &config());
        assert!((k - 0.002).abs() < 1e-12);
        assert_eq!(target, 100);

        let (k, target) = recovery_rate(100.0, &config());
        assert!((k - 0.012).abs() < 1e-12);
        assert_eq!(target, 150);
    }

    #[test]
    fn test_rate_turns_negative_when_overdosed() {
        // 0.012 - 60 * 0.0002 = 0
        let (k, _) = recovery_rate(160.0, &config());
        assert!(k.abs() < 1e-12);
        let (k, target) = recovery_rate(250.0, &config());
        assert!(k < 0.0);
        assert_eq!(target, 100);
    }

    #[test]
    fn test_dry_soil_is_frozen() {
        let r = record(-40, 30.0);
        let p = project(&r, HOUR, false, &config());
        assert_eq!(p, Projection { fertility: -40, concentration: 30.0 });
    }

    #[test]
    fn test_concentration_decays_one_per_minute() {
        let r = record(0, 30.0);
        let c = concentration_at(&r, 10 * MINUTE, true, &config());
        assert!((c - 20.0).abs() < 1e-9);
        assert_eq!(concentration_at(&r, HOUR, true, &config()), 0.0);
    }

    #[test]
    fn test_unfertilized_soil_recovers_toward_cap() {
        let r = record(-100, 0.0);
        // k = 0.002 over ten minutes: e^-1.2 of the 200 point deficit remains
        assert_eq!(fertility_at(&r, 10 * MINUTE, true, &config()), 40);
        assert_eq!(fertility_at(&r, HOUR, true, &config()), 100);
    }

    #[test]
    fn test_fertilizer_raises_target_to_bonus_ceiling() {
        let r = record(100, 100.0);
        let f = fertility_at(&r, 10 * MINUTE, true, &config());
        assert!(f > 100 && f <= 150, "got {}", f);
    }

    #[test]
    fn test_overdose_decays_toward_floor() {
        let r = record(50, 1000.0);
        let f = fertility_at(&r, 10 * MINUTE, true, &config());
        assert!(f < 50, "got {}", f);
        assert!(f >= -100);
    }

    #[test]
    fn test_time_before_last_update_changes_nothing() {
        let r = FertilityRecord {
            base_fertility: 12,
            concentration: 5.0,
            last_update: 10_000,
        };
        assert_eq!(fertility_at(&r, 5_000, true, &config()), 12);
        assert_eq!(concentration_at(&r, 5_000, true, &config()), 5.0);
    }

    proptest! {
        #[test]
        fn prop_fertility_stays_in_bounds(
            base in -100i32..=150,
            concentration in 0.0f64..2000.0,
            elapsed in 0u64..(48 * HOUR),
            wet in any::<bool>(),
        ) {
            let f = fertility_at(&record(base, concentration), elapsed, wet, &config());
            prop_assert!((-100..=150).contains(&f), "fertility {}", f);
        }

        #[test]
        fn prop_moist_concentration_never_increases(
            concentration in 0.0f64..500.0,
            t1 in 0u64..(24 * HOUR),
            dt in 0u64..(24 * HOUR),
        ) {
            let r = record(0, concentration);
            let c1 = concentration_at(&r, t1, true, &config());
            let c2 = concentration_at(&r, t1 + dt, true, &config());
            prop_assert!(c2 <= c1);
            prop_assert!(c2 >= 0.0);
        }
    }
}
