//! Growth efficiency and the active growth scheduler

pub mod efficiency;
pub mod points;
pub mod scheduler;

pub use efficiency::{BonusError, BonusProvider, EfficiencyBreakdown, EfficiencyCalculator, EfficiencyInput};
pub use points::{growth_chance, growth_points};
pub use scheduler::{roll_catch_up, throttle, GrowthDecision, GrowthScheduler};
