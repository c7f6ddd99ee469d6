//! StatSource - Trait and implementations for stat providers

mod base_stats;
mod buff;
mod gear;

pub use base_stats::BaseStatsSource;
pub use gear::GearSource;

use crate::stat_block::StatAccumulator;

/// Trait for anything that contributes stats to a StatBlock
pub trait StatSource: Send + Sync {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Priority for application order (higher = applied later)
    /// Default priority is 0.
    /// Suggested priorities:
    /// - Base stats: -100
    /// - Items: 0
    /// - Buffs: 200
    ///
    /// Flat values sum and percent values multiply, so order never changes
    /// the result; it only keeps breakdowns readable.
    fn priority(&self) -> i32 {
        0
    }

    /// Apply this source's stats to the accumulator
    fn apply(&self, stats: &mut StatAccumulator);
}
