//! BaseStatsSource - Stats from the unit definition at its level

use crate::source::StatSource;
use crate::stat_block::{StatAccumulator, StatKind, StatLine};

/// Base stats plus per-level growth
pub struct BaseStatsSource<'a> {
    pub base: &'a StatLine,
    pub growth: &'a StatLine,
    /// Unit level (1-18)
    pub level: u32,
}

impl<'a> BaseStatsSource<'a> {
    /// Create a new base stats source
    pub fn new(base: &'a StatLine, growth: &'a StatLine, level: u32) -> Self {
        BaseStatsSource { base, growth, level }
    }

    /// Value of one stat at this level
    ///
    /// Attack speed grows as a percentage of its base; everything else
    /// grows linearly.
    pub fn value_at_level(&self, stat: StatKind) -> f64 {
        let levels = self.level.saturating_sub(1) as f64;
        let base = self.base.get(stat);
        let growth = self.growth.get(stat);
        match stat {
            StatKind::AttackSpeed => base * (1.0 + growth * levels),
            _ => base + growth * levels,
        }
    }
}

impl StatSource for BaseStatsSource<'_> {
    fn id(&self) -> &str {
        "base_stats"
    }

    fn priority(&self) -> i32 {
        -100 // Base stats apply first
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        for &stat in StatKind::all() {
            stats.set_base(stat, self.value_at_level(stat));
        }
    }
}
