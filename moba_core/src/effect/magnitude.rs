//! Rank tables and stat-scaled magnitudes

use crate::stat_block::{StatKind, UnitStats};
use serde::{Deserialize, Serialize};

/// A value indexed by ability rank.
///
/// Content may write a single number (same at every rank) or an array
/// indexed by `rank - 1`. Ranks past the end of the array use the last
/// entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RankTableRepr", into = "Vec<f64>")]
pub struct RankTable(Vec<f64>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RankTableRepr {
    Single(f64),
    Table(Vec<f64>),
}

impl From<RankTableRepr> for RankTable {
    fn from(repr: RankTableRepr) -> Self {
        match repr {
            RankTableRepr::Single(v) => RankTable(vec![v]),
            RankTableRepr::Table(values) => RankTable(values),
        }
    }
}

impl From<RankTable> for Vec<f64> {
    fn from(table: RankTable) -> Self {
        table.0
    }
}

impl Default for RankTable {
    fn default() -> Self {
        RankTable(vec![0.0])
    }
}

impl RankTable {
    pub fn new(values: Vec<f64>) -> Self {
        RankTable(values)
    }

    pub fn constant(value: f64) -> Self {
        RankTable(vec![value])
    }

    /// Value at `rank` (1-based). Rank 0 reads the first entry.
    pub fn at(&self, rank: u8) -> f64 {
        let index = usize::from(rank.max(1)) - 1;
        self.0
            .get(index)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

impl From<f64> for RankTable {
    fn from(value: f64) -> Self {
        RankTable::constant(value)
    }
}

impl From<Vec<f64>> for RankTable {
    fn from(values: Vec<f64>) -> Self {
        RankTable(values)
    }
}

/// One `ratio × caster stat` term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRatio {
    pub stat: ScalingStat,
    pub ratio: f64,
}

/// Caster stats an effect can scale from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingStat {
    /// Current health
    Health,
    /// Health missing from max
    MissingHealth,
    /// Unit level
    Level,
    /// Any modifiable stat
    #[serde(untagged)]
    Stat(StatKind),
}

impl ScalingStat {
    pub fn read(self, stats: &UnitStats) -> f64 {
        match self {
            ScalingStat::Stat(stat) => stats.get(stat),
            ScalingStat::Health => stats.health,
            ScalingStat::MissingHealth => (stats.max_health - stats.health).max(0.0),
            ScalingStat::Level => f64::from(stats.level),
        }
    }
}

/// `base[rank - 1] + Σ ratio_i × caster_stat_i`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub base: RankTable,
    #[serde(default)]
    pub ratios: Vec<StatRatio>,
}

impl Magnitude {
    /// Flat rank table with no scaling
    pub fn flat(base: impl Into<RankTable>) -> Self {
        Magnitude {
            base: base.into(),
            ratios: Vec::new(),
        }
    }

    /// Builder: add a scaling term
    pub fn plus(mut self, stat: StatKind, ratio: f64) -> Self {
        self.ratios.push(StatRatio {
            stat: ScalingStat::Stat(stat),
            ratio,
        });
        self
    }

    /// Builder: add a term scaling from a non-modifiable stat
    pub fn plus_scaling(mut self, stat: ScalingStat, ratio: f64) -> Self {
        self.ratios.push(StatRatio { stat, ratio });
        self
    }

    /// Resolve against the caster's stats at the moment of application
    pub fn resolve(&self, rank: u8, caster: &UnitStats) -> f64 {
        let scaled: f64 = self
            .ratios
            .iter()
            .map(|term| term.ratio * term.stat.read(caster))
            .sum();
        self.base.at(rank) + scaled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        amount: Magnitude,
        duration: RankTable,
    }

    #[test]
    fn test_rank_table_indexing() {
        let table = RankTable::new(vec![50.0, 100.0, 150.0]);
        assert_eq!(table.at(1), 50.0);
        assert_eq!(table.at(2), 100.0);
        assert_eq!(table.at(3), 150.0);
        // Past the end reads the last entry
        assert_eq!(table.at(5), 150.0);
    }

    #[test]
    fn test_resolve_with_ratios() {
        let magnitude = Magnitude::flat(vec![80.0, 120.0])
            .plus(StatKind::AbilityPower, 0.6)
            .plus(StatKind::AttackDamage, 0.5);
        let stats = UnitStats {
            ability_power: 100.0,
            attack_damage: 40.0,
            ..Default::default()
        };
        // 120 + 60 + 20
        assert!((magnitude.resolve(2, &stats) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_health_scaling() {
        let magnitude = Magnitude::flat(0.0).plus_scaling(ScalingStat::MissingHealth, 0.1);
        let stats = UnitStats {
            health: 300.0,
            max_health: 1000.0,
            ..Default::default()
        };
        assert!((magnitude.resolve(1, &stats) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_from_toml() {
        let holder: Holder = toml::from_str(
            r#"
duration = 2.5
[amount]
base = [50, 100, 150]
ratios = [{ stat = "ability_power", ratio = 0.5 }, { stat = "missing_health", ratio = 0.05 }]
"#,
        )
        .unwrap();
        assert_eq!(holder.duration.at(3), 2.5);
        assert_eq!(holder.amount.base.at(2), 100.0);
        assert_eq!(
            holder.amount.ratios[0].stat,
            ScalingStat::Stat(StatKind::AbilityPower)
        );
        assert_eq!(holder.amount.ratios[1].stat, ScalingStat::MissingHealth);
    }
}
