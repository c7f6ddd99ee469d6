//! StatAccumulator - Collects stat modifications before producing a snapshot

use super::computed::UnitStats;
use super::stat_line::{StatKind, StatLine, STAT_COUNT};
use super::stat_value::StatValue;

/// Accumulates stat modifications from various sources
///
/// This is used during stat recomputation to collect all modifications
/// before resolving them into a [`UnitStats`] snapshot. Sources may be
/// applied in any order: flat values are summed and percent multipliers
/// multiplied, and resolution always runs flat-then-percent.
#[derive(Debug, Clone)]
pub struct StatAccumulator {
    values: [StatValue; STAT_COUNT],
}

impl Default for StatAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatAccumulator {
    pub fn new() -> Self {
        StatAccumulator {
            values: std::array::from_fn(|_| StatValue::default()),
        }
    }

    /// Set the base value of a stat
    pub fn set_base(&mut self, stat: StatKind, value: f64) {
        self.values[stat.index()].base = value;
    }

    pub fn add_flat(&mut self, stat: StatKind, value: f64) {
        self.values[stat.index()].add_flat(value);
    }

    pub fn add_percent(&mut self, stat: StatKind, value: f64) {
        self.values[stat.index()].add_percent(value);
    }

    /// Add every non-zero entry of `line` as a flat bonus
    pub fn add_flat_line(&mut self, line: &StatLine) {
        for (stat, value) in line.iter() {
            self.add_flat(stat, value);
        }
    }

    /// Add every non-zero entry of `line` as its own percent multiplier
    pub fn add_percent_line(&mut self, line: &StatLine) {
        for (stat, value) in line.iter() {
            self.add_percent(stat, value);
        }
    }

    /// Breakdown of a single stat (for tooltips and debugging)
    pub fn value(&self, stat: StatKind) -> &StatValue {
        &self.values[stat.index()]
    }

    pub fn compute(&self, stat: StatKind) -> f64 {
        self.values[stat.index()].compute()
    }

    /// Resolve into a snapshot, clamping the current pools into range
    pub fn finish(&self, level: u32, current_health: f64, current_resource: f64) -> UnitStats {
        let max_health = self.compute(StatKind::MaxHealth).max(0.0);
        let max_resource = self.compute(StatKind::MaxResource).max(0.0);

        UnitStats {
            health: current_health.clamp(0.0, max_health),
            max_health,
            health_regen: self.compute(StatKind::HealthRegen),
            resource: current_resource.clamp(0.0, max_resource),
            max_resource,
            resource_regen: self.compute(StatKind::ResourceRegen),
            attack_damage: self.compute(StatKind::AttackDamage),
            ability_power: self.compute(StatKind::AbilityPower),
            attack_speed: self.compute(StatKind::AttackSpeed).max(0.0),
            attack_range: self.compute(StatKind::AttackRange).max(0.0),
            armor: self.compute(StatKind::Armor),
            magic_resist: self.compute(StatKind::MagicResist),
            movement_speed: self.compute(StatKind::MovementSpeed).max(0.0),
            crit_chance: self.compute(StatKind::CritChance).clamp(0.0, 1.0),
            crit_damage: self.compute(StatKind::CritDamage),
            level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_then_percent_regardless_of_insertion_order() {
        let mut acc = StatAccumulator::new();
        acc.set_base(StatKind::AttackDamage, 60.0);
        acc.add_percent(StatKind::AttackDamage, 0.5);
        acc.add_flat(StatKind::AttackDamage, 40.0);
        // (60 + 40) × 1.5
        assert!((acc.compute(StatKind::AttackDamage) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_lines_are_independent_multipliers() {
        let mut acc = StatAccumulator::new();
        acc.set_base(StatKind::MovementSpeed, 300.0);
        let haste = StatLine::new().with(StatKind::MovementSpeed, 0.2);
        acc.add_percent_line(&haste);
        acc.add_percent_line(&haste);
        assert!((acc.compute(StatKind::MovementSpeed) - 300.0 * 1.2 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_finish_clamps_current_pools() {
        let mut acc = StatAccumulator::new();
        acc.set_base(StatKind::MaxHealth, 500.0);
        acc.set_base(StatKind::MaxResource, 200.0);
        let stats = acc.finish(3, 900.0, -5.0);
        assert!((stats.health - 500.0).abs() < f64::EPSILON);
        assert!((stats.resource - 0.0).abs() < f64::EPSILON);
        assert_eq!(stats.level, 3);
    }
}
