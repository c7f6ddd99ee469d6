//! StatKind and StatLine - one value per modifiable stat

use serde::{Deserialize, Serialize};

/// Every stat that base values, growth and modifiers can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxHealth,
    HealthRegen,
    MaxResource,
    ResourceRegen,
    AttackDamage,
    AbilityPower,
    AttackSpeed,
    AttackRange,
    Armor,
    MagicResist,
    MovementSpeed,
    CritChance,
    CritDamage,
}

impl StatKind {
    pub fn all() -> &'static [StatKind] {
        &[
            StatKind::MaxHealth,
            StatKind::HealthRegen,
            StatKind::MaxResource,
            StatKind::ResourceRegen,
            StatKind::AttackDamage,
            StatKind::AbilityPower,
            StatKind::AttackSpeed,
            StatKind::AttackRange,
            StatKind::Armor,
            StatKind::MagicResist,
            StatKind::MovementSpeed,
            StatKind::CritChance,
            StatKind::CritDamage,
        ]
    }

    pub(crate) fn index(self) -> usize {
        match self {
            StatKind::MaxHealth => 0,
            StatKind::HealthRegen => 1,
            StatKind::MaxResource => 2,
            StatKind::ResourceRegen => 3,
            StatKind::AttackDamage => 4,
            StatKind::AbilityPower => 5,
            StatKind::AttackSpeed => 6,
            StatKind::AttackRange => 7,
            StatKind::Armor => 8,
            StatKind::MagicResist => 9,
            StatKind::MovementSpeed => 10,
            StatKind::CritChance => 11,
            StatKind::CritDamage => 12,
        }
    }
}

/// Number of entries in [`StatKind::all`]
pub const STAT_COUNT: usize = 13;

/// One `f64` per stat.
///
/// Used for base stats, per-level growth, flat deltas and percent deltas
/// (percent as a decimal fraction, `0.2` = +20%). Every field defaults to 0
/// so TOML content only lists what it changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLine {
    pub max_health: f64,
    pub health_regen: f64,
    pub max_resource: f64,
    pub resource_regen: f64,
    pub attack_damage: f64,
    pub ability_power: f64,
    pub attack_speed: f64,
    pub attack_range: f64,
    pub armor: f64,
    pub magic_resist: f64,
    pub movement_speed: f64,
    pub crit_chance: f64,
    pub crit_damage: f64,
}

impl StatLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a single stat
    pub fn with(mut self, stat: StatKind, value: f64) -> Self {
        self.set(stat, value);
        self
    }

    pub fn get(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::MaxHealth => self.max_health,
            StatKind::HealthRegen => self.health_regen,
            StatKind::MaxResource => self.max_resource,
            StatKind::ResourceRegen => self.resource_regen,
            StatKind::AttackDamage => self.attack_damage,
            StatKind::AbilityPower => self.ability_power,
            StatKind::AttackSpeed => self.attack_speed,
            StatKind::AttackRange => self.attack_range,
            StatKind::Armor => self.armor,
            StatKind::MagicResist => self.magic_resist,
            StatKind::MovementSpeed => self.movement_speed,
            StatKind::CritChance => self.crit_chance,
            StatKind::CritDamage => self.crit_damage,
        }
    }

    pub fn set(&mut self, stat: StatKind, value: f64) {
        let slot = match stat {
            StatKind::MaxHealth => &mut self.max_health,
            StatKind::HealthRegen => &mut self.health_regen,
            StatKind::MaxResource => &mut self.max_resource,
            StatKind::ResourceRegen => &mut self.resource_regen,
            StatKind::AttackDamage => &mut self.attack_damage,
            StatKind::AbilityPower => &mut self.ability_power,
            StatKind::AttackSpeed => &mut self.attack_speed,
            StatKind::AttackRange => &mut self.attack_range,
            StatKind::Armor => &mut self.armor,
            StatKind::MagicResist => &mut self.magic_resist,
            StatKind::MovementSpeed => &mut self.movement_speed,
            StatKind::CritChance => &mut self.crit_chance,
            StatKind::CritDamage => &mut self.crit_damage,
        };
        *slot = value;
    }

    /// Non-zero entries, in [`StatKind::all`] order
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, f64)> + '_ {
        StatKind::all()
            .iter()
            .map(move |&stat| (stat, self.get(stat)))
            .filter(|(_, value)| *value != 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Every entry multiplied by `factor` (used for stacked buffs)
    pub fn scaled(&self, factor: f64) -> StatLine {
        let mut out = StatLine::new();
        for (stat, value) in self.iter() {
            out.set(stat, value * factor);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip_every_stat() {
        let mut line = StatLine::new();
        for (i, stat) in StatKind::all().iter().enumerate() {
            line.set(*stat, i as f64 + 1.0);
        }
        for (i, stat) in StatKind::all().iter().enumerate() {
            assert!((line.get(*stat) - (i as f64 + 1.0)).abs() < f64::EPSILON);
            assert_eq!(stat.index(), i);
        }
        assert_eq!(StatKind::all().len(), STAT_COUNT);
    }

    #[test]
    fn test_iter_skips_zero() {
        let line = StatLine::new()
            .with(StatKind::AttackDamage, 10.0)
            .with(StatKind::Armor, 5.0);
        let entries: Vec<_> = line.iter().collect();
        assert_eq!(entries.len(), 2);
        assert!(!line.is_zero());
        assert!(StatLine::new().is_zero());
    }

    #[test]
    fn test_parse_partial_line() {
        let line: StatLine = toml::from_str("attack_damage = 10\narmor = 4.5").unwrap();
        assert!((line.attack_damage - 10.0).abs() < f64::EPSILON);
        assert!((line.armor - 4.5).abs() < f64::EPSILON);
        assert!((line.max_health - 0.0).abs() < f64::EPSILON);
    }
}
