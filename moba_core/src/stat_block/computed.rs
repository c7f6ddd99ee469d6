//! UnitStats - the computed snapshot handed to every reader

use super::stat_line::StatKind;
use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Fully resolved stats of a unit at one instant.
///
/// Produced fresh by [`super::StatBlock::stats`]; never stored across a
/// mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    pub health: f64,
    pub max_health: f64,
    pub health_regen: f64,
    pub resource: f64,
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
    pub level: u32,
}

impl UnitStats {
    /// Look up a modifiable stat by kind
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

    /// The resist that applies to a damage type (true damage has none)
    pub fn resistance(&self, damage_type: DamageType) -> Option<f64> {
        match damage_type {
            DamageType::Physical => Some(self.armor),
            DamageType::Magic => Some(self.magic_resist),
            DamageType::True => None,
        }
    }

    /// Seconds between basic attacks
    pub fn attack_interval(&self) -> f64 {
        if self.attack_speed <= 0.0 {
            f64::INFINITY
        } else {
            1.0 / self.attack_speed
        }
    }

    /// Health as a fraction of max (0.0 - 1.0)
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Resource as a fraction of max (0.0 - 1.0)
    pub fn resource_fraction(&self) -> f64 {
        if self.max_resource <= 0.0 {
            return 0.0;
        }
        (self.resource / self.max_resource).clamp(0.0, 1.0)
    }
}
