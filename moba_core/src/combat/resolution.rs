//! Basic attack rolls

use crate::stat_block::UnitStats;
use rand::Rng;

/// Raw damage of one basic attack, before resists
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackRoll {
    pub damage: f64,
    pub is_crit: bool,
}

/// Roll a basic attack from the attacker's current stats.
///
/// A critical strike multiplies attack damage by `crit_damage`.
pub fn roll_attack<R: Rng>(stats: &UnitStats, rng: &mut R) -> AttackRoll {
    let is_crit = stats.crit_chance > 0.0 && rng.gen::<f64>() < stats.crit_chance;
    let damage = if is_crit {
        stats.attack_damage * stats.crit_damage
    } else {
        stats.attack_damage
    };
    AttackRoll {
        damage: damage.max(0.0),
        is_crit,
    }
}
