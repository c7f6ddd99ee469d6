//! DamageResult - Outcome of a single damage instance

use crate::types::{DamageType, UnitId};
use crate::unit::TriggerKind;
use serde::{Deserialize, Serialize};

/// What produced a damage instance.
///
/// Hooks use this to avoid a passive re-triggering itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageOrigin {
    #[default]
    Ability,
    Attack,
    Periodic,
    Passive(TriggerKind),
}

/// Result of applying one damage instance to a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    pub damage_type: DamageType,
    pub source: Option<UnitId>,
    /// Damage before resists
    pub raw: f64,
    /// Damage after resists
    pub after_resist: f64,
    /// Part of `after_resist` eaten by shields
    pub absorbed_by_shields: f64,
    /// Part of `after_resist` taken from health
    pub to_health: f64,
    pub health_before: f64,
    pub health_after: f64,
    pub is_killing_blow: bool,
}

impl DamageResult {
    /// A damage instance that did nothing (target already dead). Nothing
    /// counts as resisted.
    pub fn none(damage_type: DamageType, source: Option<UnitId>, raw: f64) -> Self {
        DamageResult {
            damage_type,
            source,
            raw,
            after_resist: raw,
            absorbed_by_shields: 0.0,
            to_health: 0.0,
            health_before: 0.0,
            health_after: 0.0,
            is_killing_blow: false,
        }
    }

    /// Damage consumed by shields and health combined
    pub fn total(&self) -> f64 {
        self.absorbed_by_shields + self.to_health
    }

    /// Damage removed by resists
    pub fn mitigated(&self) -> f64 {
        (self.raw - self.after_resist).max(0.0)
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.to_health > 0.0 {
            parts.push(format!("{:.0} damage taken", self.to_health));
        }

        if self.absorbed_by_shields > 0.0 {
            parts.push(format!("{:.0} absorbed by shields", self.absorbed_by_shields));
        }

        if self.mitigated() > 0.0 {
            parts.push(format!("{:.0} resisted", self.mitigated()));
        }

        if self.is_killing_blow {
            parts.push("FATAL".to_string());
        }

        if parts.is_empty() {
            "No damage".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// What happened when a basic attack was launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttackOutcome {
    Hit {
        damage: f64,
        is_crit: bool,
        /// Damage from empowered-attack modifiers spent on this hit
        bonus_damage: f64,
    },
    /// Attacker was blinded
    Miss,
}

impl AttackOutcome {
    pub fn total_damage(&self) -> f64 {
        match self {
            AttackOutcome::Hit {
                damage,
                bonus_damage,
                ..
            } => damage + bonus_damage,
            AttackOutcome::Miss => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DamageResult {
        DamageResult {
            damage_type: DamageType::Physical,
            source: Some(UnitId(1)),
            raw: 130.0,
            after_resist: 100.0,
            absorbed_by_shields: 40.0,
            to_health: 60.0,
            health_before: 60.0,
            health_after: 0.0,
            is_killing_blow: true,
        }
    }

    #[test]
    fn test_totals() {
        let result = sample();
        assert!((result.total() - 100.0).abs() < f64::EPSILON);
        assert!((result.mitigated() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary() {
        let summary = sample().summary();
        assert!(summary.contains("60 damage"));
        assert!(summary.contains("shields"));
        assert!(summary.contains("FATAL"));
        assert_eq!(DamageResult::none(DamageType::True, None, 10.0).summary(), "No damage");
    }

    #[test]
    fn test_attack_outcome_total() {
        let hit = AttackOutcome::Hit {
            damage: 60.0,
            is_crit: false,
            bonus_damage: 25.0,
        };
        assert!((hit.total_damage() - 85.0).abs() < f64::EPSILON);
        assert_eq!(AttackOutcome::Miss.total_damage(), 0.0);
    }
}
