//! Basic attacks

use super::{CombatEvent, Simulation};
use crate::combat::{roll_attack, AttackOutcome, DamageOrigin};
use crate::types::{DamageType, UnitId, TIME_EPSILON};
use crate::unit::{HasSide, TriggerKind};
use thiserror::Error;
use tracing::trace;

/// Why a basic attack was not launched
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackError {
    #[error("attacker cannot attack")]
    AttackerDisabled,
    #[error("invalid attack target")]
    InvalidTarget,
    #[error("target out of range")]
    OutOfRange,
    #[error("attack is not ready")]
    NotReady,
}

impl AttackError {
    pub fn reason(self) -> &'static str {
        match self {
            AttackError::AttackerDisabled => "attacker_disabled",
            AttackError::InvalidTarget => "invalid_target",
            AttackError::OutOfRange => "out_of_range",
            AttackError::NotReady => "not_ready",
        }
    }
}

impl Simulation {
    /// Launch one basic attack. The attack timer restarts even when a
    /// blinded attack misses.
    pub fn basic_attack(&mut self, attacker_id: UnitId, target_id: UnitId) -> Result<AttackOutcome, AttackError> {
        let attacker = self.unit(attacker_id).ok_or(AttackError::AttackerDisabled)?;
        if !attacker.can_attack() {
            return Err(AttackError::AttackerDisabled);
        }
        let target = self
            .unit(target_id)
            .filter(|t| t.is_alive() && t.id != attacker_id && attacker.is_enemy_of(*t))
            .ok_or(AttackError::InvalidTarget)?;
        let stats = attacker.stats();
        if attacker.position.distance(target.position) > stats.attack_range + TIME_EPSILON {
            return Err(AttackError::OutOfRange);
        }
        if !attacker.attack_ready() {
            return Err(AttackError::NotReady);
        }
        let blinded = attacker.crowd_control().is_blinded();

        let Some(attacker) = self.units.get_mut(&attacker_id) else {
            return Err(AttackError::AttackerDisabled);
        };
        attacker.start_attack_cooldown(stats.attack_interval());

        let outcome = if blinded {
            AttackOutcome::Miss
        } else {
            let roll = roll_attack(&stats, &mut self.rng);
            let bonuses = attacker.spend_attack_modifiers();
            attacker.raise(TriggerKind::OnHit, Some(target_id), DamageOrigin::Attack);

            let damage = self.strike(attacker_id, target_id, roll.damage, DamageType::Physical);
            let bonus_damage = bonuses
                .into_iter()
                .map(|(bonus, damage_type)| self.strike(attacker_id, target_id, bonus, damage_type))
                .sum();
            AttackOutcome::Hit {
                damage,
                is_crit: roll.is_crit,
                bonus_damage,
            }
        };

        trace!(attacker = %attacker_id, target = %target_id, outcome = ?outcome, "basic attack");
        self.record(CombatEvent::Attack {
            time: self.clock,
            attacker: attacker_id,
            target: target_id,
            outcome: outcome.clone(),
        });
        self.resolve_hooks();
        Ok(outcome)
    }

    fn strike(&mut self, attacker: UnitId, target: UnitId, amount: f64, damage_type: DamageType) -> f64 {
        let Some(unit) = self.units.get_mut(&target) else {
            return 0.0;
        };
        let result = unit.take_damage_from(amount, damage_type, Some(attacker), DamageOrigin::Attack);
        let total = result.total();
        self.record(CombatEvent::Damage {
            time: self.clock,
            target,
            result,
        });
        total
    }

    /// Fire every ready auto-attack order that is in range
    pub(crate) fn step_auto_attacks(&mut self) {
        for id in self.unit_ids() {
            let Some(unit) = self.unit(id) else {
                continue;
            };
            let Some(target) = unit.attack_target() else {
                continue;
            };
            if !unit.is_alive() || !unit.attack_ready() {
                continue;
            }
            match self.basic_attack(id, target) {
                Ok(_) | Err(AttackError::OutOfRange | AttackError::NotReady | AttackError::AttackerDisabled) => {}
                Err(AttackError::InvalidTarget) => {
                    if let Some(unit) = self.unit_mut(id) {
                        unit.clear_attack_target();
                    }
                }
            }
        }
    }
}
