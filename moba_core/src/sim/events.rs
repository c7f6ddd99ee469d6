//! Combat log

use crate::combat::{AttackOutcome, DamageResult};
use crate::types::{AbilitySlot, UnitId};
use serde::{Deserialize, Serialize};

/// Something that happened during a step, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    Cast {
        time: f64,
        caster: UnitId,
        slot: AbilitySlot,
        ability: String,
        target: Option<UnitId>,
    },
    Damage {
        time: f64,
        target: UnitId,
        result: DamageResult,
    },
    Heal {
        time: f64,
        target: UnitId,
        source: Option<UnitId>,
        amount: f64,
    },
    /// A damage-over-time or heal-over-time tick
    Periodic {
        time: f64,
        target: UnitId,
        source: Option<UnitId>,
        effect: String,
        amount: f64,
        is_heal: bool,
    },
    Attack {
        time: f64,
        attacker: UnitId,
        target: UnitId,
        outcome: AttackOutcome,
    },
    PassiveFired {
        time: f64,
        unit: UnitId,
        passive: String,
    },
    Death {
        time: f64,
        unit: UnitId,
        killer: Option<UnitId>,
    },
    Respawn {
        time: f64,
        unit: UnitId,
    },
    Purchase {
        time: f64,
        unit: UnitId,
        item: String,
        slot: usize,
    },
    Sell {
        time: f64,
        unit: UnitId,
        item: String,
        gold: u32,
    },
}

impl CombatEvent {
    pub fn time(&self) -> f64 {
        match self {
            CombatEvent::Cast { time, .. }
            | CombatEvent::Damage { time, .. }
            | CombatEvent::Heal { time, .. }
            | CombatEvent::Periodic { time, .. }
            | CombatEvent::Attack { time, .. }
            | CombatEvent::PassiveFired { time, .. }
            | CombatEvent::Death { time, .. }
            | CombatEvent::Respawn { time, .. }
            | CombatEvent::Purchase { time, .. }
            | CombatEvent::Sell { time, .. } => *time,
        }
    }

    /// Damage dealt by `unit` in this event, if any
    pub fn damage_dealt_by(&self, unit: UnitId) -> f64 {
        match self {
            CombatEvent::Damage { result, .. } if result.source == Some(unit) => result.total(),
            CombatEvent::Periodic {
                source,
                amount,
                is_heal: false,
                ..
            } if *source == Some(unit) => *amount,
            _ => 0.0,
        }
    }
}
