//! Passives - effects wired to unit hooks

use crate::effect::Effect;
use crate::types::UnitId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// When a passive fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// After one of the unit's basic attacks connects
    OnHit,
    /// After the unit takes damage
    OnTakeDamage,
    /// When health drops below `threshold` (fraction of max). Fires once
    /// per crossing.
    OnLowHealth { threshold: f64 },
    /// After one of the unit's casts commits
    OnAbilityCast,
    /// When the unit dies
    OnDeath,
}

impl Trigger {
    pub fn kind(self) -> TriggerKind {
        match self {
            Trigger::OnHit => TriggerKind::OnHit,
            Trigger::OnTakeDamage => TriggerKind::OnTakeDamage,
            Trigger::OnLowHealth { .. } => TriggerKind::OnLowHealth,
            Trigger::OnAbilityCast => TriggerKind::OnAbilityCast,
            Trigger::OnDeath => TriggerKind::OnDeath,
        }
    }
}

/// [`Trigger`] without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    OnHit,
    OnTakeDamage,
    OnLowHealth,
    OnAbilityCast,
    OnDeath,
}

/// Declarative passive data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub trigger: Trigger,
    /// Minimum seconds between firings
    #[serde(default)]
    pub cooldown: f64,
    /// Resolve magnitudes at the unit's level instead of rank 1
    #[serde(default)]
    pub level_scaled: bool,
    pub effects: Vec<Effect>,
}

/// A passive bound to a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveState {
    /// Unique per unit (item passives are prefixed with their slot id)
    pub id: String,
    pub def: Arc<PassiveDef>,
    pub cooldown_remaining: f64,
    /// Low-health passives disarm when they fire and re-arm once health is
    /// back above the threshold
    pub armed: bool,
}

impl PassiveState {
    pub fn new(id: impl Into<String>, def: Arc<PassiveDef>) -> Self {
        PassiveState {
            id: id.into(),
            def,
            cooldown_remaining: 0.0,
            armed: true,
        }
    }

    pub fn is_ready(&self) -> bool {
        crate::types::is_elapsed(self.cooldown_remaining)
    }

    pub fn trigger(&self) -> Trigger {
        self.def.trigger
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.def.cooldown;
    }

    pub fn tick(&mut self, delta: f64) {
        self.cooldown_remaining = (self.cooldown_remaining - delta).max(0.0);
    }

    /// Rank used to resolve magnitudes
    pub fn rank_for_level(&self, level: u32) -> u8 {
        if self.def.level_scaled {
            u8::try_from(level.max(1)).unwrap_or(u8::MAX)
        } else {
            1
        }
    }
}

/// A hook raised by a unit, waiting for the simulation to resolve it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub kind: TriggerKind,
    /// The other party: hit target, attacker or killer
    pub other: Option<UnitId>,
    /// Restrict to one passive (low-health crossings are per passive)
    pub passive: Option<String>,
}
