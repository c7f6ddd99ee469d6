//! Abilities - immutable definitions and per-unit rank/cooldown state

use crate::effect::{Effect, RankTable};
use crate::types::{is_elapsed, AbilitySlot, UnitId, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Which units a unit-targeted ability accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allow {
    #[default]
    Enemy,
    /// Allies, the caster included
    Ally,
    Any,
}

/// How an ability picks its target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Targeting {
    /// The caster is the target
    SelfCast,
    /// A living unit within `range`
    Unit {
        range: f64,
        #[serde(default)]
        allow: Allow,
    },
    /// A ground position within `range`
    Ground { range: f64 },
    /// A line toward the aim point; hits the first enemy along it
    Skillshot { range: f64, width: f64 },
}

/// Declarative ability data, shared by every unit of a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub slot: AbilitySlot,
    #[serde(default)]
    pub cost: RankTable,
    pub cooldown: f64,
    /// Overrides `cooldown` at the matching rank
    #[serde(default)]
    pub cooldown_per_rank: Option<Vec<f64>>,
    #[serde(default)]
    pub cast_time: f64,
    pub targeting: Targeting,
    pub effects: Vec<Effect>,
    #[serde(default = "default_max_rank")]
    pub max_rank: u8,
}

fn default_max_rank() -> u8 {
    5
}

impl AbilityDef {
    /// Cooldown at a learned rank. `None` at rank 0.
    pub fn cooldown_at(&self, rank: u8) -> Option<f64> {
        if rank == 0 {
            return None;
        }
        let per_rank = self
            .cooldown_per_rank
            .as_ref()
            .and_then(|table| table.get(usize::from(rank) - 1))
            .copied();
        Some(per_rank.unwrap_or(self.cooldown))
    }

    pub fn cost_at(&self, rank: u8) -> f64 {
        self.cost.at(rank)
    }
}

/// One unit's binding of an ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityState {
    pub def: Arc<AbilityDef>,
    rank: u8,
    cooldown_remaining: f64,
}

impl AbilityState {
    pub fn new(def: Arc<AbilityDef>) -> Self {
        AbilityState {
            def,
            rank: 0,
            cooldown_remaining: 0.0,
        }
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn is_learned(&self) -> bool {
        self.rank > 0
    }

    /// Learned and off cooldown
    pub fn is_ready(&self) -> bool {
        self.is_learned() && is_elapsed(self.cooldown_remaining)
    }

    pub fn cooldown_remaining(&self) -> f64 {
        self.cooldown_remaining
    }

    /// Cooldown the current rank starts on a successful cast
    pub fn cooldown_for_rank(&self) -> Option<f64> {
        self.def.cooldown_at(self.rank)
    }

    pub fn cost(&self) -> f64 {
        self.def.cost_at(self.rank)
    }

    /// Raise the rank by one. False at max rank.
    pub fn rank_up(&mut self) -> bool {
        if self.rank >= self.def.max_rank {
            return false;
        }
        self.rank += 1;
        true
    }

    /// Set the rank directly. False (and unchanged) above max rank.
    pub fn set_rank(&mut self, rank: u8) -> bool {
        if rank > self.def.max_rank {
            return false;
        }
        self.rank = rank;
        true
    }

    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_for_rank().unwrap_or(0.0);
    }

    pub fn reset_cooldown(&mut self) {
        self.cooldown_remaining = 0.0;
    }

    pub fn tick(&mut self, delta: f64) {
        self.cooldown_remaining = (self.cooldown_remaining - delta).max(0.0);
    }

    /// Fraction of the cooldown still to run (0.0 ready, 1.0 just cast)
    pub fn cooldown_progress(&self) -> f64 {
        match self.cooldown_for_rank() {
            Some(total) if total > 0.0 => (self.cooldown_remaining / total).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Why a cast was rejected. Nothing changes on a rejected cast.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastError {
    /// Target missing, ineligible or out of range. Also returned for an
    /// unlearned ability.
    #[error("invalid target")]
    InvalidTarget,
    #[error("ability is on cooldown")]
    OnCooldown,
    /// Caster is dead, stunned or silenced
    #[error("caster cannot cast")]
    CasterDisabled,
    #[error("not enough resource")]
    NotEnoughResource,
}

impl CastError {
    /// Stable snake_case reason code
    pub fn reason(self) -> &'static str {
        match self {
            CastError::InvalidTarget => "invalid_target",
            CastError::OnCooldown => "on_cooldown",
            CastError::CasterDisabled => "caster_disabled",
            CastError::NotEnoughResource => "not_enough_resource",
        }
    }
}

/// A cast request from the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastRequest {
    pub slot: AbilitySlot,
    pub target: Option<UnitId>,
    pub position: Option<Vec2>,
}

impl CastRequest {
    pub fn new(slot: AbilitySlot) -> Self {
        CastRequest {
            slot,
            target: None,
            position: None,
        }
    }

    pub fn at_unit(mut self, target: UnitId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn at_point(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }
}
