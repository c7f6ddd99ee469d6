//! ActiveEffect - Duration effect instances attached to a unit

use crate::stat_block::StatModifier;
use crate::types::{is_elapsed, is_expired, DamageType, UnitId};
use serde::{Deserialize, Serialize};

/// How a re-application of an effect id that is already active merges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stacking {
    /// Remaining time becomes max(old, new)
    #[default]
    Refresh,
    /// Remaining time becomes old + new
    Extend,
    /// Re-applications while active do nothing
    Ignore,
    /// The new instance fully replaces the old one
    Replace,
    /// Stack count goes up (to `max_stacks`) and the duration refreshes
    Stack { max_stacks: u32 },
}

/// What an active effect does while it lasts (already resolved against the
/// caster's stats)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivePayload {
    /// Stat modifier, multiplied by the stack count
    Modifier { per_stack: StatModifier },
    /// Damage (or healing when `damage_type` is `None`) every `interval`
    Periodic {
        per_tick: f64,
        damage_type: Option<DamageType>,
        interval: f64,
        until_tick: f64,
    },
    /// Immunity tags held while active
    Immunity { tags: Vec<String> },
}

/// Result of merging an application into a unit's effect list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Added,
    Refreshed,
    Extended,
    Ignored,
    Replaced,
    Stacked(u32),
}

/// An active duration effect on a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Definition id; at most one instance per id per unit
    pub id: String,
    pub source: Option<UnitId>,
    pub remaining: f64,
    /// Full duration of the latest application
    pub duration: f64,
    pub stacks: u32,
    pub stacking: Stacking,
    pub is_debuff: bool,
    pub cleansable: bool,
    pub persists_through_death: bool,
    pub payload: ActivePayload,
}

/// One periodic tick that came due
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicTick {
    pub effect_id: String,
    pub source: Option<UnitId>,
    pub amount: f64,
    /// `None` heals
    pub damage_type: Option<DamageType>,
}

impl ActiveEffect {
    /// Source id of the stat modifier this effect owns on its unit
    pub fn modifier_id(&self) -> String {
        format!("effect:{}", self.id)
    }

    /// The stat modifier currently contributed, scaled by stacks
    pub fn current_modifier(&self) -> Option<StatModifier> {
        match &self.payload {
            ActivePayload::Modifier { per_stack } => {
                let factor = f64::from(self.stacks.max(1));
                let mut modifier = StatModifier::new(self.modifier_id());
                modifier.flat = per_stack.flat.scaled(factor);
                modifier.percent = per_stack.percent.scaled(factor);
                Some(modifier)
            }
            _ => None,
        }
    }

    pub fn grants_immunity(&self, tag: &str) -> bool {
        match &self.payload {
            ActivePayload::Immunity { tags } => tags.iter().any(|t| t == tag),
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        !is_expired(self.remaining)
    }

    /// Advance by `delta`, returning the periodic ticks that came due
    pub fn tick(&mut self, delta: f64) -> Vec<PeriodicTick> {
        self.remaining -= delta;
        let mut ticks = Vec::new();
        if let ActivePayload::Periodic {
            per_tick,
            damage_type,
            interval,
            until_tick,
        } = &mut self.payload
        {
            *until_tick -= delta;
            while is_elapsed(*until_tick) && !is_expired(self.remaining) && *interval > 0.0 {
                ticks.push(PeriodicTick {
                    effect_id: self.id.clone(),
                    source: self.source,
                    amount: *per_tick * f64::from(self.stacks.max(1)),
                    damage_type: *damage_type,
                });
                *until_tick += *interval;
            }
        }
        ticks
    }

    /// Merge a fresh application of the same id into this instance.
    ///
    /// For [`Stacking::Replace`] the caller swaps the instance out itself.
    pub fn merge(&mut self, incoming: ActiveEffect) -> MergeOutcome {
        match self.stacking {
            Stacking::Refresh => {
                self.remaining = self.remaining.max(incoming.duration);
                self.duration = self.duration.max(incoming.duration);
                self.source = incoming.source.or(self.source);
                MergeOutcome::Refreshed
            }
            Stacking::Extend => {
                self.remaining += incoming.duration;
                self.duration = self.remaining;
                MergeOutcome::Extended
            }
            Stacking::Ignore => MergeOutcome::Ignored,
            Stacking::Replace => {
                *self = incoming;
                MergeOutcome::Replaced
            }
            Stacking::Stack { max_stacks } => {
                self.stacks = (self.stacks + 1).min(max_stacks.max(1));
                self.remaining = incoming.duration;
                self.duration = incoming.duration;
                self.source = incoming.source.or(self.source);
                MergeOutcome::Stacked(self.stacks)
            }
        }
    }
}
