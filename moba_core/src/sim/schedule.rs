//! Time-deferred callbacks registered against the simulation clock

use super::Simulation;
use crate::ability::AbilityDef;
use crate::effect::{Anchor, DelayedAoeEffect, EffectContext};
use crate::types::{is_elapsed, Vec2};
use std::sync::Arc;
use tracing::debug;

/// Work waiting for the clock
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    /// A cast whose wind-up is running. Dropped if the caster dies first.
    CastWindup {
        ctx: EffectContext,
        ability: Arc<AbilityDef>,
    },
    /// An area that resolves after its delay. Cannot be cancelled.
    DelayedAoe {
        ctx: EffectContext,
        effect: DelayedAoeEffect,
        /// Fixed centre, unless the anchor follows the caster
        center: Vec2,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Scheduled {
    due: f64,
    action: ScheduledAction,
}

/// Pending actions in insertion order
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pending: Vec<Scheduled>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: f64, action: ScheduledAction) {
        self.pending.push(Scheduled { due, action });
    }

    /// Remove and return every action due at `now`, oldest first
    pub fn take_due(&mut self, now: f64) -> Vec<ScheduledAction> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| is_elapsed(s.due - now));
        self.pending = waiting;
        due.into_iter().map(|s| s.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Simulation {
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub(crate) fn run_schedule(&mut self) {
        for action in self.schedule.take_due(self.clock) {
            match action {
                ScheduledAction::CastWindup { ctx, ability } => {
                    if !self.unit(ctx.caster).is_some_and(|u| u.is_alive()) {
                        debug!(caster = %ctx.caster, ability = %ability.id, "wind-up dropped");
                        continue;
                    }
                    self.apply_effects(&ctx, &ability.effects);
                }
                ScheduledAction::DelayedAoe { ctx, effect, center } => {
                    let center = match effect.anchor {
                        Anchor::FollowCaster => self.unit(ctx.caster).map_or(center, |u| u.position),
                        Anchor::CastPoint | Anchor::Caster => center,
                    };
                    self.resolve_delayed_aoe(&ctx, &effect, center);
                }
            }
        }
    }
}
