//! Forced movement - dashes and knockbacks

use crate::effect::{Effect, EffectContext};
use crate::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedKind {
    /// Self-initiated, cannot be interrupted
    Dash,
    /// Imposed by another unit
    Knockback,
}

/// Effects a dash applies when it ends
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub ctx: EffectContext,
    pub effects: Vec<Effect>,
}

/// Movement that replaces normal movement until its distance runs out
#[derive(Debug, Clone, PartialEq)]
pub struct ForcedMovement {
    pub kind: ForcedKind,
    /// Unit vector
    pub direction: Vec2,
    pub speed: f64,
    pub remaining_distance: f64,
    pub stop_on_enemy_hit: bool,
    pub arrival: Option<Box<Arrival>>,
}

impl ForcedMovement {
    pub fn knockback(direction: Vec2, distance: f64, speed: f64) -> Self {
        ForcedMovement {
            kind: ForcedKind::Knockback,
            direction,
            speed,
            remaining_distance: distance.max(0.0),
            stop_on_enemy_hit: false,
            arrival: None,
        }
    }

    pub fn dash(direction: Vec2, distance: f64, speed: f64) -> Self {
        ForcedMovement {
            kind: ForcedKind::Dash,
            direction,
            speed,
            remaining_distance: distance.max(0.0),
            stop_on_enemy_hit: false,
            arrival: None,
        }
    }

    pub fn stopping_on_enemy(mut self, stop: bool) -> Self {
        self.stop_on_enemy_hit = stop;
        self
    }

    pub fn with_arrival(mut self, arrival: Arrival) -> Self {
        self.arrival = Some(Box::new(arrival));
        self
    }

    pub fn is_dash(&self) -> bool {
        self.kind == ForcedKind::Dash
    }

    /// Move `position` for one tick. Returns the new position and whether
    /// the movement is finished.
    pub fn advance(&mut self, position: Vec2, delta: f64) -> (Vec2, bool) {
        let step = (self.speed * delta).min(self.remaining_distance).max(0.0);
        self.remaining_distance -= step;
        let finished = self.remaining_distance <= crate::types::TIME_EPSILON || self.speed <= 0.0;
        (position + self.direction * step, finished)
    }
}
