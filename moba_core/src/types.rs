//! Core types shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Slack used when comparing countdowns against zero.
///
/// Fixed-step clocks accumulate `1/60`-style increments that never land
/// exactly on a duration boundary.
pub const TIME_EPSILON: f64 = 1e-9;

/// True once a countdown has run past zero (a countdown sitting exactly on
/// the boundary is still live for that tick).
pub fn is_expired(remaining: f64) -> bool {
    remaining < -TIME_EPSILON
}

/// True once a cooldown-style countdown has reached zero.
pub fn is_elapsed(remaining: f64) -> bool {
    remaining <= TIME_EPSILON
}

/// Identifier of a unit inside a [`crate::sim::Simulation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team a unit fights for (0 or 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Side(pub u8);

impl Side {
    pub const BLUE: Side = Side(0);
    pub const RED: Side = Side(1);

    pub fn opponent(self) -> Side {
        Side(1 - (self.0 & 1))
    }

    /// Default facing along the lane: side 0 pushes toward +x, side 1 toward -x
    pub fn attack_direction(self) -> Vec2 {
        if self.0 == 0 {
            Vec2::new(1.0, 0.0)
        } else {
            Vec2::new(-1.0, 0.0)
        }
    }
}

/// Damage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Reduced by armor
    Physical,
    /// Reduced by magic resist
    Magic,
    /// Ignores both resists
    True,
}

/// What pool an ability cost draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Mana,
    Energy,
    /// Resourceless units can always afford their abilities
    None,
}

/// Broad category of a unit definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    #[default]
    Champion,
    Minion,
    Monster,
    Structure,
}

/// The four ability slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilitySlot {
    Q,
    W,
    E,
    R,
}

impl AbilitySlot {
    pub fn all() -> &'static [AbilitySlot] {
        &[AbilitySlot::Q, AbilitySlot::W, AbilitySlot::E, AbilitySlot::R]
    }

    pub fn index(self) -> usize {
        match self {
            AbilitySlot::Q => 0,
            AbilitySlot::W => 1,
            AbilitySlot::E => 2,
            AbilitySlot::R => 3,
        }
    }
}

/// 2D world position / direction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len <= f64::EPSILON {
            None
        } else {
            Some(Vec2::new(self.x / len, self.y / len))
        }
    }

    /// Move toward `target` by at most `max_step`
    pub fn move_toward(self, target: Vec2, max_step: f64) -> Vec2 {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f64::EPSILON {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }

    /// Shortest distance from this point to the segment `a..b`
    pub fn distance_to_segment(self, a: Vec2, b: Vec2) -> f64 {
        let ab = b - a;
        let len_sq = ab.dot(ab);
        if len_sq <= f64::EPSILON {
            return self.distance(a);
        }
        let t = ((self - a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.distance(a + ab * t)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}
