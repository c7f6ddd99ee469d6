//! Capability traits implemented by units

use crate::types::{Side, Vec2};

pub trait HasHealth {
    fn health(&self) -> f64;
    fn max_health(&self) -> f64;
    fn is_dead(&self) -> bool;

    fn is_alive(&self) -> bool {
        !self.is_dead()
    }
}

pub trait HasPosition {
    fn position(&self) -> Vec2;

    fn distance_to(&self, other: &impl HasPosition) -> f64 {
        self.position().distance(other.position())
    }
}

pub trait HasSide {
    fn side(&self) -> Side;

    fn is_enemy_of(&self, other: &impl HasSide) -> bool {
        self.side() != other.side()
    }

    fn is_ally_of(&self, other: &impl HasSide) -> bool {
        self.side() == other.side()
    }
}
