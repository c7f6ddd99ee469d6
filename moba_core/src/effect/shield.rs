//! Shields - temporary damage absorption

use crate::types::is_expired;
use serde::{Deserialize, Serialize};

/// A single shield instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub amount: f64,
    /// `None` lasts until depleted
    pub remaining: Option<f64>,
    /// Label of whatever granted the shield
    pub source: String,
}

/// All shields on a unit, kept in application order.
///
/// Damage drains the oldest shield first and only moves to the next one
/// once the previous is gone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldStack {
    shields: Vec<Shield>,
}

impl ShieldStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, amount: f64, duration: Option<f64>, source: impl Into<String>) {
        if amount <= 0.0 {
            return;
        }
        self.shields.push(Shield {
            amount,
            remaining: duration,
            source: source.into(),
        });
    }

    /// Soak up to `damage`. Returns the amount absorbed.
    pub fn absorb(&mut self, damage: f64) -> f64 {
        let mut left = damage.max(0.0);
        let mut absorbed = 0.0;
        for shield in self.shields.iter_mut() {
            if left <= 0.0 {
                break;
            }
            let take = shield.amount.min(left);
            shield.amount -= take;
            left -= take;
            absorbed += take;
        }
        self.shields.retain(|s| s.amount > 0.0);
        absorbed
    }

    /// Count down timed shields, dropping expired ones
    pub fn tick(&mut self, delta: f64) {
        for shield in self.shields.iter_mut() {
            if let Some(remaining) = shield.remaining.as_mut() {
                *remaining -= delta;
            }
        }
        self.shields
            .retain(|s| !s.remaining.is_some_and(is_expired));
    }

    pub fn total(&self) -> f64 {
        self.shields.iter().map(|s| s.amount).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shield> {
        self.shields.iter()
    }

    pub fn len(&self) -> usize {
        self.shields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shields.is_empty()
    }

    pub fn clear(&mut self) {
        self.shields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_shield_drains_first() {
        let mut stack = ShieldStack::new();
        stack.add(20.0, None, "S1");
        stack.add(30.0, None, "S2");

        let absorbed = stack.absorb(25.0);
        assert!((absorbed - 25.0).abs() < f64::EPSILON);

        let left: Vec<&Shield> = stack.iter().collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].source, "S2");
        assert!((left[0].amount - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_absorb_caps_at_total() {
        let mut stack = ShieldStack::new();
        stack.add(40.0, None, "barrier");
        assert!((stack.absorb(100.0) - 40.0).abs() < f64::EPSILON);
        assert!(stack.is_empty());
        assert_eq!(stack.absorb(10.0), 0.0);
    }

    #[test]
    fn test_timed_shield_expires() {
        let mut stack = ShieldStack::new();
        stack.add(50.0, Some(1.0), "timed");
        stack.add(10.0, None, "lasting");
        stack.tick(0.5);
        assert!((stack.total() - 60.0).abs() < f64::EPSILON);
        stack.tick(0.6);
        assert!((stack.total() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_shield_is_ignored() {
        let mut stack = ShieldStack::new();
        stack.add(0.0, None, "empty");
        assert!(stack.is_empty());
    }
}
