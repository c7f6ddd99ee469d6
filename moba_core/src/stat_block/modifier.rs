//! StatModifier - a named bundle of flat and percent deltas

use super::stat_line::{StatKind, StatLine};
use crate::types::is_expired;
use serde::{Deserialize, Serialize};

/// Flat and percent deltas contributed under one source id.
///
/// Re-applying a modifier with an id that is already present overwrites it.
/// `expires_in` of `None` means permanent until removed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub source_id: String,
    #[serde(default)]
    pub flat: StatLine,
    #[serde(default)]
    pub percent: StatLine,
    #[serde(default)]
    pub expires_in: Option<f64>,
}

impl StatModifier {
    /// Create an empty permanent modifier
    pub fn new(source_id: impl Into<String>) -> Self {
        StatModifier {
            source_id: source_id.into(),
            flat: StatLine::new(),
            percent: StatLine::new(),
            expires_in: None,
        }
    }

    /// Builder: add a flat delta
    pub fn with_flat(mut self, stat: StatKind, value: f64) -> Self {
        self.flat.set(stat, self.flat.get(stat) + value);
        self
    }

    /// Builder: add a percent delta (0.2 = +20%)
    pub fn with_percent(mut self, stat: StatKind, value: f64) -> Self {
        self.percent.set(stat, self.percent.get(stat) + value);
        self
    }

    /// Builder: expire after `seconds`
    pub fn lasting(mut self, seconds: f64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Count down the expiry. Returns true while the modifier is still live.
    pub fn tick(&mut self, delta: f64) -> bool {
        match self.expires_in.as_mut() {
            Some(remaining) => {
                *remaining -= delta;
                !is_expired(*remaining)
            }
            None => true,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_in.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_same_stat() {
        let modifier = StatModifier::new("test")
            .with_flat(StatKind::Armor, 10.0)
            .with_flat(StatKind::Armor, 5.0)
            .with_percent(StatKind::MovementSpeed, 0.1);
        assert!((modifier.flat.armor - 15.0).abs() < f64::EPSILON);
        assert!((modifier.percent.movement_speed - 0.1).abs() < f64::EPSILON);
        assert!(modifier.is_permanent());
    }

    #[test]
    fn test_timed_modifier_expires() {
        let mut modifier = StatModifier::new("haste").lasting(1.0);
        assert!(modifier.tick(0.5));
        assert!(modifier.tick(0.5));
        assert!(!modifier.tick(0.1));
    }

    #[test]
    fn test_permanent_never_expires() {
        let mut modifier = StatModifier::new("item_slot_0");
        assert!(modifier.tick(1_000.0));
    }
}
