//! Basic-attack modifiers (empowered next hits)

use crate::types::{is_expired, DamageType, UnitId};
use serde::{Deserialize, Serialize};

/// Bonus damage on the next `charges` basic attacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackModifier {
    pub id: String,
    pub source: Option<UnitId>,
    /// Bonus per hit, resolved when the modifier was granted
    pub bonus: f64,
    pub damage_type: DamageType,
    pub charges: u32,
    pub remaining: Option<f64>,
}

impl AttackModifier {
    /// Count down the expiry. Returns true while still live.
    pub fn tick(&mut self, delta: f64) -> bool {
        match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining -= delta;
                !is_expired(*remaining)
            }
            None => true,
        }
    }
}

/// Spend one charge from every modifier, returning the bonus hits
pub(crate) fn spend_charges(modifiers: &mut Vec<AttackModifier>) -> Vec<(f64, DamageType)> {
    let hits = modifiers
        .iter_mut()
        .filter(|m| m.charges > 0)
        .map(|m| {
            m.charges -= 1;
            (m.bonus, m.damage_type)
        })
        .collect();
    modifiers.retain(|m| m.charges > 0);
    hits
}
