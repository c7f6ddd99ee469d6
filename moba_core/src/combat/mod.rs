//! Combat resolution - damage breakdowns and basic attack rolls

mod resolution;
mod result;

pub use resolution::{roll_attack, AttackRoll};
pub use result::{AttackOutcome, DamageOrigin, DamageResult};
