//! EffectContext - who applied an effect, and from where

use crate::combat::DamageOrigin;
use crate::stat_block::UnitStats;
use crate::types::{Side, UnitId, Vec2};

/// Everything an effect needs to resolve besides its own data
#[derive(Debug, Clone, PartialEq)]
pub struct EffectContext {
    pub caster: UnitId,
    /// Captured so side filters still work if the caster is gone
    pub caster_side: Side,
    /// Caster stats when the context was built. Used only when the caster
    /// no longer exists at resolution time.
    pub caster_stats: UnitStats,
    /// Ability rank (or unit level for level-scaled passives)
    pub rank: u8,
    pub primary: Option<UnitId>,
    /// Centre for area policies
    pub point: Vec2,
    pub origin: DamageOrigin,
    /// Ability, passive or item id; used to label shields and modifiers
    pub label: String,
}

impl EffectContext {
    /// Same context aimed at another unit and point
    pub fn retarget(&self, primary: Option<UnitId>, point: Vec2) -> Self {
        EffectContext {
            primary,
            point,
            ..self.clone()
        }
    }
}
