//! Read-only views for rendering, UI and networking

use super::Simulation;
use crate::cc::CcKind;
use crate::stat_block::UnitStats;
use crate::types::{AbilitySlot, Side, UnitId, UnitKind, Vec2};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub id: String,
    pub remaining: f64,
    pub stacks: u32,
    pub is_debuff: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub def_id: String,
    pub name: String,
    pub kind: UnitKind,
    pub side: Side,
    pub position: Vec2,
    pub is_dead: bool,
    pub stats: UnitStats,
    pub shield: f64,
    pub effects: Vec<EffectSnapshot>,
    pub crowd_control: Vec<CcKind>,
    /// Rank per slot, Q to R
    pub ranks: [u8; 4],
    /// Cooldown progress per slot, Q to R
    pub cooldowns: [f64; 4],
    pub gold: u32,
    /// Item id per inventory slot
    pub items: Vec<Option<String>>,
}

impl From<&Unit> for UnitSnapshot {
    fn from(unit: &Unit) -> Self {
        let slots = AbilitySlot::all();
        UnitSnapshot {
            id: unit.id,
            def_id: unit.def_id.clone(),
            name: unit.name.clone(),
            kind: unit.kind,
            side: unit.side,
            position: unit.position,
            is_dead: unit.is_dead(),
            stats: unit.stats(),
            shield: unit.total_shield(),
            effects: unit
                .active_effects()
                .iter()
                .map(|e| EffectSnapshot {
                    id: e.id.clone(),
                    remaining: e.remaining,
                    stacks: e.stacks,
                    is_debuff: e.is_debuff,
                })
                .collect(),
            crowd_control: unit.crowd_control().iter().map(|c| c.kind).collect(),
            ranks: std::array::from_fn(|i| unit.ability(slots[i]).map_or(0, |a| a.rank())),
            cooldowns: std::array::from_fn(|i| unit.cooldown_progress(slots[i])),
            gold: unit.gold(),
            items: (0..unit.inventory().capacity())
                .map(|slot| unit.inventory().get(slot).map(|item| item.id.clone()))
                .collect(),
        }
    }
}

/// The whole world at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub time: f64,
    pub units: Vec<UnitSnapshot>,
}

impl Simulation {
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            time: self.clock,
            units: self.units().map(UnitSnapshot::from).collect(),
        }
    }
}
