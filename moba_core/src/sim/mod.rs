//! Simulation - the single-threaded fixed-step world
//!
//! The simulation owns every unit, the clock, the queue of scheduled
//! effects and the RNG. All cross-unit interaction goes through it: the
//! cast pipeline, effect resolution, basic attacks, movement and passive
//! hooks are implemented as `impl Simulation` blocks in the submodules.
//!
//! `step(dt)` runs in a fixed order:
//! 1. advance the clock
//! 2. tick every unit (cooldowns, effects, modifiers, CC, shields, regen)
//! 3. movement (forced movement replaces normal movement)
//! 4. auto-attacks
//! 5. scheduled effects that came due, in insertion order
//! 6. passive hooks

mod attack;
mod cast;
mod events;
mod hooks;
mod movement;
mod resolve;
mod schedule;
mod snapshot;

pub use attack::AttackError;
pub use events::CombatEvent;
pub use schedule::{Schedule, ScheduledAction};
pub use snapshot::{EffectSnapshot, SimSnapshot, UnitSnapshot};

use crate::ability::AbilityState;
use crate::config::{ContentError, GameConstants};
use crate::effect::ActiveEffect;
use crate::item::{Inventory, ItemDef, PurchaseError};
use crate::stat_block::UnitStats;
use crate::types::{AbilitySlot, Side, UnitId, Vec2};
use crate::unit::{Unit, UnitCatalog, UnitDef, UnitRules};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, trace};

/// The world every unit lives in.
///
/// Every step appends to the combat log and nothing trims it. Long-running
/// drivers should call [`Simulation::drain_events`] after each step (or
/// batch of steps) to keep it bounded.
#[derive(Debug, Clone)]
pub struct Simulation {
    units: BTreeMap<UnitId, Unit>,
    next_id: u32,
    clock: f64,
    schedule: Schedule,
    rng: ChaCha8Rng,
    constants: GameConstants,
    /// Grows until drained
    events: Vec<CombatEvent>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(GameConstants::default(), 0)
    }
}

impl Simulation {
    pub fn new(constants: GameConstants, seed: u64) -> Self {
        Simulation {
            units: BTreeMap::new(),
            next_id: 1,
            clock: 0.0,
            schedule: Schedule::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            constants,
            events: Vec::new(),
        }
    }

    /// Default constants with a fixed RNG seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(GameConstants::default(), seed)
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    /// Seconds since the simulation started
    pub fn time(&self) -> f64 {
        self.clock
    }

    // === Unit lifecycle ===

    /// Build a unit from a definition and add it to the world
    pub fn spawn(&mut self, def: &UnitDef, side: Side, position: Vec2) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        let unit = Unit::with_rules(id, def, side, position, UnitRules::from(&self.constants));
        info!(unit = %id, def = %def.id, side = side.0, "unit spawned");
        self.units.insert(id, unit);
        id
    }

    /// Spawn by definition id
    pub fn spawn_from(
        &mut self,
        catalog: &UnitCatalog,
        def_id: &str,
        side: Side,
        position: Vec2,
    ) -> Result<UnitId, ContentError> {
        let def = Arc::clone(catalog.require(def_id)?);
        Ok(self.spawn(&def, side, position))
    }

    /// Remove a unit from the active set
    pub fn despawn(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        info!(unit = %id, name = %unit.name, "unit despawned");
        Some(unit)
    }

    /// Revive a dead unit at full health
    pub fn respawn(&mut self, id: UnitId, position: Vec2) -> bool {
        let revived = self
            .units
            .get_mut(&id)
            .is_some_and(|unit| unit.revive(position));
        if revived {
            self.record(CombatEvent::Respawn {
                time: self.clock,
                unit: id,
            });
        }
        revived
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Every unit, in id order
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    pub fn living_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.is_alive())
    }

    // === Shop ===

    /// Buy an item for a unit. `None` if the unit does not exist.
    pub fn purchase(&mut self, id: UnitId, item: Arc<ItemDef>) -> Option<Result<usize, PurchaseError>> {
        let unit = self.units.get_mut(&id)?;
        let item_id = item.id.clone();
        let result = unit.purchase(item);
        if let Ok(slot) = result {
            self.record(CombatEvent::Purchase {
                time: self.clock,
                unit: id,
                item: item_id,
                slot,
            });
        }
        Some(result)
    }

    /// Sell the item in `slot`. Returns the gold credited.
    pub fn sell(&mut self, id: UnitId, slot: usize) -> u32 {
        let Some(unit) = self.units.get_mut(&id) else {
            return 0;
        };
        let item = unit.inventory().get(slot).map(|item| item.id.clone());
        let gold = unit.sell(slot);
        if let Some(item) = item {
            self.record(CombatEvent::Sell {
                time: self.clock,
                unit: id,
                item,
                gold,
            });
        }
        gold
    }

    // === Orders ===

    pub fn move_to(&mut self, id: UnitId, target: Vec2) -> bool {
        match self.units.get_mut(&id) {
            Some(unit) if unit.is_alive() => {
                unit.move_to(target);
                true
            }
            _ => false,
        }
    }

    /// Order a unit to auto-attack another
    pub fn attack_unit(&mut self, id: UnitId, target: UnitId) -> bool {
        if id == target || !self.units.contains_key(&target) {
            return false;
        }
        match self.units.get_mut(&id) {
            Some(unit) if unit.is_alive() => {
                unit.attack(target);
                true
            }
            _ => false,
        }
    }

    // === Read-only queries ===

    pub fn stats(&self, id: UnitId) -> Option<UnitStats> {
        self.units.get(&id).map(Unit::stats)
    }

    pub fn active_effects(&self, id: UnitId) -> Option<&[ActiveEffect]> {
        self.units.get(&id).map(Unit::active_effects)
    }

    pub fn ability(&self, id: UnitId, slot: AbilitySlot) -> Option<&AbilityState> {
        self.units.get(&id).and_then(|u| u.ability(slot))
    }

    pub fn cooldown_progress(&self, id: UnitId, slot: AbilitySlot) -> f64 {
        self.units
            .get(&id)
            .map_or(0.0, |u| u.cooldown_progress(slot))
    }

    pub fn inventory(&self, id: UnitId) -> Option<&Inventory> {
        self.units.get(&id).map(Unit::inventory)
    }

    // === Events ===

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn record(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    // === Step ===

    /// Advance the world by `dt` seconds
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.clock += dt;
        trace!(time = self.clock, "step");

        let ids = self.unit_ids();
        for id in &ids {
            let Some(unit) = self.units.get_mut(id) else {
                continue;
            };
            for tick in unit.tick(dt) {
                self.events.push(CombatEvent::Periodic {
                    time: self.clock,
                    target: *id,
                    source: tick.source,
                    effect: tick.effect_id,
                    amount: tick.amount,
                    is_heal: tick.damage_type.is_none(),
                });
            }
        }

        self.step_movement(dt);
        self.step_auto_attacks();
        self.run_schedule();
        self.resolve_hooks();
    }

    /// Step `count` times at a fixed `dt`
    pub fn run_for(&mut self, count: u32, dt: f64) {
        for _ in 0..count {
            self.step(dt);
        }
    }
}
