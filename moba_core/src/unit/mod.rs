//! Unit - the champion/minion/monster/structure state machine
//!
//! A unit owns all of its mutable combat state. Other units only reach it
//! through the public methods here (`take_damage`, `heal`, `apply_effect`
//! and friends); the simulation decides who calls what.

mod attack;
mod def;
mod movement;
mod passive;
mod shop;
mod traits;

pub use attack::AttackModifier;
pub use def::{UnitCatalog, UnitDef};
pub use movement::{Arrival, ForcedKind, ForcedMovement};
pub use passive::{HookEvent, PassiveDef, PassiveState, Trigger, TriggerKind};
pub use traits::{HasHealth, HasPosition, HasSide};

use crate::ability::AbilityState;
use crate::cc::{CcKind, CrowdControl, CrowdControlSet};
use crate::combat::{DamageOrigin, DamageResult};
use crate::config::GameConstants;
use crate::defense::{self, constants::DEFAULT_MIN_RESIST};
use crate::effect::{ActiveEffect, MergeOutcome, PeriodicTick, ShieldStack, Stacking};
use crate::item::{Inventory, DEFAULT_INVENTORY_CAPACITY};
use crate::stat_block::{StatBlock, StatModifier, UnitStats};
use crate::types::{AbilitySlot, DamageType, ResourceKind, Side, UnitId, UnitKind, Vec2};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Game rules a unit needs locally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRules {
    pub min_resist: f64,
    pub combat_timeout: f64,
    pub max_level: u32,
    pub inventory_capacity: usize,
    pub collision_radius: f64,
}

impl Default for UnitRules {
    fn default() -> Self {
        UnitRules {
            min_resist: DEFAULT_MIN_RESIST,
            combat_timeout: 5.0,
            max_level: 18,
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            collision_radius: 35.0,
        }
    }
}

impl From<&GameConstants> for UnitRules {
    fn from(constants: &GameConstants) -> Self {
        UnitRules {
            min_resist: constants.combat.min_resist,
            combat_timeout: constants.combat.combat_timeout,
            max_level: constants.units.max_level,
            inventory_capacity: constants.shop.inventory_capacity,
            collision_radius: constants.units.default_collision_radius,
        }
    }
}

/// A live unit
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub def_id: String,
    pub name: String,
    pub kind: UnitKind,
    pub side: Side,
    pub position: Vec2,
    pub collision_radius: f64,
    pub resource_kind: ResourceKind,
    pub bounty: u32,

    stats: StatBlock,
    rules: UnitRules,
    innate_immunities: BTreeSet<String>,
    effects: Vec<ActiveEffect>,
    shields: ShieldStack,
    crowd_control: CrowdControlSet,
    attack_modifiers: Vec<AttackModifier>,
    abilities: [Option<AbilityState>; 4],
    passives: Vec<PassiveState>,
    forced_movement: Option<ForcedMovement>,
    move_target: Option<Vec2>,
    attack_target: Option<UnitId>,
    attack_cooldown: f64,
    inventory: Inventory,
    gold: u32,
    is_dead: bool,
    regen_out_of_combat_only: bool,
    since_combat: f64,
    pending_hooks: Vec<HookEvent>,
}

impl Unit {
    /// Build a level 1 unit from its definition with default rules
    pub fn new(id: UnitId, def: &UnitDef, side: Side, position: Vec2) -> Self {
        Self::with_rules(id, def, side, position, UnitRules::default())
    }

    pub fn with_rules(id: UnitId, def: &UnitDef, side: Side, position: Vec2, rules: UnitRules) -> Self {
        let mut abilities: [Option<AbilityState>; 4] = Default::default();
        for ability in &def.abilities {
            abilities[ability.slot.index()] = Some(AbilityState::new(Arc::clone(ability)));
        }

        let passives = def
            .passives
            .iter()
            .map(|p| PassiveState::new(p.id.clone(), Arc::new(p.clone())))
            .collect();

        Unit {
            id,
            def_id: def.id.clone(),
            name: def.name.clone(),
            kind: def.kind,
            side,
            position,
            collision_radius: def.collision_radius.unwrap_or(rules.collision_radius),
            resource_kind: def.resource,
            bounty: def.bounty,
            stats: StatBlock::new(def.id.clone(), def.base, def.growth),
            rules,
            innate_immunities: def.immunities.iter().cloned().collect(),
            effects: Vec::new(),
            shields: ShieldStack::new(),
            crowd_control: CrowdControlSet::new(),
            attack_modifiers: Vec::new(),
            abilities,
            passives,
            forced_movement: None,
            move_target: None,
            attack_target: None,
            attack_cooldown: 0.0,
            inventory: Inventory::with_capacity(rules.inventory_capacity),
            gold: def.starting_gold,
            is_dead: false,
            regen_out_of_combat_only: def.regen_out_of_combat_only,
            since_combat: rules.combat_timeout,
            pending_hooks: Vec::new(),
        }
    }

    // === Stats ===

    /// Fresh stat snapshot
    pub fn stats(&self) -> UnitStats {
        self.stats.stats()
    }

    pub fn stat_block(&self) -> &StatBlock {
        &self.stats
    }

    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    /// Set the level. False (and unchanged) outside `1..=max_level`.
    pub fn set_level(&mut self, level: u32) -> bool {
        if level == 0 || level > self.rules.max_level {
            return false;
        }
        self.stats.set_level(level);
        true
    }

    pub fn level_up(&mut self) -> bool {
        self.set_level(self.level() + 1)
    }

    pub fn apply_buff(&mut self, modifier: StatModifier) {
        self.stats.apply_buff(modifier);
    }

    pub fn remove_buff(&mut self, source_id: &str) -> bool {
        self.stats.remove_buff(source_id)
    }

    pub fn has_buff(&self, source_id: &str) -> bool {
        self.stats.has_buff(source_id)
    }

    pub fn rules(&self) -> &UnitRules {
        &self.rules
    }

    // === Health ===

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    pub fn health(&self) -> f64 {
        self.stats.current_health()
    }

    /// Set current health directly (clamped). Setting 0 does not kill.
    pub fn set_health(&mut self, value: f64) {
        self.stats.set_health(value);
    }

    /// Apply damage from an ability or the driver. Returns the damage
    /// absorbed by shields and health combined.
    pub fn take_damage(&mut self, amount: f64, damage_type: DamageType, source: Option<UnitId>) -> f64 {
        self.take_damage_from(amount, damage_type, source, DamageOrigin::Ability)
            .total()
    }

    /// Full damage intake: resists, then shields (oldest first), then
    /// health.
    pub fn take_damage_from(
        &mut self,
        amount: f64,
        damage_type: DamageType,
        source: Option<UnitId>,
        origin: DamageOrigin,
    ) -> DamageResult {
        if self.is_dead {
            return DamageResult::none(damage_type, source, amount);
        }

        let stats = self.stats();
        let raw = amount.max(0.0);
        let after_resist = match stats.resistance(damage_type) {
            Some(resist) => defense::mitigate(raw, resist, self.rules.min_resist),
            None => raw,
        };

        let absorbed_by_shields = self.shields.absorb(after_resist);
        let health_before = stats.health;
        let to_health = (after_resist - absorbed_by_shields).min(health_before);
        let health_after = health_before - to_health;
        self.stats.set_health(health_after);

        if after_resist > 0.0 {
            self.since_combat = 0.0;
        }

        let is_killing_blow = after_resist - absorbed_by_shields > 0.0 && health_after <= 0.0;
        trace!(
            unit = %self.id,
            raw,
            after_resist,
            absorbed_by_shields,
            to_health,
            "damage taken"
        );

        if after_resist > 0.0 {
            self.raise(TriggerKind::OnTakeDamage, source, origin);
        }
        if is_killing_blow {
            self.die(source);
        } else {
            self.check_low_health(source, origin);
        }

        DamageResult {
            damage_type,
            source,
            raw,
            after_resist,
            absorbed_by_shields,
            to_health,
            health_before,
            health_after,
            is_killing_blow,
        }
    }

    /// Heal up to max health. Returns the amount actually healed.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if self.is_dead || amount <= 0.0 {
            return 0.0;
        }
        let stats = self.stats();
        let healed = amount.min(stats.max_health - stats.health).max(0.0);
        self.stats.set_health(stats.health + healed);
        self.rearm_low_health();
        healed
    }

    fn die(&mut self, killer: Option<UnitId>) {
        self.is_dead = true;
        self.shields.clear();
        for cc in self.crowd_control.clear() {
            self.stats.remove_buff(&cc.modifier_id());
        }
        self.forced_movement = None;
        self.move_target = None;
        self.attack_target = None;
        self.attack_modifiers.clear();

        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| e.persists_through_death);
        self.effects = kept;
        for effect in &dropped {
            self.reverse(effect);
        }
        self.stats.set_health(0.0);

        self.pending_hooks.push(HookEvent {
            kind: TriggerKind::OnDeath,
            other: killer,
            passive: None,
        });
        info!(unit = %self.id, name = %self.name, killer = ?killer, "unit died");
    }

    /// Bring a dead unit back at full health
    pub fn revive(&mut self, position: Vec2) -> bool {
        if !self.is_dead {
            return false;
        }
        self.is_dead = false;
        self.position = position;
        self.stats.refill();
        self.since_combat = self.rules.combat_timeout;
        self.attack_cooldown = 0.0;
        for passive in self.passives.iter_mut() {
            passive.armed = true;
        }
        info!(unit = %self.id, name = %self.name, "unit revived");
        true
    }

    // === Shields ===

    pub fn add_shield(&mut self, amount: f64, duration: Option<f64>, source: impl Into<String>) {
        if self.is_dead {
            return;
        }
        self.shields.add(amount, duration, source);
    }

    pub fn shields(&self) -> &ShieldStack {
        &self.shields
    }

    pub fn total_shield(&self) -> f64 {
        self.shields.total()
    }

    // === Resource ===

    pub fn resource(&self) -> f64 {
        self.stats.current_resource()
    }

    /// Pure affordability check
    pub fn can_afford(&self, cost: f64) -> bool {
        match self.resource_kind {
            ResourceKind::None => true,
            _ => cost <= 0.0 || self.resource() + crate::types::TIME_EPSILON >= cost,
        }
    }

    /// Deduct a cost. False (and unchanged) when unaffordable.
    pub fn spend_resource(&mut self, cost: f64) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        if self.resource_kind != ResourceKind::None && cost > 0.0 {
            self.stats.set_resource(self.resource() - cost);
        }
        true
    }

    pub fn restore_resource(&mut self, amount: f64) -> f64 {
        if self.is_dead || self.resource_kind == ResourceKind::None || amount <= 0.0 {
            return 0.0;
        }
        let before = self.resource();
        self.stats.set_resource(before + amount);
        self.resource() - before
    }

    /// Fill resource to max
    pub fn refill_resource(&mut self) {
        let max = self.stats().max_resource;
        self.stats.set_resource(max);
    }

    // === Immunities ===

    pub fn has_immunity(&self, tag: &str) -> bool {
        self.innate_immunities.contains(tag) || self.effects.iter().any(|e| e.grants_immunity(tag))
    }

    pub fn grant_immunity(&mut self, tag: impl Into<String>) {
        self.innate_immunities.insert(tag.into());
    }

    pub fn revoke_immunity(&mut self, tag: &str) -> bool {
        self.innate_immunities.remove(tag)
    }

    // === Active effects ===

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn effect(&self, id: &str) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn has_effect(&self, id: &str) -> bool {
        self.effect(id).is_some()
    }

    /// Attach or merge a duration effect. `None` if the unit is dead.
    pub fn apply_effect(&mut self, effect: ActiveEffect) -> Option<MergeOutcome> {
        if self.is_dead {
            return None;
        }
        let outcome = match self.effects.iter().position(|e| e.id == effect.id) {
            None => {
                self.install(effect);
                MergeOutcome::Added
            }
            Some(index) if self.effects[index].stacking == Stacking::Replace => {
                let old = self.effects.remove(index);
                self.reverse(&old);
                self.install(effect);
                MergeOutcome::Replaced
            }
            Some(index) => {
                let outcome = self.effects[index].merge(effect);
                if let Some(modifier) = self.effects[index].current_modifier() {
                    self.stats.apply_buff(modifier);
                }
                outcome
            }
        };
        debug!(unit = %self.id, outcome = ?outcome, "effect applied");
        Some(outcome)
    }

    /// Remove an effect by id, reversing its modifier
    pub fn remove_effect(&mut self, id: &str) -> bool {
        match self.effects.iter().position(|e| e.id == id) {
            Some(index) => {
                let effect = self.effects.remove(index);
                self.reverse(&effect);
                true
            }
            None => false,
        }
    }

    /// Strip cleansable crowd control and cleansable debuffs. Returns how
    /// many were removed.
    pub fn cleanse(&mut self) -> usize {
        let removed_cc = self.crowd_control.cleanse();
        for cc in &removed_cc {
            self.stats.remove_buff(&cc.modifier_id());
        }
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| e.is_debuff && e.cleansable);
        self.effects = kept;
        for effect in &removed {
            self.reverse(effect);
        }
        removed_cc.len() + removed.len()
    }

    fn install(&mut self, effect: ActiveEffect) {
        if let Some(modifier) = effect.current_modifier() {
            self.stats.apply_buff(modifier);
        }
        self.effects.push(effect);
    }

    fn reverse(&mut self, effect: &ActiveEffect) {
        if effect.current_modifier().is_some() {
            self.stats.remove_buff(&effect.modifier_id());
        }
    }

    // === Crowd control ===

    /// Apply a crowd control instance. `None` if dead or immune.
    pub fn apply_crowd_control(&mut self, cc: CrowdControl) -> Option<u64> {
        if self.is_dead || self.has_immunity(cc.kind.tag()) || self.has_immunity("crowd_control") {
            return None;
        }
        let kind = cc.kind;
        let id = self.crowd_control.apply(cc);
        if let Some(modifier) = self.crowd_control.get(id).and_then(CrowdControl::movement_modifier) {
            self.stats.apply_buff(modifier);
        }
        if kind == CcKind::Taunt {
            self.move_target = None;
        }
        debug!(unit = %self.id, cc = ?kind, "crowd control applied");
        Some(id)
    }

    pub fn remove_crowd_control(&mut self, id: u64) -> bool {
        match self.crowd_control.remove(id) {
            Some(cc) => {
                self.stats.remove_buff(&cc.modifier_id());
                true
            }
            None => false,
        }
    }

    pub fn crowd_control(&self) -> &CrowdControlSet {
        &self.crowd_control
    }

    pub fn can_move(&self) -> bool {
        !self.is_dead && self.crowd_control.can_move() && self.forced_movement.is_none()
    }

    pub fn can_attack(&self) -> bool {
        !self.is_dead && self.crowd_control.can_attack()
    }

    pub fn can_cast(&self) -> bool {
        !self.is_dead && self.crowd_control.can_cast()
    }

    // === Forced movement ===

    /// Push the unit along `direction`. Refused (returning false, with no
    /// partial effect) when immune, dead or mid-dash.
    pub fn apply_knockback(&mut self, direction: Vec2, distance: f64, speed: f64) -> bool {
        if self.is_dead || self.has_immunity("knockback") {
            return false;
        }
        if self.forced_movement.as_ref().is_some_and(ForcedMovement::is_dash) {
            return false;
        }
        let Some(direction) = direction.normalized() else {
            return false;
        };
        if distance <= 0.0 {
            return false;
        }
        self.forced_movement = Some(ForcedMovement::knockback(direction, distance, speed));
        true
    }

    /// Start a dash. Refused when immune, dead or already displaced.
    pub fn start_dash(&mut self, movement: ForcedMovement) -> bool {
        if self.is_dead || self.has_immunity("dash") || self.forced_movement.is_some() {
            return false;
        }
        self.forced_movement = Some(movement);
        true
    }

    pub fn is_in_forced_movement(&self) -> bool {
        self.forced_movement.is_some()
    }

    pub fn forced_movement(&self) -> Option<&ForcedMovement> {
        self.forced_movement.as_ref()
    }

    pub(crate) fn forced_movement_mut(&mut self) -> Option<&mut ForcedMovement> {
        self.forced_movement.as_mut()
    }

    pub(crate) fn end_forced_movement(&mut self) -> Option<ForcedMovement> {
        self.forced_movement.take()
    }

    // === Orders ===

    pub fn move_to(&mut self, target: Vec2) {
        self.move_target = Some(target);
        self.attack_target = None;
    }

    pub fn attack(&mut self, target: UnitId) {
        self.attack_target = Some(target);
        self.move_target = None;
    }

    pub fn stop(&mut self) {
        self.move_target = None;
        self.attack_target = None;
    }

    pub fn move_target(&self) -> Option<Vec2> {
        self.move_target
    }

    pub(crate) fn clear_move_target(&mut self) {
        self.move_target = None;
    }

    /// Attack order, overridden by an active taunt
    pub fn attack_target(&self) -> Option<UnitId> {
        self.crowd_control.taunt_source().or(self.attack_target)
    }

    pub(crate) fn clear_attack_target(&mut self) {
        self.attack_target = None;
    }

    // === Basic attacks ===

    pub fn attack_ready(&self) -> bool {
        crate::types::is_elapsed(self.attack_cooldown)
    }

    pub(crate) fn start_attack_cooldown(&mut self, interval: f64) {
        self.attack_cooldown = interval;
        self.since_combat = 0.0;
    }

    pub fn add_attack_modifier(&mut self, modifier: AttackModifier) {
        if self.is_dead {
            return;
        }
        self.attack_modifiers.retain(|m| m.id != modifier.id);
        self.attack_modifiers.push(modifier);
    }

    pub fn attack_modifiers(&self) -> &[AttackModifier] {
        &self.attack_modifiers
    }

    pub(crate) fn spend_attack_modifiers(&mut self) -> Vec<(f64, DamageType)> {
        attack::spend_charges(&mut self.attack_modifiers)
    }

    // === Abilities ===

    pub fn ability(&self, slot: AbilitySlot) -> Option<&AbilityState> {
        self.abilities[slot.index()].as_ref()
    }

    pub(crate) fn ability_mut(&mut self, slot: AbilitySlot) -> Option<&mut AbilityState> {
        self.abilities[slot.index()].as_mut()
    }

    /// Learn or rank up an ability. False when the slot is empty or maxed.
    pub fn rank_up(&mut self, slot: AbilitySlot) -> bool {
        self.ability_mut(slot).is_some_and(AbilityState::rank_up)
    }

    pub fn set_ability_rank(&mut self, slot: AbilitySlot, rank: u8) -> bool {
        self.ability_mut(slot).is_some_and(|a| a.set_rank(rank))
    }

    /// 0.0 when ready (or empty), 1.0 right after a cast
    pub fn cooldown_progress(&self, slot: AbilitySlot) -> f64 {
        self.ability(slot).map_or(0.0, AbilityState::cooldown_progress)
    }

    pub fn reset_cooldowns(&mut self) {
        for ability in self.abilities.iter_mut().flatten() {
            ability.reset_cooldown();
        }
    }

    // === Passives and hooks ===

    pub fn passives(&self) -> &[PassiveState] {
        &self.passives
    }

    pub(crate) fn passives_mut(&mut self) -> &mut [PassiveState] {
        &mut self.passives
    }

    /// Queue a hook unless it was raised by a passive of the same kind
    pub(crate) fn raise(&mut self, kind: TriggerKind, other: Option<UnitId>, origin: DamageOrigin) {
        if origin == DamageOrigin::Passive(kind) {
            return;
        }
        self.pending_hooks.push(HookEvent {
            kind,
            other,
            passive: None,
        });
    }

    pub fn pending_hooks(&self) -> &[HookEvent] {
        &self.pending_hooks
    }

    pub(crate) fn take_hooks(&mut self) -> Vec<HookEvent> {
        std::mem::take(&mut self.pending_hooks)
    }

    fn check_low_health(&mut self, source: Option<UnitId>, origin: DamageOrigin) {
        if origin == DamageOrigin::Passive(TriggerKind::OnLowHealth) {
            return;
        }
        let fraction = self.stats().health_fraction();
        for passive in self.passives.iter_mut() {
            if let Trigger::OnLowHealth { threshold } = passive.def.trigger {
                if passive.armed && fraction < threshold {
                    passive.armed = false;
                    self.pending_hooks.push(HookEvent {
                        kind: TriggerKind::OnLowHealth,
                        other: source,
                        passive: Some(passive.id.clone()),
                    });
                }
            }
        }
    }

    fn rearm_low_health(&mut self) {
        let fraction = self.stats().health_fraction();
        for passive in self.passives.iter_mut() {
            if let Trigger::OnLowHealth { threshold } = passive.def.trigger {
                if !passive.armed && fraction >= threshold {
                    passive.armed = true;
                }
            }
        }
    }

    // === Gold ===

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn set_gold(&mut self, amount: u32) {
        self.gold = amount;
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    // === Tick ===

    /// Advance timers by `delta`. Periodic ticks that came due are applied
    /// and returned with `amount` set to what actually landed.
    pub fn tick(&mut self, delta: f64) -> Vec<PeriodicTick> {
        for ability in self.abilities.iter_mut().flatten() {
            ability.tick(delta);
        }
        for passive in self.passives.iter_mut() {
            passive.tick(delta);
        }
        self.attack_cooldown = (self.attack_cooldown - delta).max(0.0);

        let mut due = Vec::new();
        for effect in self.effects.iter_mut() {
            due.extend(effect.tick(delta));
        }
        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| !e.is_active());
        self.effects = live;
        for effect in &expired {
            self.reverse(effect);
            debug!(unit = %self.id, effect = %effect.id, "effect expired");
        }

        if self.is_dead {
            return Vec::new();
        }

        self.stats.tick_modifiers(delta);
        for cc in self.crowd_control.tick(delta) {
            self.stats.remove_buff(&cc.modifier_id());
        }
        self.shields.tick(delta);
        self.attack_modifiers.retain_mut(|m| m.tick(delta));

        self.since_combat += delta;
        let stats = self.stats();
        let in_combat = self.since_combat < self.rules.combat_timeout;
        if !(self.regen_out_of_combat_only && in_combat) && stats.health_regen > 0.0 {
            self.stats.set_health(stats.health + stats.health_regen * delta);
        }
        if self.resource_kind != ResourceKind::None && stats.resource_regen > 0.0 {
            self.stats.set_resource(stats.resource + stats.resource_regen * delta);
        }

        let mut applied = Vec::with_capacity(due.len());
        for mut tick in due {
            tick.amount = match tick.damage_type {
                Some(damage_type) => self
                    .take_damage_from(tick.amount, damage_type, tick.source, DamageOrigin::Periodic)
                    .total(),
                None => self.heal(tick.amount),
            };
            applied.push(tick);
        }
        self.rearm_low_health();
        applied
    }
}

impl HasHealth for Unit {
    fn health(&self) -> f64 {
        self.stats.current_health()
    }

    fn max_health(&self) -> f64 {
        self.stats().max_health
    }

    fn is_dead(&self) -> bool {
        self.is_dead
    }
}

impl HasPosition for Unit {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl HasSide for Unit {
    fn side(&self) -> Side {
        self.side
    }
}
