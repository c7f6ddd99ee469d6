//! StatBlock - A unit's base stats, modifiers and current pools

mod aggregator;
mod computed;
mod modifier;
mod stat_line;
mod stat_value;

pub use aggregator::StatAccumulator;
pub use computed::UnitStats;
pub use modifier::StatModifier;
pub use stat_line::{StatKind, StatLine, STAT_COUNT};
pub use stat_value::StatValue;

use crate::source::{BaseStatsSource, GearSource, StatSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete stat state for a unit.
///
/// Only the inputs are stored: base stats, growth, level, modifiers and the
/// two current pools. [`StatBlock::stats`] recomputes the snapshot from
/// scratch on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBlock {
    /// Identifier used in logs
    pub id: String,

    level: u32,
    base: StatLine,
    growth: StatLine,

    /// Timed and permanent buffs, keyed by source id (unique)
    modifiers: Vec<StatModifier>,
    /// Item contributions, keyed by inventory slot
    item_modifiers: BTreeMap<usize, StatModifier>,

    current_health: f64,
    current_resource: f64,
}

impl StatBlock {
    /// Create a level 1 block with full health and resource
    pub fn new(id: impl Into<String>, base: StatLine, growth: StatLine) -> Self {
        let mut block = StatBlock {
            id: id.into(),
            level: 1,
            base,
            growth,
            modifiers: Vec::new(),
            item_modifiers: BTreeMap::new(),
            current_health: 0.0,
            current_resource: 0.0,
        };
        block.refill();
        block
    }

    /// Collect every source into an accumulator
    pub fn accumulate(&self) -> StatAccumulator {
        let base = BaseStatsSource::new(&self.base, &self.growth, self.level);
        let gear: Vec<GearSource<'_>> = self
            .item_modifiers
            .iter()
            .map(|(slot, modifier)| GearSource::new(*slot, modifier))
            .collect();

        let mut sources: Vec<&dyn StatSource> = Vec::with_capacity(1 + gear.len() + self.modifiers.len());
        sources.push(&base);
        sources.extend(gear.iter().map(|g| g as &dyn StatSource));
        sources.extend(self.modifiers.iter().map(|m| m as &dyn StatSource));
        sources.sort_by_key(|s| s.priority());

        let mut accumulator = StatAccumulator::new();
        for source in sources {
            source.apply(&mut accumulator);
        }
        accumulator
    }

    /// Recompute the full stat snapshot
    pub fn stats(&self) -> UnitStats {
        self.accumulate()
            .finish(self.level, self.current_health, self.current_resource)
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Change level. Max health and resource gained are added to the
    /// current pools.
    pub fn set_level(&mut self, level: u32) {
        let before = self.stats();
        self.level = level.max(1);
        let after = self.stats();
        self.current_health += (after.max_health - before.max_health).max(0.0);
        self.current_resource += (after.max_resource - before.max_resource).max(0.0);
        self.clamp_current();
    }

    pub fn base(&self) -> &StatLine {
        &self.base
    }

    pub fn growth(&self) -> &StatLine {
        &self.growth
    }

    // === Pools ===

    pub fn current_health(&self) -> f64 {
        self.current_health
    }

    pub fn current_resource(&self) -> f64 {
        self.current_resource
    }

    /// Set current health, clamped to [0, max]
    pub fn set_health(&mut self, value: f64) {
        let max = self.stats().max_health;
        self.current_health = value.clamp(0.0, max);
    }

    /// Set current resource, clamped to [0, max]
    pub fn set_resource(&mut self, value: f64) {
        let max = self.stats().max_resource;
        self.current_resource = value.clamp(0.0, max);
    }

    /// Restore both pools to max
    pub fn refill(&mut self) {
        let stats = self.accumulate().finish(self.level, f64::MAX, f64::MAX);
        self.current_health = stats.max_health;
        self.current_resource = stats.max_resource;
    }

    fn clamp_current(&mut self) {
        let stats = self.stats();
        self.current_health = stats.health;
        self.current_resource = stats.resource;
    }

    // === Buff Methods ===

    /// Apply a modifier. An existing modifier with the same source id is
    /// overwritten.
    pub fn apply_buff(&mut self, modifier: StatModifier) {
        if let Some(existing) = self
            .modifiers
            .iter_mut()
            .find(|m| m.source_id == modifier.source_id)
        {
            *existing = modifier;
        } else {
            self.modifiers.push(modifier);
        }
        self.clamp_current();
    }

    /// Remove a modifier by id. Returns true if one was removed.
    pub fn remove_buff(&mut self, source_id: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.source_id != source_id);
        let removed = self.modifiers.len() != before;
        if removed {
            self.clamp_current();
        }
        removed
    }

    pub fn has_buff(&self, source_id: &str) -> bool {
        self.modifiers.iter().any(|m| m.source_id == source_id)
    }

    pub fn buff(&self, source_id: &str) -> Option<&StatModifier> {
        self.modifiers.iter().find(|m| m.source_id == source_id)
    }

    /// All buffs currently applied
    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    /// Tick timed modifiers, removing expired ones. Returns the removed ids.
    pub fn tick_modifiers(&mut self, delta: f64) -> Vec<String> {
        let mut expired = Vec::new();
        self.modifiers.retain_mut(|m| {
            let live = m.tick(delta);
            if !live {
                expired.push(m.source_id.clone());
            }
            live
        });
        if !expired.is_empty() {
            self.clamp_current();
        }
        expired
    }

    // === Item Methods ===

    /// Attach an item's stat contribution to a slot
    pub fn set_item_modifier(&mut self, slot: usize, mut modifier: StatModifier) {
        modifier.source_id = GearSource::slot_id(slot);
        modifier.expires_in = None;
        self.item_modifiers.insert(slot, modifier);
        self.clamp_current();
    }

    /// Detach an item's stat contribution
    pub fn clear_item_modifier(&mut self, slot: usize) -> Option<StatModifier> {
        let removed = self.item_modifiers.remove(&slot);
        if removed.is_some() {
            self.clamp_current();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> StatBlock {
        let base = StatLine::new()
            .with(StatKind::MaxHealth, 600.0)
            .with(StatKind::MaxResource, 300.0)
            .with(StatKind::AttackDamage, 60.0)
            .with(StatKind::MovementSpeed, 340.0)
            .with(StatKind::Armor, 30.0);
        let growth = StatLine::new()
            .with(StatKind::MaxHealth, 100.0)
            .with(StatKind::AttackDamage, 3.0);
        StatBlock::new("test", base, growth)
    }

    #[test]
    fn test_new_block_is_full() {
        let stats = block().stats();
        assert!((stats.health - 600.0).abs() < f64::EPSILON);
        assert!((stats.resource - 300.0).abs() < f64::EPSILON);
        assert_eq!(stats.level, 1);
    }

    #[test]
    fn test_buff_overwrites_same_id() {
        let mut block = block();
        block.apply_buff(StatModifier::new("rage").with_flat(StatKind::AttackDamage, 10.0));
        block.apply_buff(StatModifier::new("rage").with_flat(StatKind::AttackDamage, 25.0));
        assert_eq!(block.modifiers().len(), 1);
        assert!((block.stats().attack_damage - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_remove_buff_restores_exactly() {
        let mut block = block();
        let before = block.stats();
        block.apply_buff(
            StatModifier::new("fortify")
                .with_flat(StatKind::Armor, 20.0)
                .with_percent(StatKind::Armor, 0.5),
        );
        assert!((block.stats().armor - 75.0).abs() < 1e-9);
        assert!(block.remove_buff("fortify"));
        assert_eq!(block.stats(), before);
        assert!(!block.remove_buff("fortify"));
    }

    #[test]
    fn test_timed_buff_expires_on_tick() {
        let mut block = block();
        block.apply_buff(StatModifier::new("haste").with_percent(StatKind::MovementSpeed, 0.2).lasting(0.5));
        for _ in 0..30 {
            block.tick_modifiers(1.0 / 60.0);
        }
        assert!(block.has_buff("haste"));
        let expired = block.tick_modifiers(1.0 / 60.0);
        assert_eq!(expired, vec!["haste".to_string()]);
        assert!((block.stats().movement_speed - 340.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_up_adds_health_gain() {
        let mut block = block();
        block.set_health(300.0);
        block.set_level(3);
        let stats = block.stats();
        assert!((stats.max_health - 800.0).abs() < 1e-9);
        assert!((stats.health - 500.0).abs() < 1e-9);
        assert!((stats.attack_damage - 66.0).abs() < 1e-9);
    }

    #[test]
    fn test_losing_max_health_clamps_current() {
        let mut block = block();
        block.apply_buff(StatModifier::new("bulk").with_flat(StatKind::MaxHealth, 200.0));
        block.set_health(800.0);
        block.remove_buff("bulk");
        assert!((block.stats().health - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_item_modifier_is_keyed_by_slot() {
        let mut block = block();
        block.set_item_modifier(0, StatModifier::new("long_sword").with_flat(StatKind::AttackDamage, 10.0));
        assert!((block.stats().attack_damage - 70.0).abs() < 1e-9);
        // Items are not buffs and cannot be removed as one
        assert!(!block.remove_buff("item_slot_0"));
        let removed = block.clear_item_modifier(0).unwrap();
        assert_eq!(removed.source_id, "item_slot_0");
        assert!((block.stats().attack_damage - 60.0).abs() < 1e-9);
    }
}
