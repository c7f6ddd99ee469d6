//! Passive hook resolution
//!
//! Units queue hooks while they are mutated. The simulation drains them
//! after each operation and fires matching passives, which may raise more
//! hooks. Resolution stops after `hook_round_limit` rounds.

use super::{CombatEvent, Simulation};
use crate::combat::DamageOrigin;
use crate::effect::{Effect, EffectContext};
use crate::types::UnitId;
use crate::unit::{HookEvent, TriggerKind};
use tracing::{debug, warn};

impl Simulation {
    /// Fire passives for every queued hook
    pub fn resolve_hooks(&mut self) {
        let limit = self.constants.combat.hook_round_limit.max(1);
        for _ in 0..limit {
            let raised = self.collect_hooks();
            if raised.is_empty() {
                return;
            }
            for (owner, hook) in raised {
                self.fire_hook(owner, hook);
            }
        }
        let dropped = self.collect_hooks();
        if !dropped.is_empty() {
            warn!(dropped = dropped.len(), limit, "hook resolution hit its round limit");
        }
    }

    fn collect_hooks(&mut self) -> Vec<(UnitId, HookEvent)> {
        let mut raised = Vec::new();
        for (id, unit) in self.units.iter_mut() {
            raised.extend(unit.take_hooks().into_iter().map(|hook| (*id, hook)));
        }
        raised
    }

    fn fire_hook(&mut self, owner: UnitId, hook: HookEvent) {
        if hook.kind == TriggerKind::OnDeath {
            self.settle_death(owner, hook.other);
        }

        let Some(unit) = self.units.get_mut(&owner) else {
            return;
        };
        if unit.is_dead() && hook.kind != TriggerKind::OnDeath {
            return;
        }
        let level = unit.level();
        let mut firing: Vec<(String, u8, Vec<Effect>)> = Vec::new();
        for passive in unit.passives_mut() {
            if passive.trigger().kind() != hook.kind || !passive.is_ready() {
                continue;
            }
            if hook.kind == TriggerKind::OnLowHealth && hook.passive.as_deref() != Some(passive.id.as_str()) {
                continue;
            }
            passive.start_cooldown();
            firing.push((
                passive.id.clone(),
                passive.rank_for_level(level),
                passive.def.effects.clone(),
            ));
        }
        if firing.is_empty() {
            return;
        }

        let side = unit.side;
        let stats = unit.stats();
        let own_position = unit.position;
        let point = hook
            .other
            .and_then(|other| self.unit(other))
            .map_or(own_position, |other| other.position);

        for (passive, rank, effects) in firing {
            debug!(unit = %owner, passive = %passive, "passive fired");
            self.record(CombatEvent::PassiveFired {
                time: self.clock,
                unit: owner,
                passive: passive.clone(),
            });
            let ctx = EffectContext {
                caster: owner,
                caster_side: side,
                caster_stats: stats,
                rank,
                primary: hook.other,
                point,
                origin: DamageOrigin::Passive(hook.kind),
                label: passive,
            };
            self.apply_effects(&ctx, &effects);
        }
    }

    fn settle_death(&mut self, victim: UnitId, killer: Option<UnitId>) {
        let bounty = self.unit(victim).map_or(0, |u| u.bounty);
        self.record(CombatEvent::Death {
            time: self.clock,
            unit: victim,
            killer,
        });
        let Some(killer) = killer.filter(|k| *k != victim) else {
            return;
        };
        if let Some(unit) = self.units.get_mut(&killer) {
            unit.add_gold(bounty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Magnitude, TargetPolicy};
    use crate::sim::tests::target_dummy;
    use crate::types::{DamageType, Side, Vec2};
    use crate::unit::{PassiveDef, Trigger};

    fn with_passive(trigger: Trigger, cooldown: f64, effects: Vec<Effect>) -> crate::unit::UnitDef {
        let mut def = target_dummy();
        def.passives.push(PassiveDef {
            id: "test_passive".to_string(),
            name: String::new(),
            trigger,
            cooldown,
            level_scaled: false,
            effects,
        });
        def
    }

    #[test]
    fn test_thorns_do_not_loop() {
        let thorns = vec![Effect::damage(Magnitude::flat(10.0), DamageType::True)];
        let mut sim = Simulation::with_seed(1);
        let a = sim.spawn(&with_passive(Trigger::OnTakeDamage, 0.0, thorns.clone()), Side::BLUE, Vec2::ZERO);
        let b = sim.spawn(&with_passive(Trigger::OnTakeDamage, 0.0, thorns), Side::RED, Vec2::new(100.0, 0.0));

        sim.unit_mut(a).unwrap().take_damage(100.0, DamageType::True, Some(b));
        sim.resolve_hooks();
        // a reflects 10 to b; b's thorns do not answer a passive of the same kind
        assert!((sim.unit(a).unwrap().health() - 900.0).abs() < 1e-9);
        assert!((sim.unit(b).unwrap().health() - 990.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_health_fires_once_per_crossing() {
        let shield = vec![Effect::shield(Magnitude::flat(100.0), None).on(TargetPolicy::Caster)];
        let mut sim = Simulation::with_seed(1);
        let id = sim.spawn(&with_passive(Trigger::OnLowHealth { threshold: 0.3 }, 0.0, shield), Side::BLUE, Vec2::ZERO);

        sim.unit_mut(id).unwrap().take_damage(750.0, DamageType::True, None);
        sim.resolve_hooks();
        assert!((sim.unit(id).unwrap().total_shield() - 100.0).abs() < 1e-9);

        sim.unit_mut(id).unwrap().take_damage(150.0, DamageType::True, None);
        sim.resolve_hooks();
        assert!(sim.unit(id).unwrap().total_shield().abs() < 1e-9);

        sim.unit_mut(id).unwrap().heal(500.0);
        sim.unit_mut(id).unwrap().take_damage(450.0, DamageType::True, None);
        sim.resolve_hooks();
        assert!((sim.unit(id).unwrap().total_shield() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_passive_cooldown() {
        let heal = vec![Effect::heal(Magnitude::flat(5.0)).on(TargetPolicy::Caster)];
        let mut sim = Simulation::with_seed(1);
        let id = sim.spawn(&with_passive(Trigger::OnTakeDamage, 2.0, heal), Side::BLUE, Vec2::ZERO);
        for _ in 0..3 {
            sim.unit_mut(id).unwrap().take_damage(20.0, DamageType::True, None);
            sim.resolve_hooks();
        }
        assert!((sim.unit(id).unwrap().health() - 945.0).abs() < 1e-9);
    }
}
