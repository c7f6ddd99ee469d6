//! Effect resolution - the single place effects are applied
//!
//! `apply_effects` walks an effect list once. Deferred effects are held back
//! and applied after everything else in the same pass. Area and targeted
//! effects pick their targets when they are applied, and living units are
//! visited in id order.

use super::schedule::ScheduledAction;
use super::{CombatEvent, Simulation};
use crate::cc::CrowdControl;
use crate::effect::{
    ActiveEffect, ActivePayload, Affects, Anchor, CrowdControlEffect, DamageEffect, DashEffect,
    DelayedAoeEffect, DurationEffect, DurationPayload, Effect, EffectContext, EmpowerAttackEffect,
    HealEffect, KnockbackEffect, RestoreResourceEffect, ShieldEffect, TargetPolicy,
};
use crate::stat_block::{StatModifier, UnitStats};
use crate::types::{is_elapsed, Side, UnitId, Vec2};
use crate::unit::{Arrival, AttackModifier, ForcedMovement, HasPosition};
use tracing::{debug, trace};

impl Simulation {
    /// Apply an effect list in order, deferred effects last
    pub fn apply_effects(&mut self, ctx: &EffectContext, effects: &[Effect]) {
        let mut deferred = Vec::new();
        for effect in effects {
            match effect {
                Effect::Deferred(inner) => deferred.push(inner.effect.as_ref()),
                other => self.apply_effect(ctx, other),
            }
        }
        for effect in deferred {
            self.apply_effect(ctx, effect);
        }
    }

    /// Apply one effect with its own target policy. The single dispatch
    /// point for every effect kind.
    pub fn apply_effect(&mut self, ctx: &EffectContext, effect: &Effect) {
        let landing = match effect {
            Effect::DelayedAoe(aoe) => {
                self.schedule_delayed_aoe(ctx, aoe);
                return;
            }
            Effect::Dash(dash) => {
                self.start_dash(ctx, dash);
                return;
            }
            Effect::Deferred(inner) => {
                self.apply_effect(ctx, &inner.effect);
                return;
            }
            Effect::Damage(e) => Landing::Damage(e),
            Effect::Heal(e) => Landing::Heal(e),
            Effect::Shield(e) => Landing::Shield(e),
            Effect::RestoreResource(e) => Landing::RestoreResource(e),
            Effect::Cleanse(_) => Landing::Cleanse,
            Effect::EmpowerAttack(e) => Landing::EmpowerAttack(e),
            Effect::Duration(e) => Landing::Duration(e),
            Effect::CrowdControl(e) => Landing::CrowdControl(e),
            Effect::Knockback(e) => Landing::Knockback(e),
        };
        let Some(policy) = effect.target() else {
            return;
        };
        let tag = effect.immunity_tag();
        for target in self.select_targets(ctx, policy) {
            self.land(ctx, landing, tag, target);
        }
    }

    /// Living units an effect lands on, in id order
    pub fn select_targets(&self, ctx: &EffectContext, policy: TargetPolicy) -> Vec<UnitId> {
        let alive = |id: UnitId| self.unit(id).is_some_and(|u| u.is_alive());
        match policy {
            TargetPolicy::Caster => Some(ctx.caster).filter(|id| alive(*id)).into_iter().collect(),
            TargetPolicy::Target => ctx.primary.filter(|id| alive(*id)).into_iter().collect(),
            TargetPolicy::EnemiesInArea { radius } => {
                self.units_in_area(ctx.point, radius, ctx.caster_side, Affects::Enemies)
            }
            TargetPolicy::AlliesInArea { radius } => {
                self.units_in_area(ctx.point, radius, ctx.caster_side, Affects::Allies)
            }
            TargetPolicy::AllInArea { radius } => {
                self.units_in_area(ctx.point, radius, ctx.caster_side, Affects::All)
            }
        }
    }

    /// Living units within `radius` of `center`, filtered by side
    pub fn units_in_area(&self, center: Vec2, radius: f64, side: Side, affects: Affects) -> Vec<UnitId> {
        self.living_units()
            .filter(|u| match affects {
                Affects::Enemies => u.side != side,
                Affects::Allies => u.side == side,
                Affects::All => true,
            })
            .filter(|u| u.position.distance(center) <= radius + crate::types::TIME_EPSILON)
            .map(|u| u.id)
            .collect()
    }

    /// Caster stats right now, or the captured ones if the caster is gone
    fn caster_stats(&self, ctx: &EffectContext) -> UnitStats {
        self.unit(ctx.caster).map_or(ctx.caster_stats, |u| u.stats())
    }

    fn land(&mut self, ctx: &EffectContext, landing: Landing<'_>, tag: Option<&str>, target: UnitId) {
        let stats = self.caster_stats(ctx);
        let rank = ctx.rank;
        let time = self.clock;

        let source_position = self.unit(ctx.caster).map_or(ctx.point, |u| u.position());
        let Some(unit) = self.units.get_mut(&target) else {
            return;
        };
        if let Some(tag) = tag {
            if unit.has_immunity(tag) {
                debug!(unit = %target, tag, "effect blocked by immunity");
                return;
            }
        }

        match landing {
            Landing::Damage(e) => {
                let amount = e.amount.resolve(rank, &stats);
                let result = unit.take_damage_from(amount, e.damage_type, Some(ctx.caster), ctx.origin);
                trace!(target = %target, summary = %result.summary(), "damage resolved");
                self.events.push(CombatEvent::Damage { time, target, result });
            }
            Landing::Heal(e) => {
                let amount = unit.heal(e.amount.resolve(rank, &stats));
                self.events.push(CombatEvent::Heal {
                    time,
                    target,
                    source: Some(ctx.caster),
                    amount,
                });
            }
            Landing::Shield(e) => {
                unit.add_shield(e.amount.resolve(rank, &stats), e.duration, ctx.label.clone());
            }
            Landing::RestoreResource(e) => {
                unit.restore_resource(e.amount.resolve(rank, &stats));
            }
            Landing::Cleanse => {
                unit.cleanse();
            }
            Landing::EmpowerAttack(e) => unit.add_attack_modifier(AttackModifier {
                id: e.id.clone(),
                source: Some(ctx.caster),
                bonus: e.bonus.resolve(rank, &stats),
                damage_type: e.damage_type,
                charges: e.charges,
                remaining: e.duration,
            }),
            Landing::Duration(e) => {
                let active = build_active_effect(e, ctx, &stats);
                unit.apply_effect(active);
            }
            Landing::CrowdControl(e) => {
                let cc = CrowdControl::new(e.cc, e.duration.at(rank))
                    .with_magnitude(e.magnitude)
                    .from_source(ctx.caster);
                unit.apply_crowd_control(cc);
            }
            Landing::Knockback(e) => {
                let away = unit.position - source_position;
                let direction = away.normalized().unwrap_or_else(|| ctx.caster_side.attack_direction());
                unit.apply_knockback(direction, e.distance, e.speed);
            }
        }
    }

    fn schedule_delayed_aoe(&mut self, ctx: &EffectContext, aoe: &DelayedAoeEffect) {
        let center = match aoe.anchor {
            Anchor::CastPoint => ctx.point,
            Anchor::Caster | Anchor::FollowCaster => {
                self.unit(ctx.caster).map_or(ctx.point, |u| u.position)
            }
        };
        if is_elapsed(aoe.delay) {
            self.resolve_delayed_aoe(ctx, aoe, center);
            return;
        }
        self.schedule.push(
            self.clock + aoe.delay,
            ScheduledAction::DelayedAoe {
                ctx: ctx.clone(),
                effect: aoe.clone(),
                center,
            },
        );
    }

    /// Apply the area's effects to every eligible unit inside it now
    pub(crate) fn resolve_delayed_aoe(&mut self, ctx: &EffectContext, aoe: &DelayedAoeEffect, center: Vec2) {
        let caught = self.units_in_area(center, aoe.radius, ctx.caster_side, aoe.affects);
        debug!(caster = %ctx.caster, caught = caught.len(), "delayed area resolved");
        for target in caught {
            self.apply_effects(&ctx.retarget(Some(target), center), &aoe.effects);
        }
    }

    fn start_dash(&mut self, ctx: &EffectContext, dash: &DashEffect) {
        let Some(caster) = self.units.get_mut(&ctx.caster) else {
            return;
        };
        if caster.is_dead() || caster.has_immunity("dash") {
            return;
        }
        let offset = ctx.point - caster.position;
        let (direction, distance) = match offset.normalized() {
            Some(direction) => (direction, dash.distance.min(offset.length())),
            None => (caster.side.attack_direction(), dash.distance),
        };
        let mut movement = ForcedMovement::dash(direction, distance, dash.speed)
            .stopping_on_enemy(dash.stop_on_enemy_hit);
        if !dash.on_arrival.is_empty() {
            movement = movement.with_arrival(Arrival {
                ctx: ctx.clone(),
                effects: dash.on_arrival.clone(),
            });
        }
        caster.start_dash(movement);
    }
}

/// The per-target part of an effect, once area and forced-movement kinds
/// have been handled
#[derive(Clone, Copy)]
enum Landing<'a> {
    Damage(&'a DamageEffect),
    Heal(&'a HealEffect),
    Shield(&'a ShieldEffect),
    RestoreResource(&'a RestoreResourceEffect),
    Cleanse,
    EmpowerAttack(&'a EmpowerAttackEffect),
    Duration(&'a DurationEffect),
    CrowdControl(&'a CrowdControlEffect),
    Knockback(&'a KnockbackEffect),
}

/// Resolve a duration effect definition into an instance for one target
fn build_active_effect(def: &DurationEffect, ctx: &EffectContext, stats: &UnitStats) -> ActiveEffect {
    let duration = def.duration.at(ctx.rank);
    let payload = match &def.payload {
        DurationPayload::Stats { flat, percent } => {
            let mut per_stack = StatModifier::new(def.id.clone());
            per_stack.flat = *flat;
            per_stack.percent = *percent;
            ActivePayload::Modifier { per_stack }
        }
        DurationPayload::ScaledStat {
            stat,
            amount,
            percent,
        } => {
            let value = amount.resolve(ctx.rank, stats);
            let per_stack = if *percent {
                StatModifier::new(def.id.clone()).with_percent(*stat, value)
            } else {
                StatModifier::new(def.id.clone()).with_flat(*stat, value)
            };
            ActivePayload::Modifier { per_stack }
        }
        DurationPayload::Periodic {
            amount,
            damage_type,
            interval,
        } => ActivePayload::Periodic {
            per_tick: amount.resolve(ctx.rank, stats) * interval,
            damage_type: *damage_type,
            interval: *interval,
            until_tick: *interval,
        },
        DurationPayload::Immunity { tags } => ActivePayload::Immunity { tags: tags.clone() },
    };

    ActiveEffect {
        id: def.id.clone(),
        source: Some(ctx.caster),
        remaining: duration,
        duration,
        stacks: 1,
        stacking: def.stacking,
        is_debuff: def.is_debuff,
        cleansable: def.cleansable,
        persists_through_death: def.persists_through_death,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageOrigin;
    use crate::effect::{Magnitude, RankTable, Stacking};
    use crate::sim::tests::target_dummy;
    use crate::stat_block::StatKind;
    use crate::types::DamageType;

    fn setup() -> (Simulation, UnitId, UnitId) {
        let mut sim = Simulation::with_seed(7);
        let caster = sim.spawn(&target_dummy(), Side::BLUE, Vec2::ZERO);
        let enemy = sim.spawn(&target_dummy(), Side::RED, Vec2::new(200.0, 0.0));
        (sim, caster, enemy)
    }

    fn ctx(sim: &Simulation, caster: UnitId, primary: Option<UnitId>, point: Vec2, rank: u8) -> EffectContext {
        let unit = sim.unit(caster).unwrap();
        EffectContext {
            caster,
            caster_side: unit.side,
            caster_stats: unit.stats(),
            rank,
            primary,
            point,
            origin: DamageOrigin::Ability,
            label: "test".to_string(),
        }
    }

    #[test]
    fn test_rank_scaled_true_damage() {
        let (mut sim, caster, enemy) = setup();
        let effect = Effect::damage(Magnitude::flat(vec![50.0, 100.0, 150.0]), DamageType::True);
        for (rank, expected) in [(1, 950.0), (2, 850.0), (3, 700.0)] {
            let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, rank);
            sim.apply_effects(&ctx, std::slice::from_ref(&effect));
            assert!((sim.unit(enemy).unwrap().health() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaling_reads_current_stats() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        sim.unit_mut(caster)
            .unwrap()
            .apply_buff(StatModifier::new("rage").with_flat(StatKind::AttackDamage, 40.0));
        let effect = Effect::damage(Magnitude::flat(0.0).plus(StatKind::AttackDamage, 1.0), DamageType::True);
        sim.apply_effects(&ctx, &[effect]);
        assert!((sim.unit(enemy).unwrap().health() - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_hits_enemies_only() {
        let (mut sim, caster, enemy) = setup();
        let far = sim.spawn(&target_dummy(), Side::RED, Vec2::new(900.0, 0.0));
        let ctx = ctx(&sim, caster, None, Vec2::new(150.0, 0.0), 1);
        let effect = Effect::damage(Magnitude::flat(100.0), DamageType::True)
            .on(TargetPolicy::EnemiesInArea { radius: 200.0 });
        sim.apply_effects(&ctx, &[effect]);
        assert!((sim.unit(enemy).unwrap().health() - 900.0).abs() < 1e-9);
        assert!((sim.unit(caster).unwrap().health() - 1000.0).abs() < 1e-9);
        assert!((sim.unit(far).unwrap().health() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_deferred_runs_after_the_rest() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        // Listed first, but the cleanse must still see the stun
        let effects = vec![
            Effect::Deferred(crate::effect::DeferredEffect {
                effect: Box::new(Effect::Cleanse(crate::effect::CleanseEffect::default())),
            }),
            Effect::crowd_control(crate::cc::CcKind::Stun, 1.0),
        ];
        sim.apply_effects(&ctx, &effects);
        let unit = sim.unit(enemy).unwrap();
        assert!(unit.crowd_control().is_empty());
        assert!(unit.can_cast());
    }

    #[test]
    fn test_nested_effects_land_once() {
        let (mut sim, caster, enemy) = setup();
        let direct = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        let deferred_hit = Effect::Deferred(crate::effect::DeferredEffect {
            effect: Box::new(Effect::damage(Magnitude::flat(100.0), DamageType::True)),
        });
        sim.apply_effect(&direct, &deferred_hit);
        assert!((sim.unit(enemy).unwrap().health() - 900.0).abs() < 1e-9);

        let area = ctx(&sim, caster, None, Vec2::new(200.0, 0.0), 1);
        let echo = Effect::DelayedAoe(DelayedAoeEffect {
            delay: 0.5,
            radius: 100.0,
            anchor: Anchor::CastPoint,
            affects: Affects::Enemies,
            effects: vec![deferred_hit],
        });
        sim.apply_effect(&area, &echo);
        sim.run_for(31, 1.0 / 60.0);
        assert!((sim.unit(enemy).unwrap().health() - 800.0).abs() < 1e-9);
        assert!(sim.schedule().is_empty());
    }

    #[test]
    fn test_duration_stack_and_expiry() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        let shred = Effect::Duration(DurationEffect {
            id: "shred".to_string(),
            target: TargetPolicy::Target,
            duration: RankTable::constant(2.0),
            stacking: Stacking::Stack { max_stacks: 3 },
            is_debuff: true,
            cleansable: true,
            persists_through_death: false,
            tag: None,
            payload: DurationPayload::Stats {
                flat: crate::stat_block::StatLine::new().with(StatKind::Armor, -5.0),
                percent: crate::stat_block::StatLine::new(),
            },
        });
        for _ in 0..5 {
            sim.apply_effects(&ctx, std::slice::from_ref(&shred));
        }
        assert!((sim.stats(enemy).unwrap().armor - 15.0).abs() < 1e-9);
        sim.run_for(121, 1.0 / 60.0);
        assert!((sim.stats(enemy).unwrap().armor - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_periodic_damage_per_second() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        let burn = Effect::Duration(DurationEffect {
            id: "burn".to_string(),
            target: TargetPolicy::Target,
            duration: RankTable::constant(3.0),
            stacking: Stacking::Refresh,
            is_debuff: true,
            cleansable: true,
            persists_through_death: false,
            tag: Some("burn".to_string()),
            payload: DurationPayload::Periodic {
                amount: Magnitude::flat(20.0),
                damage_type: Some(DamageType::True),
                interval: 0.5,
            },
        });
        sim.apply_effects(&ctx, &[burn]);
        sim.run_for(240, 1.0 / 60.0);
        // six ticks of 10 over three seconds
        assert!((sim.unit(enemy).unwrap().health() - 940.0).abs() < 1e-6);
        assert!(sim.active_effects(enemy).unwrap().is_empty());
    }

    #[test]
    fn test_knockback_pushes_away_from_caster() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, Some(enemy), Vec2::ZERO, 1);
        sim.apply_effects(&ctx, &[Effect::knockback(300.0, 1500.0)]);
        sim.run_for(30, 1.0 / 60.0);
        let unit = sim.unit(enemy).unwrap();
        assert!((unit.position.x - 500.0).abs() < 1e-6);
        assert!(!unit.is_in_forced_movement());
    }

    #[test]
    fn test_delayed_aoe_uses_position_at_resolution() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, None, Vec2::new(200.0, 0.0), 1);
        let meteor = Effect::DelayedAoe(DelayedAoeEffect {
            delay: 1.0,
            radius: 100.0,
            anchor: Anchor::CastPoint,
            affects: Affects::Enemies,
            effects: vec![Effect::damage(Magnitude::flat(100.0), DamageType::True)],
        });
        sim.apply_effects(&ctx, &[meteor]);
        let bystander = sim.spawn(&target_dummy(), Side::RED, Vec2::new(250.0, 0.0));
        sim.unit_mut(enemy).unwrap().position = Vec2::new(600.0, 0.0);
        sim.run_for(60, 1.0 / 60.0);
        assert!((sim.unit(enemy).unwrap().health() - 1000.0).abs() < 1e-9);
        assert!((sim.unit(bystander).unwrap().health() - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_delayed_aoe_resolves_after_caster_death() {
        let (mut sim, caster, enemy) = setup();
        let ctx = ctx(&sim, caster, None, Vec2::new(200.0, 0.0), 1);
        let meteor = Effect::DelayedAoe(DelayedAoeEffect {
            delay: 0.5,
            radius: 100.0,
            anchor: Anchor::CastPoint,
            affects: Affects::Enemies,
            effects: vec![Effect::damage(Magnitude::flat(100.0), DamageType::True)],
        });
        sim.apply_effects(&ctx, &[meteor]);
        sim.despawn(caster);
        sim.run_for(31, 1.0 / 60.0);
        assert!((sim.unit(enemy).unwrap().health() - 900.0).abs() < 1e-9);
    }
}
