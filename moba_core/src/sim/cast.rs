//! Ability cast pipeline
//!
//! Validation runs in a fixed order and the first failure wins. Nothing is
//! mutated until every check has passed.

use super::schedule::ScheduledAction;
use super::{CombatEvent, Simulation};
use crate::ability::{Allow, CastError, CastRequest, Targeting};
use crate::combat::DamageOrigin;
use crate::effect::EffectContext;
use crate::types::{is_elapsed, UnitId, Vec2, TIME_EPSILON};
use crate::unit::{HasSide, TriggerKind, Unit};
use std::sync::Arc;
use tracing::debug;

/// Where a validated cast is aimed
struct Aim {
    primary: Option<UnitId>,
    point: Vec2,
}

impl Simulation {
    /// Cast an ability from `caster`
    pub fn cast_ability(&mut self, caster: UnitId, request: CastRequest) -> Result<(), CastError> {
        let result = self.try_cast(caster, request);
        if let Err(error) = result {
            debug!(caster = %caster, slot = ?request.slot, reason = error.reason(), "cast rejected");
        }
        result
    }

    /// Shorthand for [`Simulation::cast_ability`]
    pub fn cast(
        &mut self,
        caster: UnitId,
        slot: crate::types::AbilitySlot,
        target: Option<UnitId>,
        position: Option<Vec2>,
    ) -> Result<(), CastError> {
        self.cast_ability(
            caster,
            CastRequest {
                slot,
                target,
                position,
            },
        )
    }

    fn try_cast(&mut self, caster_id: UnitId, request: CastRequest) -> Result<(), CastError> {
        let caster = self.unit(caster_id).ok_or(CastError::InvalidTarget)?;
        let ability = caster.ability(request.slot).ok_or(CastError::InvalidTarget)?;
        if !ability.is_learned() {
            return Err(CastError::InvalidTarget);
        }
        if !is_elapsed(ability.cooldown_remaining()) {
            return Err(CastError::OnCooldown);
        }
        if !caster.can_cast() {
            return Err(CastError::CasterDisabled);
        }
        let cost = ability.cost();
        if !caster.can_afford(cost) {
            return Err(CastError::NotEnoughResource);
        }
        let aim = self.validate_target(caster, ability.def.targeting, &request)?;

        let def = Arc::clone(&ability.def);
        let rank = ability.rank();
        let ctx = EffectContext {
            caster: caster_id,
            caster_side: caster.side,
            caster_stats: caster.stats(),
            rank,
            primary: aim.primary,
            point: aim.point,
            origin: DamageOrigin::Ability,
            label: def.id.clone(),
        };

        // Commit
        let Some(caster) = self.units.get_mut(&caster_id) else {
            return Err(CastError::InvalidTarget);
        };
        caster.spend_resource(cost);
        if let Some(state) = caster.ability_mut(request.slot) {
            state.start_cooldown();
        }
        caster.raise(TriggerKind::OnAbilityCast, aim.primary, DamageOrigin::Ability);
        debug!(caster = %caster_id, ability = %def.id, rank, "ability cast");

        self.record(CombatEvent::Cast {
            time: self.clock,
            caster: caster_id,
            slot: request.slot,
            ability: def.id.clone(),
            target: aim.primary,
        });

        if def.cast_time > TIME_EPSILON {
            self.schedule.push(
                self.clock + def.cast_time,
                ScheduledAction::CastWindup { ctx, ability: def },
            );
        } else {
            self.apply_effects(&ctx, &def.effects);
        }
        self.resolve_hooks();
        Ok(())
    }

    fn validate_target(&self, caster: &Unit, targeting: Targeting, request: &CastRequest) -> Result<Aim, CastError> {
        match targeting {
            Targeting::SelfCast => Ok(Aim {
                primary: Some(caster.id),
                point: caster.position,
            }),
            Targeting::Unit { range, allow } => {
                let target_id = request.target.ok_or(CastError::InvalidTarget)?;
                let target = self
                    .unit(target_id)
                    .filter(|t| t.is_alive())
                    .ok_or(CastError::InvalidTarget)?;
                let eligible = match allow {
                    Allow::Enemy => caster.is_enemy_of(target),
                    Allow::Ally => caster.is_ally_of(target),
                    Allow::Any => true,
                };
                if !eligible || caster.position.distance(target.position) > range + TIME_EPSILON {
                    return Err(CastError::InvalidTarget);
                }
                Ok(Aim {
                    primary: Some(target_id),
                    point: target.position,
                })
            }
            Targeting::Ground { range } => {
                let point = request.position.ok_or(CastError::InvalidTarget)?;
                if caster.position.distance(point) > range + TIME_EPSILON {
                    return Err(CastError::InvalidTarget);
                }
                Ok(Aim {
                    primary: None,
                    point,
                })
            }
            Targeting::Skillshot { range, width } => {
                let aim = request
                    .position
                    .or_else(|| request.target.and_then(|t| self.unit(t)).map(|t| t.position))
                    .ok_or(CastError::InvalidTarget)?;
                let direction = (aim - caster.position)
                    .normalized()
                    .unwrap_or_else(|| caster.side.attack_direction());
                let end = caster.position + direction * range;
                let hit = self.first_along(caster, end, width);
                Ok(Aim {
                    primary: hit.map(|u| u.id),
                    point: hit.map_or(end, |u| u.position),
                })
            }
        }
    }

    /// First living enemy of `caster` touched by the segment to `end`
    fn first_along(&self, caster: &Unit, end: Vec2, width: f64) -> Option<&Unit> {
        let start = caster.position;
        self.living_units()
            .filter(|u| caster.is_enemy_of(*u))
            .filter(|u| u.position.distance_to_segment(start, end) <= width / 2.0 + u.collision_radius)
            .min_by(|a, b| {
                start
                    .distance(a.position)
                    .total_cmp(&start.distance(b.position))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityDef;
    use crate::cc::CrowdControl;
    use crate::effect::{Effect, Magnitude, RankTable};
    use crate::sim::tests::target_dummy;
    use crate::types::{AbilitySlot, DamageType, Side};

    fn bolt(targeting: Targeting) -> Arc<AbilityDef> {
        Arc::new(AbilityDef {
            id: "bolt".to_string(),
            name: "Bolt".to_string(),
            description: String::new(),
            slot: AbilitySlot::Q,
            cost: RankTable::new(vec![50.0, 60.0, 70.0]),
            cooldown: 8.0,
            cooldown_per_rank: None,
            cast_time: 0.0,
            targeting,
            effects: vec![Effect::damage(Magnitude::flat(vec![50.0, 100.0, 150.0]), DamageType::True)],
            max_rank: 3,
        })
    }

    fn setup(targeting: Targeting) -> (Simulation, UnitId, UnitId) {
        let mut def = target_dummy();
        def.abilities.push(bolt(targeting));
        let mut sim = Simulation::with_seed(3);
        let caster = sim.spawn(&def, Side::BLUE, Vec2::ZERO);
        let enemy = sim.spawn(&target_dummy(), Side::RED, Vec2::new(400.0, 0.0));
        (sim, caster, enemy)
    }

    fn unit_target() -> Targeting {
        Targeting::Unit {
            range: 600.0,
            allow: Allow::Enemy,
        }
    }

    #[test]
    fn test_unlearned_is_invalid_target() {
        let (mut sim, caster, enemy) = setup(unit_target());
        let result = sim.cast(caster, AbilitySlot::Q, Some(enemy), None);
        assert_eq!(result, Err(CastError::InvalidTarget));
        assert!((sim.unit(caster).unwrap().resource() - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_successful_cast_commits() {
        let (mut sim, caster, enemy) = setup(unit_target());
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);
        assert_eq!(sim.cast(caster, AbilitySlot::Q, Some(enemy), None), Ok(()));
        assert!((sim.unit(caster).unwrap().resource() - 450.0).abs() < f64::EPSILON);
        assert!((sim.unit(enemy).unwrap().health() - 950.0).abs() < f64::EPSILON);
        assert!((sim.cooldown_progress(caster, AbilitySlot::Q) - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(enemy), None),
            Err(CastError::OnCooldown)
        );
    }

    #[test]
    fn test_cooldown_gating() {
        let (mut sim, caster, enemy) = setup(unit_target());
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);
        sim.cast(caster, AbilitySlot::Q, Some(enemy), None).unwrap();
        sim.run_for(479, 1.0 / 60.0);
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(enemy), None),
            Err(CastError::OnCooldown)
        );
        sim.step(1.0 / 60.0);
        assert_eq!(sim.cast(caster, AbilitySlot::Q, Some(enemy), None), Ok(()));
    }

    #[test]
    fn test_failures_leave_state_untouched() {
        let (mut sim, caster, enemy) = setup(unit_target());
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);

        sim.unit_mut(enemy).unwrap().position = Vec2::new(700.0, 0.0);
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(enemy), None),
            Err(CastError::InvalidTarget)
        );

        sim.unit_mut(caster).unwrap().spend_resource(480.0);
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(enemy), None),
            Err(CastError::NotEnoughResource)
        );
        let unit = sim.unit(caster).unwrap();
        assert!((unit.resource() - 20.0).abs() < 1e-9);
        assert!(unit.ability(AbilitySlot::Q).unwrap().is_ready());
        assert!((sim.unit(enemy).unwrap().health() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ally_cannot_be_targeted_by_enemy_spell() {
        let (mut sim, caster, _) = setup(unit_target());
        let ally = sim.spawn(&target_dummy(), Side::BLUE, Vec2::new(100.0, 0.0));
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(ally), None),
            Err(CastError::InvalidTarget)
        );
    }

    #[test]
    fn test_stunned_caster_is_disabled() {
        let (mut sim, caster, enemy) = setup(unit_target());
        let unit = sim.unit_mut(caster).unwrap();
        unit.rank_up(AbilitySlot::Q);
        unit.apply_crowd_control(CrowdControl::stun(1.0));
        assert_eq!(
            sim.cast(caster, AbilitySlot::Q, Some(enemy), None),
            Err(CastError::CasterDisabled)
        );
    }

    #[test]
    fn test_skillshot_hits_first_enemy_and_misses_commit() {
        let (mut sim, caster, enemy) = setup(Targeting::Skillshot {
            range: 1000.0,
            width: 60.0,
        });
        let behind = sim.spawn(&target_dummy(), Side::RED, Vec2::new(800.0, 0.0));
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);
        sim.cast(caster, AbilitySlot::Q, None, Some(Vec2::new(1.0, 0.0)))
            .unwrap();
        assert!((sim.unit(enemy).unwrap().health() - 950.0).abs() < f64::EPSILON);
        assert!((sim.unit(behind).unwrap().health() - 1000.0).abs() < f64::EPSILON);

        sim.unit_mut(caster).unwrap().reset_cooldowns();
        sim.cast(caster, AbilitySlot::Q, None, Some(Vec2::new(0.0, 1.0)))
            .unwrap();
        assert!((sim.unit(caster).unwrap().resource() - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_windup_dropped_when_caster_dies() {
        let mut def = target_dummy();
        let mut ability = (*bolt(unit_target())).clone();
        ability.cast_time = 0.5;
        def.abilities.push(Arc::new(ability));
        let mut sim = Simulation::with_seed(3);
        let caster = sim.spawn(&def, Side::BLUE, Vec2::ZERO);
        let enemy = sim.spawn(&target_dummy(), Side::RED, Vec2::new(400.0, 0.0));
        sim.unit_mut(caster).unwrap().rank_up(AbilitySlot::Q);

        sim.cast(caster, AbilitySlot::Q, Some(enemy), None).unwrap();
        sim.unit_mut(caster)
            .unwrap()
            .take_damage(5000.0, DamageType::True, Some(enemy));
        sim.run_for(60, 1.0 / 60.0);
        assert!((sim.unit(enemy).unwrap().health() - 1000.0).abs() < f64::EPSILON);
        assert!(sim.schedule().is_empty());
    }
}
