//! Movement integration
//!
//! Straight-line only. Forced movement replaces normal movement for the
//! tick it is active in.

use super::Simulation;
use crate::types::{UnitId, Vec2};
use crate::unit::{ForcedKind, HasSide};
use tracing::trace;

impl Simulation {
    pub(crate) fn step_movement(&mut self, dt: f64) {
        for id in self.unit_ids() {
            let Some(unit) = self.unit(id) else {
                continue;
            };
            if unit.is_dead() {
                continue;
            }
            if unit.is_in_forced_movement() {
                self.advance_forced(id, dt);
            } else if unit.can_move() {
                self.advance_normal(id, dt);
            }
        }
    }

    fn advance_forced(&mut self, id: UnitId, dt: f64) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let start = unit.position;
        let Some(movement) = unit.forced_movement_mut() else {
            return;
        };
        let (mut end, mut finished) = movement.advance(start, dt);
        let stop_on_enemy = movement.kind == ForcedKind::Dash && movement.stop_on_enemy_hit;

        let mut hit = None;
        if stop_on_enemy {
            if let Some(enemy) = self.first_enemy_on_path(id, start, end) {
                hit = Some(enemy);
                finished = true;
                if let Some(position) = self.unit(enemy).map(|e| e.position) {
                    let radius = self.unit(id).map_or(0.0, |u| u.collision_radius)
                        + self.unit(enemy).map_or(0.0, |e| e.collision_radius);
                    end = stop_short(start, position, radius);
                }
            }
        }

        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        unit.position = end;
        if !finished {
            return;
        }
        let Some(movement) = unit.end_forced_movement() else {
            return;
        };
        trace!(unit = %id, kind = ?movement.kind, "forced movement finished");
        if let Some(arrival) = movement.arrival {
            let ctx = arrival.ctx.retarget(hit.or(arrival.ctx.primary), end);
            self.apply_effects(&ctx, &arrival.effects);
        }
    }

    fn first_enemy_on_path(&self, id: UnitId, start: Vec2, end: Vec2) -> Option<UnitId> {
        let mover = self.unit(id)?;
        self.living_units()
            .filter(|u| mover.is_enemy_of(*u))
            .filter(|u| u.position.distance_to_segment(start, end) <= mover.collision_radius + u.collision_radius)
            .min_by(|a, b| {
                start
                    .distance(a.position)
                    .total_cmp(&start.distance(b.position))
            })
            .map(|u| u.id)
    }

    fn advance_normal(&mut self, id: UnitId, dt: f64) {
        let Some(unit) = self.unit(id) else {
            return;
        };
        let speed = unit.stats().movement_speed;
        let step = speed * dt;

        // Chase an attack target that is out of range
        let chase = unit.attack_target().and_then(|target| {
            let target = self.unit(target).filter(|t| t.is_alive())?;
            let range = unit.stats().attack_range;
            let distance = unit.position.distance(target.position);
            (distance > range).then(|| unit.position.move_toward(target.position, step.min(distance - range)))
        });
        let next = chase.or_else(|| {
            if unit.attack_target().is_some() {
                return None;
            }
            unit.move_target().map(|target| unit.position.move_toward(target, step))
        });

        let Some(next) = next else {
            return;
        };
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        unit.position = next;
        if unit.move_target() == Some(next) {
            unit.clear_move_target();
        }
    }
}

/// Point on `start..target` at `gap` short of `target` (never behind `start`)
fn stop_short(start: Vec2, target: Vec2, gap: f64) -> Vec2 {
    let offset = target - start;
    let distance = offset.length();
    match offset.normalized() {
        Some(direction) => start + direction * (distance - gap).max(0.0),
        None => start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cc::CrowdControl;
    use crate::combat::DamageOrigin;
    use crate::effect::{Effect, EffectContext, Magnitude};
    use crate::sim::tests::target_dummy;
    use crate::types::{DamageType, Side};
    use crate::unit::{Arrival, ForcedMovement};

    #[test]
    fn test_move_order_reaches_target() {
        let mut sim = Simulation::with_seed(1);
        let id = sim.spawn(&target_dummy(), Side::BLUE, Vec2::ZERO);
        sim.move_to(id, Vec2::new(300.0, 0.0));
        sim.run_for(30, 1.0 / 60.0);
        assert!((sim.unit(id).unwrap().position.x - 150.0).abs() < 1e-6);
        sim.run_for(40, 1.0 / 60.0);
        let unit = sim.unit(id).unwrap();
        assert_eq!(unit.position, Vec2::new(300.0, 0.0));
        assert!(unit.move_target().is_none());
    }

    #[test]
    fn test_root_stops_movement() {
        let mut sim = Simulation::with_seed(1);
        let id = sim.spawn(&target_dummy(), Side::BLUE, Vec2::ZERO);
        sim.unit_mut(id).unwrap().apply_crowd_control(CrowdControl::root(1.0));
        sim.move_to(id, Vec2::new(300.0, 0.0));
        sim.run_for(30, 1.0 / 60.0);
        assert_eq!(sim.unit(id).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_dash_stops_on_enemy_and_applies_arrival() {
        let mut sim = Simulation::with_seed(1);
        let dasher = sim.spawn(&target_dummy(), Side::BLUE, Vec2::ZERO);
        let enemy = sim.spawn(&target_dummy(), Side::RED, Vec2::new(300.0, 0.0));
        let unit = sim.unit(dasher).unwrap();
        let ctx = EffectContext {
            caster: dasher,
            caster_side: unit.side,
            caster_stats: unit.stats(),
            rank: 1,
            primary: None,
            point: Vec2::new(600.0, 0.0),
            origin: DamageOrigin::Ability,
            label: "charge".to_string(),
        };
        let movement = ForcedMovement::dash(Vec2::new(1.0, 0.0), 600.0, 1200.0)
            .stopping_on_enemy(true)
            .with_arrival(Arrival {
                ctx,
                effects: vec![Effect::damage(Magnitude::flat(80.0), DamageType::True)],
            });
        assert!(sim.unit_mut(dasher).unwrap().start_dash(movement));
        sim.run_for(30, 1.0 / 60.0);

        let unit = sim.unit(dasher).unwrap();
        assert!(!unit.is_in_forced_movement());
        assert!((unit.position.x - 230.0).abs() < 1e-6);
        assert!((sim.unit(enemy).unwrap().health() - 920.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_short() {
        let end = stop_short(Vec2::ZERO, Vec2::new(100.0, 0.0), 30.0);
        assert!((end.x - 70.0).abs() < 1e-9);
        assert_eq!(stop_short(Vec2::ZERO, Vec2::new(10.0, 0.0), 30.0), Vec2::ZERO);
    }
}
