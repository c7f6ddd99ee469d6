//! Headless 1v1 duel between two champions

use moba_core::ability::{Allow, Targeting};
use moba_core::config::ContentError;
use moba_core::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Lane gap between the two spawn points
const START_GAP: f64 = 600.0;

/// Levels at which the ultimate gains a rank
const ULTIMATE_LEVELS: [u32; 3] = [6, 11, 16];

/// One side of a duel
#[derive(Debug, Clone)]
pub struct Contestant {
    pub champion: String,
    pub level: u32,
    pub items: Vec<String>,
}

impl Contestant {
    pub fn new(champion: impl Into<String>, level: u32) -> Self {
        Contestant {
            champion: champion.into(),
            level,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.items = items;
        self
    }
}

/// Per-side totals gathered from the combat log
#[derive(Debug, Clone, Default, Serialize)]
pub struct SideReport {
    pub champion: String,
    pub level: u32,
    pub items: Vec<String>,
    pub damage_dealt: f64,
    pub damage_shielded: f64,
    pub healing_done: f64,
    pub casts: u32,
    pub attacks: u32,
    pub crits: u32,
    pub misses: u32,
    pub passives_fired: u32,
    pub health_remaining: f64,
    pub kill_time: Option<f64>,
}

impl SideReport {
    pub fn dps(&self, duration: f64) -> f64 {
        if duration > 0.0 {
            self.damage_dealt / duration
        } else {
            0.0
        }
    }

    pub fn crit_rate(&self) -> f64 {
        let hits = self.attacks.saturating_sub(self.misses);
        if hits > 0 {
            f64::from(self.crits) / f64::from(hits) * 100.0
        } else {
            0.0
        }
    }
}

/// Outcome of a duel
#[derive(Debug, Clone, Serialize)]
pub struct DuelReport {
    pub seed: u64,
    pub duration: f64,
    /// 0 for blue, 1 for red, `None` on a timeout
    pub winner: Option<u8>,
    pub blue: SideReport,
    pub red: SideReport,
}

/// Run a duel for up to `duration` seconds at a fixed `dt`
pub struct DuelSimulation {
    pub sim: Simulation,
    pub blue: UnitId,
    pub red: UnitId,
    seed: u64,
}

impl DuelSimulation {
    /// Spawn both contestants, set their level and ability ranks, and buy
    /// their items
    pub fn setup(
        units: &UnitCatalog,
        items: &ItemCatalog,
        constants: GameConstants,
        blue: &Contestant,
        red: &Contestant,
        seed: u64,
    ) -> Result<Self, ContentError> {
        let mut sim = Simulation::new(constants, seed);
        let blue_id = prepare(&mut sim, units, items, blue, Side::BLUE, Vec2::ZERO)?;
        let red_id = prepare(&mut sim, units, items, red, Side::RED, Vec2::new(START_GAP, 0.0))?;
        sim.attack_unit(blue_id, red_id);
        sim.attack_unit(red_id, blue_id);
        Ok(DuelSimulation {
            sim,
            blue: blue_id,
            red: red_id,
            seed,
        })
    }

    /// Step until one side dies or time runs out
    pub fn run(&mut self, duration: f64, dt: f64) {
        let steps = (duration / dt).ceil().max(0.0) as u32;
        for _ in 0..steps {
            self.pilot(self.blue, self.red);
            self.pilot(self.red, self.blue);
            self.sim.step(dt);
            if self.is_over() {
                break;
            }
        }
    }

    pub fn is_over(&self) -> bool {
        [self.blue, self.red]
            .iter()
            .any(|id| self.sim.unit(*id).map_or(true, Unit::is_dead))
    }

    /// Cast whatever is ready, Q to R, then keep attacking
    fn pilot(&mut self, me: UnitId, enemy: UnitId) {
        let Some(unit) = self.sim.unit(me) else {
            return;
        };
        let Some(foe) = self.sim.unit(enemy) else {
            return;
        };
        if unit.is_dead() || foe.is_dead() || !unit.can_cast() {
            return;
        }
        let enemy_position = foe.position;

        for slot in AbilitySlot::all() {
            let Some(ability) = self.sim.ability(me, *slot) else {
                continue;
            };
            if !ability.is_ready() {
                continue;
            }
            let request = match ability.def.targeting {
                Targeting::SelfCast => CastRequest::new(*slot),
                Targeting::Unit {
                    allow: Allow::Ally, ..
                } => CastRequest::new(*slot).at_unit(me),
                Targeting::Unit { .. } => CastRequest::new(*slot).at_unit(enemy),
                Targeting::Ground { .. } | Targeting::Skillshot { .. } => {
                    CastRequest::new(*slot).at_point(enemy_position)
                }
            };
            if let Err(error) = self.sim.cast_ability(me, request) {
                debug!(unit = %me, slot = ?slot, reason = error.reason(), "pilot cast skipped");
            }
        }

        if self.sim.unit(me).is_some_and(|u| u.attack_target().is_none()) {
            self.sim.attack_unit(me, enemy);
        }
    }

    /// Fold the combat log into per-side totals
    pub fn report(&self) -> DuelReport {
        let mut blue = self.side_report(self.blue);
        let mut red = self.side_report(self.red);

        for event in self.sim.events() {
            for (id, report) in [(self.blue, &mut blue), (self.red, &mut red)] {
                tally(report, id, event);
            }
        }

        let blue_dead = self.sim.unit(self.blue).map_or(true, Unit::is_dead);
        let red_dead = self.sim.unit(self.red).map_or(true, Unit::is_dead);
        let winner = match (blue_dead, red_dead) {
            (false, true) => Some(Side::BLUE.0),
            (true, false) => Some(Side::RED.0),
            _ => None,
        };
        info!(winner = ?winner, time = self.sim.time(), "duel finished");

        DuelReport {
            seed: self.seed,
            duration: self.sim.time(),
            winner,
            blue,
            red,
        }
    }

    fn side_report(&self, id: UnitId) -> SideReport {
        let Some(unit) = self.sim.unit(id) else {
            return SideReport::default();
        };
        SideReport {
            champion: unit.name.clone(),
            level: unit.level(),
            items: unit
                .inventory()
                .items()
                .map(|(_, item)| item.id.clone())
                .collect(),
            health_remaining: unit.health(),
            ..SideReport::default()
        }
    }
}

fn prepare(
    sim: &mut Simulation,
    units: &UnitCatalog,
    items: &ItemCatalog,
    contestant: &Contestant,
    side: Side,
    position: Vec2,
) -> Result<UnitId, ContentError> {
    let id = sim.spawn_from(units, &contestant.champion, side, position)?;
    let bought: Vec<_> = contestant
        .items
        .iter()
        .map(|item| items.require(item))
        .collect::<Result<_, _>>()?;

    if let Some(unit) = sim.unit_mut(id) {
        unit.set_level(contestant.level);
        for (slot, rank) in AbilitySlot::all().iter().zip(skill_order(unit.level())) {
            unit.set_ability_rank(*slot, rank);
        }
        for item in &bought {
            unit.add_gold(item.cost);
        }
    }
    for item in bought {
        let item_id = item.id.clone();
        if let Some(Err(error)) = sim.purchase(id, item) {
            debug!(unit = %id, item = %item_id, reason = error.reason(), "purchase skipped");
        }
    }
    if let Some(unit) = sim.unit_mut(id) {
        unit.refill_resource();
    }
    Ok(id)
}

/// Ability ranks Q, W, E, R at `level`: one point in each basic ability
/// first, then max Q, then W, then E. The ultimate ranks at 6, 11 and 16.
pub fn skill_order(level: u32) -> [u8; 4] {
    let ultimate = ULTIMATE_LEVELS.iter().filter(|l| level >= **l).count() as u32;
    let mut points = level.saturating_sub(ultimate);
    let mut ranks = [0u8; 4];

    for rank in ranks.iter_mut().take(3) {
        if points == 0 {
            break;
        }
        *rank = 1;
        points -= 1;
    }
    for rank in ranks.iter_mut().take(3) {
        let room = 5 - u32::from(*rank);
        let spend = room.min(points);
        *rank += spend as u8;
        points -= spend;
    }
    ranks[3] = ultimate as u8;
    ranks
}

fn tally(report: &mut SideReport, id: UnitId, event: &CombatEvent) {
    report.damage_dealt += event.damage_dealt_by(id);
    match event {
        CombatEvent::Damage { result, .. } if result.source == Some(id) => {
            report.damage_shielded += result.absorbed_by_shields;
        }
        CombatEvent::Heal { source, amount, .. } if *source == Some(id) => {
            report.healing_done += amount;
        }
        CombatEvent::Periodic {
            source,
            amount,
            is_heal: true,
            ..
        } if *source == Some(id) => report.healing_done += amount,
        CombatEvent::Cast { caster, .. } if *caster == id => report.casts += 1,
        CombatEvent::Attack {
            attacker, outcome, ..
        } if *attacker == id => {
            report.attacks += 1;
            match outcome {
                AttackOutcome::Hit { is_crit: true, .. } => report.crits += 1,
                AttackOutcome::Miss => report.misses += 1,
                AttackOutcome::Hit { .. } => {}
            }
        }
        CombatEvent::PassiveFired { unit, .. } if *unit == id => report.passives_fired += 1,
        CombatEvent::Death {
            killer, time, ..
        } if *killer == Some(id) && report.kill_time.is_none() => {
            report.kill_time = Some(*time);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel(blue: Contestant, red: Contestant, seed: u64) -> DuelSimulation {
        DuelSimulation::setup(
            &default_units(),
            &default_items(),
            GameConstants::default(),
            &blue,
            &red,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn test_skill_order() {
        assert_eq!(skill_order(1), [1, 0, 0, 0]);
        assert_eq!(skill_order(3), [1, 1, 1, 0]);
        assert_eq!(skill_order(6), [3, 1, 1, 1]);
        assert_eq!(skill_order(18), [5, 5, 5, 3]);
    }

    #[test]
    fn test_unknown_champion() {
        let result = DuelSimulation::setup(
            &default_units(),
            &default_items(),
            GameConstants::default(),
            &Contestant::new("nobody", 1),
            &Contestant::new("bran", 1),
            0,
        );
        assert!(matches!(result, Err(ContentError::UnknownUnit(_))));
    }

    #[test]
    fn test_items_are_bought() {
        let blue = Contestant::new("lyra", 6).with_items(vec!["long_sword".to_string(), "dagger".to_string()]);
        let sim = duel(blue, Contestant::new("bran", 6), 3);
        let report = sim.report();
        assert_eq!(report.blue.items, vec!["long_sword", "dagger"]);
        assert_eq!(report.blue.level, 6);
    }

    #[test]
    fn test_duel_is_deterministic() {
        let run = |seed| {
            let mut duel = duel(Contestant::new("lyra", 9), Contestant::new("thorne", 9), seed);
            duel.run(30.0, 1.0 / 30.0);
            let report = duel.report();
            (report.duration, report.blue.damage_dealt, report.red.damage_dealt, report.winner)
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_duel_deals_damage_and_casts() {
        let mut duel = duel(Contestant::new("bran", 11), Contestant::new("magnus", 11), 5);
        duel.run(10.0, 1.0 / 30.0);
        let report = duel.report();
        assert!(report.blue.damage_dealt > 0.0);
        assert!(report.red.damage_dealt > 0.0);
        assert!(report.blue.casts > 0);
        assert!(report.blue.attacks > 0);
    }

    #[test]
    fn test_winner_has_kill_time() {
        let mut duel = duel(Contestant::new("thorne", 18), Contestant::new("melee_minion", 1), 1);
        duel.run(60.0, 1.0 / 30.0);
        let report = duel.report();
        assert_eq!(report.winner, Some(0));
        assert!(report.blue.kill_time.is_some());
        assert!(report.red.kill_time.is_none());
    }
}
