//! Effect system - the closed set of things abilities, passives and items do
//!
//! Every effect is plain data. [`crate::sim::Simulation`] is the single place
//! that applies them.

mod active;
mod context;
mod magnitude;
mod shield;

pub use active::{ActiveEffect, ActivePayload, MergeOutcome, PeriodicTick, Stacking};
pub use context::EffectContext;
pub use magnitude::{Magnitude, RankTable, ScalingStat, StatRatio};
pub use shield::{Shield, ShieldStack};

use crate::cc::CcKind;
use crate::stat_block::{StatKind, StatLine};
use crate::types::DamageType;
use serde::{Deserialize, Serialize};

/// Which units an effect lands on
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "select", rename_all = "snake_case")]
pub enum TargetPolicy {
    /// The unit that owns the ability or passive
    Caster,
    /// The primary target of the cast or trigger
    #[default]
    Target,
    /// Living enemies of the caster around the cast point
    EnemiesInArea { radius: f64 },
    /// Living allies of the caster (caster included) around the cast point
    AlliesInArea { radius: f64 },
    /// Every living unit around the cast point
    AllInArea { radius: f64 },
}

/// Side filter used by area resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affects {
    #[default]
    Enemies,
    Allies,
    All,
}

/// Where a delayed area resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// The cast point, fixed at cast time
    #[default]
    CastPoint,
    /// The caster's position at cast time
    Caster,
    /// Wherever the caster is when the delay runs out
    FollowCaster,
}

/// Coarse classification of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectClass {
    Immediate,
    SemiImmediate,
    Duration,
    DelayedAoe,
    ForcedMovement,
    CrowdControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub amount: Magnitude,
    pub damage_type: DamageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub amount: Magnitude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub amount: Magnitude,
    /// Seconds before the shield decays; `None` lasts until depleted
    #[serde(default)]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResourceEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub amount: Magnitude,
}

/// Remove cleansable crowd control and debuffs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleanseEffect {
    #[serde(default)]
    pub target: TargetPolicy,
}

/// Bonus damage on the target's next basic attacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpowerAttackEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    /// Modifier id; empowering again with the same id replaces it
    pub id: String,
    pub bonus: Magnitude,
    #[serde(default = "default_empower_type")]
    pub damage_type: DamageType,
    #[serde(default = "default_charges")]
    pub charges: u32,
    #[serde(default)]
    pub duration: Option<f64>,
}

fn default_empower_type() -> DamageType {
    DamageType::Physical
}

fn default_charges() -> u32 {
    1
}

/// Apply the inner effect after every other effect of the same resolution
/// pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredEffect {
    pub effect: Box<Effect>,
}

/// What a duration effect does while it is active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DurationPayload {
    /// Fixed stat deltas
    Stats {
        #[serde(default)]
        flat: StatLine,
        #[serde(default)]
        percent: StatLine,
    },
    /// One stat, magnitude resolved from the caster (percent as decimal
    /// when `percent` is set)
    ScaledStat {
        stat: StatKind,
        amount: Magnitude,
        #[serde(default)]
        percent: bool,
    },
    /// `amount` per second, delivered every `interval` seconds. No damage
    /// type means healing.
    Periodic {
        amount: Magnitude,
        #[serde(default)]
        damage_type: Option<DamageType>,
        #[serde(default = "default_interval")]
        interval: f64,
    },
    /// Immunity tags held for the duration
    Immunity { tags: Vec<String> },
}

fn default_interval() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationEffect {
    pub id: String,
    #[serde(default)]
    pub target: TargetPolicy,
    pub duration: RankTable,
    #[serde(default)]
    pub stacking: Stacking,
    #[serde(default)]
    pub is_debuff: bool,
    #[serde(default = "default_true")]
    pub cleansable: bool,
    #[serde(default)]
    pub persists_through_death: bool,
    /// Targets holding this immunity tag are unaffected
    #[serde(default)]
    pub tag: Option<String>,
    pub payload: DurationPayload,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedAoeEffect {
    pub delay: f64,
    pub radius: f64,
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub affects: Affects,
    /// Applied to each unit caught, with that unit as the target
    pub effects: Vec<Effect>,
}

/// Self displacement toward the cast point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashEffect {
    /// Maximum travel distance
    pub distance: f64,
    pub speed: f64,
    #[serde(default)]
    pub stop_on_enemy_hit: bool,
    /// Applied on arrival; the enemy hit (if any) becomes the target
    #[serde(default)]
    pub on_arrival: Vec<Effect>,
}

/// Push the target away from the caster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockbackEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub distance: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdControlEffect {
    #[serde(default)]
    pub target: TargetPolicy,
    pub cc: CcKind,
    pub duration: RankTable,
    /// Slow strength as a decimal (0.3 = 30%); unused by other kinds
    #[serde(default)]
    pub magnitude: f64,
}

/// Every effect primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Damage(DamageEffect),
    Heal(HealEffect),
    Shield(ShieldEffect),
    RestoreResource(RestoreResourceEffect),
    Cleanse(CleanseEffect),
    EmpowerAttack(EmpowerAttackEffect),
    Deferred(DeferredEffect),
    Duration(DurationEffect),
    DelayedAoe(DelayedAoeEffect),
    Dash(DashEffect),
    Knockback(KnockbackEffect),
    CrowdControl(CrowdControlEffect),
}

impl Effect {
    pub fn damage(amount: Magnitude, damage_type: DamageType) -> Self {
        Effect::Damage(DamageEffect {
            target: TargetPolicy::Target,
            amount,
            damage_type,
        })
    }

    pub fn heal(amount: Magnitude) -> Self {
        Effect::Heal(HealEffect {
            target: TargetPolicy::Target,
            amount,
        })
    }

    pub fn shield(amount: Magnitude, duration: Option<f64>) -> Self {
        Effect::Shield(ShieldEffect {
            target: TargetPolicy::Target,
            amount,
            duration,
        })
    }

    pub fn crowd_control(cc: CcKind, duration: f64) -> Self {
        Effect::CrowdControl(CrowdControlEffect {
            target: TargetPolicy::Target,
            cc,
            duration: RankTable::constant(duration),
            magnitude: 0.0,
        })
    }

    pub fn knockback(distance: f64, speed: f64) -> Self {
        Effect::Knockback(KnockbackEffect {
            target: TargetPolicy::Target,
            distance,
            speed,
        })
    }

    /// Builder: change who the effect lands on. No-op for effects that
    /// resolve once per cast.
    pub fn on(mut self, policy: TargetPolicy) -> Self {
        match &mut self {
            Effect::Damage(e) => e.target = policy,
            Effect::Heal(e) => e.target = policy,
            Effect::Shield(e) => e.target = policy,
            Effect::RestoreResource(e) => e.target = policy,
            Effect::Cleanse(e) => e.target = policy,
            Effect::EmpowerAttack(e) => e.target = policy,
            Effect::Duration(e) => e.target = policy,
            Effect::Knockback(e) => e.target = policy,
            Effect::CrowdControl(e) => e.target = policy,
            Effect::Deferred(e) => {
                let inner = std::mem::replace(&mut *e.effect, Effect::Cleanse(CleanseEffect::default()));
                *e.effect = inner.on(policy);
            }
            Effect::DelayedAoe(_) | Effect::Dash(_) => {}
        }
        self
    }

    pub fn class(&self) -> EffectClass {
        match self {
            Effect::Damage(_)
            | Effect::Heal(_)
            | Effect::Shield(_)
            | Effect::RestoreResource(_)
            | Effect::Cleanse(_)
            | Effect::EmpowerAttack(_) => EffectClass::Immediate,
            Effect::Deferred(_) => EffectClass::SemiImmediate,
            Effect::Duration(_) => EffectClass::Duration,
            Effect::DelayedAoe(_) => EffectClass::DelayedAoe,
            Effect::Dash(_) | Effect::Knockback(_) => EffectClass::ForcedMovement,
            Effect::CrowdControl(_) => EffectClass::CrowdControl,
        }
    }

    /// Target policy, or `None` for effects that resolve once per cast
    pub fn target(&self) -> Option<TargetPolicy> {
        match self {
            Effect::Damage(e) => Some(e.target),
            Effect::Heal(e) => Some(e.target),
            Effect::Shield(e) => Some(e.target),
            Effect::RestoreResource(e) => Some(e.target),
            Effect::Cleanse(e) => Some(e.target),
            Effect::EmpowerAttack(e) => Some(e.target),
            Effect::Duration(e) => Some(e.target),
            Effect::Knockback(e) => Some(e.target),
            Effect::CrowdControl(e) => Some(e.target),
            Effect::Deferred(e) => e.effect.target(),
            Effect::DelayedAoe(_) | Effect::Dash(_) => None,
        }
    }

    /// Immunity tag that blocks this effect outright
    pub fn immunity_tag(&self) -> Option<&str> {
        match self {
            Effect::Duration(e) => e.tag.as_deref(),
            Effect::CrowdControl(e) => Some(e.cc.tag()),
            Effect::Knockback(_) => Some("knockback"),
            Effect::Dash(_) => Some("dash"),
            Effect::Deferred(e) => e.effect.immunity_tag(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        effects: Vec<Effect>,
    }

    #[test]
    fn test_parse_effect_list() {
        let holder: Holder = toml::from_str(
            r#"
[[effects]]
kind = "damage"
damage_type = "magic"
amount = { base = [80, 120, 160], ratios = [{ stat = "ability_power", ratio = 0.7 }] }

[[effects]]
kind = "duration"
id = "ember"
is_debuff = true
tag = "burn"
duration = 3
stacking = { type = "stack", max_stacks = 3 }
payload = { type = "periodic", amount = { base = 10 }, damage_type = "magic" }

[[effects]]
kind = "crowd_control"
cc = "slow"
duration = [1.0, 1.5]
magnitude = 0.3
target = { select = "enemies_in_area", radius = 250 }

[[effects]]
kind = "delayed_aoe"
delay = 1.5
radius = 300
[[effects.effects]]
kind = "crowd_control"
cc = "stun"
duration = 1

[[effects]]
kind = "deferred"
effect = { kind = "heal", target = { select = "caster" }, amount = { base = 25 } }
"#,
        )
        .unwrap();

        assert_eq!(holder.effects.len(), 5);
        assert_eq!(holder.effects[0].class(), EffectClass::Immediate);
        assert_eq!(holder.effects[1].immunity_tag(), Some("burn"));
        assert_eq!(
            holder.effects[2].target(),
            Some(TargetPolicy::EnemiesInArea { radius: 250.0 })
        );
        assert_eq!(holder.effects[3].class(), EffectClass::DelayedAoe);
        assert_eq!(holder.effects[3].target(), None);
        assert_eq!(holder.effects[4].class(), EffectClass::SemiImmediate);
        assert_eq!(holder.effects[4].target(), Some(TargetPolicy::Caster));
    }

    #[test]
    fn test_on_changes_target() {
        let effect = Effect::heal(Magnitude::flat(50.0)).on(TargetPolicy::Caster);
        assert_eq!(effect.target(), Some(TargetPolicy::Caster));

        let deferred = Effect::Deferred(DeferredEffect {
            effect: Box::new(Effect::heal(Magnitude::flat(10.0))),
        })
        .on(TargetPolicy::AlliesInArea { radius: 100.0 });
        assert_eq!(deferred.target(), Some(TargetPolicy::AlliesInArea { radius: 100.0 }));
    }

    #[test]
    fn test_immunity_tags() {
        assert_eq!(Effect::knockback(200.0, 800.0).immunity_tag(), Some("knockback"));
        assert_eq!(Effect::crowd_control(CcKind::Stun, 1.0).immunity_tag(), Some("stun"));
        assert_eq!(Effect::heal(Magnitude::flat(1.0)).immunity_tag(), None);
    }
}
