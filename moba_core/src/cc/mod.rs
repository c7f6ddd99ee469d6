//! Crowd control - independently timed action restrictions

use crate::stat_block::{StatKind, StatModifier};
use crate::types::{is_expired, UnitId};
use serde::{Deserialize, Serialize};

/// Crowd control kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CcKind {
    /// No moving, attacking or casting
    Stun,
    /// No casting
    Silence,
    /// No moving (movement speed forced to 0)
    Root,
    /// Movement speed reduced by `magnitude`
    Slow,
    /// Attacks are forced onto the taunt source
    Taunt,
    /// Basic attacks miss
    Blind,
    /// No basic attacks
    Disarm,
}

impl CcKind {
    /// Immunity tag that blocks this kind
    pub fn tag(self) -> &'static str {
        match self {
            CcKind::Stun => "stun",
            CcKind::Silence => "silence",
            CcKind::Root => "root",
            CcKind::Slow => "slow",
            CcKind::Taunt => "taunt",
            CcKind::Blind => "blind",
            CcKind::Disarm => "disarm",
        }
    }

    pub fn blocks_move(self) -> bool {
        matches!(self, CcKind::Stun | CcKind::Root)
    }

    pub fn blocks_attack(self) -> bool {
        matches!(self, CcKind::Stun | CcKind::Disarm)
    }

    pub fn blocks_cast(self) -> bool {
        matches!(self, CcKind::Stun | CcKind::Silence)
    }
}

/// One crowd control instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdControl {
    /// Assigned by the owning [`CrowdControlSet`]
    pub id: u64,
    pub kind: CcKind,
    pub remaining: f64,
    pub magnitude: f64,
    pub source: Option<UnitId>,
    pub cleansable: bool,
}

impl CrowdControl {
    pub fn new(kind: CcKind, duration: f64) -> Self {
        CrowdControl {
            id: 0,
            kind,
            remaining: duration,
            magnitude: 0.0,
            source: None,
            cleansable: true,
        }
    }

    pub fn stun(duration: f64) -> Self {
        Self::new(CcKind::Stun, duration)
    }

    pub fn silence(duration: f64) -> Self {
        Self::new(CcKind::Silence, duration)
    }

    pub fn root(duration: f64) -> Self {
        Self::new(CcKind::Root, duration)
    }

    /// `percent` as a decimal (0.3 = 30% slower)
    pub fn slow(duration: f64, percent: f64) -> Self {
        Self::new(CcKind::Slow, duration).with_magnitude(percent)
    }

    pub fn taunt(duration: f64, source: UnitId) -> Self {
        Self::new(CcKind::Taunt, duration).from_source(source)
    }

    pub fn blind(duration: f64) -> Self {
        Self::new(CcKind::Blind, duration)
    }

    pub fn disarm(duration: f64) -> Self {
        Self::new(CcKind::Disarm, duration)
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = magnitude;
        self
    }

    pub fn from_source(mut self, source: UnitId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn uncleansable(mut self) -> Self {
        self.cleansable = false;
        self
    }

    pub fn modifier_id(&self) -> String {
        format!("cc:{}", self.id)
    }

    /// Movement speed modifier this instance imposes, if any
    pub fn movement_modifier(&self) -> Option<StatModifier> {
        match self.kind {
            CcKind::Root => Some(
                StatModifier::new(self.modifier_id()).with_percent(StatKind::MovementSpeed, -1.0),
            ),
            CcKind::Slow if self.magnitude > 0.0 => Some(
                StatModifier::new(self.modifier_id())
                    .with_percent(StatKind::MovementSpeed, -self.magnitude.min(1.0)),
            ),
            _ => None,
        }
    }
}

/// Every crowd control instance on a unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrowdControlSet {
    active: Vec<CrowdControl>,
    next_id: u64,
}

impl CrowdControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance, returning its id
    pub fn apply(&mut self, mut cc: CrowdControl) -> u64 {
        self.next_id += 1;
        cc.id = self.next_id;
        let id = cc.id;
        self.active.push(cc);
        id
    }

    pub fn get(&self, id: u64) -> Option<&CrowdControl> {
        self.active.iter().find(|c| c.id == id)
    }

    /// Count down every instance, returning the ones that ran out
    pub fn tick(&mut self, delta: f64) -> Vec<CrowdControl> {
        for cc in self.active.iter_mut() {
            cc.remaining -= delta;
        }
        let (expired, live): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|c| is_expired(c.remaining));
        self.active = live;
        expired
    }

    pub fn remove(&mut self, id: u64) -> Option<CrowdControl> {
        let index = self.active.iter().position(|c| c.id == id)?;
        Some(self.active.remove(index))
    }

    /// Remove every cleansable instance
    pub fn cleanse(&mut self) -> Vec<CrowdControl> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|c| c.cleansable);
        self.active = kept;
        removed
    }

    pub fn clear(&mut self) -> Vec<CrowdControl> {
        std::mem::take(&mut self.active)
    }

    pub fn has(&self, kind: CcKind) -> bool {
        self.active.iter().any(|c| c.kind == kind)
    }

    pub fn can_move(&self) -> bool {
        !self.active.iter().any(|c| c.kind.blocks_move())
    }

    pub fn can_attack(&self) -> bool {
        !self.active.iter().any(|c| c.kind.blocks_attack())
    }

    pub fn can_cast(&self) -> bool {
        !self.active.iter().any(|c| c.kind.blocks_cast())
    }

    pub fn is_blinded(&self) -> bool {
        self.has(CcKind::Blind)
    }

    /// Source of the most recent taunt still running
    pub fn taunt_source(&self) -> Option<UnitId> {
        self.active
            .iter()
            .rev()
            .find(|c| c.kind == CcKind::Taunt)
            .and_then(|c| c.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrowdControl> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
