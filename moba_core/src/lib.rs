//! moba_core - Combat, ability and effect resolution for a lane-based MOBA
//!
//! This library provides:
//! - StatBlock: base stats, growth, buffs and items folded into one snapshot
//! - Effects: the closed set of things abilities, passives and items do
//! - Unit: the champion/minion/monster/structure state machine
//! - Simulation: the fixed-step world that casts, attacks, moves and
//!   resolves passives
//! - Config: TOML-driven game constants, unit roster and item catalog

pub mod ability;
pub mod cc;
pub mod combat;
pub mod config;
pub mod defense;
pub mod effect;
pub mod item;
pub mod prelude;
pub mod sim;
pub mod source;
pub mod stat_block;
pub mod types;
pub mod unit;

// Re-export core types for convenience
pub use ability::{AbilityDef, AbilityState, CastError, CastRequest, Targeting};
pub use cc::{CcKind, CrowdControl};
pub use combat::{AttackOutcome, DamageResult};
pub use config::{default_items, default_units, ConfigError, ContentError, GameConstants};
pub use effect::{ActiveEffect, Effect, Magnitude, Stacking, TargetPolicy};
pub use item::{Inventory, ItemCatalog, ItemDef, PurchaseError};
pub use sim::{AttackError, CombatEvent, SimSnapshot, Simulation};
pub use stat_block::{StatBlock, StatKind, StatLine, StatModifier, UnitStats};
pub use types::{AbilitySlot, DamageType, ResourceKind, Side, UnitId, UnitKind, Vec2};
pub use unit::{Unit, UnitCatalog, UnitDef};
