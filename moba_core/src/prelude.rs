//! Prelude module for convenient imports
//!
//! ```rust
//! use moba_core::prelude::*;
//! ```

// Core types
pub use crate::stat_block::{StatBlock, StatKind, StatLine, StatModifier, UnitStats};
pub use crate::types::{AbilitySlot, DamageType, ResourceKind, Side, UnitId, UnitKind, Vec2};

// Abilities and effects
pub use crate::ability::{AbilityDef, CastError, CastRequest, Targeting};
pub use crate::cc::{CcKind, CrowdControl};
pub use crate::effect::{Effect, Magnitude, RankTable, Stacking, TargetPolicy};

// Units and items
pub use crate::item::{ItemCatalog, ItemDef, PurchaseError};
pub use crate::unit::{HasHealth, HasPosition, HasSide, Unit, UnitCatalog, UnitDef};

// Simulation
pub use crate::combat::{AttackOutcome, DamageResult};
pub use crate::sim::{AttackError, CombatEvent, Simulation};

// Config
pub use crate::config::{default_items, default_units, GameConstants};
