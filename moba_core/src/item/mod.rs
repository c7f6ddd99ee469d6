//! Items - shop definitions, the catalog, and slot-limited inventories

mod catalog;
mod inventory;

pub use catalog::ItemCatalog;
pub use inventory::{Inventory, DEFAULT_INVENTORY_CAPACITY};

use crate::stat_block::{StatLine, StatModifier};
use crate::unit::PassiveDef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A purchasable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub cost: u32,
    pub sell_value: u32,
    /// At most one copy may be equipped
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub flat: StatLine,
    #[serde(default)]
    pub percent: StatLine,
    #[serde(default)]
    pub passives: Vec<PassiveDef>,
}

impl ItemDef {
    /// Stat contribution as a permanent modifier (the id is replaced by the
    /// slot id when equipped)
    pub fn modifier(&self) -> StatModifier {
        let mut modifier = StatModifier::new(self.id.clone());
        modifier.flat = self.flat;
        modifier.percent = self.percent;
        modifier
    }
}

/// Why a purchase was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("inventory is full")]
    InventoryFull,
    #[error("not enough gold")]
    NotEnoughGold,
    #[error("a unique copy is already owned")]
    UniqueOwned,
}

impl PurchaseError {
    /// Stable snake_case reason code
    pub fn reason(self) -> &'static str {
        match self {
            PurchaseError::InventoryFull => "inventory_full",
            PurchaseError::NotEnoughGold => "not_enough_gold",
            PurchaseError::UniqueOwned => "unique_owned",
        }
    }
}
