//! Inventory - fixed-capacity item slots

use super::{ItemDef, PurchaseError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_INVENTORY_CAPACITY: usize = 6;

/// Slot index → equipped item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<Arc<ItemDef>>>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INVENTORY_CAPACITY)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Inventory {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Lowest unused slot index
    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.first_free_slot().is_none()
    }

    pub fn owns(&self, item_id: &str) -> bool {
        self.items().any(|(_, item)| item.id == item_id)
    }

    pub fn get(&self, slot: usize) -> Option<&Arc<ItemDef>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Equipped items with their slot index
    pub fn items(&self) -> impl Iterator<Item = (usize, &Arc<ItemDef>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }

    /// Check a purchase: free slot, then gold, then uniqueness
    pub fn can_purchase(&self, item: &ItemDef, gold: u32) -> Result<(), PurchaseError> {
        if self.is_full() {
            return Err(PurchaseError::InventoryFull);
        }
        if gold < item.cost {
            return Err(PurchaseError::NotEnoughGold);
        }
        if item.unique && self.owns(&item.id) {
            return Err(PurchaseError::UniqueOwned);
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, item: Arc<ItemDef>) -> Option<usize> {
        let slot = self.first_free_slot()?;
        self.slots[slot] = Some(item);
        Some(slot)
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Option<Arc<ItemDef>> {
        self.slots.get_mut(slot).and_then(Option::take)
    }
}
