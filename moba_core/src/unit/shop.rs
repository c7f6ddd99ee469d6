//! Buying and selling items

use super::{PassiveState, Unit};
use crate::item::{ItemDef, PurchaseError};
use crate::source::GearSource;
use std::sync::Arc;
use tracing::info;

impl Unit {
    /// Check whether `item` could be bought right now
    pub fn can_purchase(&self, item: &ItemDef) -> Result<(), PurchaseError> {
        self.inventory.can_purchase(item, self.gold)
    }

    /// Buy an item into the lowest free slot. Returns the slot index.
    ///
    /// Nothing changes on error.
    pub fn purchase(&mut self, item: Arc<ItemDef>) -> Result<usize, PurchaseError> {
        self.can_purchase(&item)?;
        let slot = self
            .inventory
            .insert(Arc::clone(&item))
            .ok_or(PurchaseError::InventoryFull)?;
        self.gold -= item.cost;
        self.stats.set_item_modifier(slot, item.modifier());

        let prefix = GearSource::slot_id(slot);
        for passive in &item.passives {
            self.passives.push(PassiveState::new(
                format!("{prefix}:{}", passive.id),
                Arc::new(passive.clone()),
            ));
        }
        info!(unit = %self.id, item = %item.id, slot, gold = self.gold, "item purchased");
        Ok(slot)
    }

    /// Sell the item in `slot`. Returns the gold credited (0 for an empty
    /// slot).
    pub fn sell(&mut self, slot: usize) -> u32 {
        let Some(item) = self.inventory.remove(slot) else {
            return 0;
        };
        self.stats.clear_item_modifier(slot);
        let prefix = format!("{}:", GearSource::slot_id(slot));
        self.passives.retain(|p| !p.id.starts_with(&prefix));
        self.gold = self.gold.saturating_add(item.sell_value);
        info!(unit = %self.id, item = %item.id, slot, gold = self.gold, "item sold");
        item.sell_value
    }
}
