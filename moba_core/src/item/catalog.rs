//! ItemCatalog - read-only item lookup built once at startup

use super::ItemDef;
use crate::config::ContentError;
use std::collections::HashMap;
use std::sync::Arc;

/// Item lookup by id
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<String, Arc<ItemDef>>,
}

impl ItemCatalog {
    pub fn new(items: impl IntoIterator<Item = ItemDef>) -> Self {
        ItemCatalog {
            items: items
                .into_iter()
                .map(|item| (item.id.clone(), Arc::new(item)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<ItemDef>> {
        self.items.get(id).cloned()
    }

    /// Look up an item the driver depends on
    pub fn require(&self, id: &str) -> Result<Arc<ItemDef>, ContentError> {
        self.get(id)
            .ok_or_else(|| ContentError::UnknownItem(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every item, cheapest first
    pub fn by_cost(&self) -> Vec<Arc<ItemDef>> {
        let mut items: Vec<_> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.id.cmp(&b.id)));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_block::StatLine;

    fn item(id: &str, cost: u32) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.to_string(),
            cost,
            sell_value: cost * 7 / 10,
            unique: false,
            flat: StatLine::new(),
            percent: StatLine::new(),
            passives: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_and_order() {
        let catalog = ItemCatalog::new(vec![item("b", 900), item("a", 300)]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("a").is_some());
        assert!(catalog.get("missing").is_none());
        assert_eq!(
            catalog.require("missing").unwrap_err(),
            ContentError::UnknownItem("missing".to_string())
        );
        let ids: Vec<String> = catalog.by_cost().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
