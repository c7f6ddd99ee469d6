//! Item catalog loading

use super::ConfigError;
use crate::item::{ItemCatalog, ItemDef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for item definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    #[serde(rename = "items")]
    pub items: Vec<ItemDef>,
}

/// Load the item catalog from a TOML file
pub fn load_item_catalog(path: &Path) -> Result<ItemCatalog, ConfigError> {
    let config: ItemsConfig = super::load_toml(path)?;
    build_catalog(config)
}

/// Load the item catalog from a TOML string
pub fn parse_item_catalog(content: &str) -> Result<ItemCatalog, ConfigError> {
    let config: ItemsConfig = super::parse_toml(content)?;
    build_catalog(config)
}

/// Built-in starter shop
pub fn default_items() -> ItemCatalog {
    let toml = include_str!("../../config/items.toml");
    parse_item_catalog(toml).unwrap_or_else(|error| {
        tracing::error!(%error, "bundled item catalog is invalid");
        ItemCatalog::default()
    })
}

fn build_catalog(config: ItemsConfig) -> Result<ItemCatalog, ConfigError> {
    let mut seen = HashSet::new();
    for item in &config.items {
        if !seen.insert(item.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate item id '{}'",
                item.id
            )));
        }
        if item.sell_value > item.cost {
            return Err(ConfigError::ValidationError(format!(
                "item '{}' sells for more than it costs",
                item.id
            )));
        }
    }
    Ok(ItemCatalog::new(config.items))
}
