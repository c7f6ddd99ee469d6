//! Configuration loading from TOML files

mod constants;
mod items;
mod units;

pub use constants::{
    load_game_constants, CombatConstants, GameConstants, ShopConstants, UnitConstants,
};
pub use items::{default_items, load_item_catalog, parse_item_catalog};
pub use units::{default_units, load_unit_defs, parse_unit_defs};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// A reference to content that does not exist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("unknown unit definition: {0}")]
    UnknownUnit(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
