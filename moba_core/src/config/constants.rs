//! Game constants configuration

use crate::defense::constants::DEFAULT_MIN_RESIST;
use crate::item::DEFAULT_INVENTORY_CAPACITY;
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable game constants. Every field has a default, so an empty file is
/// valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConstants {
    #[serde(default)]
    pub combat: CombatConstants,
    #[serde(default)]
    pub units: UnitConstants,
    #[serde(default)]
    pub shop: ShopConstants,
}

/// Load game constants from a TOML file
pub fn load_game_constants(path: &Path) -> Result<GameConstants, ConfigError> {
    super::load_toml(path)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    /// Resist values below this are treated as this
    #[serde(default = "default_min_resist")]
    pub min_resist: f64,
    /// Seconds without dealing or taking damage before a unit is out of
    /// combat
    #[serde(default = "default_combat_timeout")]
    pub combat_timeout: f64,
    /// Passive hooks raised by other passives resolve for at most this many
    /// rounds per operation
    #[serde(default = "default_hook_round_limit")]
    pub hook_round_limit: u32,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            min_resist: DEFAULT_MIN_RESIST,
            combat_timeout: 5.0,
            hook_round_limit: 8,
        }
    }
}

fn default_min_resist() -> f64 {
    DEFAULT_MIN_RESIST
}
fn default_combat_timeout() -> f64 {
    5.0
}
fn default_hook_round_limit() -> u32 {
    8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConstants {
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Used when a definition does not set its own
    #[serde(default = "default_collision_radius")]
    pub default_collision_radius: f64,
}

impl Default for UnitConstants {
    fn default() -> Self {
        UnitConstants {
            max_level: 18,
            default_collision_radius: 35.0,
        }
    }
}

fn default_max_level() -> u32 {
    18
}
fn default_collision_radius() -> f64 {
    35.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConstants {
    #[serde(default = "default_inventory_capacity")]
    pub inventory_capacity: usize,
}

impl Default for ShopConstants {
    fn default() -> Self {
        ShopConstants {
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
        }
    }
}

fn default_inventory_capacity() -> usize {
    DEFAULT_INVENTORY_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_toml;

    #[test]
    fn test_empty_file_uses_defaults() {
        let constants: GameConstants = parse_toml("").unwrap();
        assert_eq!(constants, GameConstants::default());
        assert!((constants.combat.min_resist - -99.0).abs() < f64::EPSILON);
        assert_eq!(constants.shop.inventory_capacity, 6);
    }

    #[test]
    fn test_partial_override() {
        let constants: GameConstants = parse_toml(
            r#"
[combat]
combat_timeout = 8.0

[units]
max_level = 30
"#,
        )
        .unwrap();
        assert!((constants.combat.combat_timeout - 8.0).abs() < f64::EPSILON);
        assert_eq!(constants.combat.hook_round_limit, 8);
        assert_eq!(constants.units.max_level, 30);
        assert!((constants.units.default_collision_radius - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_game_constants_from_file() {
        let path = std::env::temp_dir().join(format!("moba_core_game_{}.toml", std::process::id()));
        std::fs::write(&path, "[shop]\ninventory_capacity = 4\n").unwrap();
        let loaded = load_game_constants(&path);
        std::fs::remove_file(&path).ok();

        let constants = loaded.unwrap();
        assert_ne!(constants, GameConstants::default());
        assert_eq!(constants.shop.inventory_capacity, 4);

        let missing = std::env::temp_dir().join("moba_core_no_such_game.toml");
        assert!(matches!(load_game_constants(&missing), Err(ConfigError::IoError(_))));
    }
}
