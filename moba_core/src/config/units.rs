//! Unit definition loading

use super::ConfigError;
use crate::unit::{Trigger, UnitCatalog, UnitDef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for unit definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(rename = "units")]
    pub units: Vec<UnitDef>,
}

/// Load unit definitions from a TOML file
pub fn load_unit_defs(path: &Path) -> Result<UnitCatalog, ConfigError> {
    let config: UnitsConfig = super::load_toml(path)?;
    build_catalog(config)
}

/// Load unit definitions from a TOML string
pub fn parse_unit_defs(content: &str) -> Result<UnitCatalog, ConfigError> {
    let config: UnitsConfig = super::parse_toml(content)?;
    build_catalog(config)
}

/// Built-in roster: champions, a lane minion, a jungle monster and a tower
pub fn default_units() -> UnitCatalog {
    let toml = include_str!("../../config/units.toml");
    parse_unit_defs(toml).unwrap_or_else(|error| {
        tracing::error!(%error, "bundled unit roster is invalid");
        UnitCatalog::default()
    })
}

fn build_catalog(config: UnitsConfig) -> Result<UnitCatalog, ConfigError> {
    let mut seen = HashSet::new();
    for def in &config.units {
        if !seen.insert(def.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate unit id '{}'",
                def.id
            )));
        }
        validate(def)?;
    }
    Ok(UnitCatalog::new(config.units))
}

fn validate(def: &UnitDef) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::ValidationError(format!("unit '{}': {msg}", def.id)));

    if def.base.max_health <= 0.0 {
        return invalid("max_health must be positive".to_string());
    }

    let mut slots = HashSet::new();
    for ability in &def.abilities {
        if !slots.insert(ability.slot) {
            return invalid(format!("two abilities in slot {:?}", ability.slot));
        }
        if ability.max_rank == 0 {
            return invalid(format!("ability '{}' has max_rank 0", ability.id));
        }
        if ability.cooldown < 0.0 || ability.cast_time < 0.0 {
            return invalid(format!("ability '{}' has a negative timer", ability.id));
        }
    }

    for passive in &def.passives {
        if let Trigger::OnLowHealth { threshold } = passive.trigger {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return invalid(format!(
                    "passive '{}' threshold {threshold} is outside (0, 1]",
                    passive.id
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbilitySlot, ResourceKind, UnitKind};

    #[test]
    fn test_parse_units() {
        let toml = r#"
[[units]]
id = "scout"
name = "Scout"
resource = "energy"
base = { max_health = 550, max_resource = 200, attack_damage = 58, attack_speed = 0.65 }
growth = { max_health = 90, attack_speed = 0.02 }

[[units.abilities]]
id = "scout_q"
name = "Quick Shot"
slot = "q"
cost = 40
cooldown = 6
targeting = { type = "unit", range = 600 }

[[units.abilities.effects]]
kind = "damage"
damage_type = "physical"
amount = { base = [60, 90, 120], ratios = [{ stat = "attack_damage", ratio = 1.0 }] }
"#;
        let catalog = parse_unit_defs(toml).unwrap();
        let scout = catalog.get("scout").unwrap();
        assert_eq!(scout.resource, ResourceKind::Energy);
        assert_eq!(scout.kind, UnitKind::Champion);
        assert_eq!(scout.abilities[0].slot, AbilitySlot::Q);
        assert!((scout.abilities[0].cost_at(1) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_slot_is_rejected() {
        let toml = r#"
[[units]]
id = "broken"
name = "Broken"
base = { max_health = 500 }

[[units.abilities]]
id = "a"
name = "A"
slot = "q"
cooldown = 1
targeting = { type = "self_cast" }
effects = []

[[units.abilities]]
id = "b"
name = "B"
slot = "q"
cooldown = 1
targeting = { type = "self_cast" }
effects = []
"#;
        assert!(matches!(
            parse_unit_defs(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bad_threshold_is_rejected() {
        let toml = r#"
[[units]]
id = "broken"
name = "Broken"
base = { max_health = 500 }

[[units.passives]]
id = "never"
trigger = { type = "on_low_health", threshold = 1.5 }
effects = []
"#;
        assert!(parse_unit_defs(toml).is_err());
    }

    #[test]
    fn test_bundled_roster_parses() {
        let toml = include_str!("../../config/units.toml");
        let catalog = parse_unit_defs(toml).unwrap();
        for id in [
            "bran",
            "elara",
            "greta",
            "lyra",
            "magnus",
            "thorne",
            "uruk",
            "melee_minion",
            "wolf",
            "outer_tower",
        ] {
            assert!(catalog.get(id).is_some(), "missing {id}");
        }

        let uruk = catalog.get("uruk").unwrap();
        assert_eq!(uruk.resource, ResourceKind::None);
        assert!(uruk.regen_out_of_combat_only);
        assert_eq!(catalog.get("outer_tower").unwrap().kind, UnitKind::Structure);
        for champion in ["bran", "elara", "greta", "lyra", "magnus", "thorne", "uruk"] {
            assert_eq!(catalog.get(champion).unwrap().abilities.len(), 4, "{champion}");
        }
        assert_eq!(default_units().len(), catalog.len());
    }
}
