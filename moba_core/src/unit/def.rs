//! UnitDef - declarative unit content, and the roster lookup

use super::PassiveDef;
use crate::ability::AbilityDef;
use crate::config::ContentError;
use crate::stat_block::StatLine;
use crate::types::{ResourceKind, UnitKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A champion, minion, monster or structure definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: UnitKind,
    #[serde(default)]
    pub resource: ResourceKind,
    pub base: StatLine,
    #[serde(default)]
    pub growth: StatLine,
    /// Innate immunity tags
    #[serde(default)]
    pub immunities: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<Arc<AbilityDef>>,
    #[serde(default)]
    pub passives: Vec<PassiveDef>,
    #[serde(default)]
    pub collision_radius: Option<f64>,
    #[serde(default)]
    pub starting_gold: u32,
    /// Gold awarded to the killer
    #[serde(default)]
    pub bounty: u32,
    /// Health regenerates only after a spell out of combat
    #[serde(default)]
    pub regen_out_of_combat_only: bool,
}

/// Unit definitions by id
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    defs: HashMap<String, Arc<UnitDef>>,
}

impl UnitCatalog {
    pub fn new(defs: impl IntoIterator<Item = UnitDef>) -> Self {
        UnitCatalog {
            defs: defs
                .into_iter()
                .map(|def| (def.id.clone(), Arc::new(def)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<UnitDef>> {
        self.defs.get(id)
    }

    /// Look up a definition that content or the driver depends on
    pub fn require(&self, id: &str) -> Result<&Arc<UnitDef>, ContentError> {
        self.defs
            .get(id)
            .ok_or_else(|| ContentError::UnknownUnit(id.to_string()))
    }

    /// Sorted ids
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
