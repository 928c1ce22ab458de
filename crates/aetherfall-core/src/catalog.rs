//! The resource catalog: id -> display metadata, frozen at load time.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable definition of a resource type. `weight` is presentation
/// metadata; the engine itself only ever moves whole units by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub id: ResourceId,
    pub name: String,
    pub weight: f64,
}

/// Immutable catalog of resource definitions. Built once from config;
/// no `&mut self` methods exist after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCatalog {
    resources: BTreeMap<ResourceId, ResourceDef>,
}

impl ResourceCatalog {
    /// Build a catalog from a list of definitions. An empty list or a
    /// duplicate id fails the whole load.
    pub fn from_defs(defs: Vec<ResourceDef>) -> Result<Self, CatalogError> {
        if defs.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut resources = BTreeMap::new();
        for def in defs {
            let id = def.id.clone();
            if resources.insert(id.clone(), def).is_some() {
                return Err(CatalogError::DuplicateResource(id));
            }
        }
        Ok(Self { resources })
    }

    /// Human label for a resource id. Never fails: unknown ids render as a
    /// distinguishable placeholder.
    pub fn name_of(&self, id: &str) -> String {
        match self.resources.get(id) {
            Some(def) => def.name.clone(),
            None => format!("(unknown:{id})"),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ResourceDef> {
        self.resources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    /// Iterate resource ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.resources.keys()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("resource config contained no resources")]
    Empty,
    #[error("duplicate resource id '{0}'")]
    DuplicateResource(ResourceId),
}
