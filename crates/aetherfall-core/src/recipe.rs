//! Recipe templates and the validated recipe book.
//!
//! A recipe is an immutable behavior template bound to processing units.
//! Multiple units may share one recipe, so the book hands out `Arc<Recipe>`
//! rather than copies.

use crate::catalog::ResourceCatalog;
use crate::id::{RecipeId, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a recipe does when its duration elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipeMode {
    /// Batch-consume `inputs` and produce `outputs` in the unit's own
    /// inventory.
    Craft,
    /// Move one resource per activation along the unit's links.
    Transfer,
}

/// Immutable recipe template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub mode: RecipeMode,
    pub duration_turns: u32,
    pub power_required: u32,

    // Craft mode.
    pub inputs: BTreeMap<ResourceId, u32>,
    pub outputs: BTreeMap<ResourceId, u32>,

    // Transfer mode: lock to a specific resource, or move any available
    // when absent.
    pub transfer_resource: Option<ResourceId>,
}

impl Recipe {
    /// Turns between activations. A configured duration of 0 behaves as 1.
    pub fn effective_duration(&self) -> u32 {
        self.duration_turns.max(1)
    }
}

/// Validated, immutable set of recipes keyed by id.
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: BTreeMap<RecipeId, Arc<Recipe>>,
}

impl RecipeBook {
    /// Freeze a recipe list into a book. Fails fast on the first recipe
    /// referencing a resource the catalog does not define, on duplicate
    /// recipe ids, and on an empty list. No partial book is ever returned.
    pub fn build(recipes: Vec<Recipe>, catalog: &ResourceCatalog) -> Result<Self, RecipeError> {
        if recipes.is_empty() {
            return Err(RecipeError::Empty);
        }

        let mut book = BTreeMap::new();
        for recipe in recipes {
            for resource in recipe.inputs.keys() {
                if !catalog.contains(resource.as_str()) {
                    return Err(RecipeError::UnknownResource {
                        recipe: recipe.id.clone(),
                        field: "inputs",
                        resource: resource.clone(),
                    });
                }
            }
            for resource in recipe.outputs.keys() {
                if !catalog.contains(resource.as_str()) {
                    return Err(RecipeError::UnknownResource {
                        recipe: recipe.id.clone(),
                        field: "outputs",
                        resource: resource.clone(),
                    });
                }
            }
            if let Some(resource) = &recipe.transfer_resource
                && !catalog.contains(resource.as_str())
            {
                return Err(RecipeError::UnknownResource {
                    recipe: recipe.id.clone(),
                    field: "transfer_resource",
                    resource: resource.clone(),
                });
            }

            let id = recipe.id.clone();
            if book.insert(id.clone(), Arc::new(recipe)).is_some() {
                return Err(RecipeError::DuplicateRecipe(id));
            }
        }

        Ok(Self { recipes: book })
    }

    /// Shared handle to a recipe, for binding to units.
    pub fn get(&self, id: &str) -> Option<Arc<Recipe>> {
        self.recipes.get(id).cloned()
    }

    /// Iterate recipes in sorted-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecipeId, &Arc<Recipe>)> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe config contained no recipes")]
    Empty,
    #[error("duplicate recipe id '{0}'")]
    DuplicateRecipe(RecipeId),
    #[error("recipe '{recipe}' references unknown {field} resource id '{resource}'")]
    UnknownResource {
        recipe: RecipeId,
        field: &'static str,
        resource: ResourceId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceDef;

    fn catalog() -> ResourceCatalog {
        let defs = ["wood", "plank"]
            .iter()
            .map(|id| ResourceDef {
                id: ResourceId::from(*id),
                name: id.to_string(),
                weight: 1.0,
            })
            .collect();
        ResourceCatalog::from_defs(defs).unwrap()
    }

    fn craft_recipe(id: &str) -> Recipe {
        Recipe {
            id: RecipeId::from(id),
            name: id.to_string(),
            mode: RecipeMode::Craft,
            duration_turns: 2,
            power_required: 0,
            inputs: BTreeMap::from([(ResourceId::from("wood"), 2)]),
            outputs: BTreeMap::from([(ResourceId::from("plank"), 1)]),
            transfer_resource: None,
        }
    }

    #[test]
    fn build_and_share() {
        let book = RecipeBook::build(vec![craft_recipe("mill")], &catalog()).unwrap();
        let a = book.get("mill").unwrap();
        let b = book.get("mill").unwrap();
        // Shared template, not a deep copy.
        assert!(Arc::ptr_eq(&a, &b));
        assert!(book.get("smelt").is_none());
    }

    #[test]
    fn empty_book_is_a_load_error() {
        assert!(matches!(
            RecipeBook::build(vec![], &catalog()),
            Err(RecipeError::Empty)
        ));
    }

    #[test]
    fn unknown_input_resource_fails() {
        let mut recipe = craft_recipe("mill");
        recipe.inputs.insert(ResourceId::from("mithril"), 1);
        let result = RecipeBook::build(vec![recipe], &catalog());
        match result {
            Err(RecipeError::UnknownResource {
                field, resource, ..
            }) => {
                assert_eq!(field, "inputs");
                assert_eq!(resource.as_str(), "mithril");
            }
            other => panic!("expected UnknownResource, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_transfer_resource_fails() {
        let mut recipe = craft_recipe("haul");
        recipe.mode = RecipeMode::Transfer;
        recipe.inputs.clear();
        recipe.outputs.clear();
        recipe.transfer_resource = Some(ResourceId::from("mithril"));
        let result = RecipeBook::build(vec![recipe], &catalog());
        assert!(matches!(
            result,
            Err(RecipeError::UnknownResource {
                field: "transfer_resource",
                ..
            })
        ));
    }

    #[test]
    fn duplicate_recipe_id_fails() {
        let result = RecipeBook::build(vec![craft_recipe("mill"), craft_recipe("mill")], &catalog());
        assert!(matches!(result, Err(RecipeError::DuplicateRecipe(_))));
    }

    #[test]
    fn zero_duration_clamps_to_one() {
        let mut recipe = craft_recipe("mill");
        recipe.duration_turns = 0;
        assert_eq!(recipe.effective_duration(), 1);
        recipe.duration_turns = 5;
        assert_eq!(recipe.effective_duration(), 5);
    }
}
