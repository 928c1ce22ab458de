//! Resolution pipeline: parses the JSON files, resolves cross-references
//! layer by layer, and assembles a validated [`GameState`].
//!
//! Layers load in dependency order: resources, then recipes against the
//! catalog, then units against both, then the project tree. Every reference
//! error is fatal; no partially constructed state escapes this module.

use crate::schema;
use aetherfall_core::catalog::{CatalogError, ResourceCatalog, ResourceDef};
use aetherfall_core::event::Event;
use aetherfall_core::id::{RecipeId, ResourceId, UnitId};
use aetherfall_core::project::{Goal, Project, Task};
use aetherfall_core::recipe::{Recipe, RecipeBook, RecipeError, RecipeMode};
use aetherfall_core::state::GameState;
use aetherfall_core::unit::{ProcessingUnit, UnitKind, UnitStatus};
use std::collections::BTreeSet;
use std::path::Path;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading scenario data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A file failed to parse as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The resource catalog failed validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The recipe set failed validation.
    #[error(transparent)]
    Recipes(#[from] RecipeError),

    /// A recipe declared a mode string the engine does not know.
    #[error("recipe '{recipe}' has unknown mode '{mode}'")]
    UnknownMode { recipe: RecipeId, mode: String },

    /// The unit file contained no units.
    #[error("unit config contained no units")]
    NoUnits,

    /// Two units share an id.
    #[error("duplicate unit id '{0}'")]
    DuplicateUnit(UnitId),

    /// A unit inventory names a resource the catalog does not define.
    #[error("unit '{unit}' inventory references unknown resource id '{resource}'")]
    UnknownInventoryResource { unit: UnitId, resource: ResourceId },

    /// A unit binds a recipe id the book does not define.
    #[error("unit '{unit}' references unknown recipe_id '{recipe}'")]
    UnknownRecipe { unit: UnitId, recipe: RecipeId },

    /// A unit link points at a unit that does not exist.
    #[error("unit '{unit}' has {field}='{target}' which does not exist")]
    UnknownUnitRef {
        unit: UnitId,
        field: &'static str,
        target: UnitId,
    },

    /// A unit declared a kind string the engine does not know.
    #[error("unit '{unit}' has unknown kind '{kind}'")]
    UnknownKind { unit: UnitId, kind: String },

    /// A unit declared a status string the engine does not know.
    #[error("unit '{unit}' has unknown status '{status}'")]
    UnknownStatus { unit: UnitId, status: String },

    /// A file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Per-file loaders
// ===========================================================================

/// Parse `resources.json` content into a frozen catalog.
pub fn load_resources_str(json: &str) -> Result<ResourceCatalog, DataLoadError> {
    let file: schema::ResourcesFile = serde_json::from_str(json)?;
    let defs = file
        .resources
        .into_iter()
        .map(|entry| {
            let name = entry.name.unwrap_or_else(|| entry.id.clone());
            ResourceDef {
                id: ResourceId::from(entry.id),
                name,
                weight: entry.weight.unwrap_or(1.0),
            }
        })
        .collect();
    Ok(ResourceCatalog::from_defs(defs)?)
}

/// Parse `recipes.json` content into a validated book.
///
/// Mode resolution: an explicit `"craft"` or `"transfer"` string wins; any
/// other string is an error. When absent, a recipe carrying a
/// `transfer_resource` is a transfer, otherwise a craft. An empty-string
/// `transfer_resource` counts as absent.
pub fn load_recipes_str(
    json: &str,
    catalog: &ResourceCatalog,
) -> Result<RecipeBook, DataLoadError> {
    let file: schema::RecipesFile = serde_json::from_str(json)?;

    let mut recipes = Vec::with_capacity(file.recipes.len());
    for entry in file.recipes {
        let id = RecipeId::from(entry.id);
        let transfer_resource = entry
            .transfer_resource
            .filter(|s| !s.is_empty())
            .map(ResourceId::from);
        let mode = match entry.mode.as_deref() {
            Some("craft") => RecipeMode::Craft,
            Some("transfer") => RecipeMode::Transfer,
            Some(other) => {
                return Err(DataLoadError::UnknownMode {
                    recipe: id,
                    mode: other.to_string(),
                });
            }
            None if transfer_resource.is_some() => RecipeMode::Transfer,
            None => RecipeMode::Craft,
        };

        recipes.push(Recipe {
            name: entry.name.unwrap_or_else(|| id.as_str().to_string()),
            id,
            mode,
            duration_turns: entry.duration_turns,
            power_required: entry.power_required,
            inputs: entry
                .inputs
                .into_iter()
                .map(|(r, q)| (ResourceId::from(r), q))
                .collect(),
            outputs: entry
                .outputs
                .into_iter()
                .map(|(r, q)| (ResourceId::from(r), q))
                .collect(),
            transfer_resource,
        });
    }

    Ok(RecipeBook::build(recipes, catalog)?)
}

/// Parse `units.json` content into a populated [`GameState`].
///
/// Two passes: the first builds every unit and validates inventories and
/// recipe bindings; the second validates links, which may point forward. An
/// unknown `selected_unit_id` is dropped silently rather than rejected.
pub fn load_units_str(
    json: &str,
    recipes: &RecipeBook,
    catalog: &ResourceCatalog,
) -> Result<GameState, DataLoadError> {
    let file: schema::UnitsFile = serde_json::from_str(json)?;
    if file.units.is_empty() {
        return Err(DataLoadError::NoUnits);
    }

    let mut units = Vec::with_capacity(file.units.len());
    let mut seen: BTreeSet<UnitId> = BTreeSet::new();
    for entry in file.units {
        let id = UnitId::from(entry.id);
        if !seen.insert(id.clone()) {
            return Err(DataLoadError::DuplicateUnit(id));
        }

        for resource in entry.inventory.keys() {
            if !catalog.contains(resource) {
                return Err(DataLoadError::UnknownInventoryResource {
                    unit: id,
                    resource: ResourceId::from(resource.clone()),
                });
            }
        }

        let kind = match entry.kind.as_deref() {
            None => UnitKind::default(),
            Some(s) => UnitKind::parse(s).ok_or_else(|| DataLoadError::UnknownKind {
                unit: id.clone(),
                kind: s.to_string(),
            })?,
        };
        let status = match entry.status.as_deref() {
            None => UnitStatus::default(),
            Some(s) => UnitStatus::parse(s).ok_or_else(|| DataLoadError::UnknownStatus {
                unit: id.clone(),
                status: s.to_string(),
            })?,
        };

        let recipe = match entry.recipe_id {
            None => None,
            Some(recipe_id) => Some(recipes.get(&recipe_id).ok_or_else(|| {
                DataLoadError::UnknownRecipe {
                    unit: id.clone(),
                    recipe: RecipeId::from(recipe_id.clone()),
                }
            })?),
        };

        let name = entry.name.unwrap_or_else(|| id.as_str().to_string());
        let mut unit = ProcessingUnit::new(id, name, kind);
        unit.pos = entry.pos;
        unit.input_id = entry.input_id.map(UnitId::from);
        unit.output_id = entry.output_id.map(UnitId::from);
        unit.inventory = entry
            .inventory
            .into_iter()
            .filter(|(_, qty)| *qty > 0)
            .map(|(r, q)| (ResourceId::from(r), q))
            .collect();
        unit.status = status;
        unit.notes = entry.notes;
        unit.set_recipe(recipe);
        units.push(unit);
    }

    // Links may point at units defined later in the file, so they can only
    // be checked once every unit exists.
    for unit in &units {
        for (field, link) in [("input_id", &unit.input_id), ("output_id", &unit.output_id)] {
            if let Some(target) = link
                && !seen.contains(target)
            {
                return Err(DataLoadError::UnknownUnitRef {
                    unit: unit.id.clone(),
                    field,
                    target: target.clone(),
                });
            }
        }
    }

    let mut state = GameState::new();
    for unit in units {
        state.add_unit(unit);
    }
    if let Some(selected) = file.selected_unit_id
        && state.unit(&selected).is_some()
    {
        state.select_unit(Some(UnitId::from(selected)));
    }
    Ok(state)
}

/// Parse `tasks.json` content into a project tree. Completion of goals and
/// projects is derived later by the state, never read from the file.
pub fn load_projects_str(json: &str) -> Result<Vec<Project>, DataLoadError> {
    let file: schema::TasksFile = serde_json::from_str(json)?;
    let projects = file
        .projects
        .into_iter()
        .map(|p| {
            let goals = p
                .goals
                .into_iter()
                .map(|g| {
                    let tasks = g
                        .tasks
                        .into_iter()
                        .map(|t| {
                            let name = t.name.unwrap_or_else(|| t.id.clone());
                            let mut task = Task::new(t.id, name, t.required);
                            task.completed = t.completed;
                            task
                        })
                        .collect();
                    let name = g.name.unwrap_or_else(|| g.id.clone());
                    Goal::new(g.id, name, g.required, tasks)
                })
                .collect();
            let name = p.name.unwrap_or_else(|| p.id.clone());
            Project::new(p.id, name, p.required, goals)
        })
        .collect();
    Ok(projects)
}

// ===========================================================================
// Whole-scenario loading
// ===========================================================================

/// A fully loaded scenario: the frozen data layers plus the live state.
#[derive(Debug, Clone)]
pub struct LoadedGame {
    pub catalog: ResourceCatalog,
    pub recipes: RecipeBook,
    pub state: GameState,
}

/// Load a scenario from the four file contents in dependency order.
pub fn load_game_str(
    resources: &str,
    recipes: &str,
    units: &str,
    tasks: &str,
) -> Result<LoadedGame, DataLoadError> {
    let catalog = load_resources_str(resources)?;
    let book = load_recipes_str(recipes, &catalog)?;
    let mut state = load_units_str(units, &book, &catalog)?;
    state.set_projects(load_projects_str(tasks)?);

    let turn = state.sim_turn();
    state.push_event(Event::StateLoaded { turn });

    Ok(LoadedGame {
        catalog,
        recipes: book,
        state,
    })
}

/// Load a scenario from `resources.json`, `recipes.json`, `units.json`, and
/// `tasks.json` in the given directory.
pub fn load_game(dir: &Path) -> Result<LoadedGame, DataLoadError> {
    let resources = std::fs::read_to_string(dir.join("resources.json"))?;
    let recipes = std::fs::read_to_string(dir.join("recipes.json"))?;
    let units = std::fs::read_to_string(dir.join("units.json"))?;
    let tasks = std::fs::read_to_string(dir.join("tasks.json"))?;
    load_game_str(&resources, &recipes, &units, &tasks)
}

// ===========================================================================
// Tests
// ===========================================================================
