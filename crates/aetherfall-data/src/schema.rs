//! Serde data file structs for the JSON scenario format.
//!
//! These structs mirror the on-disk shape exactly; every omission rule
//! (missing names fall back to ids, missing weights to 1.0, and so on) is
//! resolved by the loader, not here. Quantities are plain maps of resource
//! id to count.

use serde::Deserialize;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_duration() -> u32 {
    1
}

// ===========================================================================
// resources.json
// ===========================================================================

/// Top-level shape of `resources.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesFile {
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

/// One resource definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
}

// ===========================================================================
// recipes.json
// ===========================================================================

/// Top-level shape of `recipes.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipesFile {
    #[serde(default)]
    pub recipes: Vec<RecipeEntry>,
}

/// One recipe definition. `mode` is optional: when absent it is inferred
/// from the presence of `transfer_resource`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_turns: u32,
    #[serde(default)]
    pub power_required: u32,
    #[serde(default)]
    pub inputs: BTreeMap<String, u32>,
    #[serde(default)]
    pub outputs: BTreeMap<String, u32>,
    #[serde(default)]
    pub transfer_resource: Option<String>,
}

// ===========================================================================
// units.json
// ===========================================================================

/// Top-level shape of `units.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitsFile {
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub selected_unit_id: Option<String>,
}

/// One processing unit definition.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub pos: (f32, f32),
    #[serde(default)]
    pub input_id: Option<String>,
    #[serde(default)]
    pub output_id: Option<String>,
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
    #[serde(default)]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: String,
}

// ===========================================================================
// tasks.json
// ===========================================================================

/// Top-level shape of `tasks.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TasksFile {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub goals: Vec<GoalEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub completed: bool,
}

// ===========================================================================
// Tests
// ===========================================================================
