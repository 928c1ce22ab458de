//! Processing units: the nodes of the logistics graph.
//!
//! Units link to each other by id only (`input_id`/`output_id` resolve
//! through the registry at use time), so cyclic routes like A -> B -> A are
//! valid topologies with nothing owned and nothing to leak.

use crate::id::UnitId;
use crate::inventory::Inventory;
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Closed set of unit kinds. Cosmetic as far as the engine is concerned:
/// transfer behavior derives from link shape, not from the tag. New kinds
/// are a compile-time-checked decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    #[default]
    Stockpile,
    ResourcePile,
    Drone,
    Factory,
}

impl UnitKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Stockpile" => Some(Self::Stockpile),
            "ResourcePile" => Some(Self::ResourcePile),
            "Drone" => Some(Self::Drone),
            "Factory" => Some(Self::Factory),
            _ => None,
        }
    }
}

/// Per-unit processing status. `Stalled` and `Paused` units are skipped by
/// the turn loop; both are legitimate durable states, distinct from the
/// global pause flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    #[default]
    Running,
    Stalled,
    Paused,
}

impl UnitStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Running" => Some(Self::Running),
            "Stalled" => Some(Self::Stalled),
            "Paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// A node in the logistics graph: identity, links, inventory, and an
/// optional shared recipe binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingUnit {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    /// World position for map rendering. Ignored by the engine.
    pub pos: (f32, f32),

    /// Upstream unit this one pulls from, when transferring.
    pub input_id: Option<UnitId>,
    /// Downstream unit this one pushes to, when transferring.
    pub output_id: Option<UnitId>,

    pub inventory: Inventory,
    recipe: Option<Arc<Recipe>>,

    pub status: UnitStatus,
    pub notes: String,

    // Private recipe timer; reset on completion or recipe change.
    turn_progress: u32,
}

impl ProcessingUnit {
    pub fn new(id: UnitId, name: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            pos: (0.0, 0.0),
            input_id: None,
            output_id: None,
            inventory: Inventory::new(),
            recipe: None,
            status: UnitStatus::Running,
            notes: String::new(),
            turn_progress: 0,
        }
    }

    pub fn recipe(&self) -> Option<&Arc<Recipe>> {
        self.recipe.as_ref()
    }

    /// Bind (or clear) the unit's recipe. The private turn timer resets so
    /// a swapped recipe never inherits another recipe's partial progress.
    pub fn set_recipe(&mut self, recipe: Option<Arc<Recipe>>) {
        self.recipe = recipe;
        self.turn_progress = 0;
    }

    /// Turns accumulated toward the current recipe's duration.
    pub fn turn_progress(&self) -> u32 {
        self.turn_progress
    }

    /// True when the unit's own inventory is the transfer source: it has an
    /// output link and no input link. A resource pile is the usual shape,
    /// but the rule is the link shape, not the kind tag.
    pub fn acts_as_source(&self) -> bool {
        self.input_id.is_none() && self.output_id.is_some()
    }

    /// Advance the turn timer by one. Returns true when the recipe duration
    /// has been reached; the timer resets to 0 in that case.
    pub(crate) fn tick_progress(&mut self, duration: u32) -> bool {
        self.turn_progress += 1;
        if self.turn_progress < duration {
            return false;
        }
        self.turn_progress = 0;
        true
    }
}
