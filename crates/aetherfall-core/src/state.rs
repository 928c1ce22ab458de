//! The aggregate root: unit registry, project tree, selection, pause flag,
//! turn counter, and the bounded event log.
//!
//! `GameState` is exclusively owned by the single simulation call context.
//! External callers mutate it (pause, selection, task toggles) only between
//! turn invocations, never during one; no locking exists or is needed.

use crate::event::{Event, EventLog};
use crate::id::{ResourceId, UnitId};
use crate::project::{self, Project};
use crate::unit::{ProcessingUnit, UnitStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Unit registry. `BTreeMap` gives the sorted-by-id iteration order the
    /// turn loop depends on.
    pub(crate) units: BTreeMap<UnitId, ProcessingUnit>,
    projects: Vec<Project>,
    selected_unit: Option<UnitId>,
    events: EventLog,
    paused: bool,
    pub(crate) sim_turn: u64,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Units
    // -----------------------------------------------------------------------

    /// Insert a unit, keyed by its id. Intended for load-time construction;
    /// the registry is structurally fixed once the simulation starts.
    pub fn add_unit(&mut self, unit: ProcessingUnit) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn unit(&self, id: &str) -> Option<&ProcessingUnit> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: &str) -> Option<&mut ProcessingUnit> {
        self.units.get_mut(id)
    }

    /// Iterate units in sorted-id order.
    pub fn units(&self) -> impl Iterator<Item = &ProcessingUnit> {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn selected_unit(&self) -> Option<&ProcessingUnit> {
        self.selected_unit
            .as_ref()
            .and_then(|id| self.units.get(id.as_str()))
    }

    pub fn selected_unit_id(&self) -> Option<&UnitId> {
        self.selected_unit.as_ref()
    }

    /// Move the selection cursor and log the change. Selecting an id not in
    /// the registry clears the selection instead.
    pub fn select_unit(&mut self, id: Option<UnitId>) {
        let turn = self.sim_turn;
        match id {
            Some(id) => {
                if let Some(unit) = self.units.get(id.as_str()) {
                    let name = unit.name.clone();
                    self.selected_unit = Some(id);
                    self.push_event(Event::UnitSelected { unit: name, turn });
                } else {
                    self.selected_unit = None;
                    self.push_event(Event::SelectionCleared { turn });
                }
            }
            None => {
                self.selected_unit = None;
                self.push_event(Event::SelectionCleared { turn });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the simulation. Only flips the flag and logs; pending turns are
    /// neither gated nor flushed here.
    pub fn pause(&mut self) {
        self.paused = true;
        let turn = self.sim_turn;
        self.push_event(Event::Paused { turn });
    }

    pub fn resume(&mut self) {
        self.paused = false;
        let turn = self.sim_turn;
        self.push_event(Event::Resumed { turn });
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    // -----------------------------------------------------------------------
    // Turn counter / log
    // -----------------------------------------------------------------------

    /// Monotonic turn counter. Never decrements, never advances while paused.
    pub fn sim_turn(&self) -> u64 {
        self.sim_turn
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Install the project tree (load-time) and derive completion once.
    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.recompute_projects();
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Re-derive goal and project completion bottom-up.
    pub fn recompute_projects(&mut self) {
        project::recompute_completion(&mut self.projects);
    }

    /// Flip one task's completion flag. Unknown paths log a soft
    /// task-not-found line and return false; on success the whole tree is
    /// recomputed and the toggle is logged.
    pub fn toggle_task(&mut self, project_id: &str, goal_id: &str, task_id: &str) -> bool {
        let turn = self.sim_turn;
        let Some(task) = project::find_task_mut(&mut self.projects, project_id, goal_id, task_id)
        else {
            self.push_event(Event::TaskNotFound {
                path: format!("{project_id}/{goal_id}/{task_id}"),
                turn,
            });
            return false;
        };

        task.completed = !task.completed;
        let name = task.name.clone();
        let completed = task.completed;
        self.recompute_projects();
        self.push_event(Event::TaskToggled {
            task: name,
            completed,
            turn,
        });
        true
    }

    // -----------------------------------------------------------------------
    // Dashboards
    // -----------------------------------------------------------------------

    /// Global resource totals across every unit's inventory.
    pub fn inventory_summary(&self) -> BTreeMap<ResourceId, u64> {
        let mut totals: BTreeMap<ResourceId, u64> = BTreeMap::new();
        for unit in self.units.values() {
            for (id, qty) in unit.inventory.iter() {
                *totals.entry(id.clone()).or_insert(0) += qty as u64;
            }
        }
        totals
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Deterministic digest of the simulation-relevant state: turn counter,
    /// unit statuses, recipe timers, and inventories in sorted order. Two
    /// runs from the same start diverge here before anywhere else.
    pub fn state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.sim_turn);
        for (id, unit) in &self.units {
            hasher.write(id.as_str().as_bytes());
            hasher.write_u32(match unit.status {
                UnitStatus::Running => 0,
                UnitStatus::Stalled => 1,
                UnitStatus::Paused => 2,
            });
            hasher.write_u32(unit.turn_progress());
            for (resource, qty) in unit.inventory.iter() {
                hasher.write(resource.as_str().as_bytes());
                hasher.write_u32(qty);
            }
        }
        hasher.finish()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic digest for desync and replay checks.
///
/// FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
