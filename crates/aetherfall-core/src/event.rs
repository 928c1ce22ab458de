//! Typed events and the bounded event log.
//!
//! The engine and the state mutators emit one event per user-visible action.
//! Idle conditions (empty source, unsatisfied craft, missing link) emit
//! nothing -- they are resting states and would spam the log every turn.
//! Events render to human lines via `Display` for console views.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// A user-visible simulation event. All events carry the turn at which they
/// occurred. Unit fields hold display names; the log outlives lookups into
/// the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// One resource moved along a link. `source == unit` for units that
    /// emit from their own inventory.
    Transferred {
        unit: String,
        source: String,
        dest: String,
        resource: ResourceId,
        quantity: u32,
        turn: u64,
    },
    /// A craft cycle completed in a unit's own inventory.
    Crafted {
        unit: String,
        produced: Vec<(ResourceId, u32)>,
        turn: u64,
    },

    Paused {
        turn: u64,
    },
    Resumed {
        turn: u64,
    },

    TaskToggled {
        task: String,
        completed: bool,
        turn: u64,
    },
    TaskNotFound {
        path: String,
        turn: u64,
    },

    UnitSelected {
        unit: String,
        turn: u64,
    },
    SelectionCleared {
        turn: u64,
    },

    StateLoaded {
        turn: u64,
    },
}

/// Discriminant tag for event types, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Transferred,
    Crafted,
    Paused,
    Resumed,
    TaskToggled,
    TaskNotFound,
    UnitSelected,
    SelectionCleared,
    StateLoaded,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Transferred { .. } => EventKind::Transferred,
            Event::Crafted { .. } => EventKind::Crafted,
            Event::Paused { .. } => EventKind::Paused,
            Event::Resumed { .. } => EventKind::Resumed,
            Event::TaskToggled { .. } => EventKind::TaskToggled,
            Event::TaskNotFound { .. } => EventKind::TaskNotFound,
            Event::UnitSelected { .. } => EventKind::UnitSelected,
            Event::SelectionCleared { .. } => EventKind::SelectionCleared,
            Event::StateLoaded { .. } => EventKind::StateLoaded,
        }
    }

    /// Turn at which the event occurred.
    pub fn turn(&self) -> u64 {
        match self {
            Event::Transferred { turn, .. }
            | Event::Crafted { turn, .. }
            | Event::Paused { turn }
            | Event::Resumed { turn }
            | Event::TaskToggled { turn, .. }
            | Event::TaskNotFound { turn, .. }
            | Event::UnitSelected { turn, .. }
            | Event::SelectionCleared { turn }
            | Event::StateLoaded { turn } => *turn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Transferred {
                unit,
                source,
                dest,
                resource,
                quantity,
                ..
            } => {
                if source == unit {
                    write!(f, "{unit}: output {quantity} {resource} -> {dest}")
                } else {
                    write!(f, "{unit}: moved {quantity} {resource} from {source} -> {dest}")
                }
            }
            Event::Crafted { unit, produced, .. } => {
                if produced.is_empty() {
                    write!(f, "{unit}: crafted (nothing)")
                } else {
                    let items: Vec<String> = produced
                        .iter()
                        .map(|(id, qty)| format!("{qty} {id}"))
                        .collect();
                    write!(f, "{unit}: crafted {}", items.join(", "))
                }
            }
            Event::Paused { .. } => write!(f, "Simulation paused."),
            Event::Resumed { .. } => write!(f, "Simulation resumed."),
            Event::TaskToggled {
                task, completed, ..
            } => {
                let verb = if *completed { "completed" } else { "reopened" };
                write!(f, "Task {verb}: {task}")
            }
            Event::TaskNotFound { path, .. } => write!(f, "Task not found: {path}"),
            Event::UnitSelected { unit, .. } => write!(f, "Selected: {unit}"),
            Event::SelectionCleared { .. } => write!(f, "Selection cleared."),
            Event::StateLoaded { .. } => write!(f, "Loaded game state from config."),
        }
    }
}

/// Default number of events retained by the log.
pub const DEFAULT_LOG_CAPACITY: usize = 300;

/// Fixed-capacity ring buffer of events. The oldest entry is evicted when
/// the buffer is full; the log never grows unbounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// The most recent `n` events, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &Event> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// All retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
