//! The project -> goal -> task completion tree.
//!
//! `Task::completed` is the sole source of truth. Goal and project
//! completion are derived and cannot be written from outside this module:
//! the fields are private and [`recompute_completion`] is the only writer,
//! so the derived flags can never drift from the tasks beneath them.

use serde::{Deserialize, Serialize};

/// Leaf of the tree. The only node with an independently settable
/// completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub required: bool,
    pub completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, required: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required,
            completed: false,
        }
    }
}

/// Middle tier. `completed` is derived from the required tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub required: bool,
    pub tasks: Vec<Task>,
    completed: bool,
}

impl Goal {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        required: bool,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required,
            tasks,
            completed: false,
        }
    }

    /// Derived completion as of the last recompute.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Root tier. `completed` is derived from the required goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub required: bool,
    pub goals: Vec<Goal>,
    completed: bool,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        required: bool,
        goals: Vec<Goal>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            required,
            goals,
            completed: false,
        }
    }

    /// Derived completion as of the last recompute.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Recompute every derived flag in one bottom-up pass.
///
/// A goal is complete iff its set of required tasks is empty or all
/// completed; a project applies the same rule over its required goals using
/// their freshly derived values. Optional nodes never block or unblock
/// anything. Total over the tree and idempotent.
pub fn recompute_completion(projects: &mut [Project]) {
    for project in projects.iter_mut() {
        for goal in project.goals.iter_mut() {
            goal.completed = goal
                .tasks
                .iter()
                .filter(|t| t.required)
                .all(|t| t.completed);
        }
        project.completed = project
            .goals
            .iter()
            .filter(|g| g.required)
            .all(|g| g.completed);
    }
}

/// Resolve a `(project, goal, task)` path to its task. `None` when any
/// segment fails to match -- callers treat that as a soft condition.
pub fn find_task_mut<'a>(
    projects: &'a mut [Project],
    project_id: &str,
    goal_id: &str,
    task_id: &str,
) -> Option<&'a mut Task> {
    projects
        .iter_mut()
        .find(|p| p.id == project_id)?
        .goals
        .iter_mut()
        .find(|g| g.id == goal_id)?
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
}
