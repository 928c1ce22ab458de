//! Aetherfall Core -- the turn-based logistics and production engine.
//!
//! This crate provides the resource catalog, recipe templates, processing
//! units, the per-turn simulation pipeline, and the project/goal/task
//! completion tree that the Aetherfall console builds on.
//!
//! # Turn Pipeline
//!
//! Each call to [`state::GameState::advance_turn`] advances the simulation by
//! one turn:
//!
//! 1. **Pause gate** -- while paused the call is a complete no-op; turns are
//!    never queued or caught up.
//! 2. **Counter** -- `sim_turn` increments exactly once.
//! 3. **Unit pass** -- units are processed in sorted-id order (a correctness
//!    requirement: two units racing for the same source inventory must
//!    resolve identically on every run).
//! 4. **Duration gating** -- each running unit with a recipe advances its
//!    private turn timer; only on reaching the recipe duration does it act.
//! 5. **Action** -- a Transfer recipe moves exactly one resource along the
//!    unit's links; a Craft recipe batch-consumes and produces against the
//!    unit's own inventory. Missing links, empty sources, and unsatisfied
//!    inputs are expected resting states and skip silently.
//!
//! # Key Types
//!
//! - [`state::GameState`] -- aggregate root: unit registry, project tree,
//!   selection, pause flag, turn counter, and the bounded event log.
//! - [`catalog::ResourceCatalog`] -- immutable resource metadata, frozen at
//!   load time.
//! - [`recipe::Recipe`] -- shared immutable behavior template (Craft or
//!   Transfer), reference-counted across units.
//! - [`unit::ProcessingUnit`] -- a node in the logistics graph; links are
//!   plain ids into the registry, never owning pointers, so cyclic routes
//!   are valid topologies.
//! - [`project::Project`] -- three-level progress tree whose upper-level
//!   completion is always derived, never stored independently.
//! - [`event::EventLog`] -- fixed-capacity ring buffer of typed events.
//! - [`engine::TurnClock`] -- wall-clock accumulator decoupling the turn
//!   rate from the caller's frame rate.

pub mod catalog;
pub mod engine;
pub mod event;
pub mod id;
pub mod inventory;
pub mod project;
pub mod recipe;
pub mod state;
pub mod unit;
