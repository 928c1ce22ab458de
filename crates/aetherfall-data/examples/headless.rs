//! Headless runner: loads the sample scenario, drives the turn clock for a
//! fixed span, prints a snapshot, and verifies determinism.
//!
//! Run with: `cargo run --package aetherfall-data --example headless`

use std::path::Path;
use std::time::Duration;

use aetherfall_core::engine::TurnClock;
use aetherfall_core::state::GameState;
use aetherfall_data::load_game;

/// Simulated wall-clock span, fed to the clock in fixed frame slices.
const SPAN_SECS: u64 = 30;
const FRAME_MS: u64 = 16;

fn run_once(data_dir: &Path) -> GameState {
    let loaded = load_game(data_dir).unwrap_or_else(|e| {
        panic!("failed to load scenario from {}: {e}", data_dir.display());
    });

    let mut state = loaded.state;
    let mut clock = TurnClock::from_rate(TurnClock::DEFAULT_TURNS_PER_SEC);
    let frame = Duration::from_millis(FRAME_MS);
    let mut elapsed = Duration::ZERO;
    while elapsed < Duration::from_secs(SPAN_SECS) {
        for _ in 0..clock.advance(frame) {
            state.advance_turn();
        }
        elapsed += frame;
    }
    state
}

fn main() {
    let data_dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));

    // Run 1
    let state = run_once(data_dir);

    println!("=== Aetherfall headless run ===");
    println!("Simulated {SPAN_SECS}s, {} turns", state.sim_turn());
    println!("Units: {}", state.unit_count());
    if let Some(selected) = state.selected_unit() {
        println!("Selected: {}", selected.name);
    }

    println!("\nInventory totals:");
    for (id, qty) in state.inventory_summary() {
        println!("  {:>10} x{qty}", id.as_str());
    }

    println!("\nRecent log:");
    for event in state.events().tail(10) {
        println!("  [t{:>3}] {event}", event.turn());
    }

    // Run 2 — determinism check
    let hash1 = state.state_hash();
    let hash2 = run_once(data_dir).state_hash();
    if hash1 == hash2 {
        println!("\nDeterminism: PASS (state hash = {hash1:#018x})");
    } else {
        println!("\nDeterminism: FAIL! {hash1:#018x} != {hash2:#018x}");
        std::process::exit(1);
    }
}
