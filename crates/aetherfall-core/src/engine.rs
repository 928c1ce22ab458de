//! The turn engine: one call processes exactly one turn over every unit.
//!
//! There is no failure path inside the turn loop. A missing link, an empty
//! source inventory, or an unsatisfied craft is the expected resting state
//! of an unsaturated logistics network, handled by silent skip -- never by
//! an error, and never by a half-applied mutation. Every transfer removes
//! from the source before adding to the destination, and every craft checks
//! all inputs before consuming any.

use crate::event::Event;
use crate::id::{ResourceId, UnitId};
use crate::inventory::Inventory;
use crate::recipe::{Recipe, RecipeMode};
use crate::state::GameState;
use crate::unit::UnitStatus;
use std::time::Duration;

impl GameState {
    /// Process exactly one simulation turn.
    ///
    /// While paused this is a complete no-op: no counter advance, no unit
    /// processing, no log entry. Otherwise the turn counter increments once
    /// and every unit is visited in sorted-id order -- a correctness
    /// requirement, not an optimization: two units racing for the same
    /// source inventory must resolve identically on every run.
    pub fn advance_turn(&mut self) {
        if self.is_paused() {
            return;
        }
        self.sim_turn += 1;

        // Snapshot the id order before any inventory moves.
        let ids: Vec<UnitId> = self.units.keys().cloned().collect();
        for id in ids {
            let Some(unit) = self.units.get_mut(id.as_str()) else {
                continue;
            };
            if unit.status != UnitStatus::Running {
                continue;
            }
            let Some(recipe) = unit.recipe().cloned() else {
                continue;
            };

            // Duration gating: partial progress persists across turns; the
            // timer resets only on reaching the threshold.
            if !unit.tick_progress(recipe.effective_duration()) {
                continue;
            }

            match recipe.mode {
                RecipeMode::Transfer => self.process_transfer(&id, &recipe),
                RecipeMode::Craft => self.process_craft(&id, &recipe),
            }
        }
    }

    /// Move exactly one resource along the unit's links.
    ///
    /// A unit with an output link and no input link emits from its own
    /// inventory; otherwise the source is `input_id`. Any unresolvable
    /// endpoint or empty source abandons the action silently.
    fn process_transfer(&mut self, unit_id: &UnitId, recipe: &Recipe) {
        let Some(unit) = self.units.get(unit_id.as_str()) else {
            return;
        };
        let Some(dest_id) = unit.output_id.clone() else {
            return;
        };
        let unit_name = unit.name.clone();
        let source_id = if unit.acts_as_source() {
            unit_id.clone()
        } else {
            match unit.input_id.clone() {
                Some(id) => id,
                None => return,
            }
        };

        let Some(dest) = self.units.get(dest_id.as_str()) else {
            return;
        };
        let dest_name = dest.name.clone();
        let Some(source) = self.units.get(source_id.as_str()) else {
            return;
        };
        let source_name = source.name.clone();

        let Some(item) =
            choose_transfer_item(&source.inventory, recipe.transfer_resource.as_ref())
        else {
            return;
        };

        // Remove must succeed before the destination is touched.
        {
            let Some(source) = self.units.get_mut(source_id.as_str()) else {
                return;
            };
            if !source.inventory.remove(&item, 1) {
                return;
            }
        }
        if let Some(dest) = self.units.get_mut(dest_id.as_str()) {
            dest.inventory.add(&item, 1);
        }

        let turn = self.sim_turn;
        self.push_event(Event::Transferred {
            unit: unit_name,
            source: source_name,
            dest: dest_name,
            resource: item,
            quantity: 1,
            turn,
        });
    }

    /// Batch-consume inputs and produce outputs against the unit's own
    /// inventory. All-or-nothing: a shortfall on any input abandons the
    /// craft before anything is consumed, without a log entry. Outputs stay
    /// local; they are never auto-forwarded along `output_id`.
    fn process_craft(&mut self, unit_id: &UnitId, recipe: &Recipe) {
        let turn = self.sim_turn;
        let Some(unit) = self.units.get_mut(unit_id.as_str()) else {
            return;
        };

        for (resource, qty) in &recipe.inputs {
            if unit.inventory.get(resource.as_str()) < *qty {
                return;
            }
        }

        for (resource, qty) in &recipe.inputs {
            unit.inventory.add(resource, -(*qty as i64));
        }
        for (resource, qty) in &recipe.outputs {
            unit.inventory.add(resource, *qty as i64);
        }

        let unit_name = unit.name.clone();
        let produced: Vec<(ResourceId, u32)> = recipe
            .outputs
            .iter()
            .map(|(resource, qty)| (resource.clone(), *qty))
            .collect();
        self.push_event(Event::Crafted {
            unit: unit_name,
            produced,
            turn,
        });
    }
}

/// Prefer the recipe's locked resource when the source holds any of it;
/// otherwise the first positive entry in sorted inventory order.
fn choose_transfer_item(
    inventory: &Inventory,
    preferred: Option<&ResourceId>,
) -> Option<ResourceId> {
    if let Some(resource) = preferred
        && inventory.get(resource.as_str()) > 0
    {
        return Some(resource.clone());
    }
    inventory.first_available().cloned()
}

// ---------------------------------------------------------------------------
// Turn clock
// ---------------------------------------------------------------------------

/// Wall-clock accumulator decoupling the fixed turn rate from the caller's
/// frame rate. The driver feeds in elapsed time and runs `advance_turn`
/// once per turn due -- zero, one, or many per external tick. Turns
/// themselves always run strictly sequentially and to completion.
#[derive(Debug, Clone)]
pub struct TurnClock {
    period: Duration,
    accumulator: Duration,
}

impl TurnClock {
    /// Default turn rate of the console driver.
    pub const DEFAULT_TURNS_PER_SEC: f64 = 2.0;

    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_nanos(1)),
            accumulator: Duration::ZERO,
        }
    }

    /// A rate that is zero, negative, or non-finite yields a clock that
    /// never fires.
    pub fn from_rate(turns_per_sec: f64) -> Self {
        let period = Duration::try_from_secs_f64(1.0 / turns_per_sec).unwrap_or(Duration::MAX);
        Self::new(period)
    }

    /// Accumulate elapsed time and return how many whole turns are due.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.accumulator += dt;
        let mut due = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            due += 1;
        }
        due
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::from_rate(Self::DEFAULT_TURNS_PER_SEC)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RecipeId;
    use crate::unit::{ProcessingUnit, UnitKind};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn wood() -> ResourceId {
        ResourceId::from("wood")
    }

    fn transfer_recipe(duration: u32, locked: Option<&str>) -> Arc<Recipe> {
        Arc::new(Recipe {
            id: RecipeId::from("haul"),
            name: "Haul".to_string(),
            mode: RecipeMode::Transfer,
            duration_turns: duration,
            power_required: 0,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            transfer_resource: locked.map(ResourceId::from),
        })
    }

    fn craft_recipe(
        duration: u32,
        inputs: &[(&str, u32)],
        outputs: &[(&str, u32)],
    ) -> Arc<Recipe> {
        Arc::new(Recipe {
            id: RecipeId::from("craft"),
            name: "Craft".to_string(),
            mode: RecipeMode::Craft,
            duration_turns: duration,
            power_required: 0,
            inputs: inputs
                .iter()
                .map(|(id, qty)| (ResourceId::from(*id), *qty))
                .collect(),
            outputs: outputs
                .iter()
                .map(|(id, qty)| (ResourceId::from(*id), *qty))
                .collect(),
            transfer_resource: None,
        })
    }

    /// Pile (wood:20) -> depot, duration 1, locked to wood.
    fn pile_and_depot() -> GameState {
        let mut state = GameState::new();
        let mut pile =
            ProcessingUnit::new(UnitId::from("a_pile"), "Forest Pile", UnitKind::ResourcePile);
        pile.inventory.add(&wood(), 20);
        pile.output_id = Some(UnitId::from("b_depot"));
        pile.set_recipe(Some(transfer_recipe(1, Some("wood"))));
        state.add_unit(pile);
        state.add_unit(ProcessingUnit::new(
            UnitId::from("b_depot"),
            "Depot",
            UnitKind::Stockpile,
        ));
        state
    }

    #[test]
    fn simple_transfer_moves_one_unit() {
        let mut state = pile_and_depot();
        state.advance_turn();

        assert_eq!(state.unit("a_pile").unwrap().inventory.get("wood"), 19);
        assert_eq!(state.unit("b_depot").unwrap().inventory.get("wood"), 1);
        assert_eq!(state.sim_turn(), 1);
        assert_eq!(state.events().len(), 1);
        let line = state.events().iter().next().unwrap().to_string();
        assert_eq!(line, "Forest Pile: output 1 wood -> Depot");
    }

    #[test]
    fn transfer_conserves_total() {
        let mut state = pile_and_depot();
        for _ in 0..7 {
            state.advance_turn();
        }
        let summary = state.inventory_summary();
        assert_eq!(summary.get("wood").copied(), Some(20));
    }

    #[test]
    fn paused_turn_is_a_complete_noop() {
        let mut state = pile_and_depot();
        state.pause();
        let log_len = state.events().len();
        let hash = state.state_hash();

        state.advance_turn();
        state.advance_turn();

        assert_eq!(state.sim_turn(), 0);
        assert_eq!(state.state_hash(), hash);
        assert_eq!(state.events().len(), log_len);
    }

    #[test]
    fn drone_moves_between_links() {
        let mut state = GameState::new();
        let mut source =
            ProcessingUnit::new(UnitId::from("a_src"), "Quarry", UnitKind::Stockpile);
        source.inventory.add(&ResourceId::from("stone"), 3);
        state.add_unit(source);
        state.add_unit(ProcessingUnit::new(
            UnitId::from("c_dst"),
            "Depot",
            UnitKind::Stockpile,
        ));
        let mut drone = ProcessingUnit::new(UnitId::from("b_drone"), "Drone 1", UnitKind::Drone);
        drone.input_id = Some(UnitId::from("a_src"));
        drone.output_id = Some(UnitId::from("c_dst"));
        drone.set_recipe(Some(transfer_recipe(1, None)));
        state.add_unit(drone);

        state.advance_turn();
        assert_eq!(state.unit("a_src").unwrap().inventory.get("stone"), 2);
        assert_eq!(state.unit("c_dst").unwrap().inventory.get("stone"), 1);
        let line = state.events().iter().next().unwrap().to_string();
        assert_eq!(line, "Drone 1: moved 1 stone from Quarry -> Depot");
    }

    #[test]
    fn transfer_prefers_locked_resource_then_falls_back() {
        let mut state = GameState::new();
        let mut pile = ProcessingUnit::new(UnitId::from("a"), "Pile", UnitKind::ResourcePile);
        pile.inventory.add(&ResourceId::from("stone"), 1);
        pile.inventory.add(&wood(), 1);
        pile.output_id = Some(UnitId::from("b"));
        pile.set_recipe(Some(transfer_recipe(1, Some("wood"))));
        state.add_unit(pile);
        state.add_unit(ProcessingUnit::new(
            UnitId::from("b"),
            "Depot",
            UnitKind::Stockpile,
        ));

        // Locked resource first.
        state.advance_turn();
        assert_eq!(state.unit("b").unwrap().inventory.get("wood"), 1);
        // Lock exhausted: falls back to the remaining resource.
        state.advance_turn();
        assert_eq!(state.unit("b").unwrap().inventory.get("stone"), 1);
        // Source empty: silent skip, no new log entry.
        let log_len = state.events().len();
        state.advance_turn();
        assert_eq!(state.events().len(), log_len);
    }

    #[test]
    fn missing_link_abandons_silently() {
        let mut state = GameState::new();
        let mut drone = ProcessingUnit::new(UnitId::from("d"), "Drone", UnitKind::Drone);
        drone.input_id = Some(UnitId::from("ghost"));
        drone.output_id = Some(UnitId::from("also_ghost"));
        drone.set_recipe(Some(transfer_recipe(1, None)));
        state.add_unit(drone);

        state.advance_turn();
        assert_eq!(state.sim_turn(), 1);
        assert!(state.events().is_empty());
    }

    #[test]
    fn duration_gates_the_action() {
        let mut state = pile_and_depot();
        state
            .unit_mut("a_pile")
            .unwrap()
            .set_recipe(Some(transfer_recipe(2, Some("wood"))));

        state.advance_turn();
        assert_eq!(state.unit("b_depot").unwrap().inventory.get("wood"), 0);
        assert_eq!(state.unit("a_pile").unwrap().turn_progress(), 1);

        state.advance_turn();
        assert_eq!(state.unit("b_depot").unwrap().inventory.get("wood"), 1);
        assert_eq!(state.unit("a_pile").unwrap().turn_progress(), 0);
    }

    #[test]
    fn craft_consumes_and_produces_locally() {
        let mut state = GameState::new();
        let mut mill = ProcessingUnit::new(UnitId::from("mill"), "Sawmill", UnitKind::Factory);
        mill.inventory.add(&wood(), 5);
        mill.output_id = Some(UnitId::from("depot"));
        mill.set_recipe(Some(craft_recipe(1, &[("wood", 2)], &[("plank", 1)])));
        state.add_unit(mill);
        state.add_unit(ProcessingUnit::new(
            UnitId::from("depot"),
            "Depot",
            UnitKind::Stockpile,
        ));

        state.advance_turn();
        let mill = state.unit("mill").unwrap();
        assert_eq!(mill.inventory.get("wood"), 3);
        // Output stays local -- never auto-forwarded along output_id.
        assert_eq!(mill.inventory.get("plank"), 1);
        assert_eq!(state.unit("depot").unwrap().inventory.get("plank"), 0);
        let line = state.events().iter().next().unwrap().to_string();
        assert_eq!(line, "Sawmill: crafted 1 plank");
    }

    #[test]
    fn craft_shortfall_changes_nothing_and_stays_quiet() {
        let mut state = GameState::new();
        let mut smelter = ProcessingUnit::new(UnitId::from("smelter"), "Smelter", UnitKind::Factory);
        smelter.inventory.add(&ResourceId::from("iron_ore"), 1);
        smelter.set_recipe(Some(craft_recipe(
            1,
            &[("iron_ore", 2), ("carbon", 1)],
            &[("iron_plate", 1)],
        )));
        state.add_unit(smelter);

        state.advance_turn();
        let smelter = state.unit("smelter").unwrap();
        assert_eq!(smelter.inventory.get("iron_ore"), 1);
        assert_eq!(smelter.inventory.get("iron_plate"), 0);
        assert!(state.events().is_empty());
    }

    #[test]
    fn non_running_units_are_skipped() {
        let mut state = pile_and_depot();
        state.unit_mut("a_pile").unwrap().status = UnitStatus::Stalled;

        state.advance_turn();
        assert_eq!(state.sim_turn(), 1);
        assert_eq!(state.unit("a_pile").unwrap().inventory.get("wood"), 20);
        assert_eq!(state.unit("a_pile").unwrap().turn_progress(), 0);
    }

    #[test]
    fn contention_resolves_in_id_order() {
        // Two drones pulling from a source holding a single stone: the
        // lower id wins, every run.
        let mut state = GameState::new();
        let mut source = ProcessingUnit::new(UnitId::from("m_src"), "Source", UnitKind::Stockpile);
        source.inventory.add(&ResourceId::from("stone"), 1);
        state.add_unit(source);
        state.add_unit(ProcessingUnit::new(
            UnitId::from("z_dst_a"),
            "Depot A",
            UnitKind::Stockpile,
        ));
        state.add_unit(ProcessingUnit::new(
            UnitId::from("z_dst_b"),
            "Depot B",
            UnitKind::Stockpile,
        ));
        for (id, dst) in [("a_drone", "z_dst_a"), ("b_drone", "z_dst_b")] {
            let mut drone = ProcessingUnit::new(UnitId::from(id), id, UnitKind::Drone);
            drone.input_id = Some(UnitId::from("m_src"));
            drone.output_id = Some(UnitId::from(dst));
            drone.set_recipe(Some(transfer_recipe(1, None)));
            state.add_unit(drone);
        }

        state.advance_turn();
        assert_eq!(state.unit("z_dst_a").unwrap().inventory.get("stone"), 1);
        assert_eq!(state.unit("z_dst_b").unwrap().inventory.get("stone"), 0);
    }

    #[test]
    fn cyclic_route_is_a_valid_topology() {
        // A -> B -> A: ids are only looked up, nothing is owned, so the
        // cycle just sloshes the resource back and forth.
        let mut state = GameState::new();
        for (id, other) in [("a", "b"), ("b", "a")] {
            let mut unit = ProcessingUnit::new(UnitId::from(id), id, UnitKind::Stockpile);
            unit.output_id = Some(UnitId::from(other));
            unit.set_recipe(Some(transfer_recipe(1, None)));
            state.add_unit(unit);
        }
        state.unit_mut("a").unwrap().inventory.add(&wood(), 1);

        for _ in 0..5 {
            state.advance_turn();
        }
        assert_eq!(state.inventory_summary().get("wood").copied(), Some(1));
    }

    #[test]
    fn turn_clock_accumulates_partial_frames() {
        let mut clock = TurnClock::from_rate(2.0);
        assert_eq!(clock.advance(Duration::from_millis(300)), 0);
        assert_eq!(clock.advance(Duration::from_millis(300)), 1);
        // A long stall yields multiple due turns at once.
        assert_eq!(clock.advance(Duration::from_millis(1600)), 3);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn turn_clock_tolerates_degenerate_rates() {
        for rate in [0.0, -2.0, f64::NAN] {
            let mut clock = TurnClock::from_rate(rate);
            assert_eq!(clock.advance(Duration::from_secs(3600)), 0, "rate {rate}");
        }
    }
}
