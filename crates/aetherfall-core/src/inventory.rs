//! Per-unit inventories of typed resources.
//!
//! Quantities are always positive for present keys: an entry that reaches
//! zero is removed rather than retained. `add` is the single mutation
//! primitive; `remove` is the atomicity guard every engine mutation checks
//! before touching a second inventory.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A mapping of resource id to non-negative quantity. `BTreeMap` keeps
/// iteration in sorted-id order, which makes the engine's "any available
/// resource" fallback reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    entries: BTreeMap<ResourceId, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity on hand, 0 if absent.
    pub fn get(&self, id: &str) -> u32 {
        self.entries.get(id).copied().unwrap_or(0)
    }

    /// Apply a signed delta. A delta of 0 is a no-op; a negative delta
    /// subtracts; the key is removed when the result reaches <= 0. The
    /// quantity clamps at `u32::MAX` rather than wrapping. Both the add and
    /// remove paths go through here.
    pub fn add(&mut self, id: &ResourceId, delta: i64) {
        if delta == 0 {
            return;
        }
        let next = (self.get(id.as_str()) as i64).saturating_add(delta);
        if next <= 0 {
            self.entries.remove(id.as_str());
        } else {
            self.entries.insert(id.clone(), next.min(u32::MAX as i64) as u32);
        }
    }

    /// Subtract `qty` only if the full amount is on hand. On shortfall the
    /// inventory is left unchanged and `false` is returned -- this is the
    /// guard that keeps quantities from ever going negative.
    #[must_use = "a false return means nothing was removed"]
    pub fn remove(&mut self, id: &ResourceId, qty: u32) -> bool {
        if self.get(id.as_str()) < qty {
            return false;
        }
        self.add(id, -(qty as i64));
        true
    }

    /// First resource with a positive quantity, in sorted-id order.
    pub fn first_available(&self) -> Option<&ResourceId> {
        // Present keys always hold > 0 by invariant.
        self.entries.keys().next()
    }

    /// Iterate entries in sorted-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, u32)> {
        self.entries.iter().map(|(id, qty)| (id, *qty))
    }

    /// Total quantity across all resource types.
    pub fn total(&self) -> u64 {
        self.entries.values().map(|&q| q as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<(ResourceId, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (ResourceId, u32)>>(iter: I) -> Self {
        let mut inv = Inventory::new();
        for (id, qty) in iter {
            inv.add(&id, qty as i64);
        }
        inv
    }
}
