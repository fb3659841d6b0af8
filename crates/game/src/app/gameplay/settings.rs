use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-left spawn for a fresh save, in world pixels.
pub(crate) const DEFAULT_CHECKPOINT: [f32; 2] = [48.0, 80.0];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item '{item}' is both carried and delivered")]
pub(crate) struct SettingsInvariantError {
    pub(crate) item: String,
}

/// Persisted player progress. An item id lives in at most one of
/// `inventory` and `items_delivered`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlayerSettings {
    pub(crate) checkpoint_pos: [f32; 2],
    #[serde(default)]
    inventory: BTreeSet<String>,
    #[serde(default)]
    items_delivered: BTreeSet<String>,
    #[serde(default)]
    pub(crate) seashells: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            checkpoint_pos: DEFAULT_CHECKPOINT,
            inventory: BTreeSet::new(),
            items_delivered: BTreeSet::new(),
            seashells: 0,
        }
    }
}

impl PlayerSettings {
    #[cfg(test)]
    pub(crate) fn inventory(&self) -> &BTreeSet<String> {
        &self.inventory
    }

    pub(crate) fn carries(&self, item: &str) -> bool {
        self.inventory.contains(item)
    }

    pub(crate) fn delivered(&self, item: &str) -> bool {
        self.items_delivered.contains(item)
    }

    pub(crate) fn owns(&self, item: &str) -> bool {
        self.carries(item) || self.delivered(item)
    }

    /// Adds `item` to the inventory unless it is already carried or
    /// delivered. Returns whether anything changed.
    pub(crate) fn grant(&mut self, item: &str) -> bool {
        if self.owns(item) {
            return false;
        }
        self.inventory.insert(item.to_string());
        self.debug_check();
        true
    }

    /// Moves every item from the inventory to `items_delivered` and awards
    /// one seashell, but only when all of them are carried.
    pub(crate) fn complete_delivery<S: AsRef<str>>(&mut self, items: &[S]) -> bool {
        if items.is_empty() || !items.iter().all(|item| self.carries(item.as_ref())) {
            return false;
        }
        for item in items {
            let item = item.as_ref();
            self.inventory.remove(item);
            self.items_delivered.insert(item.to_string());
        }
        self.seashells += 1;
        self.debug_check();
        true
    }

    pub(crate) fn set_checkpoint(&mut self, x: f32, y: f32) {
        self.checkpoint_pos = [x, y];
    }

    pub(crate) fn check_invariant(&self) -> Result<(), SettingsInvariantError> {
        match self.inventory.intersection(&self.items_delivered).next() {
            Some(item) => Err(SettingsInvariantError { item: item.clone() }),
            None => Ok(()),
        }
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariant().is_ok(),
            "inventory and items_delivered overlap: {self:?}"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameFlags {
    pub(crate) run_intro: bool,
    pub(crate) game_complete: bool,
}

impl Default for GameFlags {
    fn default() -> Self {
        Self {
            run_intro: true,
            game_complete: false,
        }
    }
}

impl GameFlags {
    pub(crate) fn completed() -> Self {
        Self {
            run_intro: false,
            game_complete: true,
        }
    }
}
