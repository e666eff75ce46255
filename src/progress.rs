//! Campaign progress: unlocked levels and best scores
//!
//! Persisted to LocalStorage. Older saves stored only the bare array of
//! unlocked level ids; those still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Campaign progress record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Progress {
    /// Unlocked level ids, ascending
    pub unlocked: Vec<u32>,
    /// Best score per level id
    pub best_scores: BTreeMap<u32, u64>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ravanaGameProgress";

    /// Fresh campaign: only level 1 unlocked
    pub fn new() -> Self {
        Self {
            unlocked: vec![1],
            best_scores: BTreeMap::new(),
        }
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        self.unlocked.binary_search(&level).is_ok()
    }

    /// Unlock `level`. Returns `true` if it was newly unlocked.
    pub fn unlock(&mut self, level: u32) -> bool {
        match self.unlocked.binary_search(&level) {
            Ok(_) => false,
            Err(pos) => {
                self.unlocked.insert(pos, level);
                true
            }
        }
    }

    /// Record a finished level: keep the best score and unlock `next`.
    ///
    /// Returns `true` if `score` is a new best for the level.
    pub fn complete_level(&mut self, level: u32, score: u64, next: Option<u32>) -> bool {
        if let Some(next) = next {
            if self.unlock(next) {
                log::info!("Level {} unlocked", next);
            }
        }

        let best = self.best_scores.entry(level).or_insert(0);
        if score > *best {
            *best = score;
            true
        } else {
            false
        }
    }

    pub fn best_score(&self, level: u32) -> Option<u64> {
        self.best_scores.get(&level).copied()
    }

    /// Highest unlocked level id
    pub fn furthest(&self) -> u32 {
        self.unlocked.last().copied().unwrap_or(1)
    }

    /// Parse a stored blob, falling back to a fresh campaign
    pub fn from_json(json: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(json).and_then(|value| {
            if value.is_array() {
                let unlocked: Vec<u32> = serde_json::from_value(value)?;
                Ok(Self {
                    unlocked,
                    best_scores: BTreeMap::new(),
                })
            } else {
                serde_json::from_value::<Self>(value)
            }
        });

        match parsed {
            Ok(stored) => stored.normalized(),
            Err(err) => {
                log::warn!("Ignoring malformed progress: {}", err);
                Self::new()
            }
        }
    }

    /// Sorted, deduplicated, level 1 always present
    fn normalized(self) -> Self {
        let mut progress = Self {
            unlocked: vec![1],
            best_scores: self.best_scores,
        };
        for id in self.unlocked {
            progress.unlock(id);
        }
        progress
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let progress = Self::from_json(&json);
                log::info!("Loaded progress: {} levels unlocked", progress.unlocked.len());
                return progress;
            }
        }

        log::info!("No saved progress, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved ({} levels unlocked)", self.unlocked.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
