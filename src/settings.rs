//! Player preferences
//!
//! Persisted in LocalStorage. Difficulty is the only setting the simulation
//! reads; it resolves to a [`Tuning`] record at session start.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_POWERUPS, POWERUP_DROP_CHANCE};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Loot parameters for this difficulty
    pub fn tuning(&self) -> Tuning {
        match self {
            Difficulty::Easy => Tuning {
                powerup_drop_chance: 0.3,
                max_powerups: MAX_POWERUPS + 4,
            },
            Difficulty::Medium => Tuning::default(),
            Difficulty::Hard => Tuning {
                powerup_drop_chance: 0.12,
                max_powerups: MAX_POWERUPS.saturating_sub(4),
            },
        }
    }
}

/// Difficulty-dependent simulation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Chance in `[0, 1]` that a kill drops a power-up
    pub powerup_drop_chance: f64,
    /// Power-up population cap
    pub max_powerups: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            powerup_drop_chance: POWERUP_DROP_CHANCE,
            max_powerups: MAX_POWERUPS,
        }
    }
}

/// Which language(s) the UI shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Sinhala,
    English,
    #[default]
    Both,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Sound effects volume (0.0 - 1.0)
    pub sound_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub difficulty: Difficulty,
    pub language: Language,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_volume: 0.7,
            music_volume: 0.5,
            difficulty: Difficulty::Medium,
            language: Language::Both,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ravanaGameSettings";

    /// Clamp volumes into range after loading untrusted data
    pub fn sanitized(mut self) -> Self {
        self.sound_volume = clamp_volume(self.sound_volume);
        self.music_volume = clamp_volume(self.music_volume);
        self
    }

    pub fn tuning(&self) -> Tuning {
        self.difficulty.tuning()
    }

    /// Parse a stored blob, falling back to defaults on malformed data
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("Ignoring malformed settings: {}", err);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
