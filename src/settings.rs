//! Game settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage. Restarting a
//! session never touches these.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::persistence;
use crate::sim::{Difficulty, WorldConfig};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty for the next session
    pub difficulty: Difficulty,
    /// Player name for highscores
    pub player_name: String,

    // === Display ===
    /// Darker water palette
    pub dark_mode: bool,
    /// Enemies roam the screen instead of drifting across it
    pub wandering_enemies: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            player_name: "Sharky".to_string(),

            dark_mode: false,
            wandering_enemies: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "sharky_settings";

    /// Session configuration for a canvas of the given size
    pub fn world_config(&self, canvas_width: f32, canvas_height: f32, seed: u64) -> WorldConfig {
        WorldConfig {
            canvas_width,
            canvas_height,
            difficulty: self.difficulty,
            seed,
            wandering_enemies: self.wandering_enemies,
        }
    }

    /// Effective effects gain (master x sfx)
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Parse stored JSON; out-of-range volumes are clamped
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    fn sanitize(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        if self.player_name.trim().is_empty() {
            self.player_name = Self::default().player_name;
        }
    }

    /// Load settings from storage, falling back to defaults
    pub fn load() -> Self {
        let mut settings: Settings = persistence::load_or_default(Self::STORAGE_KEY, "settings");
        settings.sanitize();
        settings
    }

    pub fn save(&self) -> Result<(), StorageError> {
        persistence::save_json(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
