//! Match rules
//!
//! Loaded from a JSON file next to the level; every field falls back to its
//! default when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Tunable match rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Players ===
    /// Respawns each player starts with
    pub respawns: u32,
    /// Invulnerability after a respawn, seconds
    pub respawn_safe_time: f32,
    /// Walking speed, pixels per second
    pub player_speed: f32,
    /// Collision box (width, height) in pixels
    pub player_size: (f32, f32),
    /// Spawn tile per player; missing entries use the opposite corners
    pub spawn_tiles: Option<Vec<(i32, i32)>>,

    // === Bombs ===
    /// Fuse length, seconds
    pub detonation_time: f32,
    /// How long rays stay live, seconds
    pub ray_on_screen_time: f32,
    /// Slide speed of a kicked bomb, pixels per second
    pub bomb_kick_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            respawns: 3,
            respawn_safe_time: 2.0,
            player_speed: 150.0,
            player_size: (40.0, 40.0),
            spawn_tiles: None,

            detonation_time: 3.108,
            ray_on_screen_time: 0.9,
            bomb_kick_speed: 200.0,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}): {}",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.respawns == 0 {
            return Err(SettingsError::Invalid("respawns must be at least 1".into()));
        }

        let positive = [
            ("respawn_safe_time", self.respawn_safe_time),
            ("player_speed", self.player_speed),
            ("player_size.0", self.player_size.0),
            ("player_size.1", self.player_size.1),
            ("detonation_time", self.detonation_time),
            ("ray_on_screen_time", self.ray_on_screen_time),
            ("bomb_kick_speed", self.bomb_kick_speed),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        Ok(())
    }
}
