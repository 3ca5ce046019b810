//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session policy (auto-start, auto-terminate)
//! - Appearance (background/foreground colors, frame rate)
//! - Cue output toggles (vibration, backlight)
//! - An optional custom phase sequence replacing the default exercise
//!
//! Configuration is stored at `~/.config/breather/config.toml`.
//! The sequencer itself never touches this; the hosting layer reads it
//! and passes the relevant pieces in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, CoreError};
use crate::sequencer::{Phase, PhaseKind, Sequence};

/// Session policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Begin the exercise as soon as the session surface opens.
    #[serde(default)]
    pub auto_start: bool,
    /// Close the session when the sequence completes instead of
    /// reseeding it for a manual restart.
    #[serde(default)]
    pub auto_terminate: bool,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_foreground_color")]
    pub foreground_color: String,
    /// Animation frames per second driven by the frame timer.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

/// Cue output configuration, honored by the driver implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub vibration: bool,
    #[serde(default = "default_true")]
    pub backlight: bool,
}

/// One phase of a user-defined sequence, as written in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub kind: PhaseKind,
    pub duration_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breather/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub cues: CuesConfig,
    /// Custom sequence override; the default exercise when absent.
    #[serde(default)]
    pub custom_sequence: Option<Vec<PhaseSpec>>,
}

// Default functions
fn default_background_color() -> String {
    "#000000".into()
}
fn default_foreground_color() -> String {
    "#ffffff".into()
}
fn default_frame_rate() -> u32 {
    20
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_start: false,
            auto_terminate: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            foreground_color: default_foreground_color(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            vibration: true,
            backlight: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            ui: UiConfig::default(),
            cues: CuesConfig::default(),
            custom_sequence: None,
        }
    }
}

/// Returns `~/.config/breather[-dev]/` based on BREATHER_ENV.
///
/// Set BREATHER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BREATHER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("breather-dev")
    } else {
        base_dir.join("breather")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    /// Path of the config file on disk.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub(crate) fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(cfg)
    }

    pub(crate) fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// The sequence a session should be seeded with: the custom
    /// sequence when configured, the default exercise otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the custom sequence is empty or contains a
    /// zero-duration phase.
    pub fn seed_sequence(&self) -> Result<Sequence, CoreError> {
        match &self.custom_sequence {
            Some(specs) => {
                let phases = specs
                    .iter()
                    .map(|s| Phase::new(s.kind, s.duration_ms))
                    .collect();
                Ok(Sequence::new(phases)?)
            }
            None => Ok(Sequence::default_exercise()),
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "session.auto_start" => Some(self.session.auto_start.to_string()),
            "session.auto_terminate" => Some(self.session.auto_terminate.to_string()),
            "ui.background_color" => Some(self.ui.background_color.clone()),
            "ui.foreground_color" => Some(self.ui.foreground_color.clone()),
            "ui.frame_rate" => Some(self.ui.frame_rate.to_string()),
            "cues.vibration" => Some(self.cues.vibration.to_string()),
            "cues.backlight" => Some(self.cues.backlight.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// The custom sequence is not reachable from here; edit the TOML
    /// file directly for that.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        match key {
            "session.auto_start" => self.session.auto_start = parse_bool(key, value)?,
            "session.auto_terminate" => self.session.auto_terminate = parse_bool(key, value)?,
            "ui.background_color" => self.ui.background_color = value.to_string(),
            "ui.foreground_color" => self.ui.foreground_color = value.to_string(),
            "ui.frame_rate" => {
                self.ui.frame_rate = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("cannot parse '{value}' as number"),
                })?
            }
            "cues.vibration" => self.cues.vibration = parse_bool(key, value)?,
            "cues.backlight" => self.cues.backlight = parse_bool(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string()).into()),
        }
        self.save()?;
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}' as bool"),
    })
}
