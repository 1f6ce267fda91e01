//! Player settings and preferences
//!
//! Persisted as JSON in the platform config directory, shared by every game.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings file name inside the config directory
const SETTINGS_FILE: &str = "settings.json";
/// Default SQLite file name inside the data directory
const DB_FILE: &str = "scores.db";
/// Log file name inside the data directory
const LOG_FILE: &str = "arcade.log";

/// Project directories for this application
pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "arcade-suite").ok_or(Error::NoDataDir)
}

/// Path of the log file, creating its directory if needed
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    fs::create_dir_all(dirs.data_dir())?;
    Ok(dirs.data_dir().join(LOG_FILE))
}

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name used by games that do not prompt for one
    pub username: String,
    /// Override for the SQLite score database location
    pub database_path: Option<PathBuf>,

    // === Display ===
    /// Render rate of the terminal loop
    pub target_fps: u32,
    /// Show FPS counter
    pub show_fps: bool,

    // === Game options ===
    /// Arkanoid paddle follows the mouse
    pub mouse_paddle: bool,
    /// Number of AI rivals in a race
    pub opponents: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: "PLAYER".to_string(),
            database_path: None,

            // Display
            target_fps: 60,
            show_fps: false,

            // Game options
            mouse_paddle: true,
            opponents: 3,
        }
    }
}

impl Settings {
    /// Rival count clamped to what the tracks have spawn points for
    pub fn effective_opponents(&self) -> usize {
        self.opponents.clamp(1, 5) as usize
    }

    /// Render rate clamped to something a terminal can keep up with
    pub fn effective_fps(&self) -> u32 {
        self.target_fps.clamp(10, 120)
    }

    /// Resolved database file path
    pub fn database_file(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => {
                let dirs = project_dirs()?;
                fs::create_dir_all(dirs.data_dir())?;
                Ok(dirs.data_dir().join(DB_FILE))
            }
        }
    }

    /// Load settings from the config directory
    ///
    /// Never fails: a missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        match project_dirs() {
            Ok(dirs) => Self::load_from(&dirs.config_dir().join(SETTINGS_FILE)),
            Err(e) => {
                log::warn!("{e}, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring corrupt settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<()> {
        let dirs = project_dirs()?;
        self.save_to(&dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Save settings to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = Settings {
            username: "ALX".to_string(),
            opponents: 5,
            mouse_paddle: false,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "username": "ZED" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.username, "ZED");
        assert_eq!(settings.target_fps, 60);
        assert_eq!(settings.opponents, 3);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_clamps() {
        let settings = Settings {
            opponents: 40,
            target_fps: 1,
            ..Default::default()
        };
        assert_eq!(settings.effective_opponents(), 5);
        assert_eq!(settings.effective_fps(), 10);
    }
}
