//! User settings persistence.
//!
//! Holds the crop handle preference the overlay polls, stored as JSON in
//! the user's config directory.

use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User-configurable settings persisted between sessions.
///
/// Settings are stored as JSON in the user's config directory
/// (e.g., `~/.config/scanview/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Show the crop handle and allow resizing the scan region.
    #[serde(default = "default_show_crop_handle")]
    pub show_crop_handle: bool,
}

fn default_show_crop_handle() -> bool {
    true
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "scanview", "scanview").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Loads settings from a specific file, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persists settings to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_crop_handle: default_show_crop_handle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scanview-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn round_trips_through_disk() {
        let path = temp_file("roundtrip");
        let settings = Settings {
            show_crop_handle: false,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_or_corrupt_file_falls_back_to_defaults() {
        let path = temp_file("corrupt");
        assert_eq!(Settings::load_from(&path), Settings::default());

        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).show_crop_handle);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_field_defaults_to_visible() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.show_crop_handle);
    }
}
