use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folioscope";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Horizontal margin around the content column, in cells.
    #[serde(default = "default_margin")]
    pub margin: u16,

    /// Height of inline image placeholders, in lines.
    #[serde(default = "default_placeholder_height")]
    pub placeholder_height: u16,

    /// Scroll step for mouse wheel scrolling of the content area.
    #[serde(default = "default_scroll_step")]
    pub scroll_step: usize,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_margin() -> u16 {
    2
}

fn default_placeholder_height() -> u16 {
    7
}

fn default_scroll_step() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            margin: default_margin(),
            placeholder_height: default_placeholder_height(),
            scroll_step: default_scroll_step(),
        }
    }
}

impl Settings {
    /// Load from the user config dir. A missing file is normal (defaults),
    /// a corrupt one is logged and replaced by defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("failed to parse {}: {err}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::settings_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let settings = Settings {
            version: CURRENT_VERSION,
            margin: 4,
            placeholder_height: 9,
            scroll_step: 3,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_and_corrupt_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert_eq!(Settings::load_from(&missing), Settings::default());

        let corrupt = dir.path().join("bad.yaml");
        fs::write(&corrupt, "margin: [not a number").unwrap();
        assert_eq!(Settings::load_from(&corrupt), Settings::default());
    }

    #[test]
    fn partial_files_get_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.yaml");
        fs::write(&path, "margin: 8\n").unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.margin, 8);
        assert_eq!(settings.placeholder_height, default_placeholder_height());
    }
}
