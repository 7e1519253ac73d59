// Settings file loading

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use taxaudit_recon::MatchPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Persisted reference store (delimited text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    /// Spreadsheet imported when the store is absent or empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<PathBuf>,

    pub policy: MatchPolicy,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taxaudit");
        config_dir.join("settings.toml")
    }

    /// Default location of the persisted reference store
    pub fn default_store_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taxaudit")
            .join("reference.csv")
    }

    /// Load settings from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        let settings = Self::parse(&contents)
            .map_err(|e| format!("Error parsing {}: {}", path.display(), e))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        let settings: Self = toml::from_str(contents).map_err(|e| e.to_string())?;
        settings.policy.validate().map_err(|e| e.to_string())?;
        Ok(settings)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(Self::default_store_path)
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }
}
