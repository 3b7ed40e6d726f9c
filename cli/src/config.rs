use anyhow::{Context, Result};
use favorites_core::storage::FAVORITES_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file backing the settings store
    pub database_path: PathBuf,
    /// Settings key the favorites are stored under
    pub slot: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("favorites.db"),
            slot: FAVORITES_KEY.to_string(),
        }
    }
}

/// Read the config at `path`, writing the default one first if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config)?;
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
