// Configuration loaded from YAML

use crate::persistence::{FileAdapter, MemoryAdapter, PersistenceAdapter};
use crate::sqlite::SqliteAdapter;
use crate::store::DEFAULT_KEY;
use clap::ValueEnum;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const APP_DIR: &str = "tasklist";
pub const CONFIG_FILE: &str = "config.yaml";

/// Which storage backend holds the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or the per-user config file if it exists
    ///
    /// A missing per-user file means defaults; a missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        info!(file = ?path, backend = ?config.backend, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        if config.key.is_empty() {
            return Err(eyre!("Config key cannot be empty"));
        }
        Ok(config)
    }

    /// Open the configured backend
    pub fn open_adapter(&self) -> Result<Box<dyn PersistenceAdapter>> {
        let adapter: Box<dyn PersistenceAdapter> = match self.backend {
            Backend::Memory => Box::new(MemoryAdapter::new()),
            Backend::File => Box::new(FileAdapter::open(&self.data_dir)?),
            Backend::Sqlite => Box::new(SqliteAdapter::open(&self.data_dir)?),
        };
        Ok(adapter)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
