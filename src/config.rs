// ⚙️ Configuration - where farm data lives
//
// Resolution order: built-in defaults < ~/.config/agroflow/config.toml < env.

use crate::storage::{FileStorage, SqliteStorage, Storage};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "AGROFLOW_DATA_DIR";
pub const ENV_BACKEND: &str = "AGROFLOW_BACKEND";
pub const ENV_ADDR: &str = "AGROFLOW_ADDR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `<data_dir>/agroflow_data.json`
    #[default]
    Json,
    /// `<data_dir>/agroflow.db`
    Sqlite,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(Backend::Json),
            "sqlite" | "db" => Ok(Backend::Sqlite),
            other => bail!("unknown storage backend '{}' (expected json or sqlite)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: Backend::default(),
            server_addr: default_server_addr(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("agroflow"))
        .unwrap_or_else(|| PathBuf::from(".agroflow"))
}

fn default_server_addr() -> String {
    "127.0.0.1:3000".to_string()
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("agroflow/config.toml"))
}

/// Load the user config file (if any) and apply environment overrides.
pub fn load_config() -> Result<AppConfig> {
    let config = match config_path() {
        Some(path) => load_config_file(&path)?,
        None => AppConfig::default(),
    };

    apply_overrides(config, |name| std::env::var(name).ok())
}

/// A missing file is not an error; a malformed one is.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AppConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn apply_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig> {
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty()) {
        config.backend = backend
            .parse()
            .with_context(|| format!("Invalid {}", ENV_BACKEND))?;
    }
    if let Some(addr) = lookup(ENV_ADDR).filter(|v| !v.trim().is_empty()) {
        config.server_addr = addr;
    }
    Ok(config)
}

impl AppConfig {
    pub fn storage_location(&self) -> PathBuf {
        match self.backend {
            Backend::Json => self.data_dir.clone(),
            Backend::Sqlite => self.data_dir.join("agroflow.db"),
        }
    }

    /// Where the terminal UI writes its logs.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("agroflow.log")
    }

    /// Build the configured backend.
    pub fn open_storage(&self) -> Result<Box<dyn Storage>> {
        match self.backend {
            Backend::Json => Ok(Box::new(FileStorage::new(&self.data_dir))),
            Backend::Sqlite => {
                let path = self.storage_location();
                let storage = SqliteStorage::open(&path)
                    .with_context(|| format!("Failed to open database {}", path.display()))?;
                Ok(Box::new(storage))
            }
        }
    }
}
