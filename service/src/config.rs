use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::{DocumentStore, GameStore, MemoryStore};
use crate::{ConfigError, StoreResult};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub store: StoreConfig,
}

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

fn default_timeout_ms() -> u64 {
    DocumentStore::DEFAULT_TIMEOUT.as_millis() as u64
}

/// Which [`GameStore`] backend to use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory,
    Document {
        path: PathBuf,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Document {
            path: PathBuf::from("minesweeper-data"),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn open(&self) -> StoreResult<Box<dyn GameStore>> {
        Ok(match self {
            Self::Memory => Box::new(MemoryStore::new()),
            Self::Document { path, timeout_ms } => Box::new(DocumentStore::open(
                path,
                Duration::from_millis(*timeout_ms),
            )?),
        })
    }
}
