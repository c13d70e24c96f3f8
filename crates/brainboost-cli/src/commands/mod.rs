//! Subcommand implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};

use brainboost_core::model::Language;
use brainboost_core::session::SessionManager;
use brainboost_store::{load_config_from, BrainBoostConfig, JsonFileStore};

pub mod init;
pub mod play;
pub mod register;
pub mod stats;
pub mod words;

/// Paths given on the command line.
pub struct Paths {
    pub config: Option<PathBuf>,
    pub data: Option<PathBuf>,
}

impl Paths {
    /// Load the config, applying the `--data` override.
    pub fn load_config(&self) -> Result<BrainBoostConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(data) = &self.data {
            config.data_file = data.clone();
        }
        Ok(config)
    }

    /// Load the config and open a session manager over the data file.
    pub fn open(&self) -> Result<(BrainBoostConfig, SessionManager<JsonFileStore>)> {
        let config = self.load_config()?;
        tracing::debug!("using data file {}", config.data_file.display());
        let store = JsonFileStore::open(&config.data_file)?;
        Ok((config, SessionManager::new(store)))
    }
}

pub fn parse_language(value: Option<&str>, fallback: Language) -> Result<Language> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("invalid --language"),
        None => Ok(fallback),
    }
}
