//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use brainboost_core::arithmetic::ResultKeeperConfig;
use brainboost_core::model::Language;
use brainboost_core::words::WordList;

/// Word-list overrides for Associative Chaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default)]
    pub word_list_en: Option<PathBuf>,
    #[serde(default)]
    pub word_list_pl: Option<PathBuf>,
}

impl RecallConfig {
    pub fn word_list_path(&self, language: Language) -> Option<&Path> {
        match language {
            Language::En => self.word_list_en.as_deref(),
            Language::Pl => self.word_list_pl.as_deref(),
        }
    }

    /// The configured list for `language`, or the built-in one.
    pub fn word_list(&self, language: Language) -> Result<WordList> {
        match self.word_list_path(language) {
            Some(path) => WordList::load(path),
            None => Ok(WordList::builtin(language)),
        }
    }
}

/// Top-level brainboost configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainBoostConfig {
    /// Path of the JSON data file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Language for new users and for recall plays without an explicit one.
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub result_keeper: ResultKeeperConfig,
    #[serde(default)]
    pub associative_chaining: RecallConfig,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./brainboost-data.json")
}

impl Default for BrainBoostConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            language: Language::default(),
            result_keeper: ResultKeeperConfig::default(),
            associative_chaining: RecallConfig::default(),
        }
    }
}

/// Starter file written by `brainboost init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# brainboost configuration

data_file = "./brainboost-data.json"
language = "en"

[result_keeper]
lives = 3
time_limit_secs = 60
operators = ["+", "-", "*", "/"]
max_repairs = 10000

[associative_chaining]
# word_list_en = "./nouns-en.txt"
# word_list_pl = "${HOME}/nouns-pl.txt"
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `brainboost.toml` in the current directory
/// 2. `~/.config/brainboost/config.toml`
///
/// Environment variable overrides: `BRAINBOOST_DATA`, `BRAINBOOST_LANGUAGE`.
pub fn load_config() -> Result<BrainBoostConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BrainBoostConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("brainboost.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config(&path)?
        }
        None => BrainBoostConfig::default(),
    };

    if let Ok(data) = std::env::var("BRAINBOOST_DATA") {
        config.data_file = PathBuf::from(data);
    }
    if let Ok(language) = std::env::var("BRAINBOOST_LANGUAGE") {
        config.language = language
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("invalid BRAINBOOST_LANGUAGE")?;
    }

    config.data_file = resolve_path(&config.data_file);
    let recall = &mut config.associative_chaining;
    recall.word_list_en = recall.word_list_en.as_deref().map(resolve_path);
    recall.word_list_pl = recall.word_list_pl.as_deref().map(resolve_path);

    Ok(config)
}

fn parse_config(path: &Path) -> Result<BrainBoostConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = toml::from_str::<BrainBoostConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    if config.result_keeper.operators.is_empty() {
        anyhow::bail!(
            "{}: result_keeper.operators must not be empty",
            path.display()
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("brainboost"))
}
