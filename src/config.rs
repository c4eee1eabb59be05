use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::Currency;

pub(crate) const ENV_PREFIX: &str = "VOICEBUDGET";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub(crate) level: String,
    /// Defaults to `<data_dir>/logs`.
    pub(crate) directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Currency stamped on new entries and the default "from" side of conversions.
    pub(crate) currency: Currency,
    /// Default "to" side of conversions.
    pub(crate) base_currency: Currency,
    /// Defaults to `<data_dir>/voicebudget.db`.
    pub(crate) database: Option<PathBuf>,
    pub(crate) log: LogSettings,
    /// Extra categorizer keywords, keyed by category name.
    pub(crate) keywords: HashMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: Currency::Eur,
            base_currency: Currency::Brl,
            database: None,
            log: LogSettings::default(),
            keywords: HashMap::new(),
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file at `path` if it exists, then
    /// `VOICEBUDGET__*` environment variables.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading the environment from `env` instead of
    /// the process when given.
    pub(crate) fn load_with_env(path: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").source(env))
            .build()
            .with_context(|| format!("Failed to read config: {}", path.display()))?
            .try_deserialize::<Self>()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(settings)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
