//! Run configuration.
//!
//! The YAML file shares its top-level keys with the wider RetroMix
//! configuration, so unknown keys are ignored. Only `aizynthfinder_config` and
//! `template_library` are always required; `stock` and `coprinet_command` are
//! checked against the scoring type chosen on the command line.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::constants::{
    postera, DEFAULT_AIZYNTHCLI, DEFAULT_POPULAR_FRACTION, POSTERA_API_KEY_VAR,
};
use crate::models::ScoringType;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Stock table with `inchi_key` and `price` columns
    #[serde(default)]
    pub stock: Option<PathBuf>,
    /// aizynthfinder YAML configuration, passed through to aizynthcli
    pub aizynthfinder_config: PathBuf,
    /// Gzip tab-separated template library
    pub template_library: PathBuf,
    #[serde(default = "default_aizynthcli")]
    pub aizynthcli: String,
    #[serde(default)]
    pub postera: PosteraSettings,
    /// Program and arguments of the CoPriNet price predictor
    #[serde(default)]
    pub coprinet_command: Option<Vec<String>>,
    /// Program and arguments that turn reaction SMILES into template SMARTS
    #[serde(default)]
    pub template_extractor: Option<Vec<String>>,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PosteraSettings {
    pub url: String,
    pub max_search_depth: u32,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for PosteraSettings {
    fn default() -> Self {
        Self {
            url: postera::DEFAULT_URL.to_string(),
            max_search_depth: postera::DEFAULT_MAX_SEARCH_DEPTH,
            batch_size: postera::DEFAULT_BATCH_SIZE,
            timeout_secs: postera::DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Share of used templates reported as popular, in (0, 1]
    pub popular_fraction: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            popular_fraction: DEFAULT_POPULAR_FRACTION,
        }
    }
}

fn default_aizynthcli() -> String {
    DEFAULT_AIZYNTHCLI.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fraction = self.analysis.popular_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            bail!("analysis.popular_fraction must be in (0, 1], got {fraction}");
        }
        if self.postera.batch_size == 0 {
            bail!("postera.batch_size must be at least 1");
        }
        if self.aizynthcli.trim().is_empty() {
            bail!("aizynthcli must not be empty");
        }
        Ok(())
    }

    /// Check that everything the scoring type depends on is configured.
    pub fn validate_for(&self, scoring_type: ScoringType) -> Result<()> {
        match scoring_type {
            ScoringType::Cost => {
                self.stock_path()?;
            }
            ScoringType::Coprinet => {
                if self.coprinet_command.as_ref().is_none_or(|c| c.is_empty()) {
                    bail!("scoring type 'coprinet' requires 'coprinet_command' in the config");
                }
            }
            ScoringType::State | ScoringType::Frequency => {}
        }
        Ok(())
    }

    pub fn stock_path(&self) -> Result<&Path> {
        self.stock
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("scoring type 'cost' requires 'stock' in the config"))
    }
}

/// Load `.env` from the working directory or one of its parents, if there is one.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to load .env file: {e}"),
    }
}

/// The Postera API key from the environment.
pub fn postera_api_key() -> Result<String> {
    match env::var(POSTERA_API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => bail!("{POSTERA_API_KEY_VAR} is not set (export it or add it to .env)"),
    }
}
