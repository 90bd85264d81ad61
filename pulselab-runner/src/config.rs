//! Serializable replay configuration.
//!
//! ```toml
//! name = "daily-spy"
//! bars = "data/spy.csv"
//!
//! [[strategies]]
//! variant = "sma_cross"
//! label = "fast"
//! params = { fast_period = 10, slow_period = 50 }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use pulselab_core::components::factory::{build_strategy, ConfigError, Params};
use pulselab_core::components::StrategyInstance;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or validating a replay configuration.
#[derive(Debug, Error)]
pub enum RunnerConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config lists no strategies")]
    NoStrategies,
    #[error("duplicate strategy label '{0}'")]
    DuplicateLabel(String),
    #[error("strategy '{label}': {source}")]
    Strategy { label: String, source: ConfigError },
}

/// A parameter as written in TOML: a number or a boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
}

impl From<ParamValue> for f64 {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Flag(true) => 1.0,
            ParamValue::Flag(false) => 0.0,
            ParamValue::Number(v) => v,
        }
    }
}

/// One independent strategy instance to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    pub variant: String,
    /// Defaults to the variant id.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl StrategyEntry {
    pub fn new(variant: &str) -> Self {
        Self {
            variant: variant.to_string(),
            label: None,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: f64) -> Self {
        self.params
            .insert(name.to_string(), ParamValue::Number(value));
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.variant)
    }

    pub fn core_params(&self) -> Params {
        self.params
            .iter()
            .map(|(name, &value)| (name.clone(), f64::from(value)))
            .collect()
    }

    /// Validate against the registry and build a fresh instance.
    pub fn build(&self) -> Result<StrategyInstance, ConfigError> {
        build_strategy(&self.variant, &self.core_params())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// CSV bar file, relative to the working directory.
    #[serde(default)]
    pub bars: Option<PathBuf>,
    #[serde(default)]
    pub strategies: Vec<StrategyEntry>,
}

impl ReplayConfig {
    pub fn from_toml(content: &str) -> Result<Self, RunnerConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, RunnerConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| RunnerConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Check labels are unique and every entry passes registry validation.
    pub fn validate(&self) -> Result<(), RunnerConfigError> {
        if self.strategies.is_empty() {
            return Err(RunnerConfigError::NoStrategies);
        }
        let mut labels = HashSet::new();
        for entry in &self.strategies {
            if !labels.insert(entry.label()) {
                return Err(RunnerConfigError::DuplicateLabel(entry.label().to_string()));
            }
            entry.build().map_err(|source| RunnerConfigError::Strategy {
                label: entry.label().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash over the strategy list.
    ///
    /// Covers variant, label and every parameter in name order, so two configs
    /// that replay identically hash identically regardless of TOML layout.
    pub fn config_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.strategies {
            hasher.update(entry.variant.as_bytes());
            hasher.update(&[0]);
            hasher.update(entry.label().as_bytes());
            hasher.update(&[0]);
            for (name, value) in entry.core_params() {
                hasher.update(name.as_bytes());
                hasher.update(&value.to_le_bytes());
            }
            hasher.update(&[0xff]);
        }
        hasher.finalize().to_hex().to_string()
    }
}
