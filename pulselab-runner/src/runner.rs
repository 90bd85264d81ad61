//! Replay runner: drives strategy instances over a bar history.
//!
//! Three entry points:
//! - `replay()`: one strategy entry over pre-loaded bars
//! - `replay_many()`: every entry of a config, each on its own instance, in parallel
//! - `run_from_files()`: loads config and bars from disk, then `replay_many()`

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use pulselab_core::components::factory::ConfigError;
use pulselab_core::domain::{Action, Bar, DataError, Direction};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{ReplayConfig, StrategyEntry};
use crate::data_loader::{dataset_hash, load_bars_csv};
use crate::tracker::{PositionTracker, ProtectiveExit};

/// Errors from a single replay.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("strategy '{label}': {source}")]
    Config { label: String, source: ConfigError },
    #[error("strategy '{label}': {source}")]
    Data { label: String, source: DataError },
}

/// Something that changed the position on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    /// Set when the bar's range hit a protective level before the decision.
    pub protective_exit: Option<ProtectiveExit>,
    pub action: Action,
    pub position_after: Direction,
}

/// Outcome of replaying one strategy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub label: String,
    pub variant: String,
    pub strategy_name: String,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub entries: usize,
    pub exits: usize,
    pub protective_exits: usize,
    pub records: Vec<ActionRecord>,
    /// BLAKE3 over the per-bar action stream.
    pub action_digest: String,
}

/// Config and data provenance plus every report, in config order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub config_hash: String,
    pub dataset_hash: String,
    pub reports: Vec<ReplayReport>,
}

impl ReplaySummary {
    /// Pretty JSON artifact for the whole run.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize ReplaySummary to JSON")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to deserialize ReplaySummary from JSON")
    }
}

fn hash_action(hasher: &mut blake3::Hasher, action: &Action) {
    fn level(hasher: &mut blake3::Hasher, v: Option<f64>) {
        match v {
            Some(x) => hasher.update(&x.to_le_bytes()),
            None => hasher.update(b"-"),
        };
    }
    match *action {
        Action::None => {
            hasher.update(b"n");
        }
        Action::EnterLong {
            stop_loss,
            take_profit,
        } => {
            hasher.update(b"L");
            level(hasher, stop_loss);
            level(hasher, take_profit);
        }
        Action::EnterShort {
            stop_loss,
            take_profit,
        } => {
            hasher.update(b"S");
            level(hasher, stop_loss);
            level(hasher, take_profit);
        }
        Action::CloseLong => {
            hasher.update(b"xl");
        }
        Action::CloseShort => {
            hasher.update(b"xs");
        }
        Action::CloseAny => {
            hasher.update(b"x");
        }
    }
}

/// Replay one strategy entry over `bars` on a fresh instance.
pub fn replay(entry: &StrategyEntry, bars: &[Bar]) -> Result<ReplayReport, RunError> {
    let label = entry.label().to_string();
    let mut instance = entry.build().map_err(|source| RunError::Config {
        label: label.clone(),
        source,
    })?;
    let mut tracker = PositionTracker::new();
    let mut hasher = blake3::Hasher::new();
    let mut records = Vec::new();
    let (mut entries, mut exits, mut protective_exits) = (0, 0, 0);

    for bar in bars {
        let protective_exit = tracker.check_levels(bar);
        let action = instance
            .step(bar.clone(), tracker.position())
            .map_err(|source| RunError::Data {
                label: label.clone(),
                source,
            })?;
        tracker.apply(&action, bar);
        hash_action(&mut hasher, &action);

        entries += usize::from(action.is_entry());
        exits += usize::from(action.is_exit());
        protective_exits += usize::from(protective_exit.is_some());
        if protective_exit.is_some() || !action.is_none() {
            records.push(ActionRecord {
                bar_index: instance.bars().len() - 1,
                timestamp: bar.timestamp,
                protective_exit,
                action,
                position_after: tracker.direction(),
            });
        }
    }

    info!(
        label = %label,
        strategy = instance.name(),
        bars = bars.len(),
        entries,
        exits,
        protective_exits,
        "replay finished"
    );

    Ok(ReplayReport {
        label,
        variant: entry.variant.clone(),
        strategy_name: instance.name().to_string(),
        bar_count: bars.len(),
        warmup_bars: instance.required_warmup(),
        entries,
        exits,
        protective_exits,
        records,
        action_digest: hasher.finalize().to_hex().to_string(),
    })
}

/// Replay every entry of `config` independently. Reports keep config order.
pub fn replay_many(config: &ReplayConfig, bars: &[Bar]) -> Result<Vec<ReplayReport>, RunError> {
    config
        .strategies
        .par_iter()
        .map(|entry| replay(entry, bars))
        .collect()
}

/// Load a TOML config and CSV bars from disk and replay everything.
///
/// `bars_override` takes precedence over the config's `bars` path.
pub fn run_from_files(config_path: &Path, bars_override: Option<&Path>) -> Result<ReplaySummary> {
    let config = ReplayConfig::from_file(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let bars_path = bars_override
        .map(Path::to_path_buf)
        .or_else(|| config.bars.clone())
        .context("no bar file given and config has no `bars` entry")?;
    let bars = load_bars_csv(&bars_path)
        .with_context(|| format!("loading bars {}", bars_path.display()))?;

    info!(
        strategies = config.strategies.len(),
        bars = bars.len(),
        "starting replay"
    );
    let reports = replay_many(&config, &bars)?;

    Ok(ReplaySummary {
        config_hash: config.config_hash(),
        dataset_hash: dataset_hash(&bars),
        reports,
    })
}
