//! PulseLab Runner: replay orchestration around `pulselab-core`.
//!
//! This crate provides:
//! - TOML replay configuration with registry validation and a content hash
//! - CSV bar loading with validation and a dataset hash
//! - A minimal position tracker standing in for an execution engine
//! - Deterministic replays of independent strategy instances, in parallel

pub mod config;
pub mod data_loader;
pub mod runner;
pub mod tracker;

pub use config::{ParamValue, ReplayConfig, RunnerConfigError, StrategyEntry};
pub use data_loader::{dataset_hash, load_bars_csv, read_bars_csv, LoadError};
pub use runner::{
    replay, replay_many, run_from_files, ActionRecord, ReplayReport, ReplaySummary, RunError,
};
pub use tracker::{PositionTracker, ProtectiveExit};
