// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by scheduling decisions and transitions
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Missing or invalid schedule, preset, or restart-settings reference.
    /// Surfaced to the administrative caller, never fatal to the loop.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The mission descriptor could not be read, written, or parsed.
    /// Aborts the current transition for that instance only.
    #[error("mission format error: {0}")]
    MissionFormat(String),

    /// The external process did not confirm a requested state within the
    /// bounded poll budget. The transition proceeds best-effort.
    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// Errors loading or persisting the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
