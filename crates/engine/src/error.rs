// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error type

use simward_adapters::ServerError;
use simward_core::{ConfigError, SchedulerError};
use thiserror::Error;

/// Errors surfaced by controller and admin operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown instance: {0}")]
    UnknownInstance(String),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// True for errors an administrative caller should see as their own
    /// mistake rather than a system failure
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Scheduler(SchedulerError::Configuration(_)))
    }
}
