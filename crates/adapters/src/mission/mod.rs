// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission descriptor store adapter
//!
//! Load/save capability for mission descriptors. The scheduler overlays
//! preset fields onto the loaded data and persists via a single save call.

mod json;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use json::JsonMissionStore;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMissionStore;

use async_trait::async_trait;
use simward_core::MissionData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from mission descriptor operations
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("mission descriptor not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to parse mission descriptor {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to write mission descriptor {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for reading and writing mission descriptors
#[async_trait]
pub trait MissionStore: Clone + Send + Sync + 'static {
    async fn load(&self, path: &Path) -> Result<MissionData, MissionError>;

    async fn save(&self, path: &Path, data: &MissionData) -> Result<(), MissionError>;
}
