// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-file mission descriptor store

use super::{MissionError, MissionStore};
use async_trait::async_trait;
use simward_core::MissionData;
use std::path::Path;

/// Mission store backed by a JSON descriptor file
#[derive(Clone, Default)]
pub struct JsonMissionStore;

impl JsonMissionStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MissionStore for JsonMissionStore {
    async fn load(&self, path: &Path) -> Result<MissionData, MissionError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MissionError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(MissionError::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| MissionError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    async fn save(&self, path: &Path, data: &MissionData) -> Result<(), MissionError> {
        let text = serde_json::to_vec_pretty(data).map_err(|e| MissionError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tokio::fs::write(path, text)
            .await
            .map_err(|e| MissionError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
