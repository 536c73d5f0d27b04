// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory mission store for testing

use super::{MissionError, MissionStore};
use async_trait::async_trait;
use simward_core::MissionData;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Fake mission store for testing: descriptors live in a shared map,
/// save counts are tracked per path
#[derive(Clone, Default)]
pub struct FakeMissionStore {
    missions: Arc<Mutex<HashMap<PathBuf, MissionData>>>,
    save_counts: Arc<Mutex<HashMap<PathBuf, usize>>>,
    fail_saves: Arc<Mutex<bool>>,
}

impl FakeMissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a descriptor
    pub fn insert(&self, path: impl Into<PathBuf>, data: MissionData) {
        self.missions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), data);
    }

    /// Current descriptor contents
    pub fn get(&self, path: &Path) -> Option<MissionData> {
        self.missions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }

    /// How many times the descriptor at `path` has been saved
    pub fn save_count(&self, path: &Path) -> usize {
        self.save_counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Make subsequent save calls fail
    pub fn fail_saves(&self) {
        *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }
}

#[async_trait]
impl MissionStore for FakeMissionStore {
    async fn load(&self, path: &Path) -> Result<MissionData, MissionError> {
        self.missions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .ok_or_else(|| MissionError::NotFound(path.to_path_buf()))
    }

    async fn save(&self, path: &Path, data: &MissionData) -> Result<(), MissionError> {
        if *self.fail_saves.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(MissionError::Write {
                path: path.to_path_buf(),
                message: "injected failure".to_string(),
            });
        }
        self.missions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf(), data.clone());
        *self
            .save_counts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        Ok(())
    }
}
