// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process control for testing

use super::{ProcessControl, ProcessError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded process control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCall {
    ResolvePid { process_name: String },
    SetAffinity { pid: u32, cores: Vec<usize> },
}

/// Fake process control for testing
#[derive(Clone, Default)]
pub struct FakeProcessControl {
    pids: Arc<Mutex<HashMap<String, u32>>>,
    calls: Arc<Mutex<Vec<ProcessCall>>>,
}

impl FakeProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the PID returned for a process name
    pub fn set_pid(&self, process_name: &str, pid: u32) {
        self.pids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(process_name.to_string(), pid);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ProcessCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ProcessControl for FakeProcessControl {
    async fn resolve_pid(&self, process_name: &str) -> Result<Option<u32>, ProcessError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProcessCall::ResolvePid {
                process_name: process_name.to_string(),
            });
        Ok(self
            .pids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(process_name)
            .copied())
    }

    async fn set_affinity(&self, pid: u32, cores: &[usize]) -> Result<(), ProcessError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ProcessCall::SetAffinity {
                pid,
                cores: cores.to_vec(),
            });
        Ok(())
    }
}
