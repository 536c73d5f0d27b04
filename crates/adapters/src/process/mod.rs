// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process control adapter
//!
//! Lazy PID resolution and CPU-affinity pinning for externally-launched
//! server processes.

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessControl, ProcessCall};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors from process control operations
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command failed: {cmd} - {stderr}")]
    CommandFailed { cmd: String, stderr: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for OS-level process queries and tuning
#[async_trait]
pub trait ProcessControl: Clone + Send + Sync + 'static {
    /// Find the PID of a running process by name, if any
    async fn resolve_pid(&self, process_name: &str) -> Result<Option<u32>, ProcessError>;

    /// Pin a process to the given CPU cores
    async fn set_affinity(&self, pid: u32, cores: &[usize]) -> Result<(), ProcessError>;
}

/// Process control backed by `pgrep` and `taskset`
#[derive(Clone, Default)]
pub struct OsProcessControl;

impl OsProcessControl {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessControl for OsProcessControl {
    async fn resolve_pid(&self, process_name: &str) -> Result<Option<u32>, ProcessError> {
        let output = Command::new("pgrep")
            .args(["-n", "-f", process_name])
            .output()
            .await?;
        if !output.status.success() {
            // pgrep exits 1 when nothing matches
            return Ok(None);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim().parse().ok())
    }

    async fn set_affinity(&self, pid: u32, cores: &[usize]) -> Result<(), ProcessError> {
        let list = cores
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let output = Command::new("taskset")
            .args(["-pc", &list, &pid.to_string()])
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessError::CommandFailed {
                cmd: format!("taskset -pc {} {}", list, pid),
                stderr: stderr.to_string(),
            });
        }
        Ok(())
    }
}
