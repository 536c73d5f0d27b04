// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Managed-instance state model and registry
//!
//! The registry owns all per-instance transient state. Status transitions
//! are driven by the controllers and by asynchronous status reports from
//! the external process; the loop never blocks on a transition completing.
//!
//! The `restart_pending` flag is the sole re-entrancy guard: it must be
//! set (via [`InstanceRegistry::begin_transition`], an atomic test-and-set)
//! before any stop/restart command is issued, and it clears only when a
//! status report shows the instance reaching a stable state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Observed lifecycle status of an external server process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Not yet under the scheduler's control
    Unregistered,
    /// Process not running
    Shutdown,
    /// Process starting, transient
    Loading,
    /// Process running with an active session
    Running,
    /// Session loaded but paused
    Paused,
    /// Process running but no active session
    Stopped,
    /// Process stopping, transient
    ShuttingDown,
}

impl InstanceStatus {
    /// True while the process is up in some form
    pub fn is_up(self) -> bool {
        matches!(
            self,
            InstanceStatus::Running | InstanceStatus::Paused | InstanceStatus::Stopped
        )
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceStatus::Unregistered => "unregistered",
            InstanceStatus::Shutdown => "shutdown",
            InstanceStatus::Loading => "loading",
            InstanceStatus::Running => "running",
            InstanceStatus::Paused => "paused",
            InstanceStatus::Stopped => "stopped",
            InstanceStatus::ShuttingDown => "shutting_down",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for InstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unregistered" => Ok(InstanceStatus::Unregistered),
            "shutdown" => Ok(InstanceStatus::Shutdown),
            "loading" => Ok(InstanceStatus::Loading),
            "running" => Ok(InstanceStatus::Running),
            "paused" => Ok(InstanceStatus::Paused),
            "stopped" => Ok(InstanceStatus::Stopped),
            "shutting_down" => Ok(InstanceStatus::ShuttingDown),
            _ => Err(format!("unknown instance status: {}", s)),
        }
    }
}

/// A command recorded while the instance was populated, to run
/// automatically once it becomes unoccupied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Apply the named preset to the active mission descriptor
    ApplyPreset { preset: String },
}

/// One externally-managed server process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedInstance {
    pub name: String,
    pub status: InstanceStatus,
    /// Elapsed session time in seconds, from status reports
    pub mission_time_secs: u64,
    /// Last observed occupancy
    pub populated: bool,
    /// Re-entrancy guard: a transition is in flight
    pub restart_pending: bool,
    /// Operator override: the loop leaves this instance alone
    pub maintenance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deferred: Option<DeferredAction>,
    /// Lazily resolved OS process id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Path of the active mission descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_file: Option<PathBuf>,
}

impl ManagedInstance {
    fn new(name: String, mission_file: Option<PathBuf>) -> Self {
        Self {
            name,
            status: InstanceStatus::Unregistered,
            mission_time_secs: 0,
            populated: false,
            restart_pending: false,
            maintenance: false,
            deferred: None,
            pid: None,
            mission_file,
        }
    }
}

/// Asynchronous status report from the external process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub name: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub mission_time_secs: u64,
    #[serde(default)]
    pub populated: bool,
}

/// Shared registry of managed instances.
///
/// All transient-flag mutation goes through accessor methods under one
/// mutex, so admin handlers and the loop never race on `restart_pending`.
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    inner: Arc<Mutex<HashMap<String, ManagedInstance>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ManagedInstance>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Put an instance under management
    pub fn register(&self, name: &str, mission_file: Option<PathBuf>) {
        self.lock()
            .entry(name.to_string())
            .or_insert_with(|| ManagedInstance::new(name.to_string(), mission_file));
    }

    /// Remove an instance from management
    pub fn deregister(&self, name: &str) -> Option<ManagedInstance> {
        self.lock().remove(name)
    }

    /// Snapshot of one instance
    pub fn get(&self, name: &str) -> Option<ManagedInstance> {
        self.lock().get(name).cloned()
    }

    /// Snapshot of all instances. Iteration order carries no guarantee.
    pub fn snapshot(&self) -> Vec<ManagedInstance> {
        self.lock().values().cloned().collect()
    }

    /// Registered instance names
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Atomically set `restart_pending` if no transition is in flight.
    ///
    /// Returns false when the flag was already set (or the instance is
    /// unknown), in which case the caller must not issue any command.
    pub fn begin_transition(&self, name: &str) -> bool {
        let mut map = self.lock();
        match map.get_mut(name) {
            Some(inst) if !inst.restart_pending => {
                inst.restart_pending = true;
                true
            }
            _ => false,
        }
    }

    /// Manually clear a stranded `restart_pending` flag
    pub fn clear_restart_pending(&self, name: &str) {
        if let Some(inst) = self.lock().get_mut(name) {
            inst.restart_pending = false;
        }
    }

    /// Engage the maintenance override
    pub fn set_maintenance(&self, name: &str) -> bool {
        match self.lock().get_mut(name) {
            Some(inst) => {
                inst.maintenance = true;
                true
            }
            None => false,
        }
    }

    /// Clear the maintenance override. Returns whether it was set.
    pub fn clear_maintenance(&self, name: &str) -> Option<bool> {
        self.lock().get_mut(name).map(|inst| {
            let was_set = inst.maintenance;
            inst.maintenance = false;
            was_set
        })
    }

    /// Record a command to run once the instance becomes unpopulated
    pub fn set_deferred(&self, name: &str, action: DeferredAction) {
        if let Some(inst) = self.lock().get_mut(name) {
            inst.deferred = Some(action);
        }
    }

    /// Take the deferred action if the instance is currently unpopulated
    pub fn take_deferred_if_unpopulated(&self, name: &str) -> Option<DeferredAction> {
        let mut map = self.lock();
        let inst = map.get_mut(name)?;
        if inst.populated {
            None
        } else {
            inst.deferred.take()
        }
    }

    /// Cache a lazily resolved PID
    pub fn set_pid(&self, name: &str, pid: u32) {
        if let Some(inst) = self.lock().get_mut(name) {
            inst.pid = Some(pid);
        }
    }

    /// Ingest an asynchronous status report.
    ///
    /// Reaching a stable state (`Running` or `Shutdown`) clears the
    /// `restart_pending` guard, which also expires a flag left behind by a
    /// failed transition once the process settles. Leaving the up states
    /// drops the cached PID.
    pub fn apply_status_report(&self, report: StatusReport) {
        let mut map = self.lock();
        let Some(inst) = map.get_mut(&report.name) else {
            tracing::debug!(instance = %report.name, "status report for unknown instance");
            return;
        };
        inst.status = report.status;
        inst.mission_time_secs = report.mission_time_secs;
        inst.populated = report.populated;
        match report.status {
            InstanceStatus::Running | InstanceStatus::Shutdown => {
                inst.restart_pending = false;
            }
            _ => {}
        }
        if report.status == InstanceStatus::Shutdown {
            inst.pid = None;
        }
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
