// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed scheduler configuration
//!
//! Configuration is declarative and loaded from a single TOML file. Preset
//! references from `restart.settings` are validated lazily at apply time,
//! not at load time; a missing preset is a `Configuration` error surfaced
//! to whoever triggered the apply.

use crate::error::ConfigError;
use crate::mission::Preset;
use crate::window::{DayStates, WindowSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One schedule rule: a recurring window plus the per-weekday codes.
///
/// Rules are kept in declaration order; when windows overlap, the first
/// matching rule wins. That ordering is a documented tie-break, not a
/// validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub window: WindowSpec,
    pub days: DayStates,
}

/// Warning countdown configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarnConfig {
    /// Checkpoints in seconds before the action, e.g. `[600, 300, 60]`
    pub times: Vec<u64>,
    /// Template with `{what}` and `{when}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WarnConfig {
    /// The longest configured checkpoint, which is the length of a full
    /// warned countdown
    pub fn max_time(&self) -> u64 {
        self.times.iter().copied().max().unwrap_or(0)
    }
}

/// How an in-session transition is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartMethod {
    /// Cold restart: stop the whole process and relaunch it
    RestartWithShutdown,
    /// Restart the mission in place (stop/start round trip when settings apply)
    Restart,
    /// Advance to the next mission in the rotation
    Rotate,
}

/// One settings rule: apply `preset` while `window` matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRule {
    pub window: WindowSpec,
    pub preset: String,
}

/// Preset selection for in-session transitions: either time-windowed
/// (first match in declaration order) or a uniform random choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestartSettings {
    ByWindow(Vec<SettingRule>),
    Random(Vec<String>),
}

/// In-session transition policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartConfig {
    pub method: RestartMethod,
    /// Threshold on elapsed session time, in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_time: Option<u64>,
    /// Local time-of-day windows that trigger a transition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_times: Vec<WindowSpec>,
    /// Whether the transition may proceed while the session is populated
    #[serde(default = "default_true")]
    pub populated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<RestartSettings>,
}

fn default_true() -> bool {
    true
}

/// Raw mission commands for the reset-mission admin operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResetCommands {
    One(String),
    Many(Vec<String>),
}

impl ResetCommands {
    pub fn commands(&self) -> Vec<&str> {
        match self {
            ResetCommands::One(cmd) => vec![cmd.as_str()],
            ResetCommands::Many(cmds) => cmds.iter().map(String::as_str).collect(),
        }
    }
}

/// How to reach and launch one external server process.
///
/// Process management itself is an adapter concern; this is just the data
/// the adapter needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Address the server listens on for JSON command datagrams
    pub addr: SocketAddr,
    /// Launch command for the server process
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// OS process name used for lazy PID resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    /// Launch commands for companion extension processes, by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extension_commands: BTreeMap<String, ExtensionCommand>,
}

/// Launch command for a companion extension process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCommand {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// Per-instance scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Schedule rules in declaration order (first match wins)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<ScheduleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<WarnConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartConfig>,
    /// Whether a scheduled shutdown may proceed while populated
    #[serde(default = "default_true")]
    pub populated: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub presets: BTreeMap<String, Preset>,
    /// Companion services started/stopped alongside the main process
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    /// CPU core indices to pin the running process to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<ResetCommands>,
    /// Path of the active mission descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointConfig>,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            schedule: Vec::new(),
            warn: None,
            restart: None,
            populated: true,
            presets: BTreeMap::new(),
            extensions: Vec::new(),
            affinity: None,
            reset: None,
            mission: None,
            endpoint: None,
        }
    }
}

impl InstanceConfig {
    /// Warning checkpoints, empty when no warnings are configured
    pub fn warn_times(&self) -> &[u64] {
        self.warn.as_ref().map(|w| w.times.as_slice()).unwrap_or(&[])
    }
}

/// The whole scheduler configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Scheduler loop cadence
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub interval: Duration,
    /// Affinity enforcement cadence
    #[serde(with = "humantime_serde", default = "default_affinity_interval")]
    pub affinity_interval: Duration,
    /// Popup message display time in seconds
    #[serde(default = "default_message_timeout")]
    pub message_timeout: u64,
    /// Local bind address for the command socket
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default)]
    pub instances: BTreeMap<String, InstanceConfig>,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_affinity_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_message_timeout() -> u64 {
    15
}

fn default_bind() -> SocketAddr {
    // Port 0: let the OS pick; commands are outbound datagrams
    SocketAddr::from(([0, 0, 0, 0], 0))
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            affinity_interval: default_affinity_interval(),
            message_timeout: default_message_timeout(),
            bind: default_bind(),
            instances: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Load the configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist the configuration back to a TOML file.
    ///
    /// Used by the add-preset admin operation, which is the only mutation
    /// of durable state this crate performs.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
