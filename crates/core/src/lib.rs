// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! simward-core: Core library for the Simward server scheduler
//!
//! This crate provides:
//! - Typed schedule/preset configuration loaded from TOML
//! - Time-window matching for recurring schedule rules
//! - The managed-instance state model and registry
//! - A wall-clock abstraction for testable time handling

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod config;
pub mod error;
pub mod instance;
pub mod mission;
pub mod window;

// Re-exports
pub use clock::{FakeClock, SystemClock, WallClock};
pub use config::{
    ConfigFile, EndpointConfig, ExtensionCommand, InstanceConfig, ResetCommands, RestartConfig,
    RestartMethod, RestartSettings, ScheduleRule, SettingRule, WarnConfig,
};
pub use error::{ConfigError, SchedulerError};
pub use instance::{
    DeferredAction, InstanceRegistry, InstanceStatus, ManagedInstance, StatusReport,
};
pub use mission::{Fog, MissionData, Preset, Wind, WindLayer};
pub use window::{DayState, DayStates, WindowSpec};
