// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server link adapter
//!
//! One-way command interface to the external server process. Commands are
//! fire-and-forget; there is no acknowledgment channel. Confirmation, where
//! the scheduler needs it, comes from asynchronous status reports instead.

mod udp;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use udp::UdpServerLink;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeServerLink, ServerCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from server link operations
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unknown instance: {0}")]
    UnknownInstance(String),
    #[error("failed to launch {instance}: {message}")]
    LaunchFailed { instance: String, message: String },
    #[error("failed to send command to {instance}: {message}")]
    SendFailed { instance: String, message: String },
    #[error("unknown extension {extension} for instance {instance}")]
    UnknownExtension { instance: String, extension: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter for controlling and messaging one or more external server
/// processes, keyed by instance name
#[async_trait]
pub trait ServerLink: Clone + Send + Sync + 'static {
    /// Start the OS process for an instance
    async fn launch(&self, instance: &str) -> Result<(), ServerError>;

    /// Kill the OS process for an instance
    async fn terminate(&self, instance: &str) -> Result<(), ServerError>;

    /// Stop the in-process session server (`stop_server`)
    async fn stop_server(&self, instance: &str) -> Result<(), ServerError>;

    /// Start the in-process session server (`start_server`)
    async fn start_server(&self, instance: &str) -> Result<(), ServerError>;

    /// Restart the current mission in place (`restartMission`)
    async fn restart_mission(&self, instance: &str) -> Result<(), ServerError>;

    /// Advance to the next mission in the rotation (`startNextMission`)
    async fn start_next_mission(&self, instance: &str) -> Result<(), ServerError>;

    /// Tell the surrounding system the session is ending (`onMissionEnd`)
    async fn notify_mission_end(&self, instance: &str) -> Result<(), ServerError>;

    /// Tell the surrounding system the process is going down (`onShutdown`)
    async fn notify_shutdown(&self, instance: &str) -> Result<(), ServerError>;

    /// Show an in-game popup message (`sendPopupMessage`)
    async fn send_popup(
        &self,
        instance: &str,
        text: &str,
        audience: &str,
        timeout_secs: u64,
    ) -> Result<(), ServerError>;

    /// Run a raw mission command (reset-mission admin operation)
    async fn run_command(&self, instance: &str, command: &str) -> Result<(), ServerError>;

    /// Start a companion extension process
    async fn start_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError>;

    /// Stop a companion extension process
    async fn stop_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError>;

    /// Whether a companion extension process is currently running
    async fn extension_running(&self, instance: &str, extension: &str)
        -> Result<bool, ServerError>;
}
