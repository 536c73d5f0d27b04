// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake server link for testing

use super::{ServerError, ServerLink};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Recorded server link call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerCall {
    Launch { instance: String },
    Terminate { instance: String },
    StopServer { instance: String },
    StartServer { instance: String },
    RestartMission { instance: String },
    StartNextMission { instance: String },
    NotifyMissionEnd { instance: String },
    NotifyShutdown { instance: String },
    SendPopup { instance: String, text: String },
    RunCommand { instance: String, command: String },
    StartExtension { instance: String, extension: String },
    StopExtension { instance: String, extension: String },
}

/// Fake server link for testing: records every call, never talks to a
/// real process
#[derive(Clone, Default)]
pub struct FakeServerLink {
    calls: Arc<Mutex<Vec<ServerCall>>>,
    running_extensions: Arc<Mutex<HashSet<(String, String)>>>,
    fail_launch: Arc<Mutex<bool>>,
}

impl FakeServerLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ServerCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Count of recorded popup messages for an instance
    pub fn popup_count(&self, instance: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServerCall::SendPopup { instance: i, .. } if i == instance))
            .count()
    }

    /// Pre-mark an extension as running
    pub fn set_extension_running(&self, instance: &str, extension: &str) {
        self.running_extensions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((instance.to_string(), extension.to_string()));
    }

    /// Make subsequent launch calls fail
    pub fn fail_next_launch(&self) {
        *self.fail_launch.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    fn record(&self, call: ServerCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl ServerLink for FakeServerLink {
    async fn launch(&self, instance: &str) -> Result<(), ServerError> {
        if *self.fail_launch.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(ServerError::LaunchFailed {
                instance: instance.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.record(ServerCall::Launch {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn terminate(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::Terminate {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn stop_server(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::StopServer {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn start_server(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::StartServer {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn restart_mission(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::RestartMission {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn start_next_mission(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::StartNextMission {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn notify_mission_end(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::NotifyMissionEnd {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn notify_shutdown(&self, instance: &str) -> Result<(), ServerError> {
        self.record(ServerCall::NotifyShutdown {
            instance: instance.to_string(),
        });
        Ok(())
    }

    async fn send_popup(
        &self,
        instance: &str,
        text: &str,
        _audience: &str,
        _timeout_secs: u64,
    ) -> Result<(), ServerError> {
        self.record(ServerCall::SendPopup {
            instance: instance.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn run_command(&self, instance: &str, command: &str) -> Result<(), ServerError> {
        self.record(ServerCall::RunCommand {
            instance: instance.to_string(),
            command: command.to_string(),
        });
        Ok(())
    }

    async fn start_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError> {
        self.record(ServerCall::StartExtension {
            instance: instance.to_string(),
            extension: extension.to_string(),
        });
        self.set_extension_running(instance, extension);
        Ok(())
    }

    async fn stop_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError> {
        self.record(ServerCall::StopExtension {
            instance: instance.to_string(),
            extension: extension.to_string(),
        });
        self.running_extensions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(instance.to_string(), extension.to_string()));
        Ok(())
    }

    async fn extension_running(
        &self,
        instance: &str,
        extension: &str,
    ) -> Result<bool, ServerError> {
        Ok(self
            .running_extensions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&(instance.to_string(), extension.to_string())))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
