// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP server link
//!
//! Sends JSON command datagrams to each instance's command port and manages
//! the OS processes (main server and extensions) with `tokio::process`.

use super::{ServerError, ServerLink};
use async_trait::async_trait;
use serde_json::json;
use simward_core::config::{EndpointConfig, ExtensionCommand};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::process::{Child, Command};

/// UDP-based server link
#[derive(Clone)]
pub struct UdpServerLink {
    socket: Arc<UdpSocket>,
    endpoints: Arc<HashMap<String, EndpointConfig>>,
    children: Arc<Mutex<HashMap<String, Child>>>,
    extension_children: Arc<Mutex<HashMap<(String, String), Child>>>,
}

impl UdpServerLink {
    /// Bind the outbound command socket and record the endpoints
    pub async fn bind(
        bind: SocketAddr,
        endpoints: HashMap<String, EndpointConfig>,
    ) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(bind).await?;
        Ok(Self {
            socket: Arc::new(socket),
            endpoints: Arc::new(endpoints),
            children: Arc::new(Mutex::new(HashMap::new())),
            extension_children: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn endpoint(&self, instance: &str) -> Result<&EndpointConfig, ServerError> {
        self.endpoints
            .get(instance)
            .ok_or_else(|| ServerError::UnknownInstance(instance.to_string()))
    }

    fn extension_command<'a>(
        &'a self,
        instance: &str,
        extension: &str,
    ) -> Result<&'a ExtensionCommand, ServerError> {
        self.endpoint(instance)?
            .extension_commands
            .get(extension)
            .ok_or_else(|| ServerError::UnknownExtension {
                instance: instance.to_string(),
                extension: extension.to_string(),
            })
    }

    async fn send(&self, instance: &str, message: serde_json::Value) -> Result<(), ServerError> {
        let addr = self.endpoint(instance)?.addr;
        let payload = message.to_string();
        tracing::debug!(instance, %addr, payload, "sending server command");
        self.socket
            .send_to(payload.as_bytes(), addr)
            .await
            .map_err(|e| ServerError::SendFailed {
                instance: instance.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn spawn(command: &str, args: &[String], cwd: Option<&std::path::Path>) -> std::io::Result<Child> {
        let mut cmd = Command::new(command);
        cmd.args(args);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        cmd.kill_on_drop(false);
        cmd.spawn()
    }
}

#[async_trait]
impl ServerLink for UdpServerLink {
    async fn launch(&self, instance: &str) -> Result<(), ServerError> {
        let endpoint = self.endpoint(instance)?;
        let child = Self::spawn(&endpoint.command, &endpoint.args, endpoint.cwd.as_deref())
            .map_err(|e| ServerError::LaunchFailed {
                instance: instance.to_string(),
                message: e.to_string(),
            })?;
        tracing::info!(instance, pid = child.id(), "launched server process");
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(instance.to_string(), child);
        Ok(())
    }

    async fn terminate(&self, instance: &str) -> Result<(), ServerError> {
        let child = self
            .children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(instance);
        match child {
            Some(mut child) => {
                tracing::info!(instance, "terminating server process");
                child.start_kill()?;
                let _ = child.wait().await;
                Ok(())
            }
            // Not launched by us; the process answers the shutdown
            // notification instead
            None => Ok(()),
        }
    }

    async fn stop_server(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "stop_server"})).await
    }

    async fn start_server(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "start_server"})).await
    }

    async fn restart_mission(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "restartMission"}))
            .await
    }

    async fn start_next_mission(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "startNextMission"}))
            .await
    }

    async fn notify_mission_end(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "onMissionEnd"})).await
    }

    async fn notify_shutdown(&self, instance: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": "onShutdown"})).await
    }

    async fn send_popup(
        &self,
        instance: &str,
        text: &str,
        audience: &str,
        timeout_secs: u64,
    ) -> Result<(), ServerError> {
        self.send(
            instance,
            json!({
                "command": "sendPopupMessage",
                "message": text,
                "to": audience,
                "time": timeout_secs,
            }),
        )
        .await
    }

    async fn run_command(&self, instance: &str, command: &str) -> Result<(), ServerError> {
        self.send(instance, json!({"command": command})).await
    }

    async fn start_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError> {
        let spec = self.extension_command(instance, extension)?;
        let child = Self::spawn(&spec.command, &spec.args, spec.cwd.as_deref()).map_err(|e| {
            ServerError::LaunchFailed {
                instance: format!("{}/{}", instance, extension),
                message: e.to_string(),
            }
        })?;
        tracing::info!(instance, extension, pid = child.id(), "launched extension");
        self.extension_children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((instance.to_string(), extension.to_string()), child);
        Ok(())
    }

    async fn stop_extension(&self, instance: &str, extension: &str) -> Result<(), ServerError> {
        let child = self
            .extension_children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(instance.to_string(), extension.to_string()));
        if let Some(mut child) = child {
            tracing::info!(instance, extension, "stopping extension");
            child.start_kill()?;
            let _ = child.wait().await;
        }
        Ok(())
    }

    async fn extension_running(
        &self,
        instance: &str,
        extension: &str,
    ) -> Result<bool, ServerError> {
        let mut children = self
            .extension_children
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        match children.get_mut(&(instance.to_string(), extension.to_string())) {
            Some(child) => match child.try_wait()? {
                Some(_) => {
                    children.remove(&(instance.to_string(), extension.to_string()));
                    Ok(false)
                }
                None => Ok(true),
            },
            None => Ok(false),
        }
    }
}
