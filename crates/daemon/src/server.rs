// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::lifecycle::DaemonScheduler;
use crate::protocol::{
    self, InstanceSummary, Request, Response, DEFAULT_TIMEOUT,
};
use simward_engine::SetPresetOutcome;

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("request timeout")]
    Timeout,
}

/// Handle a single client connection. Returns whether the client requested
/// a daemon shutdown.
pub async fn handle_connection(
    scheduler: &DaemonScheduler,
    stream: UnixStream,
) -> Result<bool, ServerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("client disconnected before sending a request");
            return Ok(false);
        }
        Err(e) => {
            error!("failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("received request: {:?}", request);

    let shutdown_requested = matches!(request, Request::Shutdown);
    let response = handle_request(scheduler, request).await;

    debug!("sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(shutdown_requested)
}

/// Handle a single request and return a response
async fn handle_request(scheduler: &DaemonScheduler, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Status => {
            let mut instances: Vec<InstanceSummary> = scheduler
                .registry()
                .snapshot()
                .into_iter()
                .map(|i| InstanceSummary {
                    name: i.name,
                    status: i.status,
                    populated: i.populated,
                    maintenance: i.maintenance,
                    restart_pending: i.restart_pending,
                    mission_time_secs: i.mission_time_secs,
                })
                .collect();
            instances.sort_by(|a, b| a.name.cmp(&b.name));
            Response::Instances { instances }
        }

        Request::SetMaintenance { instance } => {
            match scheduler.set_maintenance(&instance).await {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::ClearMaintenance { instance } => {
            match scheduler.clear_maintenance(&instance).await {
                Ok(was_set) => Response::MaintenanceCleared { was_set },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::SetPreset { instance, preset } => {
            match scheduler.set_preset(&instance, &preset).await {
                Ok(outcome) => Response::PresetChanged {
                    deferred: outcome == SetPresetOutcome::Deferred,
                },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::AddPreset {
            instance,
            preset,
            overwrite,
        } => match scheduler.add_preset(&instance, &preset, overwrite).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::ResetMission { instance } => match scheduler.reset_mission(&instance).await {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },

        Request::Report { report } => {
            scheduler.report_status(report);
            Response::Ok
        }

        Request::Shutdown => Response::ShuttingDown,
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
