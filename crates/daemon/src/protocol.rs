// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin wire protocol
//!
//! Length-prefixed JSON messages over the unix admin socket: a 4-byte
//! big-endian length followed by one JSON-encoded request or response per
//! connection.

use serde::{Deserialize, Serialize};
use simward_core::{InstanceStatus, StatusReport};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read/write timeout applied to every message
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a single message, to fail fast on garbage input
const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

/// Requests accepted over the admin socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Ping,
    /// Snapshot of every managed instance
    Status,
    SetMaintenance {
        instance: String,
    },
    ClearMaintenance {
        instance: String,
    },
    SetPreset {
        instance: String,
        preset: String,
    },
    AddPreset {
        instance: String,
        preset: String,
        #[serde(default)]
        overwrite: bool,
    },
    ResetMission {
        instance: String,
    },
    /// Asynchronous status report from an external process shim
    Report {
        report: StatusReport,
    },
    Shutdown,
}

/// Responses sent over the admin socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Pong,
    Ok,
    /// Outcome of a maintenance clear: whether the flag was actually set
    MaintenanceCleared {
        was_set: bool,
    },
    /// Outcome of a set-preset request
    PresetChanged {
        /// True when the change was recorded to run once the instance
        /// empties instead of applying immediately
        deferred: bool,
    },
    Instances {
        instances: Vec<InstanceSummary>,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

/// One instance in a status response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub name: String,
    pub status: InstanceStatus,
    pub populated: bool,
    pub maintenance: bool,
    pub restart_pending: bool,
    pub mission_time_secs: u64,
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message of {0} bytes exceeds the size limit")]
    TooLarge(u32),
    #[error("timed out")]
    Timeout,
    #[error("connection closed")]
    ConnectionClosed,
}

/// Encode a message as raw JSON (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Decode a raw JSON message
pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::TooLarge(u32::MAX))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(len));
    }
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::TooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Read a request, bounded by `timeout`
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let payload = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&payload)
}

/// Write a response, bounded by `timeout`
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let payload = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &payload))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
