// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use simward_adapters::{
    JsonMissionStore, LogNotifier, OsProcessControl, ServerError, UdpServerLink,
};
use simward_core::{ConfigError, ConfigFile, SystemClock};
use simward_engine::Scheduler;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// Scheduler with the daemon's concrete adapter set
pub type DaemonScheduler =
    Scheduler<UdpServerLink, JsonMissionStore, LogNotifier, OsProcessControl, SystemClock>;

/// Daemon configuration: the config file plus the paths derived from it
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Path of the TOML configuration file
    pub config_path: PathBuf,
    /// Path of the unix admin socket
    pub socket_path: PathBuf,
    /// Path of the daemon log file
    pub log_path: PathBuf,
}

impl DaemonConfig {
    /// Derive the socket and log paths from the config file location
    pub fn for_config_file(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            socket_path: config_path.with_extension("sock"),
            log_path: config_path.with_extension("log"),
        }
    }
}

/// Errors during daemon startup and shutdown
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
pub struct Daemon {
    pub config: DaemonConfig,
    /// Unix socket listener for the admin protocol
    pub listener: UnixListener,
    pub scheduler: DaemonScheduler,
    /// Flipped once startup completes; gates the scheduler loop
    pub ready_tx: watch::Sender<bool>,
    /// Flipped to stop the loop tasks
    pub shutdown_tx: watch::Sender<bool>,
    /// Set when a shutdown request arrives over the admin socket
    pub shutdown_requested: bool,
}

/// Load configuration, bind the sockets, and assemble the scheduler
pub async fn startup(config: &DaemonConfig) -> Result<Daemon, LifecycleError> {
    let file = ConfigFile::load(&config.config_path)?;
    info!(
        instances = file.instances.len(),
        interval_secs = file.interval.as_secs(),
        "configuration loaded"
    );

    let endpoints: HashMap<_, _> = file
        .instances
        .iter()
        .filter_map(|(name, cfg)| cfg.endpoint.clone().map(|e| (name.clone(), e)))
        .collect();
    let server = UdpServerLink::bind(file.bind, endpoints).await?;

    let scheduler = Scheduler::new(
        file,
        Some(config.config_path.clone()),
        server,
        JsonMissionStore::new(),
        LogNotifier::new(),
        OsProcessControl::new(),
        SystemClock,
    );

    // A stale socket from an unclean exit blocks the bind
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)?;

    let (ready_tx, _) = watch::channel(false);
    let (shutdown_tx, _) = watch::channel(false);

    Ok(Daemon {
        config: config.clone(),
        listener,
        scheduler,
        ready_tx,
        shutdown_tx,
        shutdown_requested: false,
    })
}

impl Daemon {
    /// Stop the loop tasks and remove the admin socket
    pub fn shutdown(&self) {
        info!("shutting down daemon");
        let _ = self.shutdown_tx.send(true);
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("failed to remove socket file: {}", e);
            }
        }
    }
}
