// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simward daemon (simwardd)
//!
//! Background process that drives the scheduler loop and serves the admin
//! socket. Usage: `simwardd <config.toml>`; the admin socket and log file
//! live next to the configuration file.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod protocol;
mod server;

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{DaemonConfig, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(config_path) = args.get(1).map(PathBuf::from) else {
        eprintln!("usage: simwardd <config.toml>");
        std::process::exit(2);
    };

    let config = DaemonConfig::for_config_file(&config_path);
    let log_guard = setup_logging(&config)?;

    info!("starting simwardd with {}", config.config_path.display());

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Loop tasks run until the shutdown signal flips; ready gates the
    // first tick until startup is complete.
    let loop_task = tokio::spawn({
        let scheduler = daemon.scheduler.clone();
        let ready = daemon.ready_tx.subscribe();
        let shutdown = daemon.shutdown_tx.subscribe();
        async move { scheduler.run(ready, shutdown).await }
    });
    let affinity_task = tokio::spawn({
        let scheduler = daemon.scheduler.clone();
        let shutdown = daemon.shutdown_tx.subscribe();
        async move { scheduler.run_affinity(shutdown).await }
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "daemon ready, listening on {}",
        config.socket_path.display()
    );
    let _ = daemon.ready_tx.send(true);

    // Signal ready for whoever launched us
    println!("READY");

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        match server::handle_connection(&daemon.scheduler, stream).await {
                            Ok(shutdown_requested) => {
                                daemon.shutdown_requested |= shutdown_requested;
                            }
                            Err(e) => error!("error handling connection: {}", e),
                        }
                    }
                    Err(e) => error!("error accepting connection: {}", e),
                }
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }

        if daemon.shutdown_requested {
            info!("shutdown requested over the admin socket");
            break;
        }
    }

    daemon.shutdown();
    let _ = loop_task.await;
    let _ = affinity_task.await;

    info!("daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &DaemonConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config
        .log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = config
        .log_path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("simwardd.log"));

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
