// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler state and the periodic driver loop
//!
//! The loop polls every managed instance once per tick. Transitions run as
//! spawned tasks so a warned countdown never blocks the tick; the shared
//! `restart_pending` flag keeps at most one transition in flight per
//! instance. Per-instance failures are logged and isolated - the loop
//! always completes its full pass.

use crate::error::EngineError;
use crate::lifecycle::desired_status;
use crate::mission_cycle::should_cycle;
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{
    ConfigFile, DeferredAction, InstanceConfig, InstanceRegistry, InstanceStatus, ManagedInstance,
    StatusReport, WallClock,
};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Delay between session-end / shutdown notifications and the action that
/// follows, giving the external process a moment to settle
pub(crate) const SETTLE_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

/// The scheduling engine: registry, configuration, and the adapter set
pub struct Scheduler<S, M, N, P, C> {
    pub(crate) registry: InstanceRegistry,
    pub(crate) config: Arc<RwLock<ConfigFile>>,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) server: S,
    pub(crate) missions: M,
    pub(crate) notifier: N,
    pub(crate) process: P,
    pub(crate) clock: C,
}

impl<S: Clone, M: Clone, N: Clone, P: Clone, C: Clone> Clone for Scheduler<S, M, N, P, C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            server: self.server.clone(),
            missions: self.missions.clone(),
            notifier: self.notifier.clone(),
            process: self.process.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<S, M, N, P, C> Scheduler<S, M, N, P, C>
where
    S: ServerLink,
    M: MissionStore,
    N: Notifier,
    P: ProcessControl,
    C: WallClock,
{
    /// Create a scheduler and register every configured instance
    pub fn new(
        config: ConfigFile,
        config_path: Option<PathBuf>,
        server: S,
        missions: M,
        notifier: N,
        process: P,
        clock: C,
    ) -> Self {
        let registry = InstanceRegistry::new();
        for (name, instance) in &config.instances {
            registry.register(name, instance.mission.clone());
        }
        Self {
            registry,
            config: Arc::new(RwLock::new(config)),
            config_path,
            server,
            missions,
            notifier,
            process,
            clock,
        }
    }

    /// The shared instance registry
    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Ingest an asynchronous status report from the external process
    pub fn report_status(&self, report: StatusReport) {
        self.registry.apply_status_report(report);
    }

    /// Current configuration for one instance, if any
    pub(crate) fn instance_config(&self, name: &str) -> Option<InstanceConfig> {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .instances
            .get(name)
            .cloned()
    }

    /// Popup message display time, from configuration
    pub(crate) fn message_timeout(&self) -> u64 {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .message_timeout
    }

    pub(crate) fn instance(&self, name: &str) -> Result<ManagedInstance, EngineError> {
        self.registry
            .get(name)
            .ok_or_else(|| EngineError::UnknownInstance(name.to_string()))
    }

    /// Best-effort audit record; delivery failures are logged only
    pub(crate) async fn audit(&self, name: &str, message: &str) {
        if let Err(e) = self.notifier.audit(name, message).await {
            tracing::warn!(instance = name, error = %e, "audit delivery failed");
        }
    }

    /// Run the periodic loop until the shutdown signal flips.
    ///
    /// Waits for the ready signal first so the loop never acts while the
    /// surrounding system is still starting up.
    pub async fn run(&self, mut ready: watch::Receiver<bool>, mut shutdown: watch::Receiver<bool>) {
        while !*ready.borrow_and_update() {
            if ready.changed().await.is_err() {
                tracing::warn!("ready signal dropped before startup completed");
                return;
            }
        }

        let interval = self
            .config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .interval;
        tracing::info!(interval_secs = interval.as_secs(), "scheduler loop started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick fires immediately; skip it so startup and
        // the first evaluation are a full interval apart.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("scheduler loop stopping");
                        return;
                    }
                }
            }
        }
    }

    /// Evaluate every managed instance once, isolating failures
    pub async fn tick(&self) {
        for name in self.registry.names() {
            if let Err(e) = self.evaluate_instance(&name).await {
                tracing::warn!(instance = %name, error = %e, "instance evaluation failed");
            }
        }
    }

    /// One instance's tick: run any due deferred action, then decide and
    /// spawn at most one transition
    async fn evaluate_instance(&self, name: &str) -> Result<(), EngineError> {
        let Some(instance) = self.registry.get(name) else {
            return Ok(());
        };
        if matches!(
            instance.status,
            InstanceStatus::Unregistered | InstanceStatus::Loading
        ) || instance.maintenance
            || instance.restart_pending
        {
            return Ok(());
        }
        let Some(config) = self.instance_config(name) else {
            // Registered but unconfigured instances are left alone
            return Ok(());
        };

        if let Some(action) = self.registry.take_deferred_if_unpopulated(name) {
            match action {
                DeferredAction::ApplyPreset { preset } => {
                    tracing::info!(instance = name, preset, "running deferred preset change");
                    self.apply_preset(name, Some(preset.as_str())).await?;
                }
            }
        }

        let now = self.clock.now();
        let target = desired_status(&config, &instance, now);

        if target == InstanceStatus::Running && instance.status == InstanceStatus::Shutdown {
            self.spawn_transition(name, Transition::Launch);
        } else if target == InstanceStatus::Shutdown && instance.status.is_up() {
            self.spawn_transition(name, Transition::Shutdown);
        } else if matches!(
            instance.status,
            InstanceStatus::Running | InstanceStatus::Paused
        ) && should_cycle(&config, &instance, now)
        {
            self.spawn_transition(name, Transition::RestartMission);
        }
        Ok(())
    }

    /// Run a transition as a background task so warned countdowns never
    /// block the tick
    fn spawn_transition(&self, name: &str, transition: Transition) {
        let this = self.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            let result = match transition {
                Transition::Launch => this.launch(&name).await,
                Transition::Shutdown => this.shutdown(&name).await,
                Transition::RestartMission => this.restart_mission(&name).await,
            };
            if let Err(e) = result {
                tracing::warn!(instance = %name, error = %e, ?transition, "transition failed");
            }
        });
    }

    /// Run the lower-frequency affinity enforcement until shutdown
    pub async fn run_affinity(&self, mut shutdown: watch::Receiver<bool>) {
        let interval = self
            .config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .affinity_interval;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => self.affinity_tick().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }

    /// Pin every running instance with configured affinity to its cores
    pub async fn affinity_tick(&self) {
        for name in self.registry.names() {
            if let Err(e) = self.enforce_affinity(&name).await {
                tracing::warn!(instance = %name, error = %e, "affinity enforcement failed");
            }
        }
    }

    async fn enforce_affinity(&self, name: &str) -> Result<(), EngineError> {
        let Some(instance) = self.registry.get(name) else {
            return Ok(());
        };
        if instance.status != InstanceStatus::Running {
            return Ok(());
        }
        let Some(config) = self.instance_config(name) else {
            return Ok(());
        };
        let Some(cores) = config.affinity.as_deref() else {
            return Ok(());
        };

        let pid = match instance.pid {
            Some(pid) => pid,
            None => {
                let Some(process_name) = config
                    .endpoint
                    .as_ref()
                    .and_then(|e| e.process_name.as_deref())
                else {
                    return Ok(());
                };
                match self.process.resolve_pid(process_name).await {
                    Ok(Some(pid)) => {
                        self.registry.set_pid(name, pid);
                        pid
                    }
                    Ok(None) => return Ok(()),
                    Err(e) => {
                        tracing::warn!(instance = name, error = %e, "pid resolution failed");
                        return Ok(());
                    }
                }
            }
        };

        if let Err(e) = self.process.set_affinity(pid, cores).await {
            tracing::warn!(instance = name, pid, error = %e, "failed to set cpu affinity");
        }
        Ok(())
    }
}

/// Which transition a tick decided to run
#[derive(Debug, Clone, Copy)]
enum Transition {
    Launch,
    Shutdown,
    RestartMission,
}


#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
