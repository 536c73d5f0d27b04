// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle controller: scheduled start and stop
//!
//! [`desired_status`] is the pure decision function; `Scheduler::launch`
//! and `Scheduler::shutdown` are the effectful transitions the loop spawns
//! when the decision differs from the observed status.
//!
//! The decision uses two time bases. An up-code or down-if-empty rule is
//! matched against `now`. A down rule against a running session is matched
//! against `now + restart_in`, where `restart_in` is the longest warning
//! checkpoint: the stop will only take effect after the warned countdown,
//! so the window is checked where the stop actually lands. A down rule
//! against a paused or stopped session has nothing to warn and matches
//! `now` directly. The weekday is always taken from the lookahead
//! timestamp. This asymmetry is deliberate and pinned by tests.

use crate::error::EngineError;
use crate::scheduler::{Scheduler, SETTLE_DELAY};
use chrono::{Datelike, Duration, NaiveDateTime};
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{DayState, InstanceConfig, InstanceStatus, ManagedInstance, WallClock};

/// Predicted delay before a warned transition takes effect, in seconds
fn restart_in(config: &InstanceConfig, instance: &ManagedInstance) -> u64 {
    if instance.populated {
        config.warn.as_ref().map(|w| w.max_time()).unwrap_or(0)
    } else {
        0
    }
}

/// Decide the lifecycle target for an instance at `now`.
///
/// Schedule rules are evaluated in declaration order; the first rule whose
/// full condition holds wins. When no rule fires the target is the current
/// status, which the loop treats as a no-op.
pub fn desired_status(
    config: &InstanceConfig,
    instance: &ManagedInstance,
    now: NaiveDateTime,
) -> InstanceStatus {
    let grace = restart_in(config, instance);
    let lookahead = now + Duration::seconds(grace as i64);
    let day = lookahead.weekday();

    for rule in &config.schedule {
        match rule.days.on(day) {
            DayState::Up => {
                if rule.window.contains(now.time()) && instance.status == InstanceStatus::Shutdown {
                    return InstanceStatus::Running;
                }
            }
            DayState::DownIfEmpty => {
                if rule.window.contains(now.time())
                    && instance.status.is_up()
                    && !instance.populated
                {
                    return InstanceStatus::Shutdown;
                }
            }
            DayState::Down => {
                if instance.status == InstanceStatus::Running
                    && rule.window.contains(lookahead.time())
                {
                    return InstanceStatus::Shutdown;
                }
                if matches!(
                    instance.status,
                    InstanceStatus::Paused | InstanceStatus::Stopped
                ) && rule.window.contains(now.time())
                {
                    return InstanceStatus::Shutdown;
                }
            }
            DayState::Ignore => {}
        }
    }
    instance.status
}

impl<S, M, N, P, C> Scheduler<S, M, N, P, C>
where
    S: ServerLink,
    M: MissionStore,
    N: Notifier,
    P: ProcessControl,
    C: WallClock,
{
    /// Bring a shut-down instance up: apply any time-resolved mission
    /// settings, launch the process, start configured extensions.
    ///
    /// Guarded by `restart_pending`; the flag clears when a status report
    /// shows the instance reaching `Running`. A settings or launch failure
    /// leaves the flag set so the launch is not hammered every tick.
    pub(crate) async fn launch(&self, name: &str) -> Result<(), EngineError> {
        if !self.registry.begin_transition(name) {
            return Ok(());
        }
        let Some(config) = self.instance_config(name) else {
            self.registry.clear_restart_pending(name);
            return Ok(());
        };

        self.apply_resolved_settings(name).await?;
        self.server.launch(name).await?;
        self.start_extensions(name, &config).await;
        tracing::info!(instance = name, "instance launched");
        self.audit(name, "scheduled launch").await;
        Ok(())
    }

    /// Take an up instance down: warn occupants, signal session end and
    /// shutdown with settle delays, kill the process, stop extensions.
    ///
    /// With `populated = false` configured and occupants present the call
    /// is a cheap no-op; the next tick re-evaluates. The `restart_pending`
    /// flag clears when a status report shows `Shutdown`.
    pub(crate) async fn shutdown(&self, name: &str) -> Result<(), EngineError> {
        let Some(config) = self.instance_config(name) else {
            return Ok(());
        };
        let instance = self.instance(name)?;
        if !config.populated && instance.populated {
            tracing::debug!(instance = name, "shutdown deferred: occupied");
            return Ok(());
        }
        if !self.registry.begin_transition(name) {
            return Ok(());
        }

        if instance.populated {
            if let Some(warn) = &config.warn {
                self.announce(name, &config, "shut down", warn.max_time())
                    .await;
            }
        }

        self.server.notify_mission_end(name).await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        self.server.notify_shutdown(name).await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        self.server.terminate(name).await?;
        self.stop_extensions(name, &config).await;
        tracing::info!(instance = name, "instance shut down");
        self.audit(name, "scheduled shutdown").await;
        Ok(())
    }

    /// Start configured extensions that are not already running. Failures
    /// are logged per extension and do not abort the launch.
    pub(crate) async fn start_extensions(&self, name: &str, config: &InstanceConfig) {
        for extension in &config.extensions {
            match self.server.extension_running(name, extension).await {
                Ok(true) => continue,
                Ok(false) => {
                    if let Err(e) = self.server.start_extension(name, extension).await {
                        tracing::warn!(instance = name, extension, error = %e, "extension start failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(instance = name, extension, error = %e, "extension state check failed");
                }
            }
        }
    }

    /// Stop configured extensions that are running, in reverse declaration
    /// order
    pub(crate) async fn stop_extensions(&self, name: &str, config: &InstanceConfig) {
        for extension in config.extensions.iter().rev() {
            match self.server.extension_running(name, extension).await {
                Ok(true) => {
                    if let Err(e) = self.server.stop_extension(name, extension).await {
                        tracing::warn!(instance = name, extension, error = %e, "extension stop failed");
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(instance = name, extension, error = %e, "extension state check failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
