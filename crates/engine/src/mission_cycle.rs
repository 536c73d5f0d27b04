// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission-cycle controller: in-session restart and rotation
//!
//! [`should_cycle`] is the pure trigger check; `Scheduler::restart_mission`
//! carries out the configured transition method. Both share the lifecycle
//! controller's `restart_pending` guard, so a session transition and a
//! lifecycle transition are mutually exclusive per instance.

use crate::error::EngineError;
use crate::preset::resolve_settings;
use crate::scheduler::{Scheduler, SETTLE_DELAY};
use chrono::{Duration, NaiveDateTime};
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{
    InstanceConfig, InstanceStatus, ManagedInstance, RestartMethod, SchedulerError, WallClock,
};

/// Bounded confirmation poll for the stop/start round trip: up to 30
/// one-second checks
const STOP_POLL_ATTEMPTS: u32 = 30;
const STOP_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Whether the session is due for a transition at `now`.
///
/// The elapsed-time trigger takes precedence when configured; otherwise
/// the local-time windows are checked. Both compare against the warned
/// lookahead (`now + max(warn.times)` while occupied) so the transition
/// lands where the trigger says, not where the countdown started.
pub fn should_cycle(
    config: &InstanceConfig,
    instance: &ManagedInstance,
    now: NaiveDateTime,
) -> bool {
    let Some(restart) = &config.restart else {
        return false;
    };
    let grace = if instance.populated {
        config.warn.as_ref().map(|w| w.max_time()).unwrap_or(0)
    } else {
        0
    };

    if let Some(minutes) = restart.mission_time {
        return instance.mission_time_secs + grace >= minutes * 60;
    }
    let lookahead = (now + Duration::seconds(grace as i64)).time();
    restart
        .local_times
        .iter()
        .any(|window| window.contains(lookahead))
}

impl<S, M, N, P, C> Scheduler<S, M, N, P, C>
where
    S: ServerLink,
    M: MissionStore,
    N: Notifier,
    P: ProcessControl,
    C: WallClock,
{
    /// Carry out the configured in-session transition.
    ///
    /// For the restart methods, preset resolution happens before any
    /// announcement or command so a configuration error aborts with no
    /// side effects. Rotation never resolves presets: the next mission's
    /// settings are the external process's concern. The occupancy guard
    /// mirrors the lifecycle controller: `restart.populated = false`
    /// with occupants present is a cheap no-op, re-checked next tick.
    pub(crate) async fn restart_mission(&self, name: &str) -> Result<(), EngineError> {
        let Some(config) = self.instance_config(name) else {
            return Ok(());
        };
        let Some(restart) = config.restart.clone() else {
            return Ok(());
        };
        let instance = self.instance(name)?;
        if !restart.populated && instance.populated {
            tracing::debug!(instance = name, "session transition deferred: occupied");
            return Ok(());
        }

        let resolved = match restart.method {
            RestartMethod::Rotate => None,
            _ => resolve_settings(&config, self.clock.now())?,
        };

        if !self.registry.begin_transition(name) {
            return Ok(());
        }

        if instance.populated {
            if let Some(warn) = &config.warn {
                let what = match restart.method {
                    RestartMethod::Rotate => "load the next mission",
                    _ => "restart",
                };
                self.announce(name, &config, what, warn.max_time()).await;
            }
        }

        self.server.notify_mission_end(name).await?;
        tokio::time::sleep(SETTLE_DELAY).await;

        match restart.method {
            RestartMethod::RestartWithShutdown => {
                self.server.notify_shutdown(name).await?;
                tokio::time::sleep(SETTLE_DELAY).await;
                self.server.terminate(name).await?;
                self.stop_extensions(name, &config).await;
                if let Some(preset) = resolved.as_deref() {
                    self.apply_preset(name, Some(preset)).await?;
                }
                self.server.launch(name).await?;
                self.start_extensions(name, &config).await;
            }
            RestartMethod::Restart => {
                if let Some(preset) = resolved.as_deref() {
                    self.server.stop_server(name).await?;
                    if let Err(e) = self.await_stopped(name).await {
                        tracing::warn!(instance = name, error = %e, "proceeding without stop confirmation");
                    }
                    self.apply_preset(name, Some(preset)).await?;
                    self.server.start_server(name).await?;
                } else {
                    self.server.restart_mission(name).await?;
                }
            }
            RestartMethod::Rotate => {
                self.server.start_next_mission(name).await?;
            }
        }

        tracing::info!(instance = name, method = ?restart.method, "session transition issued");
        self.audit(name, "scheduled mission restart").await;
        Ok(())
    }

    /// Poll the registry until the instance reports `Stopped`, up to the
    /// bounded retry budget
    async fn await_stopped(&self, name: &str) -> Result<(), SchedulerError> {
        for _ in 0..STOP_POLL_ATTEMPTS {
            if self
                .registry
                .get(name)
                .is_some_and(|i| i.status == InstanceStatus::Stopped)
            {
                return Ok(());
            }
            tokio::time::sleep(STOP_POLL_INTERVAL).await;
        }
        Err(SchedulerError::Timeout(format!(
            "{} did not confirm stop within {} seconds",
            name, STOP_POLL_ATTEMPTS
        )))
    }
}

#[cfg(test)]
#[path = "mission_cycle_tests.rs"]
mod tests;
