// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative operations
//!
//! These run concurrently with the loop; every transient-flag mutation
//! goes through the registry's mutex so the two never race. Configuration
//! and format problems come back as errors for the caller; they are never
//! fatal to the loop.

use crate::error::EngineError;
use crate::scheduler::Scheduler;
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{
    DeferredAction, InstanceStatus, ManagedInstance, Preset, SchedulerError, WallClock,
};

/// What `set_preset` did with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPresetOutcome {
    /// The preset was applied to the descriptor immediately
    Applied,
    /// The instance is occupied; the change runs once it empties
    Deferred,
}

impl<S, M, N, P, C> Scheduler<S, M, N, P, C>
where
    S: ServerLink,
    M: MissionStore,
    N: Notifier,
    P: ProcessControl,
    C: WallClock,
{
    /// Engage the maintenance override: the loop leaves the instance alone
    /// until the flag is cleared
    pub async fn set_maintenance(&self, name: &str) -> Result<(), EngineError> {
        if !self.registry.set_maintenance(name) {
            return Err(EngineError::UnknownInstance(name.to_string()));
        }
        self.audit(name, "maintenance engaged").await;
        Ok(())
    }

    /// Clear the maintenance override so the loop resumes managing the
    /// instance. Returns whether the flag was actually set.
    pub async fn clear_maintenance(&self, name: &str) -> Result<bool, EngineError> {
        let was_set = self
            .registry
            .clear_maintenance(name)
            .ok_or_else(|| EngineError::UnknownInstance(name.to_string()))?;
        if was_set {
            self.audit(name, "maintenance cleared").await;
        }
        Ok(was_set)
    }

    /// Apply a named preset on request.
    ///
    /// Only a stopped or shut-down instance takes the change immediately.
    /// An occupied running instance gets a deferred action that the loop
    /// runs once the instance empties; an unoccupied running instance is
    /// rejected (stop it, or let the loop handle it).
    pub async fn set_preset(
        &self,
        name: &str,
        preset_name: &str,
    ) -> Result<SetPresetOutcome, EngineError> {
        let config = self
            .instance_config(name)
            .ok_or_else(|| EngineError::UnknownInstance(name.to_string()))?;
        if !config.presets.contains_key(preset_name) {
            return Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("unknown preset: {}", preset_name),
            )));
        }
        let instance = self.instance(name)?;

        match instance.status {
            InstanceStatus::Stopped | InstanceStatus::Shutdown => {
                self.apply_preset(name, Some(preset_name)).await?;
                Ok(SetPresetOutcome::Applied)
            }
            _ if instance.populated => {
                self.registry.set_deferred(
                    name,
                    DeferredAction::ApplyPreset {
                        preset: preset_name.to_string(),
                    },
                );
                self.audit(name, &format!("preset {} deferred until empty", preset_name))
                    .await;
                Ok(SetPresetOutcome::Deferred)
            }
            status => Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("instance is {}; stop it before changing presets", status),
            ))),
        }
    }

    /// Snapshot the current descriptor's parameters as a new named preset
    /// and persist the configuration.
    ///
    /// Requires the instance to be up so the descriptor on disk is the one
    /// actually in use. Refuses to overwrite unless asked to.
    pub async fn add_preset(
        &self,
        name: &str,
        preset_name: &str,
        overwrite: bool,
    ) -> Result<(), EngineError> {
        let config = self
            .instance_config(name)
            .ok_or_else(|| EngineError::UnknownInstance(name.to_string()))?;
        let instance = self.instance(name)?;
        if !instance.status.is_up() {
            return Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("instance is {}; start it to snapshot its mission", instance.status),
            )));
        }
        if !overwrite && config.presets.contains_key(preset_name) {
            return Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("preset {} already exists", preset_name),
            )));
        }
        let path = instance
            .mission_file
            .or_else(|| config.mission.clone())
            .ok_or_else(|| {
                EngineError::Scheduler(SchedulerError::Configuration(format!(
                    "no mission descriptor configured for instance {}",
                    name
                )))
            })?;
        let data = self
            .missions
            .load(&path)
            .await
            .map_err(|e| EngineError::Scheduler(SchedulerError::MissionFormat(e.to_string())))?;
        let preset = Preset::from_mission(&data);

        let snapshot = {
            let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
            if let Some(cfg) = config.instances.get_mut(name) {
                cfg.presets.insert(preset_name.to_string(), preset);
            }
            config.clone()
        };
        if let Some(path) = &self.config_path {
            snapshot.save(path)?;
        }
        self.audit(name, &format!("preset {} added", preset_name)).await;
        Ok(())
    }

    /// Run the configured reset commands against the mission. Requires a
    /// stopped or shut-down instance.
    pub async fn reset_mission(&self, name: &str) -> Result<(), EngineError> {
        let config = self
            .instance_config(name)
            .ok_or_else(|| EngineError::UnknownInstance(name.to_string()))?;
        let instance = self.instance(name)?;
        if !matches!(
            instance.status,
            InstanceStatus::Stopped | InstanceStatus::Shutdown
        ) {
            return Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("instance is {}; stop it before resetting", instance.status),
            )));
        }
        let Some(reset) = &config.reset else {
            return Err(EngineError::Scheduler(SchedulerError::Configuration(
                format!("no reset commands configured for instance {}", name),
            )));
        };
        for command in reset.commands() {
            self.server.run_command(name, command).await?;
        }
        self.audit(name, "mission reset").await;
        Ok(())
    }

    /// Current managed-instance snapshot
    pub fn status(&self, name: &str) -> Result<ManagedInstance, EngineError> {
        self.instance(name)
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
