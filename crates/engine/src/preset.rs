// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preset resolution and application
//!
//! A preset is a sparse overlay: only fields it carries replace those on
//! the descriptor. The descriptor is persisted exactly once after the full
//! overlay, so a failed save never leaves a half-written file behind.
//!
//! Preset references are validated here, at apply time, not at config load
//! time. An unknown name is a configuration error surfaced to whoever
//! triggered the apply, before the descriptor is touched.

use crate::error::EngineError;
use crate::scheduler::Scheduler;
use chrono::{NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{
    InstanceConfig, MissionData, Preset, RestartSettings, SchedulerError, WallClock,
};

/// Overlay the present fields of a preset onto a descriptor.
///
/// The date is carried as a `YYYY-MM-DD` string and parsed here; a
/// malformed date is a configuration error and leaves the descriptor
/// unchanged.
pub fn apply_overlay(data: &mut MissionData, preset: &Preset) -> Result<(), SchedulerError> {
    let date = preset
        .date
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                SchedulerError::Configuration(format!("invalid preset date: {}", raw))
            })
        })
        .transpose()?;

    if let Some(start_time) = preset.start_time {
        data.start_time = start_time;
    }
    if let Some(date) = date {
        data.date = Some(date);
    }
    if let Some(temperature) = preset.temperature {
        data.temperature = temperature;
    }
    if let Some(clouds) = &preset.clouds {
        data.clouds = Some(clouds.clone());
    }
    if let Some(wind) = preset.wind {
        data.wind = wind;
    }
    if let Some(ground_turbulence) = preset.ground_turbulence {
        data.ground_turbulence = ground_turbulence;
    }
    if let Some(dust_density) = preset.dust_density {
        data.dust_density = dust_density;
    }
    if let Some(qnh) = preset.qnh {
        data.qnh = qnh;
    }
    if let Some(fog) = preset.fog {
        data.fog = Some(fog);
    }
    if let Some(halo) = &preset.halo {
        data.halo = Some(halo.clone());
    }
    Ok(())
}

/// Resolve which preset the `restart.settings` policy names right now.
///
/// A window mapping picks the first matching rule in declaration order; a
/// candidate list picks uniformly at random. `Ok(None)` means no settings
/// are configured at all; configured settings that resolve to nothing are
/// a configuration error.
pub fn resolve_settings(
    config: &InstanceConfig,
    now: NaiveDateTime,
) -> Result<Option<String>, SchedulerError> {
    let Some(settings) = config.restart.as_ref().and_then(|r| r.settings.as_ref()) else {
        return Ok(None);
    };
    match settings {
        RestartSettings::ByWindow(rules) => rules
            .iter()
            .find(|rule| rule.window.contains(now.time()))
            .map(|rule| Some(rule.preset.clone()))
            .ok_or_else(|| {
                SchedulerError::Configuration("no preset found for current time".to_string())
            }),
        RestartSettings::Random(names) => names
            .choose(&mut rand::thread_rng())
            .map(|name| Some(name.clone()))
            .ok_or_else(|| {
                SchedulerError::Configuration("no preset candidates configured".to_string())
            }),
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
    /// Apply a preset to an instance's active mission descriptor.
    ///
    /// With `preset_name = None` the name is resolved from the instance's
    /// `restart.settings` policy first; resolution and lookup failures
    /// abort before the descriptor is loaded or mutated. The descriptor is
    /// saved exactly once.
    pub(crate) async fn apply_preset(
        &self,
        name: &str,
        preset_name: Option<&str>,
    ) -> Result<(), EngineError> {
        let config = self.instance_config(name).ok_or_else(|| {
            EngineError::Scheduler(SchedulerError::Configuration(format!(
                "no configuration for instance {}",
                name
            )))
        })?;

        let resolved = match preset_name {
            Some(n) => n.to_string(),
            None => match resolve_settings(&config, self.clock.now())? {
                Some(n) => n,
                None => return Ok(()),
            },
        };
        let preset = config.presets.get(&resolved).ok_or_else(|| {
            EngineError::Scheduler(SchedulerError::Configuration(format!(
                "unknown preset: {}",
                resolved
            )))
        })?;

        let instance = self.instance(name)?;
        let path = instance
            .mission_file
            .or_else(|| config.mission.clone())
            .ok_or_else(|| {
                EngineError::Scheduler(SchedulerError::Configuration(format!(
                    "no mission descriptor configured for instance {}",
                    name
                )))
            })?;

        let mut data = self
            .missions
            .load(&path)
            .await
            .map_err(|e| EngineError::Scheduler(SchedulerError::MissionFormat(e.to_string())))?;
        apply_overlay(&mut data, preset)?;
        self.missions
            .save(&path, &data)
            .await
            .map_err(|e| EngineError::Scheduler(SchedulerError::MissionFormat(e.to_string())))?;

        tracing::info!(instance = name, preset = %resolved, "applied preset to mission descriptor");
        self.audit(name, &format!("preset {} applied", resolved)).await;
        Ok(())
    }

    /// Apply whatever preset the settings policy resolves to right now, if
    /// any. Used ahead of a launch or in-place restart.
    pub(crate) async fn apply_resolved_settings(&self, name: &str) -> Result<(), EngineError> {
        self.apply_preset(name, None).await
    }
}

#[cfg(test)]
#[path = "preset_tests.rs"]
mod tests;
