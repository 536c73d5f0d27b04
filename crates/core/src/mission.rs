// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission descriptor data
//!
//! [`MissionData`] is the environmental parameter set of a mission
//! descriptor as seen by this crate. How the descriptor is stored on disk
//! is the mission-store adapter's concern.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wind at a single altitude layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindLayer {
    /// Speed in m/s
    pub speed: i64,
    /// Direction in degrees the wind blows from
    pub dir: i64,
}

/// Wind at the three standard layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_ground: Option<WindLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "at2000")]
    pub at_2000: Option<WindLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "at8000")]
    pub at_8000: Option<WindLayer>,
}

/// Fog parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fog {
    /// Visibility in meters
    pub visibility: i64,
    /// Fog layer thickness in meters
    pub thickness: i64,
}

/// Environmental parameters of a mission descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionData {
    /// Mission start time in seconds since local midnight
    pub start_time: u32,
    /// Mission calendar date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Temperature in degrees Celsius
    pub temperature: i64,
    /// Opaque cloud/weather preset identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<String>,
    #[serde(default)]
    pub wind: Wind,
    pub ground_turbulence: i64,
    pub dust_density: i64,
    /// Sea-level pressure in mmHg
    pub qnh: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fog: Option<Fog>,
    /// Opaque halo preset identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<String>,
}

/// A named, immutable-at-use-time bundle of environmental parameters.
///
/// Applied as a sparse overlay: fields absent from the preset leave the
/// corresponding descriptor field untouched. The date is kept as the raw
/// `YYYY-MM-DD` string and parsed at apply time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_turbulence: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dust_density: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qnh: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fog: Option<Fog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<String>,
}

impl Preset {
    /// Snapshot the environmental parameters of a descriptor into a preset
    pub fn from_mission(data: &MissionData) -> Self {
        Self {
            start_time: Some(data.start_time),
            date: data.date.map(|d| d.format("%Y-%m-%d").to_string()),
            temperature: Some(data.temperature),
            clouds: data.clouds.clone(),
            wind: Some(data.wind),
            ground_turbulence: Some(data.ground_turbulence),
            dust_density: Some(data.dust_density),
            qnh: Some(data.qnh),
            fog: data.fog,
            halo: data.halo.clone(),
        }
    }
}
