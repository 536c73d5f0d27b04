// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recurring time-window matching for schedule rules
//!
//! A [`WindowSpec`] is one or more `HH:MM-HH:MM` ranges. Containment is
//! closed-open: the start minute is inside the window, the end minute is
//! not. A range whose end is earlier than its start crosses midnight.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a window specifier or day-state string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowParseError {
    #[error("invalid time range: {0}")]
    InvalidRange(String),
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
    #[error("day states must be 7 characters over Y/N/P/-, got: {0}")]
    InvalidDayStates(String),
}

/// A single `HH:MM-HH:MM` range, possibly crossing midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    /// Closed-open containment: `[start, end)`.
    ///
    /// A midnight-crossing range (`end < start`) matches times at or after
    /// `start` and times before `end`. A degenerate range with
    /// `start == end` matches nothing.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.start == self.end {
            false
        } else if self.start < self.end {
            t >= self.start && t < self.end
        } else {
            t >= self.start || t < self.end
        }
    }
}

impl FromStr for TimeRange {
    type Err = WindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| WindowParseError::InvalidRange(s.to_string()))?;
        Ok(Self {
            start: parse_time(start.trim())?,
            end: parse_time(end.trim())?,
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, WindowParseError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| WindowParseError::InvalidTime(s.to_string()))
}

/// One or more time ranges, matched as a union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WindowSpec {
    ranges: Vec<TimeRange>,
}

impl WindowSpec {
    /// True if the time-of-day falls inside any range of the window
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.ranges.iter().any(|r| r.contains(t))
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }
}

impl FromStr for WindowSpec {
    type Err = WindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranges = s
            .split(',')
            .map(|part| part.trim().parse())
            .collect::<Result<Vec<TimeRange>, _>>()?;
        if ranges.is_empty() {
            return Err(WindowParseError::InvalidRange(s.to_string()));
        }
        Ok(Self { ranges })
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl TryFrom<String> for WindowSpec {
    type Error = WindowParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<WindowSpec> for String {
    fn from(w: WindowSpec) -> Self {
        w.to_string()
    }
}

/// Per-weekday scheduling code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    /// `Y` - the server must be up
    Up,
    /// `N` - the server must be down
    Down,
    /// `P` - the server must be down, but only once unpopulated
    DownIfEmpty,
    /// `-` - no constraint
    Ignore,
}

impl DayState {
    fn from_char(c: char) -> Result<Self, ()> {
        match c.to_ascii_uppercase() {
            'Y' => Ok(DayState::Up),
            'N' => Ok(DayState::Down),
            'P' => Ok(DayState::DownIfEmpty),
            '-' => Ok(DayState::Ignore),
            _ => Err(()),
        }
    }

    fn as_char(self) -> char {
        match self {
            DayState::Up => 'Y',
            DayState::Down => 'N',
            DayState::DownIfEmpty => 'P',
            DayState::Ignore => '-',
        }
    }
}

/// Seven day-state codes, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayStates([DayState; 7]);

impl DayStates {
    /// The code for the given weekday
    pub fn on(&self, day: Weekday) -> DayState {
        self.0[day.num_days_from_monday() as usize]
    }
}

impl FromStr for DayStates {
    type Err = WindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 7 {
            return Err(WindowParseError::InvalidDayStates(s.to_string()));
        }
        let mut states = [DayState::Ignore; 7];
        for (i, c) in chars.into_iter().enumerate() {
            states[i] =
                DayState::from_char(c).map_err(|_| WindowParseError::InvalidDayStates(s.to_string()))?;
        }
        Ok(Self(states))
    }
}

impl fmt::Display for DayStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for state in self.0 {
            write!(f, "{}", state.as_char())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for DayStates {
    type Error = WindowParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DayStates> for String {
    fn from(d: DayStates) -> Self {
        d.to_string()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
