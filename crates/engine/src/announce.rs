// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warning countdown announcements
//!
//! A [`WarningPlan`] is the pure schedule of a countdown: which
//! checkpoints fire, in which order, and how long to wait between them.
//! `Scheduler::announce` walks the plan, emitting an in-game popup and a
//! side-channel chat message at each checkpoint, then waits out the
//! remainder so the caller resumes exactly when the countdown hits zero.
//!
//! An announced action always completes: depopulation or maintenance
//! engaging mid-countdown does not cancel it.

use crate::scheduler::Scheduler;
use simward_adapters::{MissionStore, Notifier, ProcessControl, ServerLink};
use simward_core::{InstanceConfig, WallClock};
use std::time::Duration;

/// Default warning template when none is configured
pub(crate) const DEFAULT_WARN_TEXT: &str = "!!! Server will {what} in {when} !!!";

/// One checkpoint of a countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningStep {
    /// Wait before this checkpoint fires, relative to the previous one
    pub delay: Duration,
    /// Seconds remaining when it fires
    pub remaining_secs: u64,
}

/// The full schedule of a warned countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningPlan {
    pub steps: Vec<WarningStep>,
    /// Wait after the last checkpoint until the countdown reaches zero
    pub final_delay: Duration,
}

impl WarningPlan {
    /// Build the plan for a countdown of `countdown_secs`, firing the
    /// given checkpoints in descending order. Checkpoints longer than the
    /// countdown itself are dropped; duplicates fire once.
    pub fn new(times: &[u64], countdown_secs: u64) -> Self {
        let mut marks: Vec<u64> = times
            .iter()
            .copied()
            .filter(|t| *t > 0 && *t <= countdown_secs)
            .collect();
        marks.sort_unstable_by(|a, b| b.cmp(a));
        marks.dedup();

        let mut steps = Vec::with_capacity(marks.len());
        let mut elapsed = 0u64;
        for mark in marks {
            let fire_at = countdown_secs - mark;
            steps.push(WarningStep {
                delay: Duration::from_secs(fire_at - elapsed),
                remaining_secs: mark,
            });
            elapsed = fire_at;
        }
        Self {
            steps,
            final_delay: Duration::from_secs(countdown_secs - elapsed),
        }
    }

    /// Total countdown duration
    pub fn total(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum::<Duration>() + self.final_delay
    }
}

/// Render a remaining duration the way operators read it, e.g.
/// "10 minutes" or "1 minute 30 seconds"
pub fn format_countdown(secs: u64) -> String {
    let (hours, rest) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} hour{}", hours, plural(hours)));
    }
    if minutes > 0 {
        parts.push(format!("{} minute{}", minutes, plural(minutes)));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{} second{}", seconds, plural(seconds)));
    }
    parts.join(" ")
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Fill the `{what}` and `{when}` placeholders of a warning template
pub(crate) fn warning_message(template: Option<&str>, what: &str, when: &str) -> String {
    template
        .unwrap_or(DEFAULT_WARN_TEXT)
        .replace("{what}", what)
        .replace("{when}", when)
}

impl<S, M, N, P, C> Scheduler<S, M, N, P, C>
where
    S: ServerLink,
    M: MissionStore,
    N: Notifier,
    P: ProcessControl,
    C: WallClock,
{
    /// Count down `countdown_secs`, announcing each configured checkpoint,
    /// and return once the countdown reaches zero.
    ///
    /// Notification failures are logged and do not interrupt the countdown.
    pub(crate) async fn announce(
        &self,
        name: &str,
        config: &InstanceConfig,
        what: &str,
        countdown_secs: u64,
    ) {
        let Some(warn) = &config.warn else {
            return;
        };
        let plan = WarningPlan::new(&warn.times, countdown_secs);
        let timeout = self.message_timeout();

        for step in &plan.steps {
            tokio::time::sleep(step.delay).await;
            let message = warning_message(
                warn.text.as_deref(),
                what,
                &format_countdown(step.remaining_secs),
            );
            if let Err(e) = self.server.send_popup(name, &message, "all", timeout).await {
                tracing::warn!(instance = name, error = %e, "popup warning failed");
            }
            if let Err(e) = self.notifier.chat(name, &message).await {
                tracing::warn!(instance = name, error = %e, "chat warning failed");
            }
        }
        tokio::time::sleep(plan.final_delay).await;
    }
}

#[cfg(test)]
#[path = "announce_tests.rs"]
mod tests;
