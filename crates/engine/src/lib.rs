// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! simward-engine: the scheduling controllers
//!
//! One [`Scheduler`] instance drives everything: the per-minute loop, the
//! lifecycle (start/stop) controller, the mission-cycle (restart/rotate)
//! controller, and the administrative operations. Pure decision functions
//! are split from the effectful execution paths so the rules are testable
//! with a fake clock alone.

pub mod admin;
pub mod announce;
pub mod error;
pub mod lifecycle;
pub mod mission_cycle;
pub mod preset;
pub mod scheduler;

pub use admin::SetPresetOutcome;
pub use announce::{format_countdown, WarningPlan, WarningStep};
pub use error::EngineError;
pub use lifecycle::desired_status;
pub use mission_cycle::should_cycle;
pub use preset::{apply_overlay, resolve_settings};
pub use scheduler::Scheduler;
