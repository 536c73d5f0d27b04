// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external collaborators of the scheduler:
//! the server process link, the mission descriptor store, the notifier,
//! and OS process control.

pub mod mission;
pub mod notify;
pub mod process;
pub mod server;

pub use mission::{JsonMissionStore, MissionError, MissionStore};
pub use notify::{LogNotifier, Notifier, NotifyError};
pub use process::{OsProcessControl, ProcessControl, ProcessError};
pub use server::{ServerError, ServerLink, UdpServerLink};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use mission::FakeMissionStore;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifier, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessControl, ProcessCall};
#[cfg(any(test, feature = "test-support"))]
pub use server::{FakeServerLink, ServerCall};
