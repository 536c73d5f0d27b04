// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapter
//!
//! Audit records and side-channel chat messages to operators. Delivery is
//! best-effort: the scheduler logs failures and carries on.

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifier, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Adapter for operator-facing notifications
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    /// Record an audit-worthy scheduler action
    async fn audit(&self, instance: &str, message: &str) -> Result<(), NotifyError>;

    /// Post to the instance's side channel (chat)
    async fn chat(&self, instance: &str, message: &str) -> Result<(), NotifyError>;
}

/// Notifier that writes to the log only
#[derive(Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn audit(&self, instance: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(instance, message, "audit");
        Ok(())
    }

    async fn chat(&self, instance: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(instance, message, "chat");
        Ok(())
    }
}
