// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing

use super::{Notifier, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyCall {
    Audit { instance: String, message: String },
    Chat { instance: String, message: String },
}

/// Fake notifier for testing
#[derive(Clone, Default)]
pub struct FakeNotifier {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded chat messages for one instance
    pub fn chats(&self, instance: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                NotifyCall::Chat {
                    instance: i,
                    message,
                } if i == instance => Some(message),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn audit(&self, instance: &str, message: &str) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotifyCall::Audit {
                instance: instance.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }

    async fn chat(&self, instance: &str, message: &str) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NotifyCall::Chat {
                instance: instance.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }
}
