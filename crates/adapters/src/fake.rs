// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake adapters for testing

use crate::admin::AdminSignal;
use crate::announce::{AnnounceError, Announcer};
use crate::notify::{Notifier, NotifyError};
use async_trait::async_trait;
use ck_core::{MessageId, ParticipantId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A recorded direct message
#[derive(Debug, Clone)]
pub struct DirectMessage {
    pub to: ParticipantId,
    pub text: String,
}

/// A recorded channel message
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub channel: String,
    pub text: String,
}

/// Fake notifier recording every send, with per-participant failure injection
#[derive(Clone, Default)]
pub struct FakeNotifier {
    directs: Arc<Mutex<Vec<DirectMessage>>>,
    channels: Arc<Mutex<Vec<ChannelMessage>>>,
    unreachable: Arc<Mutex<HashSet<ParticipantId>>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make direct sends to this participant fail with Unreachable
    pub fn set_unreachable(&self, participant: ParticipantId) {
        self.unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(participant);
    }

    /// Allow direct sends to this participant again
    pub fn set_reachable(&self, participant: ParticipantId) {
        self.unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&participant);
    }

    /// All recorded direct messages
    pub fn directs(&self) -> Vec<DirectMessage> {
        self.directs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// All recorded channel messages
    pub fn channels(&self) -> Vec<ChannelMessage> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_direct(&self, to: ParticipantId, text: &str) -> Result<(), NotifyError> {
        if self
            .unreachable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&to)
        {
            return Err(NotifyError::Unreachable(to));
        }
        self.directs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DirectMessage {
                to,
                text: text.to_string(),
            });
        Ok(())
    }

    async fn send_channel(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ChannelMessage {
                channel: channel.to_string(),
                text: text.to_string(),
            });
        Ok(())
    }
}

/// A recorded announcement edit
#[derive(Debug, Clone)]
pub struct AnnouncementEdit {
    pub message: MessageId,
    pub text: String,
}

/// Fake announcer handing out sequential message ids
#[derive(Clone)]
pub struct FakeAnnouncer {
    published: Arc<Mutex<Vec<(MessageId, String)>>>,
    updates: Arc<Mutex<Vec<AnnouncementEdit>>>,
    next_id: Arc<AtomicU64>,
    failing: Arc<Mutex<bool>>,
}

impl Default for FakeAnnouncer {
    fn default() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(100)),
            failing: Arc::new(Mutex::new(false)),
        }
    }
}

impl FakeAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make publish and update fail until cleared
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    pub fn published(&self) -> Vec<(MessageId, String)> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn updates(&self) -> Vec<AnnouncementEdit> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_failing(&self) -> bool {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Announcer for FakeAnnouncer {
    async fn publish(&self, text: &str) -> Result<MessageId, AnnounceError> {
        if self.is_failing() {
            return Err(AnnounceError::PublishFailed("injected failure".into()));
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, text.to_string()));
        Ok(id)
    }

    async fn update(&self, message: MessageId, text: &str) -> Result<(), AnnounceError> {
        if self.is_failing() {
            return Err(AnnounceError::PublishFailed("injected failure".into()));
        }
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(AnnouncementEdit {
                message,
                text: text.to_string(),
            });
        Ok(())
    }
}

/// Fake admin signal recording every message
#[derive(Clone, Default)]
pub struct FakeAdmin {
    signals: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    pub fn signals(&self) -> Vec<String> {
        self.signals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AdminSignal for FakeAdmin {
    async fn notify_admin(&self, text: &str) -> Result<(), NotifyError> {
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(NotifyError::Failed("injected failure".into()));
        }
        self.signals
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
