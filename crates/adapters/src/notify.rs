// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message delivery to participants and channels

use async_trait::async_trait;
use ck_core::ParticipantId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// The participant cannot receive direct messages
    #[error("participant {0} is unreachable")]
    Unreachable(ParticipantId),
    /// The channel send failed
    #[error("send failed: {0}")]
    Failed(String),
}

/// Adapter trait for message delivery
///
/// `send_direct` failing with [`NotifyError::Unreachable`] is an expected
/// condition the claim coordinator compensates for; it is not fatal.
#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    /// Deliver a private message to a single participant
    async fn send_direct(&self, to: ParticipantId, text: &str) -> Result<(), NotifyError>;

    /// Post a message to a named channel
    async fn send_channel(&self, channel: &str, text: &str) -> Result<(), NotifyError>;
}
