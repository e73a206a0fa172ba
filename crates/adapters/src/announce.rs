// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public announcement publishing and editing

use async_trait::async_trait;
use ck_core::MessageId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnounceError {
    #[error("publish failed: {0}")]
    PublishFailed(String),
    #[error("no such announcement message: {0}")]
    MessageNotFound(MessageId),
}

/// Adapter trait for the announcement surface
///
/// A test's lifecycle is anchored to one published message: `publish`
/// creates it, `update` rewrites it when the test ends.
#[async_trait]
pub trait Announcer: Clone + Send + Sync + 'static {
    /// Publish a new announcement; returns the id of the created message
    async fn publish(&self, text: &str) -> Result<MessageId, AnnounceError>;

    /// Edit an existing announcement message
    async fn update(&self, message: MessageId, text: &str) -> Result<(), AnnounceError>;
}
