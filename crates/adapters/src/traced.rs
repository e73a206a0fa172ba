// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::notify::{Notifier, NotifyError};
use async_trait::async_trait;
use ck_core::ParticipantId;
use tracing::Instrument;

/// Wrapper that adds tracing to any Notifier
#[derive(Clone)]
pub struct TracedNotifier<N> {
    inner: N,
}

impl<N> TracedNotifier<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for TracedNotifier<N> {
    async fn send_direct(&self, to: ParticipantId, text: &str) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify.direct", participant = to.0);
        async {
            tracing::debug!(text_len = text.len(), "sending");

            let start = std::time::Instant::now();
            let result = self.inner.send_direct(to, text).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "delivered"),
                // Unreachable is an expected outcome the caller compensates for
                Err(NotifyError::Unreachable(_)) => {
                    tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "unreachable")
                }
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "send failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn send_channel(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let span = tracing::info_span!("notify.channel", channel);
        async {
            let result = self.inner.send_channel(channel, text).await;
            match &result {
                Ok(()) => tracing::debug!("posted"),
                Err(e) => tracing::error!(error = %e, "post failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
