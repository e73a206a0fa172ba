// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort operator signals

use crate::notify::NotifyError;
use async_trait::async_trait;

/// Adapter trait for administrator-facing signals
///
/// Deliveries are best-effort: callers log a failure and move on, they never
/// retry and never let it abort the surrounding operation.
#[async_trait]
pub trait AdminSignal: Clone + Send + Sync + 'static {
    async fn notify_admin(&self, text: &str) -> Result<(), NotifyError>;
}
