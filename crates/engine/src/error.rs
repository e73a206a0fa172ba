// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use ck_adapters::AnnounceError;
use ck_core::ParticipantId;
use ck_storage::LedgerError;
use thiserror::Error;

/// Errors surfaced by the claim coordinator
///
/// Lost races, empty pools and ended tests are [`crate::ClaimOutcome`]
/// variants, not errors; these cover genuine failures.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    /// The code was claimed but could not be delivered; the claim was
    /// rolled back and the code returned to the pool
    #[error("could not deliver code to participant {0}")]
    Undeliverable(ParticipantId),
}

/// Errors surfaced by the lifecycle scheduler and admin operations
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("announce error: {0}")]
    Announce(#[from] AnnounceError),
}
