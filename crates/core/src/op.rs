// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use crate::model::{GameId, MessageId, ParticipantId, TestId, TestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operations that can be persisted to the WAL
///
/// Every ledger mutation is expressed as one or more operations appended
/// atomically; materialized state is a pure fold over the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Register a new game
    GameCreate { name: GameId },

    /// Import a batch of unclaimed codes for a game
    CodesAdd { game: GameId, codes: Vec<String> },

    /// Remove codes by code string
    CodesRemove { codes: Vec<String> },

    /// Assign a code to a participant within a test
    CodeClaim {
        code: String,
        participant: ParticipantId,
        test: TestId,
    },

    /// Return a claimed code to the pool
    CodeRelease { code: String },

    /// Create a test for a published announcement
    TestCreate {
        id: TestId,
        game: GameId,
        message: MessageId,
        end: DateTime<Utc>,
        feedback: Option<String>,
    },

    /// Advance a test's lifecycle status
    TestStatusSet { id: TestId, status: TestStatus },

    /// Move a test's deadline (manual override)
    TestEndSet { id: TestId, end: DateTime<Utc> },

    /// Record that a participant submitted feedback
    CompletionAppend {
        test: TestId,
        participant: ParticipantId,
    },
}

#[cfg(test)]
#[path = "op_tests.rs"]
mod tests;
