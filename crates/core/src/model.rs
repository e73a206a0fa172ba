// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain model: games, codes, tests and completions
//!
//! The ledger exclusively owns values of these types; other components read
//! snapshots and request mutations through persisted operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique name of a game, normalized to lower-case with underscores
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    /// Normalize a human-entered name into a game id
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase().replace(' ', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant (chat user) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a test
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestId(pub String);

impl std::fmt::Display for TestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a published announcement message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a test
///
/// Transitions are unidirectional: Started -> Ending -> Ended. Ended is
/// permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestStatus {
    Started,
    Ending,
    Ended,
}

impl TestStatus {
    /// The next status in the lifecycle, if any
    pub fn next(self) -> Option<TestStatus> {
        match self {
            TestStatus::Started => Some(TestStatus::Ending),
            TestStatus::Ending => Some(TestStatus::Ended),
            TestStatus::Ended => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TestStatus::Ended)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TestStatus::Started => "started",
            TestStatus::Ending => "ending",
            TestStatus::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// Typed lookup key for a test
///
/// Resolved once at the boundary; a test is addressable either by its opaque
/// id or by the id of its announcement message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TestKey {
    ById(TestId),
    ByMessage(MessageId),
}

impl std::fmt::Display for TestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKey::ById(id) => write!(f, "test {}", id),
            TestKey::ByMessage(message) => write!(f, "announcement {}", message),
        }
    }
}

/// A game for which access codes are pooled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub name: GameId,
}

/// A single-use access code belonging to a game
///
/// Claimant and claiming test are set together, atomically, exactly once;
/// only an explicit release clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCode {
    pub code: String,
    pub game: GameId,
    pub claimed_by: Option<ParticipantId>,
    pub claimed_in: Option<TestId>,
}

impl GameCode {
    pub fn new(code: impl Into<String>, game: GameId) -> Self {
        Self {
            code: code.into(),
            game,
            claimed_by: None,
            claimed_in: None,
        }
    }

    pub fn is_unclaimed(&self) -> bool {
        self.claimed_by.is_none()
    }
}

/// A time-bounded event during which codes for a game are distributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTest {
    pub id: TestId,
    pub game: GameId,
    pub message: MessageId,
    pub end: DateTime<Utc>,
    pub status: TestStatus,
    /// Optional feedback-collection reference, unique across tests
    pub feedback: Option<String>,
}

impl std::fmt::Display for GameTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "test {}-{}: {} (ends at {})",
            self.game, self.message, self.status, self.end
        )
    }
}

/// Record that a participant submitted feedback for a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub test: TestId,
    pub participant: ParticipantId,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
