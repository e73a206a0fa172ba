// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use chrono::{DateTime, Utc};
use ck_core::{
    Completion, Game, GameCode, GameId, GameTest, Operation, ParticipantId, TestId, TestKey,
    TestStatus,
};
use std::collections::{BTreeMap, HashMap};

/// Materialized state built from WAL operations
///
/// Codes live in a BTreeMap so "any unclaimed code" selection is
/// deterministic; selection order carries no semantics.
#[derive(Debug, Default)]
pub struct MaterializedState {
    pub games: HashMap<GameId, Game>,
    pub codes: BTreeMap<String, GameCode>,
    pub tests: HashMap<TestId, GameTest>,
    pub completions: Vec<Completion>,
    by_message: HashMap<ck_core::MessageId, TestId>,
}

impl MaterializedState {
    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::GameCreate { name } => {
                self.games.insert(name.clone(), Game { name: name.clone() });
            }

            Operation::CodesAdd { game, codes } => {
                for code in codes {
                    // Replay-safe: an existing code (claimed or not) wins
                    self.codes
                        .entry(code.clone())
                        .or_insert_with(|| GameCode::new(code.clone(), game.clone()));
                }
            }

            Operation::CodesRemove { codes } => {
                for code in codes {
                    self.codes.remove(code);
                }
            }

            Operation::CodeClaim {
                code,
                participant,
                test,
            } => {
                if let Some(entry) = self.codes.get_mut(code) {
                    entry.claimed_by = Some(*participant);
                    entry.claimed_in = Some(test.clone());
                }
            }

            Operation::CodeRelease { code } => {
                if let Some(entry) = self.codes.get_mut(code) {
                    entry.claimed_by = None;
                    entry.claimed_in = None;
                }
            }

            Operation::TestCreate {
                id,
                game,
                message,
                end,
                feedback,
            } => {
                self.tests.insert(
                    id.clone(),
                    GameTest {
                        id: id.clone(),
                        game: game.clone(),
                        message: *message,
                        end: *end,
                        status: TestStatus::Started,
                        feedback: feedback.clone(),
                    },
                );
                self.by_message.insert(*message, id.clone());
            }

            Operation::TestStatusSet { id, status } => {
                if let Some(test) = self.tests.get_mut(id) {
                    test.status = *status;
                }
            }

            Operation::TestEndSet { id, end } => {
                if let Some(test) = self.tests.get_mut(id) {
                    test.end = *end;
                }
            }

            Operation::CompletionAppend { test, participant } => {
                let exists = self
                    .completions
                    .iter()
                    .any(|c| &c.test == test && c.participant == *participant);
                if !exists {
                    self.completions.push(Completion {
                        test: test.clone(),
                        participant: *participant,
                    });
                }
            }
        }
    }

    /// Resolve a test by either identifier
    pub fn test(&self, key: &TestKey) -> Option<&GameTest> {
        match key {
            TestKey::ById(id) => self.tests.get(id),
            TestKey::ByMessage(message) => {
                self.by_message.get(message).and_then(|id| self.tests.get(id))
            }
        }
    }

    /// Any unclaimed code for the given game
    pub fn unclaimed_code(&self, game: &GameId) -> Option<&GameCode> {
        self.codes
            .values()
            .find(|c| &c.game == game && c.is_unclaimed())
    }

    /// Number of unclaimed codes remaining for a game
    pub fn count_unclaimed(&self, game: &GameId) -> usize {
        self.codes
            .values()
            .filter(|c| &c.game == game && c.is_unclaimed())
            .count()
    }

    /// The code a participant already holds for a game, if any
    pub fn code_held_by(&self, participant: ParticipantId, game: &GameId) -> Option<&GameCode> {
        self.codes
            .values()
            .find(|c| &c.game == game && c.claimed_by == Some(participant))
    }

    /// Tests in the given status whose end time falls before the threshold
    pub fn tests_crossing(&self, status: TestStatus, before: DateTime<Utc>) -> Vec<GameTest> {
        let mut hits: Vec<GameTest> = self
            .tests
            .values()
            .filter(|t| t.status == status && t.end <= before)
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.end.cmp(&b.end));
        hits
    }

    /// Completions recorded for a test
    pub fn completions_for(&self, test: &TestId) -> Vec<Completion> {
        self.completions
            .iter()
            .filter(|c| &c.test == test)
            .cloned()
            .collect()
    }

    /// Codes claimed under a test
    pub fn codes_claimed_in(&self, test: &TestId) -> Vec<GameCode> {
        self.codes
            .values()
            .filter(|c| c.claimed_in.as_ref() == Some(test))
            .cloned()
            .collect()
    }

    /// Whether any test already uses this feedback reference
    pub fn feedback_in_use(&self, feedback: &str) -> bool {
        self.tests
            .values()
            .any(|t| t.feedback.as_deref() == Some(feedback))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
