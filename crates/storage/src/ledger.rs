// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable ledger: the single source of truth for claim state
//!
//! One mutex guards the WAL and the materialized state together. Every write
//! appends its operations to the log and applies them to memory under a
//! single lock acquisition, so a multi-step mutation is never observable
//! half-applied and `conditional_claim` is a genuine compare-and-set.
//!
//! WAL append failures surface as [`LedgerError::Storage`] before any
//! in-memory change, so callers can distinguish infrastructure failures from
//! lost races.

use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use chrono::{DateTime, Utc};
use ck_core::{
    Completion, GameCode, GameId, GameTest, MessageId, Operation, ParticipantId, TestId, TestKey,
    TestStatus,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by ledger operations
///
/// Expected protocol outcomes (lost race, empty pool) are return values, not
/// errors; these variants cover lookups that fail and invariant violations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no such test: {0}")]
    TestNotFound(TestKey),

    #[error("no such game: {0}")]
    GameNotFound(GameId),

    #[error("a game named {0} already exists")]
    GameExists(GameId),

    #[error("no such code: {0}")]
    CodeNotFound(String),

    #[error("a test with id {0} already exists")]
    TestExists(TestId),

    #[error("announcement {0} already has a test")]
    MessageInUse(MessageId),

    #[error("feedback reference {0:?} already belongs to another test")]
    FeedbackInUse(String),

    #[error("cannot move test {id} from {from} to {to}")]
    StatusConflict {
        id: TestId,
        from: TestStatus,
        to: TestStatus,
    },

    #[error("storage error: {0}")]
    Storage(#[from] WalError),
}

/// Outcome of a [`Ledger::conditional_claim`] write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimWrite {
    /// The caller won the race. `drained_pool` is true when this claim took
    /// the game's last unclaimed code and no earlier claim already reported
    /// the drain; releasing a code or importing fresh ones re-arms it.
    Won { drained_pool: bool },
    /// Another claim consumed the code first
    Lost,
    /// The participant already holds a code for this game; carries that code
    AlreadyHolder(String),
}

struct Inner {
    wal: Wal,
    state: MaterializedState,
    /// Games whose pool drain has already been reported via a winning claim
    drained: HashSet<GameId>,
}

/// WAL-backed ledger of games, codes, tests and completions
pub struct Ledger {
    inner: Mutex<Inner>,
}

impl Ledger {
    /// Open the ledger, replaying any existing log into memory
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let wal = Wal::open(path)?;
        let mut state = MaterializedState::default();
        for op in Wal::replay(path)? {
            state.apply(&op);
        }
        tracing::info!(
            games = state.games.len(),
            codes = state.codes.len(),
            tests = state.tests.len(),
            "ledger loaded"
        );
        Ok(Self {
            inner: Mutex::new(Inner {
                wal,
                state,
                drained: HashSet::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append operations and apply them, all under the caller's lock
    fn commit(inner: &mut Inner, ops: &[Operation]) -> Result<(), LedgerError> {
        inner.wal.append_all(ops)?;
        for op in ops {
            inner.state.apply(op);
        }
        Ok(())
    }

    // ---- games and codes -------------------------------------------------

    /// Register a new game; the name is normalized by [`GameId::new`]
    pub fn create_game(&self, name: &GameId) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        if inner.state.games.contains_key(name) {
            return Err(LedgerError::GameExists(name.clone()));
        }
        Self::commit(&mut inner, &[Operation::GameCreate { name: name.clone() }])
    }

    /// Whether a game is registered
    pub fn has_game(&self, game: &GameId) -> bool {
        self.lock().state.games.contains_key(game)
    }

    /// Bulk-import codes for a game, skipping any already present anywhere
    ///
    /// Returns how many codes were actually imported.
    pub fn import_codes(&self, game: &GameId, codes: &[String]) -> Result<usize, LedgerError> {
        let mut inner = self.lock();
        if !inner.state.games.contains_key(game) {
            return Err(LedgerError::GameNotFound(game.clone()));
        }
        let fresh: Vec<String> = codes
            .iter()
            .filter(|c| !c.is_empty() && !inner.state.codes.contains_key(*c))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }
        let count = fresh.len();
        Self::commit(
            &mut inner,
            &[Operation::CodesAdd {
                game: game.clone(),
                codes: fresh,
            }],
        )?;
        inner.drained.remove(game);
        Ok(count)
    }

    /// Bulk-remove codes; unknown codes are ignored
    pub fn remove_codes(&self, codes: &[String]) -> Result<usize, LedgerError> {
        let mut inner = self.lock();
        let present: Vec<String> = codes
            .iter()
            .filter(|c| inner.state.codes.contains_key(*c))
            .cloned()
            .collect();
        if present.is_empty() {
            return Ok(0);
        }
        let count = present.len();
        Self::commit(&mut inner, &[Operation::CodesRemove { codes: present }])?;
        Ok(count)
    }

    /// Any unclaimed code for the game
    pub fn get_unclaimed_code(&self, game: &GameId) -> Option<String> {
        self.lock()
            .state
            .unclaimed_code(game)
            .map(|c| c.code.clone())
    }

    /// Number of unclaimed codes remaining for the game
    pub fn count_unclaimed(&self, game: &GameId) -> usize {
        self.lock().state.count_unclaimed(game)
    }

    /// The code a participant already holds for this game, if any
    pub fn find_code_held_by(
        &self,
        participant: ParticipantId,
        game: &GameId,
    ) -> Option<String> {
        self.lock()
            .state
            .code_held_by(participant, game)
            .map(|c| c.code.clone())
    }

    /// Compare-and-set claim: assign the code to the participant only if it
    /// is still unclaimed at write time
    ///
    /// The participant's existing holdings and the pool-drained decision are
    /// both evaluated under the same lock as the write: a participant racing
    /// their own request cannot win two codes, and exactly one winning claim
    /// observes `drained_pool` per drain of the pool. Infrastructure
    /// failures are `Err` and must not be read as a lost race.
    pub fn conditional_claim(
        &self,
        code: &str,
        participant: ParticipantId,
        test: &TestId,
    ) -> Result<ClaimWrite, LedgerError> {
        let mut inner = self.lock();
        let game = match inner.state.codes.get(code) {
            None => return Err(LedgerError::CodeNotFound(code.to_string())),
            Some(c) if !c.is_unclaimed() => return Ok(ClaimWrite::Lost),
            Some(c) => c.game.clone(),
        };
        if let Some(held) = inner.state.code_held_by(participant, &game) {
            return Ok(ClaimWrite::AlreadyHolder(held.code.clone()));
        }
        Self::commit(
            &mut inner,
            &[Operation::CodeClaim {
                code: code.to_string(),
                participant,
                test: test.clone(),
            }],
        )?;
        let drained_pool = inner.state.count_unclaimed(&game) == 0 && inner.drained.insert(game);
        Ok(ClaimWrite::Won { drained_pool })
    }

    /// Return a claimed code to the pool (rollback or admin release)
    pub fn release_claim(&self, code: &str) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        let game = match inner.state.codes.get(code) {
            None => return Err(LedgerError::CodeNotFound(code.to_string())),
            Some(c) => c.game.clone(),
        };
        Self::commit(
            &mut inner,
            &[Operation::CodeRelease {
                code: code.to_string(),
            }],
        )?;
        // The pool is no longer drained; the next drain reports again
        inner.drained.remove(&game);
        Ok(())
    }

    // ---- tests -----------------------------------------------------------

    /// Create a test bound to a freshly published announcement
    pub fn create_test(
        &self,
        id: TestId,
        game: &GameId,
        message: MessageId,
        end: DateTime<Utc>,
        feedback: Option<String>,
    ) -> Result<GameTest, LedgerError> {
        let mut inner = self.lock();
        if !inner.state.games.contains_key(game) {
            return Err(LedgerError::GameNotFound(game.clone()));
        }
        if inner.state.test(&TestKey::ById(id.clone())).is_some() {
            return Err(LedgerError::TestExists(id));
        }
        if inner.state.test(&TestKey::ByMessage(message)).is_some() {
            return Err(LedgerError::MessageInUse(message));
        }
        if let Some(reference) = &feedback {
            if inner.state.feedback_in_use(reference) {
                return Err(LedgerError::FeedbackInUse(reference.clone()));
            }
        }
        Self::commit(
            &mut inner,
            &[Operation::TestCreate {
                id: id.clone(),
                game: game.clone(),
                message,
                end,
                feedback,
            }],
        )?;
        let key = TestKey::ById(id);
        inner
            .state
            .test(&key)
            .cloned()
            .ok_or(LedgerError::TestNotFound(key))
    }

    /// Resolve a test by id or announcement message
    pub fn get_test(&self, key: &TestKey) -> Result<GameTest, LedgerError> {
        self.lock()
            .state
            .test(key)
            .cloned()
            .ok_or_else(|| LedgerError::TestNotFound(key.clone()))
    }

    /// Advance a test's status by exactly one lifecycle step
    ///
    /// Any other write is a conflict: transitions are unidirectional and a
    /// stale writer must find out, not silently regress the state machine.
    pub fn set_test_status(&self, id: &TestId, status: TestStatus) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        let current = inner
            .state
            .test(&TestKey::ById(id.clone()))
            .map(|t| t.status)
            .ok_or_else(|| LedgerError::TestNotFound(TestKey::ById(id.clone())))?;
        if current.next() != Some(status) {
            return Err(LedgerError::StatusConflict {
                id: id.clone(),
                from: current,
                to: status,
            });
        }
        Self::commit(
            &mut inner,
            &[Operation::TestStatusSet {
                id: id.clone(),
                status,
            }],
        )
    }

    /// Move a test's deadline (manual override)
    pub fn set_test_end(&self, id: &TestId, end: DateTime<Utc>) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        if inner.state.test(&TestKey::ById(id.clone())).is_none() {
            return Err(LedgerError::TestNotFound(TestKey::ById(id.clone())));
        }
        Self::commit(
            &mut inner,
            &[Operation::TestEndSet {
                id: id.clone(),
                end,
            }],
        )
    }

    /// Tests in `status` whose end time is at or before `before`
    pub fn tests_crossing(&self, status: TestStatus, before: DateTime<Utc>) -> Vec<GameTest> {
        self.lock().state.tests_crossing(status, before)
    }

    // ---- completions and reporting --------------------------------------

    /// Record that a participant submitted feedback; returns false if the
    /// completion was already recorded
    pub fn append_completion(
        &self,
        test: &TestId,
        participant: ParticipantId,
    ) -> Result<bool, LedgerError> {
        let mut inner = self.lock();
        if inner.state.test(&TestKey::ById(test.clone())).is_none() {
            return Err(LedgerError::TestNotFound(TestKey::ById(test.clone())));
        }
        let exists = inner
            .state
            .completions_for(test)
            .iter()
            .any(|c| c.participant == participant);
        if exists {
            return Ok(false);
        }
        Self::commit(
            &mut inner,
            &[Operation::CompletionAppend {
                test: test.clone(),
                participant,
            }],
        )?;
        Ok(true)
    }

    /// Completions recorded for a test
    pub fn completions_for(&self, test: &TestId) -> Vec<Completion> {
        self.lock().state.completions_for(test)
    }

    /// Codes claimed under a test
    pub fn codes_claimed_in(&self, test: &TestId) -> Vec<GameCode> {
        self.lock().state.codes_claimed_in(test)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
