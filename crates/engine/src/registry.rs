// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative operations: games, code pools, test creation

use crate::error::LifecycleError;
use chrono::{DateTime, Utc};
use ck_adapters::Announcer;
use ck_core::{GameId, GameTest, IdGen, ParticipantId, TestId, TestKey};
use ck_storage::{Ledger, LedgerError};
use std::sync::Arc;

/// Operator-facing commands over the ledger
pub struct AdminOps<P: Announcer, G: IdGen> {
    ledger: Arc<Ledger>,
    announce: P,
    ids: G,
}

impl<P: Announcer, G: IdGen> AdminOps<P, G> {
    pub fn new(ledger: Arc<Ledger>, announce: P, ids: G) -> Self {
        Self {
            ledger,
            announce,
            ids,
        }
    }

    /// Register a game; the name is normalized into its id
    pub fn add_game(&self, name: &str) -> Result<GameId, LedgerError> {
        let game = GameId::new(name);
        self.ledger.create_game(&game)?;
        tracing::info!(%game, "game registered");
        Ok(game)
    }

    /// Import a newline-separated block of codes, as pasted or attached by
    /// an operator; blank lines and codes already in the ledger are skipped
    ///
    /// Returns how many codes were actually added.
    pub fn import_codes(&self, game: &GameId, text: &str) -> Result<usize, LedgerError> {
        let codes: Vec<String> = text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let imported = self.ledger.import_codes(game, &codes)?;
        tracing::info!(%game, imported, offered = codes.len(), "codes imported");
        Ok(imported)
    }

    /// Remove codes from the pool; unknown codes are ignored
    pub fn remove_codes(&self, text: &str) -> Result<usize, LedgerError> {
        let codes: Vec<String> = text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        let removed = self.ledger.remove_codes(&codes)?;
        tracing::info!(removed, "codes removed");
        Ok(removed)
    }

    /// Announce and persist a new test
    ///
    /// The announcement is published first so the test can be keyed by its
    /// message id. If persisting fails afterwards the error is surfaced and
    /// no test exists; the orphaned announcement is left for the operator.
    pub async fn create_test(
        &self,
        game: &GameId,
        end: DateTime<Utc>,
        feedback: Option<String>,
        announcement: &str,
    ) -> Result<GameTest, LifecycleError> {
        // Reject before publishing so a bad game name costs nothing
        if !self.ledger.has_game(game) {
            return Err(LedgerError::GameNotFound(game.clone()).into());
        }
        let message = self.announce.publish(announcement).await?;
        let id = TestId(self.ids.next());
        let test = self
            .ledger
            .create_test(id, game, message, end, feedback)?;
        tracing::info!(test = %test.id, %game, message = %test.message, end = %end, "test created");
        Ok(test)
    }

    /// Record a feedback completion; returns false if already recorded
    pub fn record_completion(
        &self,
        key: &TestKey,
        participant: ParticipantId,
    ) -> Result<bool, LedgerError> {
        let test = self.ledger.get_test(key)?;
        let recorded = self.ledger.append_completion(&test.id, participant)?;
        if recorded {
            tracing::info!(test = %test.id, %participant, "completion recorded");
        }
        Ok(recorded)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
