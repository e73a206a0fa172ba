// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim coordinator: exactly one code per participant per game
//!
//! The ledger's `conditional_claim` compare-and-set is the only
//! serialization point. Everything before it is a racy read; the loop below
//! simply retries the read when the write loses. The loop is bounded by pool
//! size because each lost race means another participant consumed a code.

use crate::error::ClaimError;
use ck_adapters::{AdminSignal, Notifier, NotifyError};
use ck_core::{GameTest, ParticipantId, TestKey, TestStatus};
use ck_storage::{ClaimWrite, Ledger, LedgerError};
use std::sync::Arc;

/// Resolution of a code request
///
/// All four variants are ordinary outcomes the front end renders to the
/// participant; none indicates a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// A fresh code was claimed and delivered
    Granted(String),
    /// The participant already holds a code for this game
    AlreadyHeld(String),
    /// The pool for this game is empty
    Exhausted,
    /// The test is over; no more codes are handed out
    TestEnded,
}

/// What the claim loop produced for a live test
enum ClaimAttempt {
    Granted { code: String, drained_pool: bool },
    AlreadyHeld(String),
    Exhausted,
}

/// Hands out single-use codes against the ledger
pub struct ClaimCoordinator<N: Notifier, A: AdminSignal> {
    ledger: Arc<Ledger>,
    notify: N,
    admin: A,
}

impl<N: Notifier, A: AdminSignal> ClaimCoordinator<N, A> {
    pub fn new(ledger: Arc<Ledger>, notify: N, admin: A) -> Self {
        Self {
            ledger,
            notify,
            admin,
        }
    }

    /// Request a code for `participant` in the test identified by `key`
    ///
    /// Repeated requests are idempotent: a participant who already holds a
    /// code gets the same code again with no mutation. If delivery of a
    /// freshly claimed code fails the claim is rolled back and
    /// [`ClaimError::Undeliverable`] returned, so an unreachable participant
    /// never strands a code.
    pub async fn request_code(
        &self,
        key: &TestKey,
        participant: ParticipantId,
    ) -> Result<ClaimOutcome, ClaimError> {
        let test = self.ledger.get_test(key)?;

        if test.status == TestStatus::Ended {
            tracing::info!(test = %test.id, %participant, "request after end");
            self.best_effort_direct(participant, "This playtest has ended; codes are no longer available.")
                .await;
            return Ok(ClaimOutcome::TestEnded);
        }

        if let Some(code) = self.ledger.find_code_held_by(participant, &test.game) {
            tracing::debug!(test = %test.id, %participant, "repeat request, resending");
            self.best_effort_direct(
                participant,
                &format!("You already have a code for {}: {}", test.game, code),
            )
            .await;
            return Ok(ClaimOutcome::AlreadyHeld(code));
        }

        let (code, drained_pool) = match self.claim_loop(&test, participant)? {
            ClaimAttempt::Granted { code, drained_pool } => (code, drained_pool),
            ClaimAttempt::AlreadyHeld(code) => {
                // The write-time holdings check caught a race against this
                // participant's own concurrent request
                tracing::debug!(test = %test.id, %participant, "repeat request, resending");
                self.best_effort_direct(
                    participant,
                    &format!("You already have a code for {}: {}", test.game, code),
                )
                .await;
                return Ok(ClaimOutcome::AlreadyHeld(code));
            }
            ClaimAttempt::Exhausted => {
                tracing::info!(test = %test.id, %participant, "pool exhausted");
                self.best_effort_direct(
                    participant,
                    &format!(
                        "Sorry, all codes for {} have been handed out. Thanks for your interest!",
                        test.game
                    ),
                )
                .await;
                return Ok(ClaimOutcome::Exhausted);
            }
        };

        if let Err(e) = self
            .notify
            .send_direct(
                participant,
                &format!("Your access code for {}: {}", test.game, code),
            )
            .await
        {
            tracing::warn!(test = %test.id, %participant, error = %e, "delivery failed, rolling back claim");
            self.ledger.release_claim(&code)?;
            return Err(ClaimError::Undeliverable(participant));
        }

        tracing::info!(test = %test.id, %participant, "code granted");

        if drained_pool {
            self.signal_exhaustion(&test).await;
        }

        Ok(ClaimOutcome::Granted(code))
    }

    /// Select-and-claim until the CAS wins or the pool drains
    ///
    /// Bounded by the pool size at entry: every lost race means another
    /// winner consumed the code this attempt picked, so the unclaimed set
    /// strictly shrinks and the budget cannot run out while codes remain.
    fn claim_loop(
        &self,
        test: &GameTest,
        participant: ParticipantId,
    ) -> Result<ClaimAttempt, ClaimError> {
        let mut budget = self.ledger.count_unclaimed(&test.game);
        while budget > 0 {
            let Some(code) = self.ledger.get_unclaimed_code(&test.game) else {
                return Ok(ClaimAttempt::Exhausted);
            };
            match self.ledger.conditional_claim(&code, participant, &test.id) {
                Ok(ClaimWrite::Won { drained_pool }) => {
                    return Ok(ClaimAttempt::Granted { code, drained_pool });
                }
                Ok(ClaimWrite::Lost) => {
                    tracing::debug!(%code, %participant, "lost claim race, retrying");
                    budget -= 1;
                }
                Ok(ClaimWrite::AlreadyHolder(held)) => {
                    return Ok(ClaimAttempt::AlreadyHeld(held));
                }
                // A concurrent remove_codes can delete the code between the
                // read and the write; treat it like a lost race
                Err(LedgerError::CodeNotFound(_)) => budget -= 1,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(ClaimAttempt::Exhausted)
    }

    /// One-shot "pool exhausted" signal, sent when the last code goes out
    ///
    /// The ledger decides `drained_pool` atomically with the winning write,
    /// so concurrent winners cannot both end up here. Best-effort: a failed
    /// signal is logged and never retried.
    async fn signal_exhaustion(&self, test: &GameTest) {
        let text = format!("All codes for {} have been claimed.", test.game);
        if let Err(e) = self.admin.notify_admin(&text).await {
            tracing::warn!(test = %test.id, error = %e, "exhaustion signal failed");
        }
    }

    async fn best_effort_direct(&self, participant: ParticipantId, text: &str) {
        match self.notify.send_direct(participant, text).await {
            Ok(()) => {}
            Err(NotifyError::Unreachable(_)) => {
                tracing::debug!(%participant, "participant unreachable for courtesy message");
            }
            Err(e) => tracing::warn!(%participant, error = %e, "courtesy message failed"),
        }
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
