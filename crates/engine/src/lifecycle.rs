// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-driven test lifecycle
//!
//! Tests advance STARTED -> ENDING -> ENDED purely as a function of
//! wall-clock time. Nothing needs to be awake at the deadline: a periodic
//! reconciliation tick re-derives upcoming transitions from the ledger and
//! hands them to the de-duplicated timer index, so a missed tick costs
//! latency, never correctness, and an extra tick costs nothing.

use crate::error::LifecycleError;
use crate::report::TestReport;
use crate::timers::TransitionTimers;
use chrono::{DateTime, Utc};
use ck_adapters::{AdminSignal, Announcer};
use ck_core::{Clock, Config, GameTest, TestId, TestKey, TestStatus};
use ck_storage::{Ledger, LedgerError};
use std::sync::{Arc, Mutex, MutexGuard};

/// Advances tests through their lifecycle on a reconciliation tick
pub struct LifecycleScheduler<P: Announcer, A: AdminSignal, C: Clock> {
    ledger: Arc<Ledger>,
    announce: P,
    admin: A,
    clock: C,
    config: Config,
    timers: Mutex<TransitionTimers>,
}

impl<P: Announcer, A: AdminSignal, C: Clock> LifecycleScheduler<P, A, C> {
    pub fn new(ledger: Arc<Ledger>, announce: P, admin: A, clock: C, config: Config) -> Self {
        Self {
            ledger,
            announce,
            admin,
            clock,
            config,
            timers: Mutex::new(TransitionTimers::new()),
        }
    }

    fn timers(&self) -> MutexGuard<'_, TransitionTimers> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scan the ledger for deadlines inside the look-ahead windows and
    /// schedule any missing one-shot timers
    ///
    /// Idempotent: re-running over the same ledger state schedules nothing
    /// new, which is what makes overlapping ticks safe.
    pub fn reconcile(&self) {
        let now = self.clock.now();
        let warn_before = now + self.config.warn_window_chrono();
        let finalize_before = now + self.config.finalize_window_chrono();

        let starting = self.ledger.tests_crossing(TestStatus::Started, warn_before);
        let ending = self
            .ledger
            .tests_crossing(TestStatus::Ending, finalize_before);

        let mut timers = self.timers();
        for test in &starting {
            // Reminder fires when the warning window opens; deadlines
            // already inside the window fire immediately
            let fire_at = (test.end - self.config.warn_window_chrono()).max(now);
            if timers.schedule(&test.id, TestStatus::Ending, fire_at) {
                tracing::debug!(test = %test.id, %fire_at, "reminder scheduled");
            }
        }
        for test in &ending {
            let fire_at = test.end.max(now);
            if timers.schedule(&test.id, TestStatus::Ended, fire_at) {
                tracing::debug!(test = %test.id, %fire_at, "finalize scheduled");
            }
        }
    }

    /// Fire every transition whose time has come
    ///
    /// Failures are logged and the timer slot reopened so the next tick
    /// retries; one bad announcement must not wedge the other tests.
    pub async fn fire_due(&self) {
        let now = self.clock.now();
        let due = self.timers().due(now);
        for pending in due {
            let result = match pending.target {
                TestStatus::Ending => self.fire_reminder(&pending.test, now).await,
                TestStatus::Ended => self.fire_finalize(&pending.test).await,
                TestStatus::Started => continue,
            };
            if let Err(e) = result {
                tracing::warn!(test = %pending.test, target = %pending.target, error = %e, "transition failed, will retry");
            }
            // Reopen the slot either way: on success the status moved on and
            // the next reconcile schedules the following step; on failure the
            // next tick retries this one
            self.timers().clear(&pending.test, pending.target);
        }
    }

    /// Publish the ending-soon reminder and advance STARTED -> ENDING
    async fn fire_reminder(&self, id: &TestId, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        let test = match self.fetch_in_status(id, TestStatus::Started) {
            Some(test) => test,
            None => return Ok(()),
        };

        // A deadline far in the past means the process was down when the
        // test should have ended; announce nothing stale, just advance
        let stale = test.end + self.config.stale_after_chrono() < now;
        if stale {
            tracing::info!(test = %test.id, end = %test.end, "stale deadline, skipping reminder");
        } else {
            self.announce
                .publish(&format!(
                    "The {} playtest is ending soon! Last chance to grab a code and play.",
                    test.game
                ))
                .await?;
        }

        self.ledger.set_test_status(id, TestStatus::Ending)?;
        tracing::info!(test = %test.id, "test is ending");
        Ok(())
    }

    /// Rewrite the announcement as ended and advance ENDING -> ENDED
    async fn fire_finalize(&self, id: &TestId) -> Result<(), LifecycleError> {
        let test = match self.fetch_in_status(id, TestStatus::Ending) {
            Some(test) => test,
            None => return Ok(()),
        };

        self.announce
            .update(
                test.message,
                &format!(
                    "The {} playtest has ended. Thanks to everyone who played!",
                    test.game
                ),
            )
            .await?;

        self.ledger.set_test_status(id, TestStatus::Ended)?;
        tracing::info!(test = %test.id, "test ended");

        // Report aggregation is best-effort and never retried
        let report = TestReport::build(&self.ledger, &test);
        if let Err(e) = self.admin.notify_admin(&report.render()).await {
            tracing::warn!(test = %test.id, error = %e, "report delivery failed");
        }
        Ok(())
    }

    /// Re-read the test right before acting; a concurrent writer may have
    /// advanced it since the timer was scheduled
    fn fetch_in_status(&self, id: &TestId, status: TestStatus) -> Option<GameTest> {
        match self.ledger.get_test(&TestKey::ById(id.clone())) {
            Ok(test) if test.status == status => Some(test),
            Ok(test) => {
                tracing::debug!(test = %id, status = %test.status, "already past this transition");
                None
            }
            Err(e) => {
                tracing::warn!(test = %id, error = %e, "test vanished before transition");
                None
            }
        }
    }

    /// Manually move a test's deadline
    ///
    /// Outstanding timers for the test are cancelled and scheduling re-run
    /// immediately, so shortening a deadline takes effect without waiting
    /// for the next periodic tick.
    pub async fn end_changed(
        &self,
        key: &TestKey,
        new_end: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let test = self.ledger.get_test(key)?;
        self.ledger.set_test_end(&test.id, new_end)?;
        self.timers().cancel_test(&test.id);
        tracing::info!(test = %test.id, %new_end, "deadline moved");
        self.reconcile();
        self.fire_due().await;
        Ok(())
    }

    /// Run the scheduler until the task is dropped
    ///
    /// Sleeps until the earlier of the next pending timer and the next
    /// periodic tick; all decisions live in the sync, clock-driven methods
    /// above so this loop stays trivial.
    pub async fn run(&self) {
        loop {
            self.reconcile();
            self.fire_due().await;

            let now = self.clock.now();
            let wait = match self.timers().next_fire() {
                Some(at) => (at - now)
                    .to_std()
                    .unwrap_or_default()
                    .min(self.config.tick_interval),
                None => self.config.tick_interval,
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
