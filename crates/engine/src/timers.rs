// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! De-duplicated one-shot transition timers
//!
//! The reconciliation tick runs every few minutes and re-discovers the same
//! upcoming deadlines each time, so the timer index must make "schedule" an
//! idempotent operation: at most one outstanding timer per (test, target
//! status). A marker map is the source of truth; the heap only orders
//! firing. Popped heap entries whose fire time disagrees with the marker are
//! stale (rescheduled or cancelled) and are skipped.

use chrono::{DateTime, Utc};
use ck_core::{TestId, TestStatus};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A pending one-shot lifecycle transition
#[derive(Debug, Clone)]
pub struct PendingTransition {
    pub test: TestId,
    pub target: TestStatus,
    pub fire_at: DateTime<Utc>,
}

impl PartialEq for PendingTransition {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.test == other.test && self.target == other.target
    }
}

impl Eq for PendingTransition {}

impl PartialOrd for PendingTransition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTransition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap: earliest first
        Reverse(self.fire_at).cmp(&Reverse(other.fire_at))
    }
}

/// Timer index with one slot per (test, target status)
#[derive(Default)]
pub struct TransitionTimers {
    heap: BinaryHeap<PendingTransition>,
    scheduled: HashMap<(TestId, TestStatus), DateTime<Utc>>,
}

impl TransitionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a transition unless one is already outstanding for this
    /// (test, target) pair
    ///
    /// Returns whether a new timer was created. The check-and-set is what
    /// keeps overlapping reconciliation ticks from double-scheduling.
    pub fn schedule(
        &mut self,
        test: &TestId,
        target: TestStatus,
        fire_at: DateTime<Utc>,
    ) -> bool {
        let slot = (test.clone(), target);
        if self.scheduled.contains_key(&slot) {
            return false;
        }
        self.scheduled.insert(slot, fire_at);
        self.heap.push(PendingTransition {
            test: test.clone(),
            target,
            fire_at,
        });
        true
    }

    /// Whether a timer is outstanding for this (test, target) pair
    pub fn is_scheduled(&self, test: &TestId, target: TestStatus) -> bool {
        self.scheduled.contains_key(&(test.clone(), target))
    }

    /// Clear the marker for a fired or failed transition so a later tick can
    /// schedule it again
    pub fn clear(&mut self, test: &TestId, target: TestStatus) {
        self.scheduled.remove(&(test.clone(), target));
    }

    /// Drop all outstanding timers for a test (deadline changed)
    pub fn cancel_test(&mut self, test: &TestId) {
        self.scheduled.retain(|(id, _), _| id != test);
    }

    /// All transitions due at or before `now`, earliest first
    ///
    /// Stale heap entries, whose fire time no longer matches the marker, are
    /// discarded without firing.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<PendingTransition> {
        let mut ready = Vec::new();
        while let Some(next) = self.heap.peek() {
            if next.fire_at > now {
                break;
            }
            let Some(item) = self.heap.pop() else {
                break;
            };
            match self.scheduled.get(&(item.test.clone(), item.target)) {
                Some(fire_at) if *fire_at == item.fire_at => ready.push(item),
                _ => continue,
            }
        }
        ready
    }

    /// The earliest outstanding fire time, if any
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        // Skip stale heap heads without mutating; markers hold the truth
        self.scheduled.values().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
