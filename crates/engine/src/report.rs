// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-test report aggregation

use ck_core::{GameTest, ParticipantId};
use ck_storage::Ledger;

/// Summary of a finished test, rendered for the admin channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub test: GameTest,
    pub codes_claimed: usize,
    pub completions: usize,
    /// Participants who claimed a code but never submitted feedback
    pub silent: Vec<ParticipantId>,
}

impl TestReport {
    /// Aggregate claim and completion counts for a finished test
    pub fn build(ledger: &Ledger, test: &GameTest) -> Self {
        let claimed = ledger.codes_claimed_in(&test.id);
        let completions = ledger.completions_for(&test.id);

        let mut silent: Vec<ParticipantId> = claimed
            .iter()
            .filter_map(|c| c.claimed_by)
            .filter(|p| !completions.iter().any(|done| done.participant == *p))
            .collect();
        silent.sort();

        Self {
            test: test.clone(),
            codes_claimed: claimed.len(),
            completions: completions.len(),
            silent,
        }
    }

    /// Render the report as admin-channel text
    pub fn render(&self) -> String {
        let mut out = format!(
            "Playtest {} ({}) wrapped up: {} codes claimed, {} feedback submissions.",
            self.test.id, self.test.game, self.codes_claimed, self.completions
        );
        if !self.silent.is_empty() {
            let names: Vec<String> = self.silent.iter().map(|p| p.to_string()).collect();
            out.push_str(&format!(
                "\nClaimed but no feedback: {}",
                names.join(", ")
            ));
        }
        out
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
