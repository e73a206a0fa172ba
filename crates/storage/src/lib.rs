// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-storage: durable ledger for games, codes, tests and completions
//!
//! The ledger is a write-ahead log of operations plus a materialized state
//! replayed from it. One mutex guards both, so every multi-operation write
//! is applied atomically and the conditional claim is a true compare-and-set.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod ledger;
mod state;
mod wal;

pub use ledger::{ClaimWrite, Ledger, LedgerError};
pub use state::MaterializedState;
pub use wal::{Wal, WalError};
