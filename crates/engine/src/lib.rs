// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-engine: claim coordination and test lifecycle
//!
//! Two cooperating pieces sit on top of the ledger:
//! - [`ClaimCoordinator`] hands out single-use codes with compare-and-set
//!   conflict resolution and delivery rollback
//! - [`LifecycleScheduler`] advances tests through STARTED, ENDING and ENDED
//!   on a reconciliation tick with de-duplicated one-shot timers

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod claim;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod report;
pub mod timers;

pub use claim::{ClaimCoordinator, ClaimOutcome};
pub use error::{ClaimError, LifecycleError};
pub use lifecycle::LifecycleScheduler;
pub use registry::AdminOps;
pub use report::TestReport;
pub use timers::TransitionTimers;
