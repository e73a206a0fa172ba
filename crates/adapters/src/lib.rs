// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-adapters: boundary traits for the external collaborators
//!
//! The engine never talks to a chat platform or spreadsheet directly; it goes
//! through these traits. Production implementations live in the front end,
//! fakes live here for tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod admin;
pub mod announce;
pub mod notify;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use admin::AdminSignal;
pub use announce::{AnnounceError, Announcer};
pub use notify::{Notifier, NotifyError};
pub use traced::TracedNotifier;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAdmin, FakeAnnouncer, FakeNotifier};
