// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-core: Core library for the Code Keeper (ck) playtest coordinator
//!
//! This crate provides:
//! - The domain model for games, codes, tests and completions
//! - The persisted operation vocabulary replayed by storage
//! - A clock abstraction so deadline logic is testable
//! - Explicit configuration (no ambient globals)

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod config;
pub mod id;
pub mod model;
pub mod op;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use model::{
    Completion, Game, GameCode, GameId, GameTest, MessageId, ParticipantId, TestId, TestKey,
    TestStatus,
};
pub use op::Operation;
