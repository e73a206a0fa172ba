// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit configuration passed to components at startup
//!
//! There is no ambient global configuration; the front end loads a `Config`
//! once and hands it to the engine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cadence of the lifecycle reconciliation tick
    #[serde(with = "humantime_serde", default = "default_tick_interval")]
    pub tick_interval: Duration,

    /// How far ahead of the deadline the reminder window opens
    #[serde(with = "humantime_serde", default = "default_warn_window")]
    pub warn_window: Duration,

    /// Look-ahead window for scheduling finalize actions
    #[serde(with = "humantime_serde", default = "default_finalize_window")]
    pub finalize_window: Duration,

    /// Deadlines older than this are finalized without a reminder announcement
    #[serde(with = "humantime_serde", default = "default_stale_after")]
    pub stale_after: Duration,
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_warn_window() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

fn default_finalize_window() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_stale_after() -> Duration {
    Duration::from_secs(6 * 60 * 60)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            warn_window: default_warn_window(),
            finalize_window: default_finalize_window(),
            stale_after: default_stale_after(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Warning window as a chrono duration for deadline arithmetic
    pub fn warn_window_chrono(&self) -> chrono::Duration {
        to_chrono(self.warn_window)
    }

    /// Finalize window as a chrono duration
    pub fn finalize_window_chrono(&self) -> chrono::Duration {
        to_chrono(self.finalize_window)
    }

    /// Stale cutoff as a chrono duration
    pub fn stale_after_chrono(&self) -> chrono::Duration {
        to_chrono(self.stale_after)
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
