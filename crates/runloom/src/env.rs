// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by runloom are defined here.
//! Use these accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

use std::path::PathBuf;

/// `RUNLOOM_PLANS_DIR`: overrides every character's leveling plan directory.
pub fn plans_dir() -> Option<PathBuf> {
    var_path(names::RUNLOOM_PLANS_DIR)
}

/// `RUNLOOM_RECORDS`: JSONL file mirroring the run record log.
pub fn records_path() -> Option<PathBuf> {
    var_path(names::RUNLOOM_RECORDS)
}

/// `RUNLOOM_LOG`: `tracing` filter directives.
pub fn log_filter() -> Option<String> {
    std::env::var(names::RUNLOOM_LOG)
        .ok()
        .filter(|v| !v.is_empty())
}

fn var_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
