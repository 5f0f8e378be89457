// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run record data types.

use super::duration_ms;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// One dispatched run, as seen by the sequencer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    /// Sequence number within the log
    pub seq: u64,

    /// Wall-clock timestamp of the record
    pub timestamp: SystemTime,

    /// Time since the log was created
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,

    /// Character the session is bound to
    pub session: String,

    /// Run name as registered in the run table
    pub run: String,

    /// Whether the run was dispatched in farming mode
    pub farming: bool,

    /// What happened
    pub outcome: RunOutcome,
}

/// How a run ended within a pass.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Condition check returned Skip.
    Skipped,
    /// Condition check returned Stop; the rest of the pass was abandoned.
    Stopped,
    /// Condition check returned Error: the run does not support the mode.
    Unsupported,
    /// The run executed and returned successfully.
    Completed {
        #[serde(with = "duration_ms")]
        duration: Duration,
    },
    /// The run executed and returned an error.
    Failed {
        error: String,
        #[serde(with = "duration_ms")]
        duration: Duration,
    },
    /// The session was stopped while the run was executing.
    Interrupted,
}

impl RunOutcome {
    /// True when the run body actually executed.
    pub fn executed(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Interrupted
        )
    }

    /// True for outcomes that count as a session failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Unsupported)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
