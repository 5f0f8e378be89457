// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runs and their dispatch.
//!
//! A [`Run`] is a self-contained unit of automation: a quest script, a
//! farming route, the leveling driver or a drop. The sequencer asks each run
//! whether it can execute under the current snapshot and mode before calling
//! it.

mod boss;
mod quest;
mod registry;
mod sequencer;
mod terror_zone;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::drop::DropError;
use crate::game::GameError;
use crate::leveling::{PlanError, SequenceEntry};
use crate::scheduler::SchedulerError;

pub use boss::{BossRun, BossSpec, BOSSES};
pub use quest::{QuestRun, QuestSpec, QUESTS};
pub use registry::{RunConstructor, RunRegistry};
pub use sequencer::{Dispatched, PassEnd, PassReport, RunFailure, Sequencer, SequencerError};
pub use terror_zone::{eligible_area, TerrorZoneRun, TERROR_ZONE_RUN};

/// Verdict of a run's condition check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerResult {
    /// Preconditions unmet; try the next run
    Skip,
    /// Preconditions unmet in a way that makes the rest of the pass pointless
    Stop,
    /// Execute
    Ok,
    /// The run does not support the requested mode
    Error,
}

/// Farming vs. quest mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Farming,
    Quest,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Farming => f.write_str("farming"),
            Self::Quest => f.write_str("quest"),
        }
    }
}

/// Parameters one dispatch passes to a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunParameters {
    pub farming_run: bool,
    /// Entry of the leveling sequence that scheduled this run
    pub sequence_settings: Option<SequenceEntry>,
}

impl RunParameters {
    pub fn for_mode(mode: RunMode) -> Self {
        Self {
            farming_run: mode == RunMode::Farming,
            sequence_settings: None,
        }
    }

    pub fn farming() -> Self {
        Self::for_mode(RunMode::Farming)
    }

    pub fn quest() -> Self {
        Self::for_mode(RunMode::Quest)
    }

    pub fn mode(&self) -> RunMode {
        if self.farming_run {
            RunMode::Farming
        } else {
            RunMode::Quest
        }
    }
}

/// Errors returned from [`Run::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("run '{run}' does not support {mode} mode")]
    UnsupportedMode { run: String, mode: RunMode },

    #[error("drop failed: {0}")]
    Drop(#[from] DropError),
}

impl RunError {
    /// The session was stopped while the run executed.
    pub fn is_stopped(&self) -> bool {
        matches!(
            self,
            Self::Scheduler(SchedulerError::Stopped)
                | Self::Drop(DropError::Scheduler(SchedulerError::Stopped))
        )
    }

    /// Errors that must end the session instead of counting as a failed run.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Plan(_) | Self::UnsupportedMode { .. } => true,
            Self::Scheduler(e) => *e != SchedulerError::Stopped,
            Self::Game(_) | Self::Drop(_) => false,
        }
    }
}

/// An independently testable unit of automation.
///
/// Runs capture their context at construction and are rebuilt every pass.
pub trait Run: Send {
    fn name(&self) -> &str;

    fn check_conditions(&self, params: &RunParameters) -> SequencerResult;

    fn run(&self, params: &RunParameters) -> Result<(), RunError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
