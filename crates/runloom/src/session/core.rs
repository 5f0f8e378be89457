// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The per-character session loop.

use std::sync::Arc;

use crate::drop::{backoff_delay, DROP_RUN};
use crate::game::GameError;
use crate::run::{PassEnd, RunParameters, RunRegistry, Sequencer, SequencerError};
use crate::scheduler::{Priority, SchedulerError};
use crate::time::Clock;

use super::{ExecutionContext, HandoffRequest};

/// How a session ended without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionExit {
    /// Stop priority was requested
    Stopped,
    /// The character was handed over to another process
    HandedOff(HandoffRequest),
    /// The configured number of passes ran
    PassesDone { passes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    #[error("{failures} passes failed in a row, last: {last}")]
    TooManyFailures { failures: u32, last: String },

    #[error("session thread panicked")]
    Panicked,
}

/// What the loop does after one iteration.
enum Step {
    Continue,
    Exit(SessionExit),
}

/// One supervised character, driven on its own thread by [`Session::run`].
pub struct Session {
    ctx: Arc<ExecutionContext>,
    runs: Arc<RunRegistry>,
    max_consecutive_failures: u32,
    max_passes: Option<u64>,
    passes: u64,
}

impl Session {
    pub(crate) fn new(
        ctx: Arc<ExecutionContext>,
        runs: Arc<RunRegistry>,
        max_consecutive_failures: u32,
        max_passes: Option<u64>,
    ) -> Self {
        Self {
            ctx,
            runs,
            max_consecutive_failures,
            max_passes,
            passes: 0,
        }
    }

    pub fn ctx(&self) -> &Arc<ExecutionContext> {
        &self.ctx
    }

    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Attach the calling thread and loop until stopped, handed off, out of
    /// passes, or failed.
    pub fn run(mut self) -> Result<SessionExit, SessionError> {
        let _attached = self
            .ctx
            .scheduler()
            .attach(Arc::clone(&self.ctx), Priority::Normal)?;
        tracing::info!(session = self.name(), id = %self.ctx.session_id(), "session started");

        let result = loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Exit(exit)) => break Ok(exit),
                Err(e) => break Err(e),
            }
        };

        match &result {
            Ok(exit) => {
                tracing::info!(session = self.name(), passes = self.passes, ?exit, "session ended")
            }
            Err(e) => tracing::error!(
                session = self.name(),
                passes = self.passes,
                error = %e,
                "session failed"
            ),
        }
        result
    }

    fn step(&mut self) -> Result<Step, SessionError> {
        match self.ctx.pause_point() {
            Ok(()) => {}
            Err(SchedulerError::Stopped) => return Ok(Step::Exit(SessionExit::Stopped)),
            Err(e) => return Err(e.into()),
        }

        if let Some(handoff) = self.ctx.with_bag(|bag| bag.handoff.take()) {
            tracing::info!(
                session = self.name(),
                reason = %handoff.reason,
                "handing off character"
            );
            self.leave_game();
            return Ok(Step::Exit(SessionExit::HandedOff(handoff)));
        }

        if self.max_passes.is_some_and(|max| self.passes >= max) {
            return Ok(Step::Exit(SessionExit::PassesDone {
                passes: self.passes,
            }));
        }

        if let Err(e) = self.ctx.refresh_game_data() {
            tracing::warn!(session = self.name(), error = %e, "refresh failed");
        }

        let sequencer = Sequencer::new(&self.ctx);

        if self.ctx.with_bag(|bag| bag.pending_drop.is_some()) {
            if let Some(drop) = self.runs.construct(&self.ctx, DROP_RUN) {
                return match sequencer.execute_pass(&[drop], &RunParameters::farming()) {
                    Ok(_) => Ok(Step::Continue),
                    Err(SequencerError::Stopped) => Ok(Step::Exit(SessionExit::Stopped)),
                    Err(e) => Err(e.into()),
                };
            }
        }

        if let Err(e) = self.ensure_game() {
            return self.count_failure(format!("new game: {e}")).map(|()| {
                self.ctx
                    .clock()
                    .sleep(backoff_delay(self.ctx.with_bag(|bag| bag.consecutive_failures)));
                Step::Continue
            });
        }

        let config = self.ctx.config();
        let runs = self.runs.build_runs(&self.ctx, &config.runs);
        let params = RunParameters::for_mode(config.game.mode);
        let report = match sequencer.execute_pass(&runs, &params) {
            Ok(report) => report,
            Err(SequencerError::Stopped) => return Ok(Step::Exit(SessionExit::Stopped)),
            Err(e) => return Err(e.into()),
        };
        self.passes += 1;

        match report.failures.last() {
            Some(failure) => self.count_failure(format!("{}: {}", failure.run, failure.error))?,
            None => self.ctx.with_bag(|bag| bag.consecutive_failures = 0),
        }
        if let PassEnd::Stopped { by } = &report.end {
            tracing::debug!(session = self.name(), run = %by, "pass cut short");
        }
        tracing::debug!(
            session = self.name(),
            pass = self.passes,
            executed = report.executed().len(),
            "pass finished"
        );

        self.leave_game();
        Ok(Step::Continue)
    }

    /// Create a game at the configured difficulty unless already in one.
    fn ensure_game(&self) -> Result<(), GameError> {
        if self.ctx.with_game_data(|data| data.in_game()) {
            return Ok(());
        }
        let difficulty = self.ctx.config().game.difficulty;
        tracing::info!(session = self.name(), %difficulty, "creating game");
        self.ctx.game().manager.new_game(difficulty)?;
        self.ctx.refresh_game_data()?;
        Ok(())
    }

    fn leave_game(&self) {
        if let Err(e) = self.ctx.game().manager.exit_game() {
            tracing::warn!(session = self.name(), error = %e, "exit game failed");
        }
        if let Err(e) = self.ctx.refresh_game_data() {
            tracing::debug!(session = self.name(), error = %e, "refresh after exit failed");
        }
    }

    fn count_failure(&self, last: String) -> Result<(), SessionError> {
        let failures = self.ctx.with_bag(|bag| {
            bag.consecutive_failures += 1;
            bag.consecutive_failures
        });
        if failures > self.max_consecutive_failures {
            return Err(SessionError::TooManyFailures { failures, last });
        }
        tracing::warn!(session = self.name(), failures, %last, "failed pass");
        Ok(())
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
