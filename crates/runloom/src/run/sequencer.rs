// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pass dispatch.
//!
//! Every run considered in a pass yields exactly one [`SequencerResult`] and
//! one [`RunRecord`]. `Skip` moves on, `Stop` ends the pass, `Error` fails it,
//! and `Ok` executes the run. Runtime failures are recorded and the pass
//! continues; a stop request unwinds it.

use std::time::Duration;

use runloom_capture::{RunOutcome, RunRecord};

use super::{Run, RunError, RunMode, RunParameters, SequencerResult};
use crate::scheduler::SchedulerError;
use crate::session::ExecutionContext;
use crate::time::Clock;

#[derive(Debug, thiserror::Error)]
pub enum SequencerError {
    #[error("run '{run}' does not support {mode} mode")]
    UnsupportedMode { run: String, mode: RunMode },

    #[error("stopped")]
    Stopped,

    #[error("run '{run}' failed: {source}")]
    Fatal {
        run: String,
        #[source]
        source: RunError,
    },
}

impl From<SchedulerError> for SequencerError {
    fn from(error: SchedulerError) -> Self {
        match error {
            SchedulerError::Stopped => Self::Stopped,
            other => Self::Fatal {
                run: String::new(),
                source: RunError::Scheduler(other),
            },
        }
    }
}

/// Result of dispatching one run.
#[derive(Debug)]
pub struct Dispatched {
    pub result: SequencerResult,
    /// Error returned by the run body, when it executed and failed
    pub error: Option<RunError>,
    pub record: RunRecord,
}

/// How a pass ended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PassEnd {
    /// Every run was considered
    #[default]
    Completed,
    /// A condition check returned Stop
    Stopped { by: String },
    /// A run asked for a fresh game
    ExitGame,
}

/// A run that executed and failed during a pass.
#[derive(Debug)]
pub struct RunFailure {
    pub run: String,
    pub error: RunError,
}

#[derive(Debug, Default)]
pub struct PassReport {
    pub records: Vec<RunRecord>,
    pub failures: Vec<RunFailure>,
    pub end: PassEnd,
}

impl PassReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Names of the runs whose bodies executed.
    pub fn executed(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.outcome.executed())
            .map(|r| r.run.as_str())
            .collect()
    }
}

/// Dispatches runs for one session.
pub struct Sequencer<'a> {
    ctx: &'a ExecutionContext,
}

impl<'a> Sequencer<'a> {
    pub fn new(ctx: &'a ExecutionContext) -> Self {
        Self { ctx }
    }

    /// Check and, if allowed, execute one run.
    ///
    /// Fails only when the session is stopped, either at the suspension
    /// point before the check or inside the run body.
    pub fn dispatch(
        &self,
        run: &dyn Run,
        params: &RunParameters,
    ) -> Result<Dispatched, SchedulerError> {
        self.ctx.pause_point()?;

        let result = run.check_conditions(params);
        let (outcome, error) = match result {
            SequencerResult::Skip => {
                tracing::debug!(session = self.ctx.name(), run = run.name(), "skip");
                (RunOutcome::Skipped, None)
            }
            SequencerResult::Stop => {
                tracing::debug!(session = self.ctx.name(), run = run.name(), "stop");
                (RunOutcome::Stopped, None)
            }
            SequencerResult::Error => {
                tracing::error!(
                    session = self.ctx.name(),
                    run = run.name(),
                    mode = %params.mode(),
                    "mode not supported"
                );
                (RunOutcome::Unsupported, None)
            }
            SequencerResult::Ok => {
                tracing::info!(
                    session = self.ctx.name(),
                    run = run.name(),
                    mode = %params.mode(),
                    "starting run"
                );
                let started = self.ctx.clock().now();
                let body = run.run(params);
                let duration = self.ctx.clock().now().saturating_sub(started);
                match body {
                    Ok(()) => {
                        tracing::info!(
                            session = self.ctx.name(),
                            run = run.name(),
                            elapsed_ms = millis(duration),
                            "run finished"
                        );
                        (RunOutcome::Completed { duration }, None)
                    }
                    Err(e) if e.is_stopped() => {
                        self.ctx.log().record(
                            self.ctx.name(),
                            run.name(),
                            params.farming_run,
                            RunOutcome::Interrupted,
                        );
                        return Err(SchedulerError::Stopped);
                    }
                    Err(e) => {
                        tracing::warn!(
                            session = self.ctx.name(),
                            run = run.name(),
                            error = %e,
                            "run failed"
                        );
                        (
                            RunOutcome::Failed {
                                error: e.to_string(),
                                duration,
                            },
                            Some(e),
                        )
                    }
                }
            }
        };

        let record = self
            .ctx
            .log()
            .record(self.ctx.name(), run.name(), params.farming_run, outcome);
        Ok(Dispatched {
            result,
            error,
            record,
        })
    }

    /// Dispatch `runs` in order.
    pub fn execute_pass(
        &self,
        runs: &[Box<dyn Run>],
        params: &RunParameters,
    ) -> Result<PassReport, SequencerError> {
        let mut report = PassReport::default();

        for run in runs {
            let dispatched = self.dispatch(run.as_ref(), params)?;
            report.records.push(dispatched.record);

            match dispatched.result {
                SequencerResult::Skip => continue,
                SequencerResult::Stop => {
                    report.end = PassEnd::Stopped {
                        by: run.name().to_string(),
                    };
                    break;
                }
                SequencerResult::Error => {
                    return Err(SequencerError::UnsupportedMode {
                        run: run.name().to_string(),
                        mode: params.mode(),
                    });
                }
                SequencerResult::Ok => {}
            }

            if let Some(error) = dispatched.error {
                if error.is_fatal() {
                    return Err(SequencerError::Fatal {
                        run: run.name().to_string(),
                        source: error,
                    });
                }
                self.ctx.with_bag(|bag| bag.record_failure(run.name()));
                report.failures.push(RunFailure {
                    run: run.name().to_string(),
                    error,
                });
            }

            let exit_requested =
                self.ctx
                    .with_bag(|bag| std::mem::take(&mut bag.exit_game_requested));
            if exit_requested {
                report.end = PassEnd::ExitGame;
                break;
            }
        }

        Ok(report)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "sequencer_tests.rs"]
mod tests;
