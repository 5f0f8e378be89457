// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SessionBuilder for assembling a [`Session`] with a fluent API.

use std::sync::Arc;
use std::time::Duration;

use runloom_capture::RunLog;

use crate::config::{CharacterConfig, DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_POLL_INTERVAL_MS};
use crate::game::sim::SimGame;
use crate::game::{Character, Collaborators};
use crate::run::RunRegistry;
use crate::scheduler::Registry;
use crate::time::ClockHandle;

use super::core::Session;
use super::ExecutionContext;

/// Builder for [`Session`] instances.
///
/// ```ignore
/// let session = SessionBuilder::new(config)?
///     .with_scheduler(registry)
///     .with_simulated_game(&sim)
///     .build()?;
/// ```
pub struct SessionBuilder {
    config: CharacterConfig,
    scheduler: Option<Arc<Registry>>,
    runs: Option<Arc<RunRegistry>>,
    game: Option<(Collaborators, Box<dyn Character>)>,
    clock: ClockHandle,
    log: Option<RunLog>,
    max_consecutive_failures: u32,
    max_passes: Option<u64>,
}

impl SessionBuilder {
    /// Start from one character's configuration.
    pub fn new(config: CharacterConfig) -> Result<Self, SessionBuildError> {
        if config.name.trim().is_empty() {
            return Err(SessionBuildError::Validation(
                "character name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            config,
            scheduler: None,
            runs: None,
            game: None,
            clock: ClockHandle::system(),
            log: None,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            max_passes: None,
        })
    }

    /// Registry shared with the other sessions of this process.
    pub fn with_scheduler(mut self, scheduler: Arc<Registry>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_runs(mut self, runs: Arc<RunRegistry>) -> Self {
        self.runs = Some(runs);
        self
    }

    pub fn with_game(mut self, game: Collaborators, character: Box<dyn Character>) -> Self {
        self.game = Some((game, character));
        self
    }

    /// Back every collaborator with `sim`.
    pub fn with_simulated_game(self, sim: &SimGame) -> Self {
        let character = Box::new(sim.character(true));
        self.with_game(Collaborators::simulated(sim), character)
    }

    /// Simulated game from the character's `sim` profile, if it has one.
    pub fn with_profile_game(self) -> Self {
        let sim = self.config.sim.as_ref().map(SimGame::from_profile);
        match sim {
            Some(sim) => self.with_simulated_game(&sim),
            None => self,
        }
    }

    pub fn with_clock(mut self, clock: ClockHandle) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_log(mut self, log: RunLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    /// Stop after `passes` completed passes.
    pub fn with_max_passes(mut self, passes: u64) -> Self {
        self.max_passes = Some(passes);
        self
    }

    pub fn build(self) -> Result<Session, SessionBuildError> {
        let (game, character) = self
            .game
            .ok_or_else(|| SessionBuildError::NoGame(self.config.name.clone()))?;
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Registry::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)));
        let runs = self
            .runs
            .unwrap_or_else(|| Arc::new(RunRegistry::with_builtin_runs()));

        if let Some(unknown) = self.config.runs.iter().find(|name| !runs.contains(name)) {
            return Err(SessionBuildError::UnknownRun {
                character: self.config.name.clone(),
                run: unknown.clone(),
            });
        }

        let ctx = ExecutionContext::new(
            self.config,
            character,
            game,
            scheduler,
            self.clock,
            self.log.unwrap_or_default(),
        );
        Ok(Session::new(
            ctx,
            runs,
            self.max_consecutive_failures,
            self.max_passes,
        ))
    }
}

/// Errors that can occur when building a Session.
#[derive(Debug, thiserror::Error)]
pub enum SessionBuildError {
    #[error("Invalid session configuration: {0}")]
    Validation(String),

    #[error("No game backend for character '{0}'")]
    NoGame(String),

    #[error("Character '{character}' lists unknown run '{run}'")]
    UnknownRun { character: String, run: String },
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
