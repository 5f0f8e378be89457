// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use runloom_capture::RunLog;

use crate::config::CharacterConfig;
use crate::game::sim::SimGame;
use crate::game::{Collaborators, GameData};
use crate::scheduler::{Attachment, Priority, Registry};
use crate::session::ExecutionContext;
use crate::time::FakeClock;

/// A context wired to a simulated game and a fake clock.
pub(crate) struct Harness {
    pub ctx: Arc<ExecutionContext>,
    pub game: SimGame,
    pub registry: Arc<Registry>,
    pub clock: FakeClock,
    pub log: RunLog,
}

impl Harness {
    pub fn new(config: CharacterConfig) -> Self {
        Self::with_world(config, GameData::default(), true)
    }

    pub fn with_world(config: CharacterConfig, world: GameData, leveling: bool) -> Self {
        let game = SimGame::new(world);
        let registry = Registry::new(Duration::from_millis(5));
        let clock = FakeClock::new(1_000_000);
        let log = RunLog::new();
        let ctx = ExecutionContext::new(
            config,
            Box::new(game.character(leveling)),
            Collaborators::simulated(&game),
            Arc::clone(&registry),
            clock.clone().into(),
            log.clone(),
        );
        Self {
            ctx,
            game,
            registry,
            clock,
            log,
        }
    }

    /// Attach the calling thread at `Normal`.
    pub fn attach(&self) -> Attachment {
        self.registry
            .attach(Arc::clone(&self.ctx), Priority::Normal)
            .unwrap()
    }

    /// Put the simulated character in a fresh game and refresh the snapshot.
    pub fn enter_game(&self) {
        use crate::game::GameManager;
        let difficulty = self.ctx.config().game.difficulty;
        self.game.new_game(difficulty).unwrap();
        self.ctx.force_refresh().unwrap();
    }
}

/// A run with a fixed verdict and a scripted body.
pub(crate) struct ScriptedRun {
    name: String,
    verdict: crate::run::SequencerResult,
    body: Box<dyn Fn() -> Result<(), crate::run::RunError> + Send>,
    calls: Arc<std::sync::atomic::AtomicUsize>,
}

impl ScriptedRun {
    pub fn new(name: &str, verdict: crate::run::SequencerResult) -> Self {
        Self {
            name: name.to_string(),
            verdict,
            body: Box::new(|| Ok(())),
            calls: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
        }
    }

    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn() -> Result<(), crate::run::RunError> + Send + 'static,
    {
        self.body = Box::new(body);
        self
    }

    /// Counter of body invocations.
    pub fn calls(&self) -> Arc<std::sync::atomic::AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn boxed(self) -> Box<dyn crate::run::Run> {
        Box::new(self)
    }
}

impl crate::run::Run for ScriptedRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_conditions(&self, _params: &crate::run::RunParameters) -> crate::run::SequencerResult {
        self.verdict
    }

    fn run(&self, _params: &crate::run::RunParameters) -> Result<(), crate::run::RunError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        (self.body)()
    }
}
