// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-character execution context.
//!
//! One [`ExecutionContext`] exists per supervised character for the whole
//! process lifetime. It is shared by `Arc` between the session thread, the
//! runs it builds and short-lived helpers, and is never cloned.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use runloom_capture::RunLog;
use uuid::Uuid;

use crate::config::CharacterConfig;
use crate::drop::PendingDrop;
use crate::game::{Character, Collaborators, GameData, GameError};
use crate::scheduler::{Priority, PrioritySignal, Registry, SchedulerError};
use crate::time::ClockHandle;

/// Request to hand the character over to another process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandoffRequest {
    pub reason: String,
}

/// Mutable per-session state shared by the runs of one character.
#[derive(Debug)]
pub struct SessionBag {
    pub blacklisted_monsters: HashSet<String>,
    pub pickup_items: bool,
    /// Stash tab the last storage operation worked on
    pub stash_cursor: usize,
    /// Failed executions per run name
    pub failure_counters: HashMap<String, u32>,
    /// Passes in a row that ended with a failed run
    pub consecutive_failures: u32,
    pub handoff: Option<HandoffRequest>,
    pub pending_drop: Option<PendingDrop>,
    pub drop_active: bool,
    /// Set by a run to end the pass and start a fresh game
    pub exit_game_requested: bool,
}

impl Default for SessionBag {
    fn default() -> Self {
        Self {
            blacklisted_monsters: HashSet::new(),
            pickup_items: true,
            stash_cursor: 0,
            failure_counters: HashMap::new(),
            consecutive_failures: 0,
            handoff: None,
            pending_drop: None,
            drop_active: false,
            exit_game_requested: false,
        }
    }
}

impl SessionBag {
    pub fn record_failure(&mut self, run: &str) {
        *self.failure_counters.entry(run.to_string()).or_insert(0) += 1;
    }

    pub fn failures_of(&self, run: &str) -> u32 {
        self.failure_counters.get(run).copied().unwrap_or(0)
    }
}

/// Shared state of one supervised character.
pub struct ExecutionContext {
    name: String,
    session_id: Uuid,
    priority: PrioritySignal,
    game_data: RwLock<GameData>,
    config: RwLock<CharacterConfig>,
    bag: Mutex<SessionBag>,
    refresh_suppressed: AtomicBool,
    character: Box<dyn Character>,
    game: Collaborators,
    scheduler: Arc<Registry>,
    clock: ClockHandle,
    log: RunLog,
}

impl ExecutionContext {
    pub fn new(
        config: CharacterConfig,
        character: Box<dyn Character>,
        game: Collaborators,
        scheduler: Arc<Registry>,
        clock: ClockHandle,
        log: RunLog,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: config.name.clone(),
            session_id: Uuid::new_v4(),
            priority: PrioritySignal::new(Priority::Normal),
            game_data: RwLock::new(GameData::default()),
            config: RwLock::new(config),
            bag: Mutex::new(SessionBag::default()),
            refresh_suppressed: AtomicBool::new(false),
            character,
            game,
            scheduler,
            clock,
            log,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn priority_signal(&self) -> &PrioritySignal {
        &self.priority
    }

    pub fn desired_priority(&self) -> Priority {
        self.priority.get()
    }

    /// Change the desired priority, visible to every thread of this session.
    pub fn switch_priority(&self, priority: Priority) {
        tracing::debug!(session = %self.name, %priority, "switch priority");
        self.priority.switch(priority);
    }

    /// Suspension point for the calling thread.
    pub fn pause_point(&self) -> Result<(), SchedulerError> {
        self.scheduler.pause_if_not_priority()
    }

    pub fn scheduler(&self) -> &Arc<Registry> {
        &self.scheduler
    }

    /// Copy of the current snapshot.
    pub fn game_data(&self) -> GameData {
        self.game_data.read().clone()
    }

    pub fn with_game_data<R>(&self, f: impl FnOnce(&GameData) -> R) -> R {
        f(&self.game_data.read())
    }

    /// Refresh the snapshot unless refreshing is suppressed.
    ///
    /// Returns whether a refresh happened.
    pub fn refresh_game_data(&self) -> Result<bool, GameError> {
        if self.refresh_suppressed() {
            return Ok(false);
        }
        self.force_refresh()?;
        Ok(true)
    }

    /// Refresh the snapshot regardless of suppression.
    pub fn force_refresh(&self) -> Result<(), GameError> {
        let mut data = self.game_data.write();
        self.game.reader.refresh_game_data(&mut data)
    }

    pub fn refresh_suppressed(&self) -> bool {
        self.refresh_suppressed.load(Ordering::SeqCst)
    }

    /// Suspend per-tick refreshes until the guard drops.
    pub fn suppress_refresh(&self) -> RefreshSuppression<'_> {
        let previous = self.refresh_suppressed.swap(true, Ordering::SeqCst);
        RefreshSuppression {
            flag: &self.refresh_suppressed,
            previous,
        }
    }

    /// Copy of the live configuration.
    pub fn config(&self) -> CharacterConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, f: impl FnOnce(&mut CharacterConfig)) {
        f(&mut self.config.write());
    }

    pub fn with_bag<R>(&self, f: impl FnOnce(&mut SessionBag) -> R) -> R {
        f(&mut self.bag.lock())
    }

    pub fn character(&self) -> &dyn Character {
        self.character.as_ref()
    }

    pub fn game(&self) -> &Collaborators {
        &self.game
    }

    pub fn clock(&self) -> &ClockHandle {
        &self.clock
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("name", &self.name)
            .field("session_id", &self.session_id)
            .field("desired_priority", &self.desired_priority())
            .field("refresh_suppressed", &self.refresh_suppressed())
            .finish_non_exhaustive()
    }
}

/// Guard restoring the refresh-suppression flag on drop.
#[must_use = "refreshes resume as soon as the guard drops"]
pub struct RefreshSuppression<'a> {
    flag: &'a AtomicBool,
    previous: bool,
}

impl Drop for RefreshSuppression<'_> {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
