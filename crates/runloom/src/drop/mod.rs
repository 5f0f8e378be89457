// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Item migration ("drop").
//!
//! A drop moves stash items into a network game room under per-item quotas.
//! The run leaves any current game, navigates the menus to the requested
//! room, walks every stash tab moving eligible items to the inventory and
//! dropping them, then leaves the room. The requester receives a
//! [`DropReport`] whatever the outcome.

mod menu;
mod quota;
mod refresher;
mod request;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::game::{GameError, Item};
use crate::run::{Run, RunError, RunParameters, SequencerResult};
use crate::scheduler::SchedulerError;
use crate::session::ExecutionContext;
use crate::time::Clock;

pub use menu::{backoff_delay, MenuNavigator};
pub use quota::DropQuotaTracker;
pub use refresher::BackgroundRefresh;
pub use request::{DropReport, DropRequest, DropStatus, PendingDrop};

pub const DROP_RUN: &str = "drop";

#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("invalid drop request: {0}")]
    InvalidRequest(String),

    #[error("menus did not settle after {polls} polls")]
    MenuExhausted { polls: u32 },

    #[error("migration ran past its time limit")]
    Timeout,

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("failed to start background refresh: {0}")]
    Refresher(#[source] std::io::Error),
}

/// Stage of the drop state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropStage {
    Idle,
    NavigateToLobby,
    JoinRoom,
    InRoomMigration,
    Finalize,
}

impl fmt::Display for DropStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::NavigateToLobby => "navigate_to_lobby",
            Self::JoinRoom => "join_room",
            Self::InRoomMigration => "in_room_migration",
            Self::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

/// An item waiting to be moved, with the attempts spent on it.
struct Queued {
    item: Item,
    attempts: u32,
}

/// In-room migration over one stash.
struct Migration<'a> {
    ctx: &'a ExecutionContext,
    tracker: &'a mut DropQuotaTracker,
    max_attempts: u32,
    deadline: Duration,
    queue: VecDeque<Queued>,
    /// Moved to the inventory, reserved, not yet on the ground
    carried: Vec<Item>,
    abandoned: u32,
}

impl<'a> Migration<'a> {
    fn new(
        ctx: &'a ExecutionContext,
        tracker: &'a mut DropQuotaTracker,
        max_attempts: u32,
        deadline: Duration,
    ) -> Self {
        Self {
            ctx,
            tracker,
            max_attempts,
            deadline,
            queue: VecDeque::new(),
            carried: Vec::new(),
            abandoned: 0,
        }
    }

    /// Migrate every eligible item. Returns the number of items given up on.
    fn run(mut self) -> Result<u32, DropError> {
        let result = self.drain();
        for item in std::mem::take(&mut self.carried) {
            self.tracker.release(&item.name);
        }
        if let Err(e) = self.ctx.game().storage.close_stash() {
            tracing::debug!(session = self.ctx.name(), error = %e, "close stash failed");
        }
        result.map(|()| self.abandoned)
    }

    fn drain(&mut self) -> Result<(), DropError> {
        let ctx = self.ctx;
        let storage = &ctx.game().storage;
        let tabs = storage.open_stash()?;
        for tab in 0..tabs {
            self.ctx.with_bag(|bag| bag.stash_cursor = tab);
            for item in storage.open_tab(tab)? {
                if self.tracker.tracks(&item.name) {
                    self.queue.push_back(Queued { item, attempts: 0 });
                }
            }
        }
        tracing::debug!(session = self.ctx.name(), queued = self.queue.len(), "stash scanned");

        while let Some(mut next) = self.queue.pop_front() {
            self.checkpoint()?;
            if !self.tracker.try_reserve(&next.item.name) {
                continue;
            }
            match storage.move_to_inventory(&next.item) {
                Ok(()) => self.carried.push(next.item),
                Err(GameError::NoSpace) if !self.carried.is_empty() => {
                    self.tracker.release(&next.item.name);
                    self.flush()?;
                    self.queue.push_front(next);
                }
                Err(GameError::ItemNotFound(id)) => {
                    self.tracker.release(&next.item.name);
                    tracing::warn!(
                        session = self.ctx.name(),
                        item = %next.item.name,
                        id,
                        "item vanished"
                    );
                    self.abandoned += 1;
                }
                Err(e) => {
                    self.tracker.release(&next.item.name);
                    next.attempts += 1;
                    if next.attempts >= self.max_attempts {
                        tracing::warn!(
                            session = self.ctx.name(),
                            item = %next.item.name,
                            attempts = next.attempts,
                            error = %e,
                            "giving up on item"
                        );
                        self.abandoned += 1;
                    } else {
                        tracing::debug!(
                            session = self.ctx.name(),
                            item = %next.item.name,
                            error = %e,
                            "move failed, requeued"
                        );
                        self.ctx.clock().sleep(backoff_delay(next.attempts - 1));
                        self.queue.push_back(next);
                    }
                }
            }
        }
        self.flush()
    }

    /// Drop everything carried, committing each confirmed drop.
    fn flush(&mut self) -> Result<(), DropError> {
        let ctx = self.ctx;
        let storage = &ctx.game().storage;
        while let Some(item) = self.carried.pop() {
            let mut attempts = 0;
            loop {
                if let Err(e) = self.checkpoint() {
                    self.carried.push(item);
                    return Err(e);
                }
                match storage.drop_to_ground(&item) {
                    Ok(()) => {
                        self.tracker.commit(&item.name);
                        break;
                    }
                    Err(e) => {
                        attempts += 1;
                        if attempts >= self.max_attempts {
                            tracing::warn!(
                                session = self.ctx.name(),
                                item = %item.name,
                                error = %e,
                                "drop failed"
                            );
                            self.tracker.release(&item.name);
                            self.abandoned += 1;
                            break;
                        }
                        self.ctx.clock().sleep(backoff_delay(attempts - 1));
                    }
                }
            }
        }
        Ok(())
    }

    fn checkpoint(&self) -> Result<(), DropError> {
        self.ctx.pause_point()?;
        if self.ctx.clock().now() >= self.deadline {
            return Err(DropError::Timeout);
        }
        Ok(())
    }
}

pub struct DropRun {
    ctx: Arc<ExecutionContext>,
}

impl DropRun {
    pub fn new(ctx: Arc<ExecutionContext>) -> Self {
        Self { ctx }
    }

    fn enter(&self, stage: DropStage) {
        tracing::info!(session = self.ctx.name(), %stage, "drop stage");
    }

    fn migrate(
        &self,
        request: &DropRequest,
        tracker: &mut DropQuotaTracker,
    ) -> Result<u32, DropError> {
        let config = self.ctx.config().drop;
        let deadline = self.ctx.clock().now() + config.migration_timeout();
        let mut menus = MenuNavigator::new(&self.ctx, config.menu_poll_ceiling, deadline);

        self.enter(DropStage::NavigateToLobby);
        menus.reach_lobby()?;

        self.enter(DropStage::JoinRoom);
        menus.join_room(&request.room, &request.password)?;
        tracing::debug!(session = self.ctx.name(), polls = menus.polls(), "joined room");

        self.enter(DropStage::InRoomMigration);
        let abandoned = {
            let _suppressed = self.ctx.suppress_refresh();
            let _refresh =
                BackgroundRefresh::spawn(Arc::clone(&self.ctx), config.refresh_interval())
                    .map_err(DropError::Refresher)?;
            Migration::new(&self.ctx, tracker, config.max_item_attempts, deadline).run()?
        };

        self.enter(DropStage::Finalize);
        self.ctx.game().manager.exit_game()?;
        Ok(abandoned)
    }

    /// Leave the drop in a known state: out of any game, at character select
    /// if the menus answer, otherwise with the game process gone.
    fn recover(&self) {
        let game = self.ctx.game();
        if let Err(e) = game.manager.exit_game() {
            tracing::debug!(session = self.ctx.name(), error = %e, "exit during recovery failed");
        }
        match game.manager.return_to_character_select() {
            Ok(()) => return,
            Err(e) => {
                tracing::warn!(
                    session = self.ctx.name(),
                    error = %e,
                    "character select unreachable"
                )
            }
        }
        if !self.ctx.config().drop.allow_terminate {
            tracing::error!(session = self.ctx.name(), "menus stuck and termination disabled");
            return;
        }
        tracing::warn!(session = self.ctx.name(), "terminating game process");
        if let Err(e) = game.process.terminate_game() {
            tracing::error!(session = self.ctx.name(), error = %e, "terminate failed");
        }
    }
}

impl Run for DropRun {
    fn name(&self) -> &str {
        DROP_RUN
    }

    fn check_conditions(&self, _params: &RunParameters) -> SequencerResult {
        if self.ctx.with_bag(|bag| bag.pending_drop.is_some()) {
            SequencerResult::Ok
        } else {
            SequencerResult::Skip
        }
    }

    fn run(&self, _params: &RunParameters) -> Result<(), RunError> {
        let Some(PendingDrop { request, reply }) =
            self.ctx.with_bag(|bag| bag.pending_drop.take())
        else {
            return Ok(());
        };
        self.ctx.with_bag(|bag| bag.drop_active = true);
        tracing::info!(
            session = self.ctx.name(),
            room = %request.room,
            items = request.total_quota(),
            "drop requested"
        );

        let started = self.ctx.clock().now();
        let mut tracker = DropQuotaTracker::new(&request.quotas);
        let result = request
            .validate()
            .and_then(|()| self.migrate(&request, &mut tracker));
        let duration = self.ctx.clock().now().saturating_sub(started);

        let status = match &result {
            Ok(0) => DropStatus::Completed,
            Ok(_) => DropStatus::Partial,
            Err(_) => DropStatus::Failed,
        };
        if let Err(e) = &result {
            if !matches!(
                e,
                DropError::Scheduler(SchedulerError::Stopped) | DropError::InvalidRequest(_)
            ) {
                tracing::warn!(session = self.ctx.name(), error = %e, "drop failed, recovering");
                self.recover();
            }
        }

        let report = DropReport {
            status,
            items_dropped: tracker.committed_counts(),
            duration,
            error: result.as_ref().err().map(ToString::to_string),
            finished_at: Utc::now(),
        };
        tracing::info!(
            session = self.ctx.name(),
            status = ?report.status,
            dropped = report.total_dropped(),
            "drop finished"
        );
        self.ctx.with_bag(|bag| bag.drop_active = false);
        if reply.send(report).is_err() {
            tracing::debug!(session = self.ctx.name(), "drop requester went away");
        }

        result.map(|_| ()).map_err(RunError::from)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
