// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Menu navigation for the drop workflow.
//!
//! Every screen probe spends one poll from a budget shared by the whole
//! navigation. Unproductive probes back off exponentially, with jitter.

use std::time::Duration;

use crate::game::{GameManager, MenuScreen};
use crate::session::ExecutionContext;
use crate::time::Clock;

use super::DropError;

const BACKOFF_BASE_MS: u64 = 50;
const BACKOFF_MAX_MS: u64 = 2_000;

/// Delay before retry `attempt` (zero-based): 50ms doubling up to 2s, plus
/// up to a quarter of that again as jitter.
pub fn backoff_delay(attempt: u32) -> Duration {
    let delay_ms = BACKOFF_BASE_MS
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(BACKOFF_MAX_MS);
    let jitter_ms = fastrand::u64(0..=delay_ms / 4);
    Duration::from_millis(delay_ms + jitter_ms)
}

pub struct MenuNavigator<'a> {
    ctx: &'a ExecutionContext,
    ceiling: u32,
    deadline: Duration,
    polls: u32,
    stalls: u32,
}

impl<'a> MenuNavigator<'a> {
    /// `deadline` is measured on the context clock.
    pub fn new(ctx: &'a ExecutionContext, ceiling: u32, deadline: Duration) -> Self {
        Self {
            ctx,
            ceiling,
            deadline,
            polls: 0,
            stalls: 0,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    fn manager(&self) -> &dyn GameManager {
        self.ctx.game().manager.as_ref()
    }

    fn probe(&mut self) -> Result<MenuScreen, DropError> {
        if self.polls >= self.ceiling {
            return Err(DropError::MenuExhausted { polls: self.polls });
        }
        if self.ctx.clock().now() >= self.deadline {
            return Err(DropError::Timeout);
        }
        self.ctx.pause_point()?;
        self.polls += 1;
        Ok(self.manager().current_screen())
    }

    fn back_off(&mut self) {
        let delay = backoff_delay(self.stalls);
        self.stalls = self.stalls.saturating_add(1);
        self.ctx.clock().sleep(delay);
    }

    /// Probe and correct screens until the lobby is up.
    pub fn reach_lobby(&mut self) -> Result<(), DropError> {
        loop {
            let screen = self.probe()?;
            let step = match screen {
                MenuScreen::Lobby => return Ok(()),
                MenuScreen::InGame => self.manager().exit_game(),
                MenuScreen::CharacterSelect => self.manager().enter_lobby(),
                MenuScreen::OnlineAuth => self.manager().confirm_online_auth(),
                MenuScreen::CharacterCreation => self.manager().cancel_character_creation(),
                MenuScreen::Loading | MenuScreen::Unknown => {
                    tracing::trace!(session = self.ctx.name(), ?screen, "waiting on menu");
                    self.back_off();
                    continue;
                }
            };
            match step {
                Ok(()) => self.stalls = 0,
                Err(e) => {
                    tracing::debug!(
                        session = self.ctx.name(),
                        ?screen,
                        error = %e,
                        "menu step failed"
                    );
                    self.back_off();
                }
            }
        }
    }

    /// Join `room` from wherever the menus currently are.
    ///
    /// A game already named `room` is never left.
    pub fn join_room(&mut self, room: &str, password: &str) -> Result<(), DropError> {
        loop {
            if self.manager().current_game().as_deref() != Some(room) {
                self.reach_lobby()?;
                if let Err(e) = self.manager().join_game(room, password) {
                    tracing::debug!(session = self.ctx.name(), room, error = %e, "join failed");
                    self.back_off();
                    continue;
                }
            }
            if self.await_room(room)? {
                return Ok(());
            }
            self.back_off();
        }
    }

    /// Probe through loading screens after a join. True once in `room`,
    /// false when the menus or another game show instead.
    fn await_room(&mut self, room: &str) -> Result<bool, DropError> {
        loop {
            match self.probe()? {
                MenuScreen::InGame => {
                    return Ok(self.manager().current_game().as_deref() == Some(room));
                }
                MenuScreen::Loading | MenuScreen::Unknown => self.back_off(),
                _ => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
#[path = "menu_tests.rs"]
mod tests;
