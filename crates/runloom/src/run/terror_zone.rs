// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The terror zone run, always considered first.

use std::sync::Arc;

use super::{Run, RunError, RunMode, RunParameters, SequencerResult};
use crate::config::CharacterConfig;
use crate::game::{Area, GameData};
use crate::session::ExecutionContext;

/// Registered name of the terror zone run.
pub const TERROR_ZONE_RUN: &str = "terror_zone";

/// First configured area that is currently terrorized.
pub fn eligible_area(config: &CharacterConfig, data: &GameData) -> Option<Area> {
    config
        .terror_zone
        .areas
        .iter()
        .copied()
        .find(|area| data.terror_zones.contains(area))
}

pub struct TerrorZoneRun {
    ctx: Arc<ExecutionContext>,
}

impl TerrorZoneRun {
    pub fn new(ctx: Arc<ExecutionContext>) -> Self {
        Self { ctx }
    }

    fn target(&self) -> Option<Area> {
        let config = self.ctx.config();
        self.ctx
            .with_game_data(|data| eligible_area(&config, data))
    }
}

impl Run for TerrorZoneRun {
    fn name(&self) -> &str {
        TERROR_ZONE_RUN
    }

    fn check_conditions(&self, params: &RunParameters) -> SequencerResult {
        if params.mode() != RunMode::Farming {
            return SequencerResult::Error;
        }
        match self.target() {
            Some(_) => SequencerResult::Ok,
            None => SequencerResult::Skip,
        }
    }

    fn run(&self, _params: &RunParameters) -> Result<(), RunError> {
        let Some(area) = self.target() else {
            return Ok(());
        };
        tracing::debug!(session = self.ctx.name(), ?area, "terror zone");
        self.ctx.pause_point()?;
        self.ctx.game().navigator.move_to_area(area)?;
        self.ctx.pause_point()?;
        self.ctx.character().clear_area(area)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "terror_zone_tests.rs"]
mod tests;
