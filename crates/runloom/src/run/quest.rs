// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Quest runs. Quest mode only.

use std::sync::Arc;

use super::{Run, RunError, RunMode, RunParameters, SequencerResult};
use crate::game::{Area, Quest};
use crate::session::ExecutionContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestSpec {
    pub name: &'static str,
    pub area: Area,
    /// Monster whose death completes the quest
    pub target: &'static str,
    pub quest: Quest,
    pub clear_area: bool,
}

pub const QUESTS: &[QuestSpec] = &[
    QuestSpec {
        name: "den_of_evil",
        area: Area::DenOfEvil,
        target: "corpsefire",
        quest: Quest::DenOfEvil,
        clear_area: true,
    },
    QuestSpec {
        name: "blood_raven",
        area: Area::BurialGrounds,
        target: "blood_raven",
        quest: Quest::SistersBurialGrounds,
        clear_area: false,
    },
    QuestSpec {
        name: "rescue_cain",
        area: Area::StonyField,
        target: "rakanishu",
        quest: Quest::TheSearchForCain,
        clear_area: false,
    },
    QuestSpec {
        name: "radament",
        area: Area::LutGholeinSewers,
        target: "radament",
        quest: Quest::RadamentsLair,
        clear_area: false,
    },
    QuestSpec {
        name: "duriel",
        area: Area::TalRashasTomb,
        target: "duriel",
        quest: Quest::TheSevenTombs,
        clear_area: false,
    },
];

pub struct QuestRun {
    ctx: Arc<ExecutionContext>,
    spec: QuestSpec,
}

impl QuestRun {
    pub fn new(ctx: Arc<ExecutionContext>, spec: QuestSpec) -> Self {
        Self { ctx, spec }
    }
}

impl Run for QuestRun {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn check_conditions(&self, params: &RunParameters) -> SequencerResult {
        if params.mode() == RunMode::Farming {
            return SequencerResult::Error;
        }
        self.ctx.with_game_data(|data| {
            let tier = data.difficulty;
            if data.quest_completed(tier, self.spec.quest) {
                SequencerResult::Skip
            } else if !data.can_reach(self.spec.quest.act(), tier) {
                // Later quests in the chain cannot progress either.
                SequencerResult::Stop
            } else {
                SequencerResult::Ok
            }
        })
    }

    fn run(&self, _params: &RunParameters) -> Result<(), RunError> {
        let game = self.ctx.game();
        let character = self.ctx.character();

        self.ctx.pause_point()?;
        game.navigator.move_to_area(self.spec.area)?;
        if self.spec.clear_area {
            self.ctx.pause_point()?;
            character.clear_area(self.spec.area)?;
        }
        self.ctx.pause_point()?;
        character.kill_monster(self.spec.target)?;
        self.ctx.pause_point()?;
        game.navigator.travel_to_town(self.spec.quest.act())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "quest_tests.rs"]
mod tests;
