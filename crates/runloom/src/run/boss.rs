// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Boss farming runs.

use std::sync::Arc;

use super::{Run, RunError, RunMode, RunParameters, SequencerResult};
use crate::game::{Area, Quest};
use crate::session::ExecutionContext;

/// A boss: where it lives, and the quest killing it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossSpec {
    pub name: &'static str,
    pub area: Area,
    pub quest: Option<Quest>,
    /// Clear the area before the boss shows up
    pub clear_area: bool,
}

pub const BOSSES: &[BossSpec] = &[
    BossSpec {
        name: "andariel",
        area: Area::CatacombsLevel4,
        quest: Some(Quest::SistersToTheSlaughter),
        clear_area: false,
    },
    BossSpec {
        name: "countess",
        area: Area::ForgottenTower,
        quest: None,
        clear_area: false,
    },
    BossSpec {
        name: "summoner",
        area: Area::ArcaneSanctuary,
        quest: None,
        clear_area: false,
    },
    BossSpec {
        name: "mephisto",
        area: Area::DuranceOfHateLevel3,
        quest: Some(Quest::TheGuardian),
        clear_area: false,
    },
    BossSpec {
        name: "diablo",
        area: Area::ChaosSanctuary,
        quest: Some(Quest::TerrorsEnd),
        clear_area: true,
    },
    BossSpec {
        name: "pindleskin",
        area: Area::NihlathaksTemple,
        quest: None,
        clear_area: false,
    },
    BossSpec {
        name: "nihlathak",
        area: Area::HallsOfVaught,
        quest: None,
        clear_area: false,
    },
    BossSpec {
        name: "baal",
        area: Area::WorldstoneChamber,
        quest: Some(Quest::EveOfDestruction),
        clear_area: true,
    },
];

pub struct BossRun {
    ctx: Arc<ExecutionContext>,
    spec: BossSpec,
}

impl BossRun {
    pub fn new(ctx: Arc<ExecutionContext>, spec: BossSpec) -> Self {
        Self { ctx, spec }
    }
}

impl Run for BossRun {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn check_conditions(&self, params: &RunParameters) -> SequencerResult {
        let quest = match (params.mode(), self.spec.quest) {
            (RunMode::Quest, None) => return SequencerResult::Error,
            (RunMode::Quest, Some(quest)) => Some(quest),
            (RunMode::Farming, _) => None,
        };
        if self
            .ctx
            .with_bag(|bag| bag.blacklisted_monsters.contains(self.spec.name))
        {
            return SequencerResult::Skip;
        }

        self.ctx.with_game_data(|data| {
            let tier = data.difficulty;
            if !data.can_reach(self.spec.area.act(), tier) {
                return SequencerResult::Skip;
            }
            match quest {
                Some(quest) if data.quest_completed(tier, quest) => SequencerResult::Skip,
                _ => SequencerResult::Ok,
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
        character.kill_monster(self.spec.name)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "boss_tests.rs"]
mod tests;
