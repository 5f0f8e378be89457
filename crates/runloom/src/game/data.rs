// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Game snapshot types.
//!
//! A [`GameData`] is the whole state a run may inspect. The session refreshes
//! it in place; runs read clones of it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Difficulty tier.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Normal,
    Nightmare,
    Hell,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Normal, Self::Nightmare, Self::Hell];

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Nightmare),
            Self::Nightmare => Some(Self::Hell),
            Self::Hell => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Normal => None,
            Self::Nightmare => Some(Self::Normal),
            Self::Hell => Some(Self::Nightmare),
        }
    }

    /// All-resistance penalty applied in this tier.
    pub fn resist_penalty(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::Nightmare => 40,
            Self::Hell => 100,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Nightmare => "nightmare",
            Self::Hell => "hell",
        };
        f.write_str(name)
    }
}

/// Game act.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Act {
    #[default]
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Act {
    pub const ALL: [Act; 5] = [Self::One, Self::Two, Self::Three, Self::Four, Self::Five];

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }

    pub fn town(self) -> Area {
        match self {
            Self::One => Area::RogueEncampment,
            Self::Two => Area::LutGholein,
            Self::Three => Area::KurastDocks,
            Self::Four => Area::PandemoniumFortress,
            Self::Five => Area::Harrogath,
        }
    }

    /// The quest that finishes this act.
    pub fn boss_quest(self) -> Quest {
        match self {
            Self::One => Quest::SistersToTheSlaughter,
            Self::Two => Quest::TheSevenTombs,
            Self::Three => Quest::TheGuardian,
            Self::Four => Quest::TerrorsEnd,
            Self::Five => Quest::EveOfDestruction,
        }
    }
}

/// Areas the built-in runs travel to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    RogueEncampment,
    DenOfEvil,
    BurialGrounds,
    StonyField,
    ForgottenTower,
    Tristram,
    CatacombsLevel4,
    LutGholein,
    LutGholeinSewers,
    ArcaneSanctuary,
    TalRashasTomb,
    KurastDocks,
    DuranceOfHateLevel3,
    PandemoniumFortress,
    ChaosSanctuary,
    Harrogath,
    NihlathaksTemple,
    HallsOfVaught,
    WorldstoneChamber,
    BlackMarsh,
    TheAncientTunnels,
}

impl Area {
    pub fn act(self) -> Act {
        match self {
            Self::RogueEncampment
            | Self::DenOfEvil
            | Self::BurialGrounds
            | Self::StonyField
            | Self::ForgottenTower
            | Self::Tristram
            | Self::CatacombsLevel4
            | Self::BlackMarsh => Act::One,
            Self::LutGholein
            | Self::LutGholeinSewers
            | Self::ArcaneSanctuary
            | Self::TalRashasTomb
            | Self::TheAncientTunnels => Act::Two,
            Self::KurastDocks | Self::DuranceOfHateLevel3 => Act::Three,
            Self::PandemoniumFortress | Self::ChaosSanctuary => Act::Four,
            Self::Harrogath
            | Self::NihlathaksTemple
            | Self::HallsOfVaught
            | Self::WorldstoneChamber => Act::Five,
        }
    }

    pub fn is_town(self) -> bool {
        self.act().town() == self
    }
}

/// Quests tracked for progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quest {
    DenOfEvil,
    SistersBurialGrounds,
    TheSearchForCain,
    SistersToTheSlaughter,
    RadamentsLair,
    TheSevenTombs,
    TheGuardian,
    TerrorsEnd,
    EveOfDestruction,
}

impl Quest {
    pub fn act(self) -> Act {
        match self {
            Self::DenOfEvil
            | Self::SistersBurialGrounds
            | Self::TheSearchForCain
            | Self::SistersToTheSlaughter => Act::One,
            Self::RadamentsLair | Self::TheSevenTombs => Act::Two,
            Self::TheGuardian => Act::Three,
            Self::TerrorsEnd => Act::Four,
            Self::EveOfDestruction => Act::Five,
        }
    }

    /// Quest completed by killing `target`, if any.
    pub fn completed_by(target: &str) -> Option<Self> {
        match target {
            "corpsefire" => Some(Self::DenOfEvil),
            "blood_raven" => Some(Self::SistersBurialGrounds),
            "rakanishu" => Some(Self::TheSearchForCain),
            "andariel" => Some(Self::SistersToTheSlaughter),
            "radament" => Some(Self::RadamentsLair),
            "duriel" => Some(Self::TheSevenTombs),
            "mephisto" => Some(Self::TheGuardian),
            "diablo" => Some(Self::TerrorsEnd),
            "baal" => Some(Self::EveOfDestruction),
            _ => None,
        }
    }
}

/// Base resistances, before any tier penalty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    pub fire: i32,
    pub cold: i32,
    pub lightning: i32,
    pub poison: i32,
}

impl Resistances {
    pub fn uniform(value: i32) -> Self {
        Self {
            fire: value,
            cold: value,
            lightning: value,
            poison: value,
        }
    }

    /// Resistances as they apply inside `tier`.
    pub fn net_of(self, tier: Difficulty) -> Self {
        let penalty = tier.resist_penalty();
        Self {
            fire: self.fire - penalty,
            cold: self.cold - penalty,
            lightning: self.lightning - penalty,
            poison: self.poison - penalty,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashTab {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Out-of-game screen, or in game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuScreen {
    InGame,
    #[default]
    CharacterSelect,
    Lobby,
    OnlineAuth,
    CharacterCreation,
    Loading,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterData {
    pub level: u8,
    pub gold: u32,
    pub resistances: Resistances,
    pub dead: bool,
}

impl Default for CharacterData {
    fn default() -> Self {
        Self {
            level: 1,
            gold: 0,
            resistances: Resistances::default(),
            dead: false,
        }
    }
}

/// Snapshot of everything the orchestration core reads from the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameData {
    pub screen: MenuScreen,
    /// Name of the joined game, when in game
    pub game_name: Option<String>,
    pub area: Area,
    pub difficulty: Difficulty,
    pub character: CharacterData,
    pub completed_quests: BTreeSet<(Difficulty, Quest)>,
    pub terror_zones: Vec<Area>,
    pub stash: Vec<StashTab>,
    pub inventory: Vec<Item>,
    pub inventory_capacity: usize,
}

impl Default for GameData {
    fn default() -> Self {
        Self {
            screen: MenuScreen::CharacterSelect,
            game_name: None,
            area: Area::RogueEncampment,
            difficulty: Difficulty::Normal,
            character: CharacterData::default(),
            completed_quests: BTreeSet::new(),
            terror_zones: Vec::new(),
            stash: Vec::new(),
            inventory: Vec::new(),
            inventory_capacity: 40,
        }
    }
}

impl GameData {
    pub fn in_game(&self) -> bool {
        self.screen == MenuScreen::InGame
    }

    pub fn quest_completed(&self, tier: Difficulty, quest: Quest) -> bool {
        self.completed_quests.contains(&(tier, quest))
    }

    /// The act the character is working through in `tier`: the first act
    /// whose boss quest is incomplete, or Act V once every act is done.
    pub fn act_progress(&self, tier: Difficulty) -> Act {
        Act::ALL
            .into_iter()
            .find(|act| !self.quest_completed(tier, act.boss_quest()))
            .unwrap_or(Act::Five)
    }

    /// Whether `act` is unlocked in `tier`.
    pub fn can_reach(&self, act: Act, tier: Difficulty) -> bool {
        act <= self.act_progress(tier)
    }

    pub fn inventory_free(&self) -> usize {
        self.inventory_capacity.saturating_sub(self.inventory.len())
    }
}

#[cfg(test)]
#[path = "data_tests.rs"]
mod tests;
