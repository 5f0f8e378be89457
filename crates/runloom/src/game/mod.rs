// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Game collaborators.
//!
//! The orchestration core never touches the game directly. Reading state,
//! path-finding, menu handling, stash handling and combat all go through the
//! traits below. [`sim::SimGame`] implements every one of them in memory.

pub mod data;
pub mod sim;

use std::sync::Arc;

pub use data::{
    Act, Area, CharacterData, Difficulty, GameData, Item, MenuScreen, Quest, Resistances,
    StashTab,
};

/// Errors reported by game collaborators.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no path to {0:?}")]
    PathNotFound(Area),

    #[error("not in game")]
    NotInGame,

    #[error("no inventory space")]
    NoSpace,

    #[error("item {0} not found")]
    ItemNotFound(u64),

    #[error("failed to join game '{0}'")]
    JoinFailed(String),

    #[error("character died")]
    CharacterDied,

    #[error("{0}")]
    Other(String),
}

/// Produces the game snapshot.
pub trait GameReader: Send + Sync {
    /// Overwrite `data` with the current game state. Idempotent.
    fn refresh_game_data(&self, data: &mut GameData) -> Result<(), GameError>;
}

/// Path-finding.
pub trait Navigator: Send + Sync {
    fn travel_to_town(&self, act: Act) -> Result<(), GameError>;
    fn move_to_area(&self, area: Area) -> Result<(), GameError>;
}

/// Menus and game lifecycle.
pub trait GameManager: Send + Sync {
    fn current_screen(&self) -> MenuScreen;
    /// Name of the game currently joined
    fn current_game(&self) -> Option<String>;
    fn exit_game(&self) -> Result<(), GameError>;
    fn new_game(&self, difficulty: Difficulty) -> Result<(), GameError>;
    fn enter_lobby(&self) -> Result<(), GameError>;
    fn confirm_online_auth(&self) -> Result<(), GameError>;
    fn cancel_character_creation(&self) -> Result<(), GameError>;
    fn join_game(&self, room: &str, password: &str) -> Result<(), GameError>;
    fn return_to_character_select(&self) -> Result<(), GameError>;
}

/// Stash and inventory handling.
pub trait Storage: Send + Sync {
    /// Open the stash, returning the number of tabs.
    fn open_stash(&self) -> Result<usize, GameError>;
    /// Switch to a tab, returning the items it holds.
    fn open_tab(&self, tab: usize) -> Result<Vec<Item>, GameError>;
    fn move_to_inventory(&self, item: &Item) -> Result<(), GameError>;
    fn drop_to_ground(&self, item: &Item) -> Result<(), GameError>;
    fn close_stash(&self) -> Result<(), GameError>;
}

/// Control over the external game process.
pub trait ProcessControl: Send + Sync {
    fn terminate_game(&self) -> Result<(), GameError>;
}

/// Character behaviour: combat and movement routines.
pub trait Character: Send + Sync {
    fn kill_monster(&self, name: &str) -> Result<(), GameError>;
    fn clear_area(&self, area: Area) -> Result<(), GameError>;

    /// Leveling routines, when this character supports them.
    fn as_leveling(&self) -> Option<&dyn LevelingCharacter> {
        None
    }
}

/// Extra routines needed by the leveling run.
pub trait LevelingCharacter: Send + Sync {
    /// Spend stat and skill points for the given level.
    fn spend_points(&self, level: u8) -> Result<(), GameError>;
}

/// The game collaborators one session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub reader: Arc<dyn GameReader>,
    pub navigator: Arc<dyn Navigator>,
    pub manager: Arc<dyn GameManager>,
    pub storage: Arc<dyn Storage>,
    pub process: Arc<dyn ProcessControl>,
}

impl Collaborators {
    /// Every collaborator backed by one simulated game.
    pub fn simulated(game: &sim::SimGame) -> Self {
        let shared = Arc::new(game.clone());
        Self {
            reader: shared.clone(),
            navigator: shared.clone(),
            manager: shared.clone(),
            storage: shared.clone(),
            process: shared,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
