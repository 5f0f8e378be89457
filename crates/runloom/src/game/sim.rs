// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory game used by tests and by `runloom run`.
//!
//! [`SimGame`] implements every collaborator trait over a shared world
//! snapshot. Failures are scripted through [`SimFailures`]: each counter is
//! consumed by the matching operation, so a `join_failures = 2` profile makes
//! the first two joins fail and the third succeed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::{
    Act, Area, Character, Difficulty, GameData, GameError, GameManager, GameReader, Item,
    LevelingCharacter, MenuScreen, Navigator, ProcessControl, Quest, Storage,
};

/// Scripted failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimFailures {
    /// Screen polls reporting `Loading` before the real screen shows
    pub menu_stalls: u32,
    /// Every poll reports `Unknown` until the process is terminated
    pub stuck_menus: bool,
    pub join_failures: u32,
    /// Polls reporting `Loading` after each successful join
    pub join_loading: u32,
    pub exit_failures: u32,
    /// Failed `move_to_inventory` attempts per item name
    pub move_failures: BTreeMap<String, u32>,
    /// Failed `drop_to_ground` attempts per item name
    pub drop_failures: BTreeMap<String, u32>,
    /// Failed kill attempts per monster
    pub kill_failures: BTreeMap<String, u32>,
    /// Areas with no path
    pub unreachable: BTreeSet<Area>,
}

/// Starting world plus failure table, loadable from configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimProfile {
    pub game: GameData,
    pub failures: SimFailures,
    /// Character levels gained per monster killed
    pub levels_per_kill: u8,
}

/// What the simulated game has been asked to do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimCounters {
    pub refreshes: u64,
    pub new_games: u32,
    pub exits: u32,
    pub joins: u32,
    pub terminations: u32,
    pub travels: Vec<Act>,
    pub moves: Vec<Area>,
    pub kills: Vec<String>,
    pub cleared: Vec<Area>,
    pub points_spent: Vec<u8>,
    pub ground: Vec<Item>,
}

#[derive(Debug)]
struct SimState {
    world: GameData,
    failures: SimFailures,
    counters: SimCounters,
    levels_per_kill: u8,
    stash_open: bool,
    games_created: u32,
}

impl SimState {
    fn require_in_game(&self) -> Result<(), GameError> {
        if self.world.in_game() {
            Ok(())
        } else {
            Err(GameError::NotInGame)
        }
    }

    fn enter_game(&mut self, name: String) {
        self.world.screen = MenuScreen::InGame;
        self.world.game_name = Some(name);
        self.world.area = self.world.act_progress(self.world.difficulty).town();
    }

    fn leave_game(&mut self) {
        self.world.screen = MenuScreen::CharacterSelect;
        self.world.game_name = None;
        self.stash_open = false;
    }
}

/// Consume one scripted failure for `key`, returning whether it fired.
fn consume(table: &mut BTreeMap<String, u32>, key: &str) -> bool {
    match table.get_mut(key) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

fn consume_count(remaining: &mut u32) -> bool {
    if *remaining > 0 {
        *remaining -= 1;
        true
    } else {
        false
    }
}

/// Simulated game. Clones share the same world.
#[derive(Clone, Debug)]
pub struct SimGame {
    state: Arc<Mutex<SimState>>,
}

impl SimGame {
    pub fn new(world: GameData) -> Self {
        Self::from_profile(&SimProfile {
            game: world,
            ..SimProfile::default()
        })
    }

    pub fn from_profile(profile: &SimProfile) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                world: profile.game.clone(),
                failures: profile.failures.clone(),
                counters: SimCounters::default(),
                levels_per_kill: profile.levels_per_kill,
                stash_open: false,
                games_created: 0,
            })),
        }
    }

    /// Replace the failure table.
    pub fn with_failures(self, failures: SimFailures) -> Self {
        self.state.lock().failures = failures;
        self
    }

    /// Current world state.
    pub fn snapshot(&self) -> GameData {
        self.state.lock().world.clone()
    }

    pub fn update<F: FnOnce(&mut GameData)>(&self, f: F) {
        f(&mut self.state.lock().world);
    }

    pub fn update_failures<F: FnOnce(&mut SimFailures)>(&self, f: F) {
        f(&mut self.state.lock().failures);
    }

    pub fn counters(&self) -> SimCounters {
        self.state.lock().counters.clone()
    }

    /// A character fighting in this game.
    pub fn character(&self, leveling: bool) -> SimCharacter {
        SimCharacter {
            game: self.clone(),
            leveling,
        }
    }
}

impl GameReader for SimGame {
    fn refresh_game_data(&self, data: &mut GameData) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.counters.refreshes += 1;
        data.clone_from(&state.world);
        Ok(())
    }
}

impl Navigator for SimGame {
    fn travel_to_town(&self, act: Act) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.require_in_game()?;
        state.world.area = act.town();
        state.counters.travels.push(act);
        Ok(())
    }

    fn move_to_area(&self, area: Area) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.require_in_game()?;
        if state.failures.unreachable.contains(&area) {
            return Err(GameError::PathNotFound(area));
        }
        state.world.area = area;
        state.counters.moves.push(area);
        Ok(())
    }
}

impl GameManager for SimGame {
    fn current_screen(&self) -> MenuScreen {
        let mut state = self.state.lock();
        if state.failures.stuck_menus {
            return MenuScreen::Unknown;
        }
        if consume_count(&mut state.failures.menu_stalls) {
            return MenuScreen::Loading;
        }
        state.world.screen
    }

    fn current_game(&self) -> Option<String> {
        self.state.lock().world.game_name.clone()
    }

    fn exit_game(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if consume_count(&mut state.failures.exit_failures) {
            return Err(GameError::Other("exit menu did not open".to_string()));
        }
        if state.world.in_game() {
            state.leave_game();
            state.counters.exits += 1;
        }
        Ok(())
    }

    fn new_game(&self, difficulty: Difficulty) -> Result<(), GameError> {
        let mut state = self.state.lock();
        let screen = state.world.screen;
        if state.failures.stuck_menus
            || !matches!(screen, MenuScreen::CharacterSelect | MenuScreen::Lobby)
        {
            return Err(GameError::Other(format!(
                "cannot create a game from {:?}",
                screen
            )));
        }
        state.games_created += 1;
        state.counters.new_games += 1;
        state.world.difficulty = difficulty;
        let name = format!("runloom-{}", state.games_created);
        state.enter_game(name);
        Ok(())
    }

    fn enter_lobby(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        match state.world.screen {
            MenuScreen::CharacterSelect => {
                state.world.screen = MenuScreen::Lobby;
                Ok(())
            }
            other => Err(GameError::Other(format!(
                "lobby unavailable from {:?}",
                other
            ))),
        }
    }

    fn confirm_online_auth(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        match state.world.screen {
            MenuScreen::OnlineAuth => {
                state.world.screen = MenuScreen::Lobby;
                Ok(())
            }
            other => Err(GameError::Other(format!("no auth prompt on {:?}", other))),
        }
    }

    fn cancel_character_creation(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        match state.world.screen {
            MenuScreen::CharacterCreation => {
                state.world.screen = MenuScreen::CharacterSelect;
                Ok(())
            }
            other => Err(GameError::Other(format!(
                "not creating a character on {:?}",
                other
            ))),
        }
    }

    fn join_game(&self, room: &str, _password: &str) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.world.screen != MenuScreen::Lobby {
            return Err(GameError::Other(format!(
                "cannot join from {:?}",
                state.world.screen
            )));
        }
        if consume_count(&mut state.failures.join_failures) {
            return Err(GameError::JoinFailed(room.to_string()));
        }
        state.counters.joins += 1;
        state.enter_game(room.to_string());
        state.failures.menu_stalls = state
            .failures
            .menu_stalls
            .saturating_add(state.failures.join_loading);
        Ok(())
    }

    fn return_to_character_select(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        if state.failures.stuck_menus {
            return Err(GameError::Other("menu unresponsive".to_string()));
        }
        state.leave_game();
        Ok(())
    }
}

impl Storage for SimGame {
    fn open_stash(&self) -> Result<usize, GameError> {
        let mut state = self.state.lock();
        state.require_in_game()?;
        state.stash_open = true;
        Ok(state.world.stash.len())
    }

    fn open_tab(&self, tab: usize) -> Result<Vec<Item>, GameError> {
        let state = self.state.lock();
        if !state.stash_open {
            return Err(GameError::Other("stash is closed".to_string()));
        }
        state
            .world
            .stash
            .get(tab)
            .map(|t| t.items.clone())
            .ok_or_else(|| GameError::Other(format!("no stash tab {}", tab)))
    }

    fn move_to_inventory(&self, item: &Item) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.require_in_game()?;
        if consume(&mut state.failures.move_failures, &item.name) {
            return Err(GameError::Other(format!("{} stuck on cursor", item.name)));
        }
        if state.world.inventory_free() == 0 {
            return Err(GameError::NoSpace);
        }
        let found = state.world.stash.iter_mut().find_map(|tab| {
            let pos = tab.items.iter().position(|i| i.id == item.id)?;
            Some(tab.items.remove(pos))
        });
        match found {
            Some(moved) => {
                state.world.inventory.push(moved);
                Ok(())
            }
            None => Err(GameError::ItemNotFound(item.id)),
        }
    }

    fn drop_to_ground(&self, item: &Item) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.require_in_game()?;
        if consume(&mut state.failures.drop_failures, &item.name) {
            return Err(GameError::Other(format!("{} did not leave the cursor", item.name)));
        }
        let pos = state
            .world
            .inventory
            .iter()
            .position(|i| i.id == item.id)
            .ok_or(GameError::ItemNotFound(item.id))?;
        let dropped = state.world.inventory.remove(pos);
        state.counters.ground.push(dropped);
        Ok(())
    }

    fn close_stash(&self) -> Result<(), GameError> {
        self.state.lock().stash_open = false;
        Ok(())
    }
}

impl ProcessControl for SimGame {
    fn terminate_game(&self) -> Result<(), GameError> {
        let mut state = self.state.lock();
        state.counters.terminations += 1;
        state.failures.stuck_menus = false;
        state.failures.menu_stalls = 0;
        state.leave_game();
        Ok(())
    }
}

/// Character fighting in a [`SimGame`].
#[derive(Clone, Debug)]
pub struct SimCharacter {
    game: SimGame,
    leveling: bool,
}

impl Character for SimCharacter {
    fn kill_monster(&self, name: &str) -> Result<(), GameError> {
        let mut state = self.game.state.lock();
        state.require_in_game()?;
        if consume(&mut state.failures.kill_failures, name) {
            return Err(GameError::Other(format!("{} escaped", name)));
        }
        state.counters.kills.push(name.to_string());
        if let Some(quest) = Quest::completed_by(name) {
            let tier = state.world.difficulty;
            state.world.completed_quests.insert((tier, quest));
        }
        let gained = state.levels_per_kill;
        let level = &mut state.world.character.level;
        *level = level.saturating_add(gained).min(99);
        Ok(())
    }

    fn clear_area(&self, area: Area) -> Result<(), GameError> {
        let mut state = self.game.state.lock();
        state.require_in_game()?;
        if state.failures.unreachable.contains(&area) {
            return Err(GameError::PathNotFound(area));
        }
        state.counters.cleared.push(area);
        Ok(())
    }

    fn as_leveling(&self) -> Option<&dyn LevelingCharacter> {
        if self.leveling {
            Some(self)
        } else {
            None
        }
    }
}

impl LevelingCharacter for SimCharacter {
    fn spend_points(&self, level: u8) -> Result<(), GameError> {
        self.game.state.lock().counters.points_spent.push(level);
        Ok(())
    }
}

#[cfg(test)]
#[path = "sim_tests.rs"]
mod tests;
