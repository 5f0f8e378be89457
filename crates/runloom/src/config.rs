// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor configuration for TOML/JSON config files.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::game::sim::SimProfile;
use crate::game::{Area, Difficulty};
use crate::run::RunMode;

/// Default scheduler poll interval
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
/// Default number of failed passes in a row before a session gives up
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;
/// Default attempts per item during a drop
pub const DEFAULT_MAX_ITEM_ATTEMPTS: u32 = 3;
/// Default ceiling on menu polls while reaching a drop room
pub const DEFAULT_MENU_POLL_CEILING: u32 = 120;
/// Default wall-clock ceiling for one migration
pub const DEFAULT_MIGRATION_TIMEOUT_SECS: u64 = 300;
/// Default snapshot refresh interval while in a drop room
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 200;
/// Default directory holding leveling plans
pub const DEFAULT_PLANS_DIR: &str = "plans";

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_consecutive_failures() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_FAILURES
}

fn default_max_item_attempts() -> u32 {
    DEFAULT_MAX_ITEM_ATTEMPTS
}

fn default_menu_poll_ceiling() -> u32 {
    DEFAULT_MENU_POLL_CEILING
}

fn default_migration_timeout_secs() -> u64 {
    DEFAULT_MIGRATION_TIMEOUT_SECS
}

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_true() -> bool {
    true
}

/// Errors loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level supervisor configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// JSONL file mirroring the run record log
    #[serde(default)]
    pub records: Option<PathBuf>,

    /// One entry per supervised character
    #[serde(default, rename = "character")]
    pub characters: Vec<CharacterConfig>,
}

impl Config {
    /// Load from a `.json` or TOML file, then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        if let Some(dir) = crate::env::plans_dir() {
            config.override_plans_dir(&dir);
        }
        if config.records.is_none() {
            config.records = crate::env::records_path();
        }

        config.validate()?;
        Ok(config)
    }

    /// Point every leveling character at `dir`.
    pub fn override_plans_dir(&mut self, dir: &Path) {
        for character in &mut self.characters {
            if let Some(leveling) = character.leveling.as_mut() {
                leveling.plans_dir = Some(dir.to_path_buf());
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.characters.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[character]] is required".to_string(),
            ));
        }
        if self.scheduler.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "scheduler.poll_interval_ms must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for character in &self.characters {
            character.validate()?;
            if !seen.insert(character.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate character '{}'",
                    character.name
                )));
            }
        }
        Ok(())
    }

    pub fn character(&self, name: &str) -> Option<&CharacterConfig> {
        self.characters.iter().find(|c| c.name == name)
    }
}

/// Scheduler tuning
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Upper bound on one wait inside the suspension point
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Failed passes in a row before a session ends with an error
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Live configuration of one character.
///
/// The leveling run rewrites `game.difficulty`, `health`, `belt` and `merc`
/// at the start of every pass.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CharacterConfig {
    pub name: String,

    /// Run names, in execution order
    #[serde(default)]
    pub runs: Vec<String>,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub terror_zone: TerrorZoneConfig,

    #[serde(default)]
    pub leveling: Option<LevelingConfig>,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub belt: BeltConfig,

    #[serde(default)]
    pub merc: MercConfig,

    #[serde(default)]
    pub drop: DropConfig,

    /// Simulated game backing this character under `runloom run`
    #[serde(default)]
    pub sim: Option<SimProfile>,
}

impl CharacterConfig {
    /// Configuration with every optional section at its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: Vec::new(),
            game: GameConfig::default(),
            terror_zone: TerrorZoneConfig::default(),
            leveling: None,
            health: HealthConfig::default(),
            belt: BeltConfig::default(),
            merc: MercConfig::default(),
            drop: DropConfig::default(),
            sim: None,
        }
    }

    pub fn with_runs<I, S>(mut self, runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runs = runs.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "character name must not be empty".to_string(),
            ));
        }
        if let Some(leveling) = &self.leveling {
            if leveling.plan.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "character '{}': leveling.plan must not be empty",
                    self.name
                )));
            }
        }
        if self.drop.max_item_attempts == 0 {
            return Err(ConfigError::Validation(format!(
                "character '{}': drop.max_item_attempts must be positive",
                self.name
            )));
        }
        if self.drop.menu_poll_ceiling == 0 {
            return Err(ConfigError::Validation(format!(
                "character '{}': drop.menu_poll_ceiling must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Mode the top-level run list is dispatched in
    #[serde(default)]
    pub mode: RunMode,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TerrorZoneConfig {
    /// Terrorized areas worth running
    #[serde(default)]
    pub areas: Vec<Area>,

    /// Run only the terror zone while one of `areas` is terrorized
    #[serde(default)]
    pub skip_other_runs: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LevelingConfig {
    /// Plan name, resolved to `<plans_dir>/<plan>.json`
    pub plan: String,

    #[serde(default)]
    pub plans_dir: Option<PathBuf>,
}

impl LevelingConfig {
    pub fn plan_path(&self) -> PathBuf {
        let dir = self
            .plans_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PLANS_DIR));
        dir.join(format!("{}.json", self.plan))
    }
}

/// Life/mana thresholds, in percent.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub healing_potion_at: u8,
    pub mana_potion_at: u8,
    pub rejuv_potion_at: u8,
    /// Leave the game below this life percentage
    pub chicken_at: u8,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            healing_potion_at: 60,
            mana_potion_at: 25,
            rejuv_potion_at: 40,
            chicken_at: 30,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PotionKind {
    Healing,
    Mana,
    Rejuvenation,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BeltConfig {
    pub columns: [PotionKind; 4],
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            columns: [
                PotionKind::Healing,
                PotionKind::Healing,
                PotionKind::Mana,
                PotionKind::Rejuvenation,
            ],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MercConfig {
    pub use_merc: bool,
    pub healing_potion_at: u8,
    pub rejuv_potion_at: u8,
}

impl Default for MercConfig {
    fn default() -> Self {
        Self {
            use_merc: true,
            healing_potion_at: 50,
            rejuv_potion_at: 40,
        }
    }
}

/// Bounds for one drop migration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DropConfig {
    #[serde(default = "default_max_item_attempts")]
    pub max_item_attempts: u32,

    #[serde(default = "default_menu_poll_ceiling")]
    pub menu_poll_ceiling: u32,

    #[serde(default = "default_migration_timeout_secs")]
    pub migration_timeout_secs: u64,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Fall back to terminating the game process when menus stay stuck
    #[serde(default = "default_true")]
    pub allow_terminate: bool,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            max_item_attempts: DEFAULT_MAX_ITEM_ATTEMPTS,
            menu_poll_ceiling: DEFAULT_MENU_POLL_CEILING,
            migration_timeout_secs: DEFAULT_MIGRATION_TIMEOUT_SECS,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            allow_terminate: true,
        }
    }
}

impl DropConfig {
    pub fn migration_timeout(&self) -> Duration {
        Duration::from_secs(self.migration_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
