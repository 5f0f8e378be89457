// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative leveling plans.
//!
//! A plan lists, per difficulty tier, the runs to execute before, during and
//! after questing, plus the predicates a character must meet to play that
//! tier. Plans live at `<plans_dir>/<plan>.json` and may use JSON5 syntax.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::game::Difficulty;
use crate::run::RunRegistry;

/// Default gold per character level below which a character counts as poor
pub const DEFAULT_LOW_GOLD_PER_LEVEL: u32 = 1000;

fn default_low_gold_per_level() -> u32 {
    DEFAULT_LOW_GOLD_PER_LEVEL
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("leveling plan {} not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read leveling plan {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed leveling plan {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("leveling plan names unknown run '{0}'")]
    UnknownRun(String),

    #[error("leveling plan entry '{run}' has min_level {min} above max_level {max}")]
    InvalidBounds { run: String, min: u8, max: u8 },
}

/// One scheduled run inside a tier list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceEntry {
    pub run: String,
    #[serde(default)]
    pub min_level: Option<u8>,
    #[serde(default)]
    pub max_level: Option<u8>,
    /// Dispatch in farming mode, and only while the character is low on gold
    #[serde(default)]
    pub farming: bool,
    /// A failed check ends the rest of the list instead of skipping this entry
    #[serde(default)]
    pub stop_if_check_fails: bool,
    /// Leave the game after this run succeeds
    #[serde(default)]
    pub exit_game: bool,
}

impl SequenceEntry {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            min_level: None,
            max_level: None,
            farming: false,
            stop_if_check_fails: false,
            exit_game: false,
        }
    }

    pub fn level_allows(&self, level: u8) -> bool {
        self.min_level.map_or(true, |min| level >= min)
            && self.max_level.map_or(true, |max| level <= max)
    }
}

/// Predicates a character must meet to play a tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierRequirements {
    pub min_level: Option<u8>,
    /// Resistance floors, net of the tier's penalty
    pub fire: Option<i32>,
    pub cold: Option<i32>,
    pub lightning: Option<i32>,
    pub poison: Option<i32>,
    /// Require the character not to be low on gold
    pub require_gold: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierSequence {
    pub before_quests: Vec<SequenceEntry>,
    pub quests: Vec<SequenceEntry>,
    pub after_quests: Vec<SequenceEntry>,
    pub requirements: Option<TierRequirements>,
}

impl TierSequence {
    pub fn entries(&self) -> impl Iterator<Item = &SequenceEntry> {
        self.before_quests
            .iter()
            .chain(&self.quests)
            .chain(&self.after_quests)
    }
}

/// A whole leveling plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelingSequenceSettings {
    #[serde(default)]
    pub normal: TierSequence,
    #[serde(default)]
    pub nightmare: TierSequence,
    #[serde(default)]
    pub hell: TierSequence,
    #[serde(default = "default_low_gold_per_level")]
    pub low_gold_per_level: u32,
}

impl Default for LevelingSequenceSettings {
    fn default() -> Self {
        Self {
            normal: TierSequence::default(),
            nightmare: TierSequence::default(),
            hell: TierSequence::default(),
            low_gold_per_level: DEFAULT_LOW_GOLD_PER_LEVEL,
        }
    }
}

impl LevelingSequenceSettings {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PlanError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PlanError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        parse_json5_or_json(&content).map_err(|e| PlanError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn tier(&self, tier: Difficulty) -> &TierSequence {
        match tier {
            Difficulty::Normal => &self.normal,
            Difficulty::Nightmare => &self.nightmare,
            Difficulty::Hell => &self.hell,
        }
    }

    /// Check every entry against the run table and its own level bounds.
    pub fn validate(&self, runs: &RunRegistry) -> Result<(), PlanError> {
        for entry in Difficulty::ALL
            .into_iter()
            .flat_map(|tier| self.tier(tier).entries())
        {
            if !runs.contains(&entry.run) {
                return Err(PlanError::UnknownRun(entry.run.clone()));
            }
            if let (Some(min), Some(max)) = (entry.min_level, entry.max_level) {
                if min > max {
                    return Err(PlanError::InvalidBounds {
                        run: entry.run.clone(),
                        min,
                        max,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Parse content as JSON5, falling back to strict JSON on parse failure.
fn parse_json5_or_json<T: serde::de::DeserializeOwned>(
    content: &str,
) -> Result<T, serde_json::Error> {
    json5::from_str(content).or_else(|_| serde_json::from_str(content))
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
