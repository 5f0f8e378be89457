// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tier ratchet.
//!
//! Walking up from Normal, a tier is kept while its requirements hold. The
//! walk advances past the configured tier only once the tier below has its
//! final milestone complete. Any failed requirement drops the character to
//! the highest tier below it whose requirements still hold.

use crate::game::{Difficulty, GameData, Quest};
use crate::session::ExecutionContext;

use super::plan::{LevelingSequenceSettings, TierRequirements};

/// Final milestone of every tier.
pub const FINAL_MILESTONE: Quest = Quest::EveOfDestruction;

/// A tier evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierDecision {
    pub from: Difficulty,
    pub to: Difficulty,
}

impl TierDecision {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Gold below `level * per_level`.
pub fn is_low_gold(data: &GameData, per_level: u32) -> bool {
    let floor = u32::from(data.character.level).saturating_mul(per_level);
    data.character.gold < floor
}

/// Whether `data` meets `requirements` inside `tier`.
///
/// Resistance floors compare against resistances net of the tier penalty.
pub fn requirements_hold(
    requirements: Option<&TierRequirements>,
    tier: Difficulty,
    data: &GameData,
    low_gold_per_level: u32,
) -> bool {
    let Some(req) = requirements else {
        return true;
    };
    if req
        .min_level
        .is_some_and(|min| data.character.level < min)
    {
        return false;
    }
    let net = data.character.resistances.net_of(tier);
    let floors = [
        (req.fire, net.fire),
        (req.cold, net.cold),
        (req.lightning, net.lightning),
        (req.poison, net.poison),
    ];
    if floors
        .into_iter()
        .any(|(floor, value)| floor.is_some_and(|floor| value < floor))
    {
        return false;
    }
    !(req.require_gold && is_low_gold(data, low_gold_per_level))
}

/// Tier the character should play, given the configured `current` tier.
pub fn select_tier(
    settings: &LevelingSequenceSettings,
    current: Difficulty,
    data: &GameData,
) -> Difficulty {
    let mut tier = Difficulty::Normal;
    while let Some(next) = tier.next() {
        let holds = requirements_hold(
            settings.tier(next).requirements.as_ref(),
            next,
            data,
            settings.low_gold_per_level,
        );
        if !holds {
            break;
        }
        if current < next && !data.quest_completed(tier, FINAL_MILESTONE) {
            break;
        }
        tier = next;
    }
    tier
}

/// Re-evaluate the configured tier and write the result back.
///
/// Idempotent for a fixed snapshot.
pub fn adjust_difficulty(
    ctx: &ExecutionContext,
    settings: &LevelingSequenceSettings,
) -> TierDecision {
    let from = ctx.config().game.difficulty;
    let to = ctx.with_game_data(|data| select_tier(settings, from, data));
    let decision = TierDecision { from, to };

    if decision.changed() {
        ctx.update_config(|config| config.game.difficulty = to);
        if to > from {
            tracing::info!(session = ctx.name(), %from, %to, "advancing difficulty");
        } else {
            tracing::warn!(session = ctx.name(), %from, %to, "reverting difficulty");
        }
    }
    decision
}

#[cfg(test)]
#[path = "difficulty_tests.rs"]
mod tests;
