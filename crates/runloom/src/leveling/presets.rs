// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Survival presets keyed by tier and level.

use crate::config::{BeltConfig, HealthConfig, MercConfig, PotionKind};
use crate::game::Difficulty;
use crate::session::ExecutionContext;

/// Level below which a character still counts as fresh.
const EARLY_LEVEL: u8 = 12;

/// Level at which the first mercenary is affordable.
const MERC_LEVEL: u8 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presets {
    pub health: HealthConfig,
    pub belt: BeltConfig,
    pub merc: MercConfig,
}

pub fn presets_for(tier: Difficulty, level: u8) -> Presets {
    use PotionKind::{Healing, Mana, Rejuvenation};

    let early = tier == Difficulty::Normal && level < EARLY_LEVEL;
    let health = match tier {
        Difficulty::Normal if early => HealthConfig {
            healing_potion_at: 50,
            mana_potion_at: 20,
            rejuv_potion_at: 30,
            chicken_at: 0,
        },
        Difficulty::Normal => HealthConfig::default(),
        Difficulty::Nightmare => HealthConfig {
            healing_potion_at: 70,
            mana_potion_at: 30,
            rejuv_potion_at: 45,
            chicken_at: 35,
        },
        Difficulty::Hell => HealthConfig {
            healing_potion_at: 80,
            mana_potion_at: 35,
            rejuv_potion_at: 50,
            chicken_at: 40,
        },
    };

    let columns = match tier {
        _ if early => [Healing, Healing, Mana, Mana],
        Difficulty::Hell => [Healing, Mana, Rejuvenation, Rejuvenation],
        _ => [Healing, Healing, Mana, Rejuvenation],
    };

    let merc_healing = match tier {
        Difficulty::Normal => 50,
        Difficulty::Nightmare => 60,
        Difficulty::Hell => 70,
    };

    Presets {
        health,
        belt: BeltConfig { columns },
        merc: MercConfig {
            use_merc: level >= MERC_LEVEL,
            healing_potion_at: merc_healing,
            rejuv_potion_at: 40,
        },
    }
}

/// Write the presets for `tier` and `level` into the live configuration.
///
/// Returns whether anything changed.
pub fn apply_presets(ctx: &ExecutionContext, tier: Difficulty, level: u8) -> bool {
    let presets = presets_for(tier, level);
    let mut changed = false;
    ctx.update_config(|config| {
        changed = config.health != presets.health
            || config.belt != presets.belt
            || config.merc != presets.merc;
        config.health = presets.health;
        config.belt = presets.belt;
        config.merc = presets.merc;
    });
    if changed {
        tracing::debug!(session = ctx.name(), %tier, level, "applied presets");
    }
    changed
}

#[cfg(test)]
#[path = "presets_tests.rs"]
mod tests;
