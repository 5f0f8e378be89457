// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::config::CharacterConfig;
use crate::game::{Act, Difficulty, GameData};
use crate::testing::Harness;
use yare::parameterized;

fn spec(name: &str) -> BossSpec {
    *BOSSES.iter().find(|b| b.name == name).unwrap()
}

fn world_through(act: Act) -> GameData {
    let mut data = GameData::default();
    for done in Act::ALL.into_iter().filter(|a| *a < act) {
        data.completed_quests
            .insert((Difficulty::Normal, done.boss_quest()));
    }
    data
}

fn boss(name: &str, world: GameData) -> (Harness, BossRun) {
    let h = Harness::with_world(CharacterConfig::named("sorc"), world, false);
    h.enter_game();
    let run = BossRun::new(Arc::clone(&h.ctx), spec(name));
    (h, run)
}

#[parameterized(
    countess = { "countess" },
    summoner = { "summoner" },
    pindleskin = { "pindleskin" },
    nihlathak = { "nihlathak" },
)]
fn test_quest_mode_unsupported_without_quest(name: &str) {
    let (_h, run) = boss(name, world_through(Act::Five));
    assert_eq!(
        run.check_conditions(&RunParameters::quest()),
        SequencerResult::Error
    );
    assert_eq!(
        run.check_conditions(&RunParameters::farming()),
        SequencerResult::Ok
    );
}

#[test]
fn test_unreachable_area_skips() {
    let (_h, run) = boss("mephisto", world_through(Act::Two));
    assert_eq!(
        run.check_conditions(&RunParameters::farming()),
        SequencerResult::Skip
    );
}

#[test]
fn test_quest_mode_skips_completed_quest() {
    let (_h, run) = boss("andariel", world_through(Act::Two));
    assert_eq!(
        run.check_conditions(&RunParameters::quest()),
        SequencerResult::Skip
    );
    assert_eq!(
        run.check_conditions(&RunParameters::farming()),
        SequencerResult::Ok
    );
}

#[test]
fn test_quest_mode_runs_open_quest() {
    let (_h, run) = boss("andariel", GameData::default());
    assert_eq!(
        run.check_conditions(&RunParameters::quest()),
        SequencerResult::Ok
    );
}

#[test]
fn test_blacklisted_boss_skips() {
    let (h, run) = boss("baal", world_through(Act::Five));
    h.ctx.with_bag(|bag| {
        bag.blacklisted_monsters.insert("baal".to_string());
    });
    assert_eq!(
        run.check_conditions(&RunParameters::farming()),
        SequencerResult::Skip
    );
}

#[test]
fn test_run_moves_clears_and_kills() {
    let (h, run) = boss("diablo", world_through(Act::Four));
    let _attached = h.attach();

    run.run(&RunParameters::farming()).unwrap();

    let counters = h.game.counters();
    assert_eq!(counters.moves, vec![Area::ChaosSanctuary]);
    assert_eq!(counters.cleared, vec![Area::ChaosSanctuary]);
    assert_eq!(counters.kills, vec!["diablo"]);
}

#[test]
fn test_run_propagates_path_failure() {
    let (h, run) = boss("baal", world_through(Act::Five));
    let _attached = h.attach();
    h.game.update_failures(|f| {
        f.unreachable.insert(Area::WorldstoneChamber);
    });

    let err = run.run(&RunParameters::farming()).unwrap_err();

    assert!(matches!(err, RunError::Game(_)));
    assert!(h.game.counters().kills.is_empty());
}
