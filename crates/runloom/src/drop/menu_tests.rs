// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::config::CharacterConfig;
use crate::game::GameData;
use crate::scheduler::{Priority, SchedulerError};
use crate::testing::Harness;
use rstest::rstest;

fn far_future() -> Duration {
    Duration::from_secs(u64::MAX / 2_000)
}

fn harness_on(screen: MenuScreen) -> Harness {
    let world = GameData {
        screen,
        ..GameData::default()
    };
    Harness::with_world(CharacterConfig::named("sorc"), world, true)
}

#[rstest]
#[case::zero(0, 50)]
#[case::first_retry(1, 100)]
#[case::fourth_retry(4, 800)]
#[case::capped(10, 2_000)]
#[case::huge(100, 2_000)]
fn test_backoff_delay_bounds(#[case] attempt: u32, #[case] base_ms: u64) {
    for _ in 0..20 {
        let delay = backoff_delay(attempt).as_millis() as u64;
        assert!(delay >= base_ms, "{delay} < {base_ms}");
        assert!(delay <= base_ms + base_ms / 4, "{delay} too large");
    }
}

#[rstest]
#[case::character_select(MenuScreen::CharacterSelect)]
#[case::online_auth(MenuScreen::OnlineAuth)]
#[case::character_creation(MenuScreen::CharacterCreation)]
#[case::lobby(MenuScreen::Lobby)]
fn test_reach_lobby_corrects_screen(#[case] screen: MenuScreen) {
    let harness = harness_on(screen);
    let _attached = harness.attach();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.reach_lobby().unwrap();

    assert_eq!(harness.game.snapshot().screen, MenuScreen::Lobby);
    assert!(menus.polls() <= 3);
}

#[test]
fn test_reach_lobby_leaves_current_game() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    let _attached = harness.attach();
    harness.enter_game();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.reach_lobby().unwrap();

    assert_eq!(harness.game.counters().exits, 1);
    assert_eq!(harness.game.snapshot().screen, MenuScreen::Lobby);
}

#[test]
fn test_stalls_back_off_on_the_clock() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    harness.game.update_failures(|f| f.menu_stalls = 3);
    let _attached = harness.attach();
    let before = harness.clock.sleep_count();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.reach_lobby().unwrap();

    assert_eq!(harness.clock.sleep_count() - before, 3);
    assert_eq!(menus.polls(), 5);
}

#[test]
fn test_stuck_menus_exhaust_poll_budget() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    harness.game.update_failures(|f| f.stuck_menus = true);
    let _attached = harness.attach();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    let err = menus.reach_lobby().unwrap_err();

    assert!(matches!(err, DropError::MenuExhausted { polls: 120 }));
}

#[test]
fn test_deadline_bounds_navigation() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    harness.game.update_failures(|f| f.stuck_menus = true);
    let _attached = harness.attach();
    let deadline = harness.ctx.clock().now() + Duration::from_secs(5);

    let mut menus = MenuNavigator::new(&harness.ctx, 10_000, deadline);
    let err = menus.reach_lobby().unwrap_err();

    assert!(matches!(err, DropError::Timeout));
    assert!(menus.polls() < 10_000);
}

#[test]
fn test_join_room_retries_failed_joins() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    harness.game.update_failures(|f| f.join_failures = 2);
    let _attached = harness.attach();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.join_room("mule-room", "secret").unwrap();

    let world = harness.game.snapshot();
    assert_eq!(world.screen, MenuScreen::InGame);
    assert_eq!(world.game_name.as_deref(), Some("mule-room"));
    assert_eq!(harness.game.counters().joins, 1);
}

#[rstest]
#[case::one_frame(1)]
#[case::several_frames(4)]
fn test_join_room_waits_out_loading(#[case] frames: u32) {
    let harness = harness_on(MenuScreen::Lobby);
    harness.game.update_failures(|f| f.join_loading = frames);
    let _attached = harness.attach();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.join_room("trade", "pw").unwrap();

    let counters = harness.game.counters();
    assert_eq!(counters.joins, 1);
    assert_eq!(counters.exits, 0);
    assert_eq!(harness.game.snapshot().game_name.as_deref(), Some("trade"));
    assert_eq!(menus.polls(), 2 + frames);
}

#[test]
fn test_join_room_keeps_the_room_already_joined() {
    let harness = harness_on(MenuScreen::InGame);
    harness.game.update(|w| w.game_name = Some("trade".to_string()));
    let _attached = harness.attach();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.join_room("trade", "pw").unwrap();

    let counters = harness.game.counters();
    assert_eq!(counters.joins, 0);
    assert_eq!(counters.exits, 0);
    assert_eq!(menus.polls(), 1);
}

#[test]
fn test_join_room_leaves_another_game_first() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    let _attached = harness.attach();
    harness.enter_game();

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    menus.join_room("trade", "pw").unwrap();

    let counters = harness.game.counters();
    assert_eq!(counters.exits, 1);
    assert_eq!(counters.joins, 1);
    assert_eq!(harness.game.snapshot().game_name.as_deref(), Some("trade"));
}

#[test]
fn test_stop_interrupts_navigation() {
    let harness = harness_on(MenuScreen::CharacterSelect);
    harness.game.update_failures(|f| f.stuck_menus = true);
    let _attached = harness.attach();
    harness.ctx.switch_priority(Priority::Stop);

    let mut menus = MenuNavigator::new(&harness.ctx, 120, far_future());
    let err = menus.reach_lobby().unwrap_err();

    assert!(matches!(err, DropError::Scheduler(SchedulerError::Stopped)));
}
