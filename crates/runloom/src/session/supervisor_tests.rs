// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::config::CharacterConfig;
use crate::drop::DropStatus;
use crate::game::sim::SimGame;
use crate::game::{GameData, Item, StashTab};
use crate::run::{RunRegistry, SequencerResult};
use crate::scheduler::Registry;
use crate::session::SessionBuilder;
use crate::testing::ScriptedRun;
use crate::time::FakeClock;
use runloom_capture::RunLog;
use std::time::{Duration, Instant};

struct Fixture {
    supervisor: Supervisor,
    scheduler: Arc<Registry>,
    runs: Arc<RunRegistry>,
    log: RunLog,
}

impl Fixture {
    fn new() -> Self {
        let mut runs = RunRegistry::with_builtin_runs();
        runs.register("tick", |_, _| {
            ScriptedRun::new("tick", SequencerResult::Ok)
                .with_body(|| {
                    std::thread::sleep(Duration::from_millis(1));
                    Ok(())
                })
                .boxed()
        });
        Self {
            supervisor: Supervisor::new(),
            scheduler: Registry::new(Duration::from_millis(5)),
            runs: Arc::new(runs),
            log: RunLog::new(),
        }
    }

    fn session(&self, name: &str, world: GameData, passes: Option<u64>) -> Session {
        let sim = SimGame::new(world);
        let mut builder = SessionBuilder::new(CharacterConfig::named(name).with_runs(["tick"]))
            .unwrap()
            .with_scheduler(Arc::clone(&self.scheduler))
            .with_runs(Arc::clone(&self.runs))
            .with_simulated_game(&sim)
            .with_clock(FakeClock::new(1_000).into())
            .with_log(self.log.clone());
        if let Some(passes) = passes {
            builder = builder.with_max_passes(passes);
        }
        builder.build().unwrap()
    }

    fn spawn(&mut self, name: &str, passes: Option<u64>) {
        let session = self.session(name, GameData::default(), passes);
        self.supervisor.spawn(session).unwrap();
    }

    fn join(&mut self) -> BTreeMap<String, Result<SessionExit, SessionError>> {
        std::mem::take(&mut self.supervisor).join()
    }

    fn ticks(&self, name: &str) -> usize {
        self.log
            .count(|r| r.session == name && r.run == "tick" && r.outcome.executed())
    }
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

#[test]
fn test_sessions_run_on_their_own_threads() {
    let mut fx = Fixture::new();
    fx.spawn("a", Some(2));
    fx.spawn("b", Some(3));
    assert_eq!(fx.supervisor.names(), vec!["a", "b"]);

    let exits = fx.join();

    assert_eq!(exits.len(), 2);
    assert_eq!(exits["a"].as_ref().unwrap(), &SessionExit::PassesDone { passes: 2 });
    assert_eq!(exits["b"].as_ref().unwrap(), &SessionExit::PassesDone { passes: 3 });
    assert_eq!(fx.ticks("a"), 2);
    assert_eq!(fx.ticks("b"), 3);
    assert_eq!(fx.scheduler.attached_count(), 0);
}

#[test]
fn test_duplicate_character_is_rejected() {
    let mut fx = Fixture::new();
    fx.spawn("a", Some(1));
    let second = fx.session("a", GameData::default(), Some(1));

    let err = fx.supervisor.spawn(second).unwrap_err();

    assert!(matches!(err, SupervisorError::DuplicateCharacter(ref name) if name == "a"));
    fx.join();
}

#[test]
fn test_unknown_character() {
    let fx = Fixture::new();
    assert!(matches!(
        fx.supervisor.pause("ghost"),
        Err(SupervisorError::UnknownCharacter(_))
    ));
    assert!(matches!(
        fx.supervisor.request_handoff("ghost", "x"),
        Err(SupervisorError::UnknownCharacter(_))
    ));
}

#[test]
fn test_stop_all_ends_every_session() {
    let mut fx = Fixture::new();
    fx.spawn("a", None);
    fx.spawn("b", None);
    assert!(wait_until(|| fx.ticks("a") > 0 && fx.ticks("b") > 0));

    fx.supervisor.stop_all();
    let exits = fx.join();

    for exit in exits.values() {
        assert_eq!(exit.as_ref().unwrap(), &SessionExit::Stopped);
    }
}

#[test]
fn test_stop_one_leaves_the_other_running() {
    let mut fx = Fixture::new();
    fx.spawn("a", None);
    fx.spawn("b", None);
    assert!(wait_until(|| fx.ticks("a") > 0));

    fx.supervisor.stop("a").unwrap();
    let handle = fx.supervisor.handle();
    assert!(wait_until(|| handle.context("a").is_some_and(|ctx| {
        ctx.scheduler().attached_count() == 1
    })));
    let before = fx.ticks("b");
    assert!(wait_until(|| fx.ticks("b") > before));

    fx.supervisor.stop_all();
    let exits = fx.join();
    assert_eq!(exits["a"].as_ref().unwrap(), &SessionExit::Stopped);
}

#[test]
fn test_pause_and_resume() {
    let mut fx = Fixture::new();
    fx.spawn("a", None);
    assert!(wait_until(|| fx.ticks("a") > 0));

    fx.supervisor.pause("a").unwrap();
    std::thread::sleep(Duration::from_millis(50));
    let paused_at = fx.ticks("a");
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(fx.ticks("a"), paused_at);

    fx.supervisor.resume("a").unwrap();
    assert!(wait_until(|| fx.ticks("a") > paused_at));

    fx.supervisor.stop_all();
    let exits = fx.join();
    assert_eq!(exits["a"].as_ref().unwrap(), &SessionExit::Stopped);
}

#[test]
fn test_resume_does_not_undo_stop() {
    let mut fx = Fixture::new();
    fx.spawn("a", None);

    fx.supervisor.stop("a").unwrap();
    fx.supervisor.resume("a").unwrap();
    let ctx = fx.supervisor.handle().context("a").unwrap();
    assert_eq!(ctx.desired_priority(), Priority::Stop);

    let exits = fx.join();
    assert_eq!(exits["a"].as_ref().unwrap(), &SessionExit::Stopped);
}

#[test]
fn test_handoff_from_another_thread() {
    let mut fx = Fixture::new();
    fx.spawn("a", None);
    assert!(wait_until(|| fx.ticks("a") > 0));

    fx.supervisor.request_handoff("a", "player took over").unwrap();
    let exits = fx.join();

    assert_eq!(
        exits["a"].as_ref().unwrap(),
        &SessionExit::HandedOff(HandoffRequest {
            reason: "player took over".to_string()
        })
    );
}

#[test]
fn test_submit_drop_to_running_session() {
    let mut fx = Fixture::new();
    let world = GameData {
        stash: vec![StashTab {
            items: vec![Item::new(1, "ber"), Item::new(2, "jah")],
        }],
        ..GameData::default()
    };
    let session = fx.session("mule", world, None);
    fx.supervisor.spawn(session).unwrap();

    let receiver = fx
        .supervisor
        .submit_drop(
            "mule",
            DropRequest::new("trade", "").with_quota("ber", 1).with_quota("jah", 1),
        )
        .unwrap();
    let report = receiver.blocking_recv().unwrap();

    assert_eq!(report.status, DropStatus::Completed);
    assert_eq!(report.total_dropped(), 2);
    let ctx = fx.supervisor.handle().context("mule").unwrap();
    assert!(!ctx.with_bag(|bag| bag.drop_active));

    fx.supervisor.stop_all();
    fx.join();
}

#[test]
fn test_one_drop_at_a_time() {
    let mut fx = Fixture::new();
    // paused before the first pass so the request stays pending
    let session = fx.session("mule", GameData::default(), None);
    session.ctx().switch_priority(Priority::Pause);
    fx.supervisor.spawn(session).unwrap();
    let request = DropRequest::new("trade", "").with_quota("ber", 1);

    let _first = fx.supervisor.submit_drop("mule", request.clone()).unwrap();
    let second = fx.supervisor.submit_drop("mule", request);

    assert!(matches!(second, Err(SupervisorError::DropAlreadyActive(_))));
    fx.supervisor.stop_all();
    fx.join();
}

#[test]
fn test_invalid_drop_is_rejected_up_front() {
    let mut fx = Fixture::new();
    let session = fx.session("mule", GameData::default(), None);
    session.ctx().switch_priority(Priority::Pause);
    fx.supervisor.spawn(session).unwrap();

    let err = fx
        .supervisor
        .submit_drop("mule", DropRequest::new("", "").with_quota("ber", 1))
        .unwrap_err();

    assert!(matches!(err, SupervisorError::InvalidDrop(DropError::InvalidRequest(_))));
    let ctx = fx.supervisor.handle().context("mule").unwrap();
    assert!(ctx.with_bag(|bag| bag.pending_drop.is_none()));
    fx.supervisor.stop_all();
    fx.join();
}
