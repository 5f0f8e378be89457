// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::config::CharacterConfig;
use crate::testing::Harness;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Instant;
use yare::parameterized;

const ALL: [Priority; 5] = [
    Priority::High,
    Priority::Normal,
    Priority::Background,
    Priority::Pause,
    Priority::Stop,
];

#[test]
fn test_priority_order() {
    assert!(Priority::High < Priority::Normal);
    assert!(Priority::Normal < Priority::Background);
    assert!(Priority::Background < Priority::Pause);
    assert!(Priority::Pause < Priority::Stop);
    assert_eq!(Priority::Stop.value(), 100);
}

#[test]
fn test_get_unattached_fails() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    assert_eq!(h.registry.get().unwrap_err(), SchedulerError::NotAttached);
    assert_eq!(
        h.registry.set_priority(Priority::High),
        Err(SchedulerError::NotAttached)
    );
    assert_eq!(
        h.registry.pause_if_not_priority(),
        Err(SchedulerError::NotAttached)
    );
}

#[test]
fn test_attach_get_detach() {
    let h = Harness::new(CharacterConfig::named("sorc"));

    let attachment = h.attach();
    let status = h.registry.get().unwrap();
    assert_eq!(status.priority, Priority::Normal);
    assert_eq!(status.context.name(), "sorc");
    assert_eq!(h.registry.attached_count(), 1);

    drop(attachment);
    assert_eq!(h.registry.attached_count(), 0);
    assert_eq!(h.registry.get().unwrap_err(), SchedulerError::NotAttached);
}

#[test]
fn test_attach_twice_fails() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let _first = h.attach();

    let second = h.registry.attach(Arc::clone(&h.ctx), Priority::High);

    assert_eq!(second.unwrap_err(), SchedulerError::AlreadyAttached);
    assert_eq!(h.registry.attached_count(), 1);
}

#[test]
fn test_reattach_after_detach() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let first = h.attach();
    let token = first.token();
    drop(first);

    let second = h.attach();
    assert_ne!(second.token(), token);
}

#[test]
fn test_other_thread_is_not_attached() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let _attached = h.attach();
    let registry = Arc::clone(&h.registry);

    let result = thread::spawn(move || registry.get().map(|s| s.priority))
        .join()
        .unwrap();

    assert_eq!(result, Err(SchedulerError::NotAttached));
}

#[test]
fn test_attachments_are_per_registry() {
    let a = Harness::new(CharacterConfig::named("a"));
    let b = Harness::new(CharacterConfig::named("b"));

    let _in_a = a.attach();
    assert!(b.registry.get().is_err());
    let _in_b = b.attach();

    assert_eq!(a.registry.get().unwrap().context.name(), "a");
    assert_eq!(b.registry.get().unwrap().context.name(), "b");
}

#[test]
fn test_threads_sharing_context_each_get_their_status() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let _main = h.attach();
    let registry = Arc::clone(&h.registry);
    let ctx = Arc::clone(&h.ctx);

    let helper = thread::spawn(move || {
        let _attached = registry.attach(ctx, Priority::Background).unwrap();
        let status = registry.get().unwrap();
        (status.priority, registry.attached_count())
    })
    .join()
    .unwrap();

    assert_eq!(helper, (Priority::Background, 2));
    assert_eq!(h.registry.get().unwrap().priority, Priority::Normal);
    assert_eq!(h.registry.attached_count(), 1);
}

#[test]
fn test_set_priority_changes_own_status() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let _attached = h.attach();

    h.registry.set_priority(Priority::Background).unwrap();

    assert_eq!(h.registry.get().unwrap().priority, Priority::Background);
}

#[parameterized(
    high = { Priority::High },
    normal = { Priority::Normal },
    background = { Priority::Background },
    pause = { Priority::Pause },
)]
fn test_pause_returns_when_priorities_match(priority: Priority) {
    let h = Harness::new(CharacterConfig::named("sorc"));
    let _attached = h.registry.attach(Arc::clone(&h.ctx), priority).unwrap();
    h.ctx.switch_priority(priority);

    assert_eq!(h.registry.pause_if_not_priority(), Ok(()));
}

#[test]
fn test_pause_never_returns_ok_once_stopped() {
    for current in ALL {
        let h = Harness::new(CharacterConfig::named("sorc"));
        let _attached = h.registry.attach(Arc::clone(&h.ctx), current).unwrap();
        h.ctx.switch_priority(Priority::Stop);

        assert_eq!(
            h.registry.pause_if_not_priority(),
            Err(SchedulerError::Stopped),
            "current = {}",
            current
        );
    }
}

#[test]
fn test_pause_blocks_until_resumed() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    h.ctx.switch_priority(Priority::Pause);
    let registry = Arc::clone(&h.registry);
    let ctx = Arc::clone(&h.ctx);
    let resumed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&resumed);

    let worker = thread::spawn(move || {
        let _attached = registry.attach(ctx, Priority::Normal).unwrap();
        let result = registry.pause_if_not_priority();
        flag.store(true, Ordering::SeqCst);
        result
    });

    thread::sleep(Duration::from_millis(50));
    assert!(!resumed.load(Ordering::SeqCst));

    h.ctx.switch_priority(Priority::Normal);
    assert_eq!(worker.join().unwrap(), Ok(()));
    assert!(resumed.load(Ordering::SeqCst));
}

#[test]
fn test_stop_while_paused_unwinds_waiter() {
    let h = Harness::new(CharacterConfig::named("sorc"));
    h.ctx.switch_priority(Priority::Pause);
    let registry = Arc::clone(&h.registry);
    let ctx = Arc::clone(&h.ctx);
    let steps_after_pause = Arc::new(AtomicU64::new(0));
    let steps = Arc::clone(&steps_after_pause);

    let worker = thread::spawn(move || -> Result<(), SchedulerError> {
        let _attached = registry.attach(ctx, Priority::Normal)?;
        registry.pause_if_not_priority()?;
        steps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    thread::sleep(Duration::from_millis(30));
    h.ctx.switch_priority(Priority::Stop);

    assert_eq!(worker.join().unwrap(), Err(SchedulerError::Stopped));
    assert_eq!(steps_after_pause.load(Ordering::SeqCst), 0);
    assert_eq!(h.registry.attached_count(), 0);
}

#[test]
fn test_wait_for_change_wakes_on_switch() {
    let signal = Arc::new(PrioritySignal::new(Priority::Pause));
    let other = Arc::clone(&signal);

    let start = Instant::now();
    let switcher = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        other.switch(Priority::Normal);
    });

    let woke_with = signal.wait_for_change(Priority::Pause, Duration::from_secs(10));
    switcher.join().unwrap();

    assert_eq!(woke_with, Priority::Normal);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_wait_for_change_returns_immediately_when_already_changed() {
    let signal = PrioritySignal::new(Priority::Normal);
    assert_eq!(
        signal.wait_for_change(Priority::Pause, Duration::from_secs(10)),
        Priority::Normal
    );
}
