// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use rstest::rstest;
use std::thread;
use std::time::Duration;

fn completed(ms: u64) -> RunOutcome {
    RunOutcome::Completed {
        duration: Duration::from_millis(ms),
    }
}

fn failed(error: &str) -> RunOutcome {
    RunOutcome::Failed {
        error: error.to_string(),
        duration: Duration::from_millis(10),
    }
}

#[test]
fn test_record_and_retrieve() {
    let log = RunLog::new();

    let returned = log.record("sorc", "andariel", true, completed(100));

    assert_eq!(log.len(), 1);
    let records = log.records();
    assert_eq!(records[0], returned);
    assert_eq!(records[0].seq, 0);
    assert_eq!(records[0].run, "andariel");
}

#[rstest]
#[case::skipped(RunOutcome::Skipped, false)]
#[case::stopped(RunOutcome::Stopped, false)]
#[case::unsupported(RunOutcome::Unsupported, false)]
#[case::completed(completed(5), true)]
#[case::failed(failed("chicken"), true)]
#[case::interrupted(RunOutcome::Interrupted, true)]
fn test_executions_by_outcome(#[case] outcome: RunOutcome, #[case] executed: bool) {
    let log = RunLog::new();
    log.record("sorc", "baal", true, outcome);

    assert_eq!(log.executions_of("baal"), usize::from(executed));
}

#[test]
fn test_executions_ignore_condition_outcomes() {
    let log = RunLog::new();
    log.record("sorc", "baal", true, RunOutcome::Skipped);
    log.record("sorc", "baal", true, completed(5));
    log.record("sorc", "baal", true, failed("chicken"));
    log.record("sorc", "baal", true, RunOutcome::Stopped);

    assert_eq!(log.executions_of("baal"), 2);
    assert_eq!(log.executions_of("mephisto"), 0);
}

#[test]
fn test_for_session_filters() {
    let log = RunLog::new();
    log.record("sorc", "baal", true, completed(5));
    log.record("pally", "baal", true, completed(5));
    log.record("sorc", "meph", true, completed(5));

    assert_eq!(log.for_session("sorc").len(), 2);
    assert_eq!(log.for_session("pally").len(), 1);
    assert!(log.for_session("necro").is_empty());
}

#[test]
fn test_count_failures_by_session() {
    let log = RunLog::new();
    log.record("sorc", "a", true, completed(100));
    log.record("sorc", "b", true, failed("died"));
    log.record("pally", "c", false, RunOutcome::Unsupported);

    assert_eq!(log.count(|r| r.outcome.is_failure()), 2);
    assert_eq!(
        log.count(|r| r.session == "sorc" && r.outcome.is_failure()),
        1
    );
    assert!(!log.is_empty());
    assert!(RunLog::default().is_empty());
}

#[test]
fn test_clone_shares_state() {
    let log1 = RunLog::new();
    let log2 = log1.clone();

    log1.record("sorc", "a", true, completed(1));
    log2.record("pally", "b", true, completed(1));

    assert_eq!(log1.len(), 2);
    assert_eq!(log2.len(), 2);
}

#[test]
fn test_file_mirror_appends_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.jsonl");

    {
        let log = RunLog::with_file(&path).unwrap();
        log.record("sorc", "andariel", true, completed(1));
        log.record("sorc", "mephisto", true, failed("no path"));
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let second: RunRecord = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.run, "mephisto");
    assert!(matches!(second.outcome, RunOutcome::Failed { .. }));
}

#[test]
fn test_file_mirror_invalid_path() {
    let result = RunLog::with_file(Path::new("/nonexistent/dir/runs.jsonl"));
    assert!(result.is_err());
}

#[test]
fn test_concurrent_sessions_share_sequence() {
    let log = RunLog::new();
    let other = log.clone();

    let handle = thread::spawn(move || {
        for _ in 0..100 {
            other.record("pally", "baal", true, RunOutcome::Skipped);
        }
    });
    for _ in 0..100 {
        log.record("sorc", "baal", true, RunOutcome::Skipped);
    }
    handle.join().unwrap();

    let seqs: Vec<u64> = log.records().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, (0..200).collect::<Vec<u64>>());
}

proptest! {
    #[test]
    fn len_equals_record_count(count in 0usize..100) {
        let log = RunLog::new();
        for _ in 0..count {
            log.record("sorc", "a", true, RunOutcome::Skipped);
        }
        prop_assert_eq!(log.len(), count);
    }

    #[test]
    fn failures_counted_exactly(ok in 0usize..20, bad in 0usize..20) {
        let log = RunLog::new();
        for _ in 0..ok {
            log.record("sorc", "a", true, completed(1));
        }
        for _ in 0..bad {
            log.record("sorc", "a", true, failed("x"));
        }
        prop_assert_eq!(log.count(|r| r.outcome.is_failure()), bad);
        prop_assert_eq!(log.executions_of("a"), ok + bad);
    }
}
