// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::session::HandoffRequest;
use chrono::Utc;
use runloom_capture::RunOutcome;
use std::time::Duration;

fn written(f: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut buf = Vec::new();
    f(&mut buf);
    String::from_utf8(buf).unwrap()
}

#[test]
fn error_plain_text_when_not_terminal() {
    let output = written(|buf| write_error(buf, "plan not found", false));
    assert_eq!(output, "Error: plan not found\n");
}

#[test]
fn error_with_ansi_when_terminal() {
    let output = written(|buf| write_error(buf, "plan not found", true));
    assert_eq!(output, "\x1b[31mError: plan not found\x1b[0m\n");
}

#[test]
fn warning_plain_text_when_not_terminal() {
    let output = written(|buf| write_warning(buf, format_args!("{} retries left", 2), false));
    assert_eq!(output, "Warning: 2 retries left\n");
}

#[test]
fn warning_with_ansi_when_terminal() {
    let output = written(|buf| write_warning(buf, "slow menus", true));
    assert_eq!(output, "\x1b[33mWarning: slow menus\x1b[0m\n");
}

#[yare::parameterized(
    stopped = { Ok(SessionExit::Stopped), "stopped" },
    passes = { Ok(SessionExit::PassesDone { passes: 4 }), "4 passes" },
    handoff = {
        Ok(SessionExit::HandedOff(HandoffRequest { reason: "manual".to_string() })),
        "handed off (manual)"
    },
    panicked = { Err(SessionError::Panicked), "error: session thread panicked" },
)]
fn exit_descriptions(exit: Result<SessionExit, SessionError>, expected: &str) {
    assert_eq!(describe_exit(&exit), expected);
}

#[test]
fn summary_counts_runs_per_session() {
    let log = RunLog::new();
    let done = RunOutcome::Completed {
        duration: Duration::from_secs(1),
    };
    log.record("sorc", "andariel", true, done.clone());
    log.record("sorc", "mephisto", true, RunOutcome::Skipped);
    log.record(
        "sorc",
        "diablo",
        true,
        RunOutcome::Failed {
            error: "died".to_string(),
            duration: Duration::ZERO,
        },
    );
    log.record("pala", "baal", true, done);
    let exits = BTreeMap::from([
        ("sorc".to_string(), Ok(SessionExit::PassesDone { passes: 1 })),
        ("pala".to_string(), Ok(SessionExit::Stopped)),
    ]);

    let output = written(|buf| write_summary(buf, &exits, &log).unwrap());

    assert_eq!(
        output,
        "pala: stopped, 1 runs executed, 0 failed\nsorc: 1 passes, 2 runs executed, 1 failed\n"
    );
}

#[test]
fn drop_report_lists_items_and_error() {
    let report = DropReport {
        status: DropStatus::Partial,
        items_dropped: BTreeMap::from([("ber".to_string(), 2), ("ist".to_string(), 1)]),
        duration: Duration::from_millis(1_500),
        error: Some("timed out".to_string()),
        finished_at: Utc::now(),
    };

    let output = written(|buf| write_drop_report(buf, &report).unwrap());

    assert_eq!(
        output,
        "drop partial: 3 items in 1.5s\n  ber: 2\n  ist: 1\n  error: timed out\n"
    );
}
