// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-facing output: diagnostics on stderr, summaries on stdout.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, IsTerminal, Write};

use runloom_capture::RunLog;

use crate::drop::{DropReport, DropStatus};
use crate::session::{SessionError, SessionExit};

/// Print an error message to stderr.
///
/// Displays in red when stderr is a terminal, plain text otherwise.
pub fn print_error(msg: impl fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_error(&mut io::stderr(), msg, is_tty);
}

fn write_error<W: Write>(writer: &mut W, msg: impl fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[31mError: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Error: {}", msg);
    }
}

/// Print a warning message to stderr, in yellow on a terminal.
pub fn print_warning(msg: impl fmt::Display) {
    let is_tty = io::stderr().is_terminal();
    write_warning(&mut io::stderr(), msg, is_tty);
}

fn write_warning<W: Write>(writer: &mut W, msg: impl fmt::Display, is_terminal: bool) {
    if is_terminal {
        let _ = writeln!(writer, "\x1b[33mWarning: {}\x1b[0m", msg);
    } else {
        let _ = writeln!(writer, "Warning: {}", msg);
    }
}

/// Short description of how a session ended.
pub fn describe_exit(exit: &Result<SessionExit, SessionError>) -> String {
    match exit {
        Ok(SessionExit::Stopped) => "stopped".to_string(),
        Ok(SessionExit::HandedOff(handoff)) => format!("handed off ({})", handoff.reason),
        Ok(SessionExit::PassesDone { passes }) => format!("{passes} passes"),
        Err(e) => format!("error: {e}"),
    }
}

/// One line per session: how it ended and what its runs did.
pub fn write_summary<W: Write>(
    writer: &mut W,
    exits: &BTreeMap<String, Result<SessionExit, SessionError>>,
    log: &RunLog,
) -> io::Result<()> {
    for (name, exit) in exits {
        let records = log.for_session(name);
        let executed = records.iter().filter(|r| r.outcome.executed()).count();
        let failed = records.iter().filter(|r| r.outcome.is_failure()).count();
        writeln!(
            writer,
            "{name}: {}, {executed} runs executed, {failed} failed",
            describe_exit(exit)
        )?;
    }
    Ok(())
}

pub fn write_drop_report<W: Write>(writer: &mut W, report: &DropReport) -> io::Result<()> {
    let status = match report.status {
        DropStatus::Completed => "completed",
        DropStatus::Partial => "partial",
        DropStatus::Failed => "failed",
    };
    writeln!(
        writer,
        "drop {status}: {} items in {:.1}s",
        report.total_dropped(),
        report.duration.as_secs_f64()
    )?;
    for (item, count) in &report.items_dropped {
        writeln!(writer, "  {item}: {count}")?;
    }
    if let Some(error) = &report.error {
        writeln!(writer, "  error: {error}")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
