// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run records for runloom sessions.
//!
//! Every run the sequencer considers produces one immutable [`RunRecord`]
//! describing what the condition check decided and how execution ended.
//! Records are returned alongside the pass result and appended to a shared
//! [`RunLog`], which can mirror them to a JSONL file for later inspection.

mod duration_ms;
mod log;
mod record;

pub use log::RunLog;
pub use record::{RunOutcome, RunRecord};
