// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! runloom
//!
//! Per-character run sequencing with a cooperative priority scheduler. Each
//! supervised character gets a [`session::Session`] on its own thread; the
//! session dispatches its configured [`run::Run`]s pass after pass, while the
//! [`session::Supervisor`] pauses, resumes, stops, hands off or interrupts it
//! with a drop.
//!
//! The game itself is reached only through the traits in [`game`].
//! [`game::sim::SimGame`] implements all of them in memory.

pub mod cli;
pub mod commands;
pub mod config;
pub mod drop;
pub mod env;
pub mod game;
pub mod leveling;
pub mod output;
pub mod run;
pub mod scheduler;
pub mod session;
pub mod time;

/// Run records, re-exported from `runloom-capture`.
pub mod records {
    pub use runloom_capture::{RunLog, RunOutcome, RunRecord};
}

#[cfg(test)]
mod testing;
