// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-character run sequencer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "runloom",
    version,
    about = "Run sequencing and priority scheduling for game automation"
)]
pub struct Cli {
    /// Log at debug level unless RUNLOOM_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate a configuration file and every leveling plan it references
    Check {
        /// Supervisor configuration (TOML, or JSON by extension)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Supervise every configured character against its simulated game
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Stop each session after this many passes
    #[arg(long, value_name = "N")]
    pub passes: Option<u64>,

    /// Drop request file (TOML, or JSON by extension) submitted before start
    #[arg(long = "drop", value_name = "FILE")]
    pub drop_request: Option<PathBuf>,

    /// Character receiving the drop request; defaults to the first one
    #[arg(long = "drop-for", value_name = "NAME", requires = "drop_request")]
    pub drop_for: Option<String>,

    /// Overrides every character's leveling plan directory
    #[arg(long, value_name = "DIR")]
    pub plans_dir: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
