// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! runloom binary entry point.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use runloom::cli::{Cli, Command, RunArgs};
use runloom::commands;
use runloom::output::{print_error, print_warning, write_drop_report, write_summary};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match &cli.command {
        Command::Check { config } => match commands::check(config) {
            Ok(summary) => {
                println!(
                    "{}: {} characters, {} leveling plans ok",
                    config.display(),
                    summary.characters,
                    summary.plans
                );
                0
            }
            Err(e) => {
                print_error(e);
                1
            }
        },
        Command::Run(args) => run(args),
    };
    std::process::exit(code);
}

/// Filter: RUNLOOM_LOG > --verbose > default "warn".
fn init_tracing(verbose: bool) {
    let filter = match runloom::env::log_filter() {
        Some(directives) => EnvFilter::try_new(&directives).unwrap_or_else(|e| {
            print_warning(format_args!("ignoring RUNLOOM_LOG: {e}"));
            EnvFilter::new("warn")
        }),
        None if verbose => EnvFilter::new("runloom=debug,info"),
        None => EnvFilter::new("warn"),
    };
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(layer).init();
}

fn run(args: &RunArgs) -> i32 {
    let interrupt = Arc::new(AtomicBool::new(false));
    // SIGINT only sets the flag; the sessions stop at their next pause point.
    #[cfg(unix)]
    {
        if let Err(e) =
            signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupt))
        {
            print_warning(format_args!("Failed to handle SIGINT: {}", e));
        }
    }

    let summary = match commands::run(args, Arc::clone(&interrupt)) {
        Ok(summary) => summary,
        Err(e) => {
            print_error(e);
            return 1;
        }
    };

    let mut stdout = std::io::stdout().lock();
    let mut written = write_summary(&mut stdout, &summary.exits, &summary.log);
    if let Some(report) = &summary.drop_report {
        written = written.and_then(|()| write_drop_report(&mut stdout, report));
    }
    if let Err(e) = written.and_then(|()| stdout.flush()) {
        print_warning(format_args!("Failed to write summary: {}", e));
    }

    for (name, exit) in &summary.exits {
        if let Err(e) = exit {
            print_error(format_args!("session '{}' failed: {}", name, e));
        }
    }

    if interrupt.load(Ordering::SeqCst) {
        130
    } else if summary.all_ok() {
        0
    } else {
        1
    }
}
