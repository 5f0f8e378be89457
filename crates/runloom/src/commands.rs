// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `runloom check` and `runloom run`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use runloom_capture::RunLog;

use crate::cli::RunArgs;
use crate::config::{Config, ConfigError};
use crate::drop::{DropError, DropReport, DropRequest};
use crate::leveling::{LevelingSequenceSettings, PlanError};
use crate::run::RunRegistry;
use crate::scheduler::{Priority, Registry};
use crate::session::{
    Session, SessionBuildError, SessionBuilder, SessionError, SessionExit, Supervisor,
    SupervisorError,
};

const INTERRUPT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("character '{character}': {source}")]
    Plan {
        character: String,
        #[source]
        source: PlanError,
    },

    #[error("character '{character}' lists unknown run '{run}'")]
    UnknownRun { character: String, run: String },

    #[error(transparent)]
    Build(#[from] SessionBuildError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("drop request: {0}")]
    Drop(#[from] DropError),

    #[error("no character named '{0}'")]
    UnknownCharacter(String),

    #[error("Failed to open records file {path}: {source}")]
    Records {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start interrupt watcher: {0}")]
    Watcher(#[source] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckSummary {
    pub characters: usize,
    /// Leveling plans loaded and validated
    pub plans: usize,
}

/// Load `path` and every leveling plan it references.
pub fn check(path: &Path) -> Result<CheckSummary, CommandError> {
    let config = Config::load(path)?;
    let runs = RunRegistry::with_builtin_runs();
    let mut plans = 0;

    for character in &config.characters {
        if let Some(run) = character.runs.iter().find(|run| !runs.contains(run)) {
            return Err(CommandError::UnknownRun {
                character: character.name.clone(),
                run: run.clone(),
            });
        }
        if let Some(leveling) = &character.leveling {
            LevelingSequenceSettings::load(&leveling.plan_path())
                .and_then(|settings| settings.validate(&runs))
                .map_err(|source| CommandError::Plan {
                    character: character.name.clone(),
                    source,
                })?;
            plans += 1;
        }
    }

    tracing::debug!(characters = config.characters.len(), plans, "configuration ok");
    Ok(CheckSummary {
        characters: config.characters.len(),
        plans,
    })
}

pub struct RunSummary {
    pub exits: BTreeMap<String, Result<SessionExit, SessionError>>,
    /// Report of the drop submitted with `--drop`, if it ran
    pub drop_report: Option<DropReport>,
    pub log: RunLog,
}

impl RunSummary {
    pub fn all_ok(&self) -> bool {
        self.exits.values().all(Result::is_ok)
    }
}

/// Supervise every configured character until each session ends.
///
/// Setting `interrupt` stops every session.
pub fn run(args: &RunArgs, interrupt: Arc<AtomicBool>) -> Result<RunSummary, CommandError> {
    let mut config = Config::load(&args.config)?;
    if let Some(dir) = &args.plans_dir {
        config.override_plans_dir(dir);
    }
    let drop_request = args
        .drop_request
        .as_deref()
        .map(DropRequest::load)
        .transpose()?;
    let drop_target = match (&drop_request, &args.drop_for) {
        (None, _) => None,
        (Some(_), Some(name)) => Some(name.clone()),
        (Some(_), None) => config.characters.first().map(|c| c.name.clone()),
    };
    if let Some(target) = &drop_target {
        if config.character(target).is_none() {
            return Err(CommandError::UnknownCharacter(target.clone()));
        }
    }

    let log = match &config.records {
        Some(path) => RunLog::with_file(path).map_err(|source| CommandError::Records {
            path: path.clone(),
            source,
        })?,
        None => RunLog::new(),
    };
    let scheduler = Registry::new(config.scheduler.poll_interval());
    let runs = Arc::new(RunRegistry::with_builtin_runs());

    let sessions = config
        .characters
        .iter()
        .map(|character| {
            let mut builder = SessionBuilder::new(character.clone())?
                .with_scheduler(Arc::clone(&scheduler))
                .with_runs(Arc::clone(&runs))
                .with_profile_game()
                .with_log(log.clone())
                .with_max_consecutive_failures(config.scheduler.max_consecutive_failures);
            if let Some(passes) = args.passes {
                builder = builder.with_max_passes(passes);
            }
            builder.build()
        })
        .collect::<Result<Vec<Session>, _>>()?;

    let mut supervisor = Supervisor::new();
    for session in sessions {
        // held until the drop is queued so it runs ahead of the first pass
        if drop_target.as_deref() == Some(session.name()) {
            session.ctx().switch_priority(Priority::Pause);
        }
        if let Err(e) = supervisor.spawn(session) {
            supervisor.stop_all();
            supervisor.join();
            return Err(e.into());
        }
    }

    let mut receiver = None;
    if let (Some(request), Some(target)) = (drop_request, &drop_target) {
        let submitted = supervisor.submit_drop(target, request);
        let resumed = supervisor.resume(target);
        match submitted.and_then(|rx| resumed.map(|()| rx)) {
            Ok(rx) => receiver = Some(rx),
            Err(e) => {
                supervisor.stop_all();
                supervisor.join();
                return Err(e.into());
            }
        }
    }

    let done = Arc::new(AtomicBool::new(false));
    let watcher = {
        let handle = supervisor.handle();
        let done = Arc::clone(&done);
        std::thread::Builder::new()
            .name("interrupt".to_string())
            .spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    if interrupt.load(Ordering::SeqCst) {
                        tracing::info!("interrupted, stopping every session");
                        handle.stop_all();
                        return;
                    }
                    std::thread::sleep(INTERRUPT_POLL);
                }
            })
    };
    let watcher = match watcher {
        Ok(watcher) => watcher,
        Err(e) => {
            supervisor.stop_all();
            supervisor.join();
            return Err(CommandError::Watcher(e));
        }
    };

    let exits = supervisor.join();
    done.store(true, Ordering::SeqCst);
    if watcher.join().is_err() {
        tracing::warn!("interrupt watcher panicked");
    }

    let drop_report = receiver.and_then(|mut receiver| receiver.try_recv().ok());
    Ok(RunSummary {
        exits,
        drop_report,
        log,
    })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
