// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Name to constructor table, and the run list builder.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{
    eligible_area, BossRun, QuestRun, Run, TerrorZoneRun, BOSSES, QUESTS, TERROR_ZONE_RUN,
};
use crate::drop::{DropRun, DROP_RUN};
use crate::leveling::{LevelingRun, LEVELING_RUN};
use crate::session::ExecutionContext;

/// Builds a run bound to one context.
pub type RunConstructor =
    Arc<dyn Fn(&Arc<ExecutionContext>, &Arc<RunRegistry>) -> Box<dyn Run> + Send + Sync>;

/// Table of every run the builder can construct.
#[derive(Default)]
pub struct RunRegistry {
    constructors: BTreeMap<String, RunConstructor>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every built-in run.
    pub fn with_builtin_runs() -> Self {
        let mut registry = Self::new();
        for spec in BOSSES {
            let spec = *spec;
            registry.register(spec.name, move |ctx, _| {
                Box::new(BossRun::new(Arc::clone(ctx), spec))
            });
        }
        for spec in QUESTS {
            let spec = *spec;
            registry.register(spec.name, move |ctx, _| {
                Box::new(QuestRun::new(Arc::clone(ctx), spec))
            });
        }
        registry.register(TERROR_ZONE_RUN, |ctx, _| {
            Box::new(TerrorZoneRun::new(Arc::clone(ctx)))
        });
        registry.register(LEVELING_RUN, |ctx, runs| {
            Box::new(LevelingRun::new(Arc::clone(ctx), Arc::clone(runs)))
        });
        registry.register(DROP_RUN, |ctx, _| Box::new(DropRun::new(Arc::clone(ctx))));
        registry
    }

    /// Add or replace a run.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Arc<ExecutionContext>, &Arc<RunRegistry>) -> Box<dyn Run> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn construct(
        self: &Arc<Self>,
        ctx: &Arc<ExecutionContext>,
        name: &str,
    ) -> Option<Box<dyn Run>> {
        self.constructors
            .get(name)
            .map(|constructor| constructor(ctx, self))
    }

    /// Ordered run list for one pass.
    ///
    /// The terror zone run comes first whenever terror zones are configured.
    /// While one is active and `skip_other_runs` is set, it is the only run.
    /// Unknown names are left out.
    pub fn build_runs(
        self: &Arc<Self>,
        ctx: &Arc<ExecutionContext>,
        names: &[String],
    ) -> Vec<Box<dyn Run>> {
        let config = ctx.config();
        let mut runs = Vec::with_capacity(names.len() + 1);

        if !config.terror_zone.areas.is_empty() {
            if let Some(run) = self.construct(ctx, TERROR_ZONE_RUN) {
                runs.push(run);
                let active = ctx.with_game_data(|data| eligible_area(&config, data));
                if active.is_some() && config.terror_zone.skip_other_runs {
                    tracing::debug!(session = ctx.name(), "terror zone only");
                    return runs;
                }
            }
        }

        for name in names {
            if name == TERROR_ZONE_RUN {
                continue;
            }
            match self.construct(ctx, name) {
                Some(run) => runs.push(run),
                None => tracing::warn!(session = ctx.name(), run = %name, "unknown run"),
            }
        }
        runs
    }
}

impl fmt::Debug for RunRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunRegistry")
            .field("runs", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
