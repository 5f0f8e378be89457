// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The leveling driver.
//!
//! [`LevelingRun`] is itself a run. Each pass it settles the tier the
//! character should play, applies survival presets, and then dispatches the
//! entries of the tier's plan lists as sub-runs through the same sequencer
//! that drives top-level runs.

mod difficulty;
mod plan;
mod presets;

use std::collections::HashSet;
use std::sync::Arc;

use crate::run::{Run, RunError, RunParameters, RunRegistry, Sequencer, SequencerResult};
use crate::session::ExecutionContext;

pub use difficulty::{
    adjust_difficulty, is_low_gold, requirements_hold, select_tier, TierDecision,
    FINAL_MILESTONE,
};
pub use plan::{
    LevelingSequenceSettings, PlanError, SequenceEntry, TierRequirements, TierSequence,
    DEFAULT_LOW_GOLD_PER_LEVEL,
};
pub use presets::{apply_presets, presets_for, Presets};

pub const LEVELING_RUN: &str = "leveling";

/// How one plan list ended.
enum ListEnd {
    /// Move on to the next list
    Continue,
    /// End the leveling pass
    EndPass,
}

pub struct LevelingRun {
    ctx: Arc<ExecutionContext>,
    runs: Arc<RunRegistry>,
}

impl LevelingRun {
    pub fn new(ctx: Arc<ExecutionContext>, runs: Arc<RunRegistry>) -> Self {
        Self { ctx, runs }
    }

    fn load_plan(&self) -> Result<LevelingSequenceSettings, RunError> {
        let config = self.ctx.config();
        let leveling = config.leveling.ok_or_else(|| {
            RunError::Config(format!(
                "character '{}' has no leveling plan",
                self.ctx.name()
            ))
        })?;
        let plan = LevelingSequenceSettings::load(&leveling.plan_path())?;
        plan.validate(&self.runs)?;
        Ok(plan)
    }

    fn run_list(
        &self,
        list: &[SequenceEntry],
        plan: &LevelingSequenceSettings,
        executed: &mut HashSet<String>,
    ) -> Result<ListEnd, RunError> {
        let sequencer = Sequencer::new(&self.ctx);

        for entry in list {
            self.ctx.pause_point()?;
            if executed.contains(&entry.run) {
                continue;
            }
            self.ctx.refresh_game_data()?;

            let eligible = self.ctx.with_game_data(|data| {
                entry.level_allows(data.character.level)
                    && (!entry.farming || is_low_gold(data, plan.low_gold_per_level))
            });
            if !eligible {
                if entry.stop_if_check_fails {
                    tracing::debug!(
                        session = self.ctx.name(),
                        run = %entry.run,
                        "check failed, ending list"
                    );
                    return Ok(ListEnd::Continue);
                }
                tracing::trace!(session = self.ctx.name(), run = %entry.run, "entry not eligible");
                continue;
            }

            let run = self
                .runs
                .construct(&self.ctx, &entry.run)
                .ok_or_else(|| PlanError::UnknownRun(entry.run.clone()))?;
            let params = RunParameters {
                farming_run: entry.farming,
                sequence_settings: Some(entry.clone()),
            };
            let dispatched = sequencer.dispatch(run.as_ref(), &params)?;

            match dispatched.result {
                SequencerResult::Skip if entry.stop_if_check_fails => {
                    return Ok(ListEnd::Continue);
                }
                SequencerResult::Skip => continue,
                SequencerResult::Stop => return Ok(ListEnd::EndPass),
                SequencerResult::Error => {
                    return Err(RunError::UnsupportedMode {
                        run: entry.run.clone(),
                        mode: params.mode(),
                    });
                }
                SequencerResult::Ok => {}
            }

            executed.insert(entry.run.clone());
            if let Some(error) = dispatched.error {
                return Err(error);
            }
            if entry.exit_game {
                self.ctx.with_bag(|bag| bag.exit_game_requested = true);
                return Ok(ListEnd::EndPass);
            }
        }
        Ok(ListEnd::Continue)
    }
}

impl Run for LevelingRun {
    fn name(&self) -> &str {
        LEVELING_RUN
    }

    fn check_conditions(&self, params: &RunParameters) -> SequencerResult {
        // Never nested inside another plan
        if params.sequence_settings.is_some() {
            return SequencerResult::Error;
        }
        SequencerResult::Ok
    }

    fn run(&self, _params: &RunParameters) -> Result<(), RunError> {
        let plan = self.load_plan()?;
        let character = self.ctx.character();
        let leveler = character.as_leveling().ok_or_else(|| {
            RunError::Config(format!(
                "character '{}' has no leveling routines",
                self.ctx.name()
            ))
        })?;

        self.ctx.pause_point()?;
        let data = self.ctx.game_data();
        self.ctx
            .game()
            .navigator
            .travel_to_town(data.act_progress(data.difficulty))?;

        let decision = adjust_difficulty(&self.ctx, &plan);
        let level = data.character.level;
        apply_presets(&self.ctx, decision.to, level);
        leveler.spend_points(level)?;

        if decision.to != data.difficulty {
            tracing::info!(
                session = self.ctx.name(),
                playing = %data.difficulty,
                tier = %decision.to,
                "leaving game to switch difficulty"
            );
            self.ctx.with_bag(|bag| bag.exit_game_requested = true);
            return Ok(());
        }

        let tier = plan.tier(decision.to);
        let mut executed = HashSet::new();
        for list in [&tier.before_quests, &tier.quests, &tier.after_quests] {
            if let ListEnd::EndPass = self.run_list(list, &plan, &mut executed)? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
