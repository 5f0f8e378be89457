// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One thread per character, and the controls other threads use on them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::RwLock;
use tokio::sync::oneshot;

use crate::drop::{DropError, DropReport, DropRequest, PendingDrop};
use crate::scheduler::Priority;

use super::core::{Session, SessionError, SessionExit};
use super::{ExecutionContext, HandoffRequest};

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("no session for character '{0}'")]
    UnknownCharacter(String),

    #[error("character '{0}' is already supervised")]
    DuplicateCharacter(String),

    #[error("character '{0}' already has a drop in progress")]
    DropAlreadyActive(String),

    #[error(transparent)]
    InvalidDrop(#[from] DropError),

    #[error("failed to spawn session thread for '{name}': {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },
}

/// Cloneable control surface over every supervised session.
#[derive(Clone, Debug, Default)]
pub struct SupervisorHandle {
    contexts: Arc<RwLock<BTreeMap<String, Arc<ExecutionContext>>>>,
}

impl SupervisorHandle {
    pub fn names(&self) -> Vec<String> {
        self.contexts.read().keys().cloned().collect()
    }

    pub fn context(&self, name: &str) -> Option<Arc<ExecutionContext>> {
        self.contexts.read().get(name).cloned()
    }

    fn require(&self, name: &str) -> Result<Arc<ExecutionContext>, SupervisorError> {
        self.context(name)
            .ok_or_else(|| SupervisorError::UnknownCharacter(name.to_string()))
    }

    pub fn pause(&self, name: &str) -> Result<(), SupervisorError> {
        self.require(name)?.switch_priority(Priority::Pause);
        Ok(())
    }

    pub fn resume(&self, name: &str) -> Result<(), SupervisorError> {
        let ctx = self.require(name)?;
        if ctx.desired_priority() == Priority::Stop {
            tracing::warn!(session = name, "cannot resume a stopped session");
            return Ok(());
        }
        ctx.switch_priority(Priority::Normal);
        Ok(())
    }

    pub fn stop(&self, name: &str) -> Result<(), SupervisorError> {
        self.require(name)?.switch_priority(Priority::Stop);
        Ok(())
    }

    pub fn stop_all(&self) {
        for ctx in self.contexts.read().values() {
            ctx.switch_priority(Priority::Stop);
        }
    }

    /// Queue a drop for `name`. The report arrives on the returned receiver.
    pub fn submit_drop(
        &self,
        name: &str,
        request: DropRequest,
    ) -> Result<oneshot::Receiver<DropReport>, SupervisorError> {
        request.validate()?;
        let ctx = self.require(name)?;
        ctx.with_bag(|bag| {
            if bag.drop_active || bag.pending_drop.is_some() {
                return Err(SupervisorError::DropAlreadyActive(name.to_string()));
            }
            let (pending, receiver) = PendingDrop::new(request);
            bag.pending_drop = Some(pending);
            Ok(receiver)
        })
    }

    /// Ask the session to release the character at its next pass boundary.
    pub fn request_handoff(
        &self,
        name: &str,
        reason: impl Into<String>,
    ) -> Result<(), SupervisorError> {
        let ctx = self.require(name)?;
        let reason = reason.into();
        tracing::info!(session = name, %reason, "handoff requested");
        ctx.with_bag(|bag| bag.handoff = Some(HandoffRequest { reason }));
        Ok(())
    }
}

/// Owns the session threads.
#[derive(Default)]
pub struct Supervisor {
    handle: SupervisorHandle,
    threads: Vec<(String, JoinHandle<Result<SessionExit, SessionError>>)>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SupervisorHandle {
        self.handle.clone()
    }

    /// Start `session` on a thread named after its character.
    pub fn spawn(&mut self, session: Session) -> Result<(), SupervisorError> {
        let name = session.name().to_string();
        {
            let mut contexts = self.handle.contexts.write();
            if contexts.contains_key(&name) {
                return Err(SupervisorError::DuplicateCharacter(name));
            }
            contexts.insert(name.clone(), Arc::clone(session.ctx()));
        }

        let thread = std::thread::Builder::new()
            .name(format!("session-{name}"))
            .spawn(move || session.run());
        match thread {
            Ok(thread) => {
                self.threads.push((name, thread));
                Ok(())
            }
            Err(source) => {
                self.handle.contexts.write().remove(&name);
                Err(SupervisorError::Spawn { name, source })
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.handle.names()
    }

    pub fn pause(&self, name: &str) -> Result<(), SupervisorError> {
        self.handle.pause(name)
    }

    pub fn resume(&self, name: &str) -> Result<(), SupervisorError> {
        self.handle.resume(name)
    }

    pub fn stop(&self, name: &str) -> Result<(), SupervisorError> {
        self.handle.stop(name)
    }

    pub fn stop_all(&self) {
        self.handle.stop_all();
    }

    pub fn submit_drop(
        &self,
        name: &str,
        request: DropRequest,
    ) -> Result<oneshot::Receiver<DropReport>, SupervisorError> {
        self.handle.submit_drop(name, request)
    }

    pub fn request_handoff(
        &self,
        name: &str,
        reason: impl Into<String>,
    ) -> Result<(), SupervisorError> {
        self.handle.request_handoff(name, reason)
    }

    /// Wait for every session thread and collect how each ended.
    pub fn join(self) -> BTreeMap<String, Result<SessionExit, SessionError>> {
        self.threads
            .into_iter()
            .map(|(name, thread)| {
                let exit = thread.join().unwrap_or(Err(SessionError::Panicked));
                (name, exit)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
