// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execution registry and cooperative priority scheduler.
//!
//! Every session thread attaches to the [`Registry`] with the priority it
//! runs at. The context it attaches with carries a [`PrioritySignal`]: the
//! priority the character *should* run at. Threads only yield at
//! [`Registry::pause_if_not_priority`], which blocks while the two differ and
//! fails with [`SchedulerError::Stopped`] once the desired priority is
//! [`Priority::Stop`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::session::ExecutionContext;

/// Execution priority. Lower values take precedence; `Stop` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High = 0,
    Normal = 1,
    Background = 5,
    Pause = 10,
    Stop = 100,
}

impl Priority {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Background => "background",
            Self::Pause => "pause",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("thread is not attached to the execution registry")]
    NotAttached,

    #[error("thread is already attached to the execution registry")]
    AlreadyAttached,

    #[error("stopped")]
    Stopped,
}

/// Desired priority of one context, with a change signal.
#[derive(Debug)]
pub struct PrioritySignal {
    desired: Mutex<Priority>,
    changed: Condvar,
}

impl PrioritySignal {
    pub fn new(priority: Priority) -> Self {
        Self {
            desired: Mutex::new(priority),
            changed: Condvar::new(),
        }
    }

    pub fn get(&self) -> Priority {
        *self.desired.lock()
    }

    /// Set the desired priority and wake every waiter.
    pub fn switch(&self, priority: Priority) {
        *self.desired.lock() = priority;
        self.changed.notify_all();
    }

    /// Block until the desired priority differs from `seen` or `timeout`
    /// elapses. Returns the desired priority on wake.
    pub fn wait_for_change(&self, seen: Priority, timeout: Duration) -> Priority {
        let mut desired = self.desired.lock();
        if *desired == seen {
            self.changed.wait_for(&mut desired, timeout);
        }
        *desired
    }
}

/// Priority and context of one attached thread.
#[derive(Clone)]
pub struct Status {
    pub priority: Priority,
    pub context: Arc<ExecutionContext>,
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Status")
            .field("priority", &self.priority)
            .field("context", &self.context.name())
            .finish()
    }
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Registry id to attachment token, for the current thread.
    static TOKENS: RefCell<HashMap<u64, u64>> = RefCell::new(HashMap::new());
}

fn token_for(registry: u64) -> Option<u64> {
    TOKENS.with(|tokens| tokens.borrow().get(&registry).copied())
}

/// Maps attached threads to their [`Status`].
pub struct Registry {
    id: u64,
    poll_interval: Duration,
    next_token: AtomicU64,
    entries: Mutex<HashMap<u64, Status>>,
}

impl Registry {
    pub fn new(poll_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            poll_interval,
            next_token: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Register the calling thread. Detaches when the returned guard drops.
    pub fn attach(
        self: &Arc<Self>,
        context: Arc<ExecutionContext>,
        priority: Priority,
    ) -> Result<Attachment, SchedulerError> {
        if token_for(self.id).is_some() {
            return Err(SchedulerError::AlreadyAttached);
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = context.name(), %priority, token, "attached");
        self.entries
            .lock()
            .insert(token, Status { priority, context });
        TOKENS.with(|tokens| tokens.borrow_mut().insert(self.id, token));

        Ok(Attachment {
            registry: Arc::clone(self),
            token,
            _thread_bound: PhantomData,
        })
    }

    /// Status of the calling thread.
    pub fn get(&self) -> Result<Status, SchedulerError> {
        let token = token_for(self.id).ok_or(SchedulerError::NotAttached)?;
        self.entries
            .lock()
            .get(&token)
            .cloned()
            .ok_or(SchedulerError::NotAttached)
    }

    /// Change the priority the calling thread runs at.
    pub fn set_priority(&self, priority: Priority) -> Result<(), SchedulerError> {
        let token = token_for(self.id).ok_or(SchedulerError::NotAttached)?;
        match self.entries.lock().get_mut(&token) {
            Some(status) => {
                status.priority = priority;
                Ok(())
            }
            None => Err(SchedulerError::NotAttached),
        }
    }

    pub fn attached_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// The suspension point.
    ///
    /// Returns immediately when the calling thread's priority equals the
    /// desired priority of its context. Otherwise waits, at most one poll
    /// interval at a time, until they match.
    pub fn pause_if_not_priority(&self) -> Result<(), SchedulerError> {
        let status = self.get()?;
        let signal = status.context.priority_signal();
        let mut logged = false;
        loop {
            let desired = signal.get();
            if desired == Priority::Stop {
                return Err(SchedulerError::Stopped);
            }
            if desired == status.priority {
                if logged {
                    tracing::debug!(session = status.context.name(), "resumed");
                }
                return Ok(());
            }
            if !logged {
                tracing::debug!(
                    session = status.context.name(),
                    running = %status.priority,
                    %desired,
                    "waiting for priority"
                );
                logged = true;
            }
            signal.wait_for_change(desired, self.poll_interval);
        }
    }

    fn detach(&self, token: u64) {
        if let Some(status) = self.entries.lock().remove(&token) {
            tracing::debug!(session = status.context.name(), token, "detached");
        }
        TOKENS.with(|tokens| {
            let mut tokens = tokens.borrow_mut();
            if tokens.get(&self.id) == Some(&token) {
                tokens.remove(&self.id);
            }
        });
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("attached", &self.attached_count())
            .finish()
    }
}

/// Attachment of the current thread. Dropping it detaches.
///
/// Not `Send`: it must be dropped on the thread that attached.
pub struct Attachment {
    registry: Arc<Registry>,
    token: u64,
    _thread_bound: PhantomData<*const ()>,
}

impl Attachment {
    pub fn token(&self) -> u64 {
        self.token
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.registry.detach(self.token);
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
