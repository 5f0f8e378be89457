// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Drop requests and reports.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::DropError;

/// Items to move out of the stash, and the room to drop them in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropRequest {
    pub room: String,
    #[serde(default)]
    pub password: String,
    /// Maximum number of items to drop, per item name
    pub quotas: BTreeMap<String, u32>,
}

impl DropRequest {
    pub fn new(room: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            password: password.into(),
            quotas: BTreeMap::new(),
        }
    }

    pub fn with_quota(mut self, item: impl Into<String>, quota: u32) -> Self {
        self.quotas.insert(item.into(), quota);
        self
    }

    /// Load from a `.json` or TOML file.
    pub fn load(path: &Path) -> Result<Self, DropError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DropError::InvalidRequest(format!("{}: {}", path.display(), e)))?;
        let request: DropRequest = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content).map_err(|e| DropError::InvalidRequest(e.to_string()))?
        } else {
            toml::from_str(&content).map_err(|e| DropError::InvalidRequest(e.to_string()))?
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), DropError> {
        if self.room.trim().is_empty() {
            return Err(DropError::InvalidRequest("room must not be empty".to_string()));
        }
        if self.quotas.is_empty() {
            return Err(DropError::InvalidRequest("no item quotas".to_string()));
        }
        if let Some((name, _)) = self.quotas.iter().find(|(_, quota)| **quota == 0) {
            return Err(DropError::InvalidRequest(format!(
                "quota for '{}' must be positive",
                name
            )));
        }
        Ok(())
    }

    /// Items requested across every quota.
    pub fn total_quota(&self) -> u64 {
        self.quotas.values().map(|&quota| u64::from(quota)).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropStatus {
    /// Every reachable item was dropped
    Completed,
    /// The migration finished but gave up on some items
    Partial,
    Failed,
}

/// Outcome of one drop, sent back to whoever submitted the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropReport {
    pub status: DropStatus,
    pub items_dropped: BTreeMap<String, u32>,
    pub duration: Duration,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl DropReport {
    pub fn total_dropped(&self) -> u64 {
        self.items_dropped.values().map(|&count| u64::from(count)).sum()
    }
}

/// A submitted request waiting in a session bag, with its reply channel.
#[derive(Debug)]
pub struct PendingDrop {
    pub request: DropRequest,
    pub reply: oneshot::Sender<DropReport>,
}

impl PendingDrop {
    /// Pair a request with the receiver its report will arrive on.
    pub fn new(request: DropRequest) -> (Self, oneshot::Receiver<DropReport>) {
        let (reply, receiver) = oneshot::channel();
        (Self { request, reply }, receiver)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
