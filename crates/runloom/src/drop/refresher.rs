// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot refresher used while the session's own refresh is suppressed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::scheduler::Priority;
use crate::session::ExecutionContext;

#[derive(Default)]
struct StopFlag {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Background thread refreshing a context's snapshot at a fixed interval.
///
/// Stopped and joined when dropped, whatever path the owner leaves by.
pub struct BackgroundRefresh {
    stop: Arc<StopFlag>,
    refreshes: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundRefresh {
    pub fn spawn(ctx: Arc<ExecutionContext>, interval: Duration) -> std::io::Result<Self> {
        let stop = Arc::new(StopFlag::default());
        let refreshes = Arc::new(AtomicU64::new(0));

        let handle = {
            let stop = Arc::clone(&stop);
            let refreshes = Arc::clone(&refreshes);
            std::thread::Builder::new()
                .name(format!("{}-refresh", ctx.name()))
                .spawn(move || {
                    let mut stopped = stop.stopped.lock();
                    while !*stopped && ctx.desired_priority() != Priority::Stop {
                        match ctx.force_refresh() {
                            Ok(()) => {
                                refreshes.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                tracing::debug!(
                                    session = ctx.name(),
                                    error = %e,
                                    "background refresh failed"
                                );
                            }
                        }
                        stop.wake.wait_for(&mut stopped, interval);
                    }
                })?
        };

        Ok(Self {
            stop,
            refreshes,
            handle: Some(handle),
        })
    }

    /// Refreshes completed so far.
    pub fn refreshes(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl Drop for BackgroundRefresh {
    fn drop(&mut self) {
        *self.stop.stopped.lock() = true;
        self.stop.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("background refresh thread panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "refresher_tests.rs"]
mod tests;
