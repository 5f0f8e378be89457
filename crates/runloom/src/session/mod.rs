// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-character sessions and their supervisor.

mod builder;
mod context;
mod core;
mod supervisor;

pub use builder::{SessionBuildError, SessionBuilder};
pub use context::{ExecutionContext, HandoffRequest, RefreshSuppression, SessionBag};
pub use core::{Session, SessionError, SessionExit};
pub use supervisor::{Supervisor, SupervisorError, SupervisorHandle};
