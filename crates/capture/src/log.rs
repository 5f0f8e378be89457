// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only run log shared by every session of a supervisor.

use crate::record::{RunOutcome, RunRecord};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// JSONL mirror of the log, one record per line.
struct JsonlSink {
    out: BufWriter<File>,
}

impl JsonlSink {
    fn open(path: &Path) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    fn append(&mut self, record: &RunRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

struct Shared {
    origin: Instant,
    // sequence numbers are the index into this vector
    entries: Mutex<Vec<RunRecord>>,
    sink: Option<Mutex<JsonlSink>>,
}

/// Cloning a `RunLog` yields another handle onto the same records.
#[derive(Clone)]
pub struct RunLog {
    shared: Arc<Shared>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::from_sink(None)
    }

    /// In-memory log that also appends every record to `path` as JSONL.
    pub fn with_file(path: &Path) -> io::Result<Self> {
        let sink = JsonlSink::open(path)?;
        Ok(Self::from_sink(Some(sink)))
    }

    fn from_sink(sink: Option<JsonlSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                origin: Instant::now(),
                entries: Mutex::new(Vec::new()),
                sink: sink.map(Mutex::new),
            }),
        }
    }

    /// Append a record for `run` in `session`, returning what was stored.
    ///
    /// A failing file mirror never loses the in-memory record.
    pub fn record(
        &self,
        session: &str,
        run: &str,
        farming: bool,
        outcome: RunOutcome,
    ) -> RunRecord {
        let mut entries = self.shared.entries.lock();
        let record = RunRecord {
            seq: entries.len() as u64,
            timestamp: SystemTime::now(),
            elapsed: self.shared.origin.elapsed(),
            session: session.to_owned(),
            run: run.to_owned(),
            farming,
            outcome,
        };
        if let Some(sink) = &self.shared.sink {
            // written under the entries lock so file order matches `seq`
            let _ = sink.lock().append(&record);
        }
        entries.push(record.clone());
        record
    }

    /// Snapshot of every record, oldest first.
    pub fn records(&self) -> Vec<RunRecord> {
        self.shared.entries.lock().clone()
    }

    pub fn for_session(&self, session: &str) -> Vec<RunRecord> {
        self.select(|r| r.session == session)
    }

    pub fn count(&self, pred: impl Fn(&RunRecord) -> bool) -> usize {
        self.shared.entries.lock().iter().filter(|r| pred(r)).count()
    }

    /// Times the body of `run` actually ran, across all sessions.
    pub fn executions_of(&self, run: &str) -> usize {
        self.count(|r| r.run == run && r.outcome.executed())
    }

    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, pred: impl Fn(&RunRecord) -> bool) -> Vec<RunRecord> {
        self.shared
            .entries
            .lock()
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog")
            .field("records", &self.len())
            .field("mirrored", &self.shared.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
