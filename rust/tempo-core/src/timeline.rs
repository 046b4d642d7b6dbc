//! Append-only record of executed slices.
//!
//! Every slice a worker executes lands here as one [`TimelineEntry`]. The
//! display sort key is `(core, start)`; main cores are numbered `0..n` and
//! HPC workers use negative ids (`-1 - hpc_index`), so a sorted timeline
//! lists HPC workers first, then the main cores in order — callers that want
//! main-cores-first group on the sign of `core`.

use serde::Serialize;
use std::sync::Mutex;

/// One executed slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// Executing core: `0..nb_cores` for main cores, `-1 - i` for HPC
    /// worker `i`.
    pub core: i32,
    /// Id of the process that ran.
    pub pid: i32,
    /// Simulated tick at which the slice began.
    pub start: u64,
    /// Ticks consumed by the slice.
    pub len: u64,
    /// Whether the slice ended in a preemption.
    pub preempted: bool,
}

/// Mutex-guarded slice recorder owned by one container.
#[derive(Debug, Default)]
pub struct Timeline {
    entries: Mutex<Vec<TimelineEntry>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one slice.
    pub fn record(&self, entry: TimelineEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot the entries sorted by `(core, start)`.
    pub fn sorted(&self) -> Vec<TimelineEntry> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by_key(|e| (e.core, e.start));
        entries
    }

    /// Consume the recorder, returning entries sorted by `(core, start)`.
    pub fn into_sorted(self) -> Vec<TimelineEntry> {
        let mut entries = self.entries.into_inner().unwrap();
        entries.sort_by_key(|e| (e.core, e.start));
        entries
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
