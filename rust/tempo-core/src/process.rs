//! Process records for the scheduling simulator.
//!
//! A [`Process`] pairs the immutable inputs of one synthetic task (burst,
//! priority, arrival, weight) with its mutable scheduling state. The mutable
//! fields are atomics so a record can be shared across worker threads via
//! `Arc` without external locking; the engine's queueing protocol guarantees
//! at most one worker executes a given process at a time, and the compound
//! updates (remaining time together with the container clock) are performed
//! while the container's finish lock is held.

use crate::alg::MLFQ_LEVELS;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tracing::warn;

// ---------------------------------------------------------------------------
// ProcessSpec
// ---------------------------------------------------------------------------

/// The immutable inputs used to build one process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessSpec {
    /// Total ticks of CPU work the process requires.
    pub burst: u64,
    /// Scheduling priority; smaller values are more urgent.
    pub priority: i32,
    /// Simulated tick at which the process becomes runnable.
    pub arrival: u64,
    /// Weighted-fair-queueing weight; values ≤ 0 are coerced to 1.0.
    pub weight: f64,
}

impl ProcessSpec {
    pub fn new(burst: u64, priority: i32, arrival: u64, weight: f64) -> Self {
        Self {
            burst,
            priority,
            arrival,
            weight,
        }
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self {
            burst: 0,
            priority: 0,
            arrival: 0,
            weight: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Process
// ---------------------------------------------------------------------------

/// One schedulable task.
///
/// Identity and inputs never change after construction. The scheduling
/// state lives in atomics:
///
/// * `remaining` decreases monotonically; once it reaches zero the process
///   is terminal and never re-enters a queue.
/// * `admitted` is the at-most-once enqueue marker for arrival polling —
///   claimed with a compare-and-swap so concurrent pollers cannot
///   double-enqueue.
/// * `responded` / `first_response` are set on the first slice that performs
///   non-zero work and never change afterwards.
/// * `end_time` is `first_response + burst` once the process completes.
pub struct Process {
    id: i32,
    burst_time: u64,
    priority: i32,
    arrival_time: u64,
    weight: f64,

    admitted: AtomicBool,
    remaining: AtomicU64,
    responded: AtomicBool,
    first_response: AtomicU64,
    end_time: AtomicU64,
    mlfq_level: AtomicUsize,
    was_preempted: AtomicBool,
}

impl Process {
    /// Build a process from its spec.
    ///
    /// Non-positive weights are coerced to 1.0 with a warning, matching the
    /// normalization policy for degenerate inputs.
    pub fn new(id: i32, spec: ProcessSpec) -> Self {
        let weight = if spec.weight > 0.0 {
            spec.weight
        } else {
            warn!(id, weight = spec.weight, "non-positive weight, forcing 1.0");
            1.0
        };
        if spec.burst == 0 {
            warn!(id, "zero burst, process completes instantly");
        }
        Self {
            id,
            burst_time: spec.burst,
            priority: spec.priority,
            arrival_time: spec.arrival,
            weight,
            admitted: AtomicBool::new(false),
            remaining: AtomicU64::new(spec.burst),
            responded: AtomicBool::new(false),
            first_response: AtomicU64::new(0),
            end_time: AtomicU64::new(0),
            mlfq_level: AtomicUsize::new(0),
            was_preempted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn burst_time(&self) -> u64 {
        self.burst_time
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn arrival_time(&self) -> u64 {
        self.arrival_time
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    // -- scheduling state -------------------------------------------------

    /// Ticks of work left.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Whether all work has been executed.
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `step` ticks of work. Callers hold the container's finish
    /// lock so the decrement stays consistent with the clock.
    pub fn consume(&self, step: u64) {
        self.remaining.fetch_sub(step, Ordering::AcqRel);
    }

    /// Claim the at-most-once admission slot. Returns `true` exactly once.
    pub fn try_admit(&self) -> bool {
        self.admitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_admitted(&self) -> bool {
        self.admitted.load(Ordering::Acquire)
    }

    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }

    pub fn first_response(&self) -> u64 {
        self.first_response.load(Ordering::Acquire)
    }

    /// Record the first scheduling response at tick `now`. Later calls are
    /// ignored.
    pub fn record_response(&self, now: u64) {
        if !self.responded.swap(true, Ordering::AcqRel) {
            self.first_response.store(now, Ordering::Release);
        }
    }

    pub fn end_time(&self) -> u64 {
        self.end_time.load(Ordering::Acquire)
    }

    /// Record completion: `end_time = first_response + burst_time`.
    pub fn record_completion(&self) {
        self.end_time
            .store(self.first_response() + self.burst_time, Ordering::Release);
    }

    pub fn mlfq_level(&self) -> usize {
        self.mlfq_level.load(Ordering::Acquire)
    }

    /// Demote one MLFQ level, saturating at the last lane.
    pub fn demote(&self) {
        let level = self.mlfq_level.load(Ordering::Acquire);
        if level < MLFQ_LEVELS - 1 {
            self.mlfq_level.store(level + 1, Ordering::Release);
        }
    }

    pub fn was_preempted(&self) -> bool {
        self.was_preempted.load(Ordering::Acquire)
    }

    pub fn mark_preempted(&self) {
        self.was_preempted.store(true, Ordering::Release);
    }

    /// Snapshot this process into a serializable report.
    pub fn report(&self) -> ProcessReport {
        ProcessReport::from(self)
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.id)
            .field("burst", &self.burst_time)
            .field("priority", &self.priority)
            .field("arrival", &self.arrival_time)
            .field("remaining", &self.remaining())
            .field("mlfq_level", &self.mlfq_level())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ProcessReport
// ---------------------------------------------------------------------------

/// Post-run snapshot of one process.
///
/// `turnaround`, `waiting` and `response` are only present when the process
/// actually ran: a process that was never scheduled has no response time,
/// and a zero-burst process completes without ever running.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub id: i32,
    pub burst: u64,
    pub priority: i32,
    pub arrival: u64,
    pub weight: f64,
    pub remaining: u64,
    pub completed: bool,
    pub responded: bool,
    pub first_response: u64,
    pub end_time: u64,
    pub mlfq_level: usize,
    pub was_preempted: bool,
    pub turnaround: Option<u64>,
    pub waiting: Option<u64>,
    pub response: Option<u64>,
}

impl From<&Process> for ProcessReport {
    fn from(p: &Process) -> Self {
        let remaining = p.remaining();
        let completed = remaining == 0;
        let responded = p.responded();
        let response = responded.then(|| p.first_response().saturating_sub(p.arrival_time()));
        let turnaround =
            (completed && responded).then(|| p.end_time().saturating_sub(p.arrival_time()));
        let waiting = turnaround.map(|t| t.saturating_sub(p.burst_time()));
        Self {
            id: p.id(),
            burst: p.burst_time(),
            priority: p.priority(),
            arrival: p.arrival_time(),
            weight: p.weight(),
            remaining,
            completed,
            responded,
            first_response: p.first_response(),
            end_time: p.end_time(),
            mlfq_level: p.mlfq_level(),
            was_preempted: p.was_preempted(),
            turnaround,
            waiting,
            response,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
