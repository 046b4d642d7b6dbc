//! The scheduling algorithm set and its per-algorithm quantum table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of MLFQ levels. A process's level is capped at `MLFQ_LEVELS - 1`
/// both for lane selection and for demotion.
pub const MLFQ_LEVELS: usize = 4;

/// A scheduling discipline for one ready queue.
///
/// The variant is fixed at queue construction and selects both the insertion
/// rule and the pop rule. `None` schedules with the default discipline
/// (FIFO insertion, quantum 2); it exists so a container with zero main
/// cores can still name a main algorithm for stolen slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedAlg {
    /// No discipline chosen; behaves like FIFO.
    None,
    /// First-in first-out, run to completion.
    Fifo,
    /// Round-robin over a FIFO queue.
    Rr,
    /// Shortest job first (by total burst, non-preemptive).
    Sjf,
    /// Non-preemptive priority (smaller value = higher priority).
    Priority,
    /// "Brain Fuck Scheduler"-style FIFO with a longer quantum.
    Bfs,
    /// Multi-level feedback queue with per-level lanes and demotion.
    Mlfq,
    /// LIFO discipline used by the auxiliary HPC pool.
    Hpc,
    /// Weighted fair queueing with a per-queue virtual clock.
    Wfq,
    /// Preemptive priority: a running slice yields to a higher-priority
    /// arrival at its next step boundary.
    PrioPreempt,
}

impl SchedAlg {
    /// Upper bound on the ticks one slice may consume.
    ///
    /// `mlfq_level` only matters for [`SchedAlg::Mlfq`]; every other
    /// algorithm ignores it. Unlisted algorithms fall back to 2.
    pub fn quantum(self, mlfq_level: usize) -> u64 {
        match self {
            SchedAlg::Rr => 2,
            SchedAlg::Bfs => 4,
            SchedAlg::Wfq => 3,
            SchedAlg::Mlfq => 2 + 2 * mlfq_level.min(MLFQ_LEVELS - 1) as u64,
            SchedAlg::PrioPreempt => 2,
            _ => 2,
        }
    }

    /// Whether a running slice of this algorithm checks for preemption.
    pub fn is_preemptive(self) -> bool {
        matches!(self, SchedAlg::PrioPreempt)
    }

    /// All algorithms, in menu order.
    pub fn all() -> &'static [SchedAlg] {
        &[
            SchedAlg::Fifo,
            SchedAlg::Rr,
            SchedAlg::Sjf,
            SchedAlg::Priority,
            SchedAlg::Bfs,
            SchedAlg::Mlfq,
            SchedAlg::Hpc,
            SchedAlg::Wfq,
            SchedAlg::PrioPreempt,
            SchedAlg::None,
        ]
    }
}

impl fmt::Display for SchedAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedAlg::None => "none",
            SchedAlg::Fifo => "fifo",
            SchedAlg::Rr => "rr",
            SchedAlg::Sjf => "sjf",
            SchedAlg::Priority => "priority",
            SchedAlg::Bfs => "bfs",
            SchedAlg::Mlfq => "mlfq",
            SchedAlg::Hpc => "hpc",
            SchedAlg::Wfq => "wfq",
            SchedAlg::PrioPreempt => "prio-preempt",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
