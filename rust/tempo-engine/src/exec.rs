//! The slice executor: one quantum of one process on one worker.
//!
//! A slice consumes at most `quantum` ticks in steps of
//! `min(quantum - used, remaining)`. Each step sleeps a scaled duration to
//! make the interleaving observable, then performs the accounting — process
//! remaining time, container budget, simulated clock, completion — in one
//! critical section of the finish lock. Between steps the preemptive
//! discipline re-polls main arrivals and asks the main queue whether a
//! higher-priority process should take over.

use std::sync::Arc;
use std::thread;

use tracing::debug;

use tempo_core::{Process, SchedAlg, TimelineEntry};

use crate::container::Shared;

/// Outcome of one slice.
///
/// `preempted` matters to the caller: a preempted process was already
/// re-inserted into the main queue by the preemption check, so the worker
/// must not enqueue it a second time — a process may live in at most one
/// queue node at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SliceRun {
    pub used: u64,
    pub preempted: bool,
}

/// Execute one slice of `p` under `alg` on behalf of core `core`.
///
/// Exactly one timeline entry is recorded per call unless no work was
/// performed.
pub(crate) fn run_slice(shared: &Shared, p: &Arc<Process>, alg: SchedAlg, core: i32) -> SliceRun {
    if p.is_complete() {
        return SliceRun {
            used: 0,
            preempted: false,
        };
    }

    let quantum = alg.quantum(p.mlfq_level());
    let start = shared.clock.now();
    let mut used = 0u64;
    let mut preempted = false;

    while used < quantum && !shared.clock.is_exhausted() {
        let remaining = p.remaining();
        if remaining == 0 {
            break;
        }
        let step = (quantum - used).min(remaining);

        // Simulated CPU work; the only purpose is observable concurrency.
        thread::sleep(shared.tick * step as u32);

        {
            let mut clk = shared.clock.lock();
            if !p.responded() {
                p.record_response(start);
            }
            p.consume(step);
            clk.accumulated_cpu += step;
            clk.sim_time += step;
            used += step;

            if p.is_complete() {
                p.record_completion();
                clk.remaining_count -= 1;
                if clk.remaining_count <= 0 {
                    clk.time_exhausted = true;
                }
            }
            if clk.accumulated_cpu >= shared.clock.budget() {
                clk.time_exhausted = true;
            }
        }

        if alg.is_preemptive() {
            shared.poll_main_arrivals();
            if shared.main_queue.try_preempt(p) {
                debug!(pid = p.id(), core, "slice preempted by higher priority arrival");
                preempted = true;
                break;
            }
        }
    }

    // A process that burned its whole quantum without finishing drops one
    // MLFQ level.
    if alg == SchedAlg::Mlfq && !p.is_complete() && used == quantum {
        p.demote();
    }

    if used > 0 {
        shared.timeline.record(TimelineEntry {
            core,
            pid: p.id(),
            start,
            len: used,
            preempted,
        });
    }
    SliceRun { used, preempted }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
