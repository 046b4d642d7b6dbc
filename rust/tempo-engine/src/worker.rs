//! Worker loops for main cores and the HPC pool.
//!
//! Both loops follow the same contract: pop, execute one slice, re-enqueue
//! unfinished work, poll arrivals, and flood termination markers the moment
//! the end of the run is observed. Popping a marker exits the loop. HPC
//! workers additionally steal one slice from the main queue when stealing is
//! enabled and their own queue is empty.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::container::Shared;
use crate::exec::run_slice;
use crate::queue::Entry;

/// How long an idle worker waits on its queue before re-checking
/// cancellation and arrivals.
const POP_WAIT: Duration = Duration::from_millis(10);

/// Loop body of one main core.
pub(crate) fn main_worker(shared: Arc<Shared>, core_id: i32) {
    debug!(core_id, "main worker started");
    loop {
        if shared.observe_stop() {
            shared.flood();
            break;
        }
        let entry = match shared.main_queue.pop_timeout(POP_WAIT) {
            Some(entry) => entry,
            None => {
                shared.idle_maintenance();
                continue;
            }
        };
        let p = match entry {
            Entry::Stop => break,
            Entry::Task(p) => p,
        };

        shared.clock.begin_slice();
        let slice = run_slice(&shared, &p, shared.main_alg, core_id);
        // A preempted process was already re-queued by the preemption check.
        if !slice.preempted && !shared.clock.is_exhausted() && !p.is_complete() {
            shared.main_queue.push(Entry::Task(p));
        }
        shared.clock.end_slice();

        shared.poll_arrivals();
        if shared.observe_stop() {
            shared.flood();
            break;
        }
    }
    debug!(core_id, "main worker exiting");
}

/// Loop body of one HPC worker. Timeline core id is `-1 - hpc_index`.
pub(crate) fn hpc_worker(shared: Arc<Shared>, hpc_index: usize) {
    let core_id = -1 - hpc_index as i32;
    debug!(core_id, "hpc worker started");
    loop {
        if shared.observe_stop() {
            shared.flood();
            break;
        }
        let entry = match shared.hpc_queue.pop_timeout(POP_WAIT) {
            Some(entry) => entry,
            None => {
                shared.idle_maintenance();
                // With no HPC work at all, stealing is the only way this
                // worker makes progress.
                try_steal(&shared, core_id);
                continue;
            }
        };
        let p = match entry {
            Entry::Stop => break,
            Entry::Task(p) => p,
        };

        shared.clock.begin_slice();
        let slice = run_slice(&shared, &p, shared.hpc_alg, core_id);
        if !slice.preempted && !shared.clock.is_exhausted() && !p.is_complete() {
            shared.hpc_queue.push(Entry::Task(p));
        }
        shared.clock.end_slice();

        try_steal(&shared, core_id);
        shared.poll_arrivals();
        if shared.observe_stop() {
            shared.flood();
            break;
        }
    }
    debug!(core_id, "hpc worker exiting");
}

/// One stealing attempt: non-blocking pop from the main queue, one slice
/// under the *main* algorithm, re-enqueue to main if unfinished. A stolen
/// marker is discarded — markers never travel back to the main queue.
fn try_steal(shared: &Shared, core_id: i32) {
    if !shared.allow_steal || !shared.hpc_queue.is_empty() {
        return;
    }
    match shared.main_queue.try_pop() {
        Some(Entry::Task(p)) => {
            debug!(core_id, pid = p.id(), "stealing from main queue");
            shared.clock.begin_slice();
            let slice = run_slice(shared, &p, shared.main_alg, core_id);
            if !slice.preempted && !shared.clock.is_exhausted() && !p.is_complete() {
                shared.main_queue.push(Entry::Task(p));
            }
            shared.clock.end_slice();
        }
        Some(Entry::Stop) | None => {}
    }
}
