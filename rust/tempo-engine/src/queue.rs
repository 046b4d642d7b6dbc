//! Algorithm-parameterized ready queues.
//!
//! A [`ReadyQueue`] is an ordered collection of [`Entry`] values — process
//! handles or termination markers — whose insertion and pop disciplines are
//! fixed by the [`SchedAlg`] chosen at construction:
//!
//! * FIFO / RR / BFS / WFQ / `None`: insert at the tail.
//! * Priority (both flavors): stable ascending insert by priority.
//! * SJF: stable ascending insert by burst time.
//! * HPC: insert at the head (LIFO).
//! * MLFQ: insert at the tail of the lane for the process's current level;
//!   pop scans lanes from level 0 and takes the first non-empty head.
//!
//! WFQ pops the entry minimizing `V + remaining / weight` where `V` is the
//! queue's virtual clock, then advances `V` by the winner's `remaining /
//! weight` at pop time. A termination marker always outranks processes: for
//! list-shaped queues it is pushed to the head, for MLFQ it is counted
//! separately and served first, and the WFQ scan returns any marker before
//! comparing finish times.
//!
//! Consumers block on a condition variable while the queue is empty. The
//! queue lock is a leaf: it is never held while the container's finish or
//! timeline locks are taken.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tempo_core::{Process, SchedAlg, MLFQ_LEVELS};

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One queue entry: a runnable process or a termination marker.
///
/// A worker that pops [`Entry::Stop`] exits its loop. Markers are flooded by
/// whichever worker observes the end of the run; unconsumed markers are
/// simply dropped with the queue.
#[derive(Debug, Clone)]
pub enum Entry {
    Task(Arc<Process>),
    Stop,
}

// ---------------------------------------------------------------------------
// Internal shape
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Lanes {
    /// Single ordered list (every algorithm except MLFQ).
    List(VecDeque<Entry>),
    /// Per-level FIFO lanes for MLFQ. Markers are counted, not stored, so
    /// they are always served before any lane.
    Leveled {
        stops: usize,
        levels: [VecDeque<Arc<Process>>; MLFQ_LEVELS],
    },
}

#[derive(Debug)]
struct Inner {
    lanes: Lanes,
    len: usize,
    /// WFQ virtual clock; unused by other algorithms.
    virtual_time: f64,
}

/// Thread-safe ready queue with a blocking pop.
#[derive(Debug)]
pub struct ReadyQueue {
    alg: SchedAlg,
    inner: Mutex<Inner>,
    nonempty: Condvar,
}

impl ReadyQueue {
    pub fn new(alg: SchedAlg) -> Self {
        let lanes = if alg == SchedAlg::Mlfq {
            Lanes::Leveled {
                stops: 0,
                levels: std::array::from_fn(|_| VecDeque::new()),
            }
        } else {
            Lanes::List(VecDeque::new())
        };
        Self {
            alg,
            inner: Mutex::new(Inner {
                lanes,
                len: 0,
                virtual_time: 0.0,
            }),
            nonempty: Condvar::new(),
        }
    }

    pub fn alg(&self) -> SchedAlg {
        self.alg
    }

    /// Advisory size. Only the steal fast-path may rely on it.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current WFQ virtual time (0 for other algorithms).
    pub fn virtual_time(&self) -> f64 {
        self.inner.lock().unwrap().virtual_time
    }

    // -- push -------------------------------------------------------------

    /// Insert an entry according to the queue's discipline and wake every
    /// waiting consumer.
    pub fn push(&self, entry: Entry) {
        let mut inner = self.inner.lock().unwrap();
        match entry {
            Entry::Stop => match &mut inner.lanes {
                // Head position: the next pop returns the marker.
                Lanes::List(list) => list.push_front(Entry::Stop),
                Lanes::Leveled { stops, .. } => *stops += 1,
            },
            Entry::Task(p) => match &mut inner.lanes {
                Lanes::Leveled { levels, .. } => {
                    let lane = p.mlfq_level().min(MLFQ_LEVELS - 1);
                    levels[lane].push_back(p);
                }
                Lanes::List(list) => match self.alg {
                    SchedAlg::Priority | SchedAlg::PrioPreempt => {
                        insert_sorted(list, p, |q| q.priority())
                    }
                    SchedAlg::Sjf => insert_sorted(list, p, |q| q.burst_time()),
                    SchedAlg::Hpc => list.push_front(Entry::Task(p)),
                    _ => list.push_back(Entry::Task(p)),
                },
            },
        }
        inner.len += 1;
        drop(inner);
        self.nonempty.notify_all();
    }

    // -- pop --------------------------------------------------------------

    /// Block until an entry is available and return it.
    pub fn pop(&self) -> Entry {
        let mut inner = self.inner.lock().unwrap();
        while inner.len == 0 {
            inner = self.nonempty.wait(inner).unwrap();
        }
        self.pop_locked(&mut inner)
    }

    /// Like [`pop`](Self::pop) but gives up after `wait`.
    ///
    /// Workers use this so an idle thread periodically re-checks
    /// cancellation and arrivals instead of parking forever.
    pub fn pop_timeout(&self, wait: Duration) -> Option<Entry> {
        let deadline = Instant::now() + wait;
        let mut inner = self.inner.lock().unwrap();
        while inner.len == 0 {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self.nonempty.wait_timeout(inner, deadline - now).unwrap();
            inner = guard;
        }
        Some(self.pop_locked(&mut inner))
    }

    /// Non-blocking pop, used by the HPC steal path.
    pub fn try_pop(&self) -> Option<Entry> {
        let mut inner = self.inner.lock().unwrap();
        if inner.len == 0 {
            return None;
        }
        Some(self.pop_locked(&mut inner))
    }

    fn pop_locked(&self, inner: &mut Inner) -> Entry {
        inner.len -= 1;
        if self.alg == SchedAlg::Wfq {
            return pop_wfq(inner);
        }
        match &mut inner.lanes {
            Lanes::Leveled { stops, levels } => {
                if *stops > 0 {
                    *stops -= 1;
                    return Entry::Stop;
                }
                for lane in levels.iter_mut() {
                    if let Some(p) = lane.pop_front() {
                        return Entry::Task(p);
                    }
                }
                unreachable!("queue length out of sync with lanes")
            }
            Lanes::List(list) => list.pop_front().expect("pop from empty list"),
        }
    }

    // -- preemption -------------------------------------------------------

    /// Preemption check for the preemptive-priority discipline.
    ///
    /// If the head of the queue is a process with strictly higher priority
    /// (smaller value) than `running`, the running process is flagged,
    /// re-inserted in priority order, and `true` is returned so the caller
    /// stops its slice. Any other head — including a termination marker —
    /// leaves the slice alone.
    pub fn try_preempt(&self, running: &Arc<Process>) -> bool {
        if self.alg != SchedAlg::PrioPreempt {
            return false;
        }
        let mut inner = self.inner.lock().unwrap();
        let Lanes::List(list) = &mut inner.lanes else {
            return false;
        };
        let head_priority = match list.front() {
            Some(Entry::Task(q)) => q.priority(),
            _ => return false,
        };
        if head_priority < running.priority() {
            running.mark_preempted();
            insert_sorted(list, Arc::clone(running), |q| q.priority());
            inner.len += 1;
            true
        } else {
            false
        }
    }
}

/// Stable ascending insert: the new process lands after every existing
/// entry with an equal or smaller key, so same-key entries keep their
/// insertion order. Markers have no key and stay pinned at the front.
fn insert_sorted<K: Ord>(
    list: &mut VecDeque<Entry>,
    p: Arc<Process>,
    key: impl Fn(&Process) -> K,
) {
    let k = key(&p);
    let pos = list.iter().position(|e| match e {
        Entry::Task(q) => k < key(q),
        Entry::Stop => false,
    });
    match pos {
        Some(i) => list.insert(i, Entry::Task(p)),
        None => list.push_back(Entry::Task(p)),
    }
}

/// WFQ pop: any marker is immediately eligible; otherwise take the entry
/// with the smallest virtual finish time (ties keep the earliest queue
/// position) and advance the virtual clock by its pre-slice share.
fn pop_wfq(inner: &mut Inner) -> Entry {
    let vt = inner.virtual_time;
    let Lanes::List(list) = &mut inner.lanes else {
        unreachable!("WFQ queue uses list lanes")
    };
    if let Some(i) = list.iter().position(|e| matches!(e, Entry::Stop)) {
        list.remove(i);
        return Entry::Stop;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, e) in list.iter().enumerate() {
        if let Entry::Task(q) = e {
            let finish = vt + q.remaining() as f64 / q.weight();
            if best.is_none_or(|(_, best_finish)| finish < best_finish) {
                best = Some((i, finish));
            }
        }
    }
    let (idx, _) = best.expect("pop from empty list");
    let Some(Entry::Task(p)) = list.remove(idx) else {
        unreachable!("scan selected a non-task entry")
    };
    inner.virtual_time = vt + p.remaining() as f64 / p.weight();
    Entry::Task(p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::ProcessSpec;

    fn proc(id: i32, burst: u64, priority: i32, weight: f64) -> Arc<Process> {
        Arc::new(Process::new(id, ProcessSpec::new(burst, priority, 0, weight)))
    }

    fn pop_id(q: &ReadyQueue) -> i32 {
        match q.pop() {
            Entry::Task(p) => p.id(),
            Entry::Stop => panic!("unexpected stop marker"),
        }
    }

    #[test]
    fn fifo_pops_in_insertion_order() {
        let q = ReadyQueue::new(SchedAlg::Fifo);
        for id in 0..3 {
            q.push(Entry::Task(proc(id, 5, 0, 1.0)));
        }
        assert_eq!(pop_id(&q), 0);
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 2);
    }

    #[test]
    fn priority_sorts_ascending_with_stable_ties() {
        let q = ReadyQueue::new(SchedAlg::Priority);
        q.push(Entry::Task(proc(0, 5, 7, 1.0)));
        q.push(Entry::Task(proc(1, 5, 3, 1.0)));
        q.push(Entry::Task(proc(2, 5, 7, 1.0)));
        q.push(Entry::Task(proc(3, 5, 1, 1.0)));
        assert_eq!(pop_id(&q), 3);
        assert_eq!(pop_id(&q), 1);
        // Equal priorities keep insertion order.
        assert_eq!(pop_id(&q), 0);
        assert_eq!(pop_id(&q), 2);
    }

    #[test]
    fn sjf_sorts_by_burst() {
        let q = ReadyQueue::new(SchedAlg::Sjf);
        q.push(Entry::Task(proc(0, 9, 0, 1.0)));
        q.push(Entry::Task(proc(1, 2, 0, 1.0)));
        q.push(Entry::Task(proc(2, 5, 0, 1.0)));
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 2);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn hpc_is_lifo() {
        let q = ReadyQueue::new(SchedAlg::Hpc);
        q.push(Entry::Task(proc(0, 5, 0, 1.0)));
        q.push(Entry::Task(proc(1, 5, 0, 1.0)));
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn stop_marker_jumps_to_the_head() {
        let q = ReadyQueue::new(SchedAlg::Fifo);
        q.push(Entry::Task(proc(0, 5, 0, 1.0)));
        q.push(Entry::Stop);
        assert!(matches!(q.pop(), Entry::Stop));
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn sorted_insert_does_not_displace_a_head_marker() {
        let q = ReadyQueue::new(SchedAlg::Priority);
        q.push(Entry::Task(proc(0, 5, 9, 1.0)));
        q.push(Entry::Stop);
        q.push(Entry::Task(proc(1, 5, 1, 1.0)));
        assert!(matches!(q.pop(), Entry::Stop));
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn mlfq_serves_lower_levels_first() {
        let q = ReadyQueue::new(SchedAlg::Mlfq);
        let demoted = proc(0, 9, 0, 1.0);
        demoted.demote();
        q.push(Entry::Task(demoted));
        q.push(Entry::Task(proc(1, 9, 0, 1.0)));
        // Level 0 process pops before the level 1 one despite later insert.
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn mlfq_serves_markers_before_any_lane() {
        let q = ReadyQueue::new(SchedAlg::Mlfq);
        q.push(Entry::Task(proc(0, 9, 0, 1.0)));
        q.push(Entry::Stop);
        assert!(matches!(q.pop(), Entry::Stop));
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn wfq_picks_smallest_virtual_finish() {
        let q = ReadyQueue::new(SchedAlg::Wfq);
        q.push(Entry::Task(proc(0, 6, 0, 2.0))); // finish 3.0
        q.push(Entry::Task(proc(1, 4, 0, 1.0))); // finish 4.0
        q.push(Entry::Task(proc(2, 9, 0, 3.0))); // finish 3.0, later position
        assert_eq!(pop_id(&q), 0);
        assert_eq!(q.virtual_time(), 3.0);
        // V=3: finish(1) = 7.0, finish(2) = 6.0.
        assert_eq!(pop_id(&q), 2);
        assert_eq!(q.virtual_time(), 6.0);
        assert_eq!(pop_id(&q), 1);
        assert_eq!(q.virtual_time(), 10.0);
    }

    #[test]
    fn wfq_marker_outranks_finish_times() {
        let q = ReadyQueue::new(SchedAlg::Wfq);
        q.push(Entry::Task(proc(0, 1, 0, 10.0)));
        q.push(Entry::Stop);
        let vt = q.virtual_time();
        assert!(matches!(q.pop(), Entry::Stop));
        // A marker pop does not advance the virtual clock.
        assert_eq!(q.virtual_time(), vt);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn try_preempt_requeues_running_process() {
        let q = ReadyQueue::new(SchedAlg::PrioPreempt);
        let running = proc(0, 8, 5, 1.0);
        q.push(Entry::Task(proc(1, 3, 1, 1.0)));
        assert!(q.try_preempt(&running));
        assert!(running.was_preempted());
        // The urgent arrival pops first, then the preempted process.
        assert_eq!(pop_id(&q), 1);
        assert_eq!(pop_id(&q), 0);
    }

    #[test]
    fn try_preempt_ignores_lower_priority_head() {
        let q = ReadyQueue::new(SchedAlg::PrioPreempt);
        let running = proc(0, 8, 5, 1.0);
        q.push(Entry::Task(proc(1, 3, 9, 1.0)));
        assert!(!q.try_preempt(&running));
        assert!(!running.was_preempted());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn try_preempt_ignores_markers_and_other_algs() {
        let q = ReadyQueue::new(SchedAlg::PrioPreempt);
        let running = proc(0, 8, 5, 1.0);
        assert!(!q.try_preempt(&running));
        q.push(Entry::Stop);
        assert!(!q.try_preempt(&running));

        let q = ReadyQueue::new(SchedAlg::Priority);
        q.push(Entry::Task(proc(1, 3, 0, 1.0)));
        assert!(!q.try_preempt(&running));
    }

    #[test]
    fn pop_timeout_expires_on_empty_queue() {
        let q = ReadyQueue::new(SchedAlg::Fifo);
        assert!(q.pop_timeout(Duration::from_millis(5)).is_none());
    }

    #[test]
    fn pop_blocks_until_push() {
        use std::thread;

        let q = Arc::new(ReadyQueue::new(SchedAlg::Fifo));
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                q.push(Entry::Task(proc(7, 1, 0, 1.0)));
            })
        };
        assert_eq!(pop_id(&q), 7);
        producer.join().unwrap();
    }

    #[test]
    fn try_pop_never_blocks() {
        let q = ReadyQueue::new(SchedAlg::Fifo);
        assert!(q.try_pop().is_none());
        q.push(Entry::Task(proc(0, 1, 0, 1.0)));
        assert!(q.try_pop().is_some());
        assert!(q.try_pop().is_none());
    }
}
