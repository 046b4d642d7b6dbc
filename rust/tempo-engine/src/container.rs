//! Containers: ownership and lifecycle of one simulated workload.
//!
//! A container owns its process records, the main and HPC ready queues, the
//! simulated clock and the timeline. [`Container::run`] acquires the scratch
//! resource, admits immediate arrivals, spawns the configured workers, joins
//! them, releases the scratch resource and publishes a [`RunReport`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use tempo_core::{
    Process, ProcessReport, ProcessSpec, RunSummary, SchedAlg, Timeline, TimelineEntry,
};

use crate::cancel::CancellationToken;
use crate::clock::SimClock;
use crate::queue::{Entry, ReadyQueue};
use crate::scratch::{ScratchProvider, TempDirScratch};
use crate::worker;

/// Id offset for HPC processes, so main and HPC ids never collide.
const HPC_ID_BASE: i32 = 1000;

/// Default scaled duration of one simulated tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(3);

/// Budget applied when a caller asks for zero.
const MIN_BUDGET: u64 = 100;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Construction parameters for one container.
///
/// Degenerate values are normalized at construction: negative counts become
/// 0 and a zero budget becomes [`MIN_BUDGET`], each with a warning.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Number of main core workers.
    pub cores: i32,
    /// Number of auxiliary HPC workers.
    pub hpc_threads: i32,
    /// Discipline of the main queue (also used for stolen slices).
    pub main_alg: SchedAlg,
    /// Discipline of the HPC queue.
    pub hpc_alg: SchedAlg,
    /// Total ticks the container may execute before shutting down.
    pub budget: u64,
    /// Scaled wall-clock duration of one tick of work.
    pub tick: Duration,
    /// Cancellation hook polled by workers between slices.
    pub cancel: CancellationToken,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            cores: 1,
            hpc_threads: 0,
            main_alg: SchedAlg::Fifo,
            hpc_alg: SchedAlg::Hpc,
            budget: 1000,
            tick: DEFAULT_TICK,
            cancel: CancellationToken::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by every worker of one container.
pub(crate) struct Shared {
    pub cores: usize,
    pub hpc_threads: usize,
    pub main_alg: SchedAlg,
    pub hpc_alg: SchedAlg,
    /// Derived at init: HPC workers may steal from the main queue only when
    /// the container has no main cores but does have main processes.
    pub allow_steal: bool,
    pub tick: Duration,
    pub clock: SimClock,
    pub timeline: Timeline,
    pub main_queue: ReadyQueue,
    pub hpc_queue: ReadyQueue,
    pub main_procs: Vec<Arc<Process>>,
    pub hpc_procs: Vec<Arc<Process>>,
    pub cancel: CancellationToken,
}

impl Shared {
    /// Observe end-of-run conditions. Cancellation is folded into the
    /// exhaustion flag here so a single flag drives shutdown.
    pub fn observe_stop(&self) -> bool {
        if self.cancel.is_cancelled() {
            self.clock.mark_exhausted();
        }
        self.clock.is_exhausted()
    }

    /// Push one termination marker per configured worker of each pool.
    /// Over-flooding is harmless; extra markers die with the queues.
    pub fn flood(&self) {
        for _ in 0..self.cores {
            self.main_queue.push(Entry::Stop);
        }
        for _ in 0..self.hpc_threads {
            self.hpc_queue.push(Entry::Stop);
        }
    }

    /// Admit every process whose arrival tick has passed. The admission
    /// flag is claimed with a compare-and-swap, so concurrent pollers
    /// enqueue each process at most once.
    pub fn poll_arrivals(&self) {
        let now = self.clock.now();
        admit(&self.main_procs, &self.main_queue, now);
        admit(&self.hpc_procs, &self.hpc_queue, now);
    }

    /// Arrival poll restricted to the main pool, used by the preemptive
    /// slice loop so a higher-priority arrival becomes visible to the
    /// preemption check mid-slice.
    pub fn poll_main_arrivals(&self) {
        let now = self.clock.now();
        admit(&self.main_procs, &self.main_queue, now);
    }

    /// When both queues are empty, nothing is mid-slice and undelivered
    /// arrivals remain, jump the clock to the earliest pending arrival.
    /// Work is the only other thing that advances simulated time, so
    /// without this a fully idle container would never see its future
    /// arrivals.
    pub fn idle_maintenance(&self) {
        if self.observe_stop() {
            return;
        }
        self.idle_fast_forward();
        self.poll_arrivals();
    }

    fn idle_fast_forward(&self) {
        if !(self.main_queue.is_empty() && self.hpc_queue.is_empty()) {
            return;
        }
        let Some(next) = self.earliest_pending_arrival() else {
            return;
        };
        let mut clk = self.clock.lock();
        if clk.in_flight == 0 && !clk.time_exhausted && next > clk.sim_time {
            debug!(from = clk.sim_time, to = next, "idle fast-forward to next arrival");
            clk.sim_time = next;
        }
    }

    fn earliest_pending_arrival(&self) -> Option<u64> {
        self.main_procs
            .iter()
            .chain(self.hpc_procs.iter())
            .filter(|p| !p.is_admitted() && !p.is_complete())
            .map(|p| p.arrival_time())
            .min()
    }
}

fn admit(procs: &[Arc<Process>], queue: &ReadyQueue, now: u64) {
    for p in procs {
        if !p.is_complete() && !p.is_admitted() && p.arrival_time() <= now && p.try_admit() {
            queue.push(Entry::Task(Arc::clone(p)));
        }
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// One simulated workload: processes, queues, workers and their clock.
pub struct Container {
    shared: Arc<Shared>,
    scratch: Box<dyn ScratchProvider>,
}

impl Container {
    /// Build a container from its configuration and process lists.
    ///
    /// Main processes are numbered `0..main.len()`, HPC processes
    /// `1000 + i`. Zero-burst processes are complete on arrival and are
    /// excluded from the remaining count, so a workload of only zero-burst
    /// processes ends immediately.
    pub fn new(config: ContainerConfig, main: Vec<ProcessSpec>, hpc: Vec<ProcessSpec>) -> Self {
        let cores = normalize_count(config.cores, "cores");
        let hpc_threads = normalize_count(config.hpc_threads, "hpc_threads");
        let budget = if config.budget == 0 {
            warn!(min = MIN_BUDGET, "zero budget, forcing minimum");
            MIN_BUDGET
        } else {
            config.budget
        };

        let allow_steal = cores == 0 && !main.is_empty();
        if allow_steal {
            info!("no main cores but main processes exist, enabling HPC steal");
        }

        let main_procs: Vec<Arc<Process>> = main
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Arc::new(Process::new(i as i32, spec)))
            .collect();
        let hpc_procs: Vec<Arc<Process>> = hpc
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Arc::new(Process::new(HPC_ID_BASE + i as i32, spec)))
            .collect();

        let remaining_count = main_procs
            .iter()
            .chain(hpc_procs.iter())
            .filter(|p| !p.is_complete())
            .count() as i64;

        let shared = Shared {
            cores,
            hpc_threads,
            main_alg: config.main_alg,
            hpc_alg: config.hpc_alg,
            allow_steal,
            tick: config.tick,
            clock: SimClock::new(budget, remaining_count),
            timeline: Timeline::new(),
            main_queue: ReadyQueue::new(config.main_alg),
            hpc_queue: ReadyQueue::new(config.hpc_alg),
            main_procs,
            hpc_procs,
            cancel: config.cancel,
        };

        Self {
            shared: Arc::new(shared),
            scratch: Box::new(TempDirScratch),
        }
    }

    /// Replace the scratch-resource provider.
    pub fn with_scratch(mut self, scratch: Box<dyn ScratchProvider>) -> Self {
        self.scratch = scratch;
        self
    }

    /// The token that cancels this container's run.
    pub fn cancellation(&self) -> CancellationToken {
        self.shared.cancel.clone()
    }

    /// Execute the workload to completion, budget exhaustion or
    /// cancellation, and publish the sorted timeline and process outcomes.
    pub fn run(self) -> RunReport {
        let Container { shared, scratch } = self;

        let handle = scratch.acquire();

        // Immediate arrivals (arrival tick already reached at time 0).
        shared.poll_arrivals();

        let mut joins = Vec::with_capacity(shared.cores + shared.hpc_threads);
        for i in 0..shared.cores {
            let s = Arc::clone(&shared);
            let spawn = thread::Builder::new()
                .name(format!("tempo-core-{i}"))
                .spawn(move || worker::main_worker(s, i as i32));
            match spawn {
                Ok(h) => joins.push(h),
                Err(e) => warn!(core = i, error = %e, "failed to spawn main worker"),
            }
        }
        for i in 0..shared.hpc_threads {
            let s = Arc::clone(&shared);
            let spawn = thread::Builder::new()
                .name(format!("tempo-hpc-{i}"))
                .spawn(move || worker::hpc_worker(s, i));
            match spawn {
                Ok(h) => joins.push(h),
                Err(e) => warn!(hpc = i, error = %e, "failed to spawn HPC worker"),
            }
        }

        for h in joins {
            let _ = h.join();
        }

        if let Some(handle) = handle {
            scratch.release(handle);
        }

        let report = RunReport::from_shared(&shared);
        info!(
            completed = report.summary.completed,
            unfinished = report.summary.unfinished,
            executed = report.executed_ticks,
            exhausted = report.time_exhausted,
            "container run finished"
        );
        report
    }
}

fn normalize_count(value: i32, what: &str) -> usize {
    if value < 0 {
        warn!(value, what, "negative count, forcing 0");
        0
    } else {
        value as usize
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Everything a container publishes after its workers have joined.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Executed slices sorted by `(core, start)`.
    pub timeline: Vec<TimelineEntry>,
    /// Outcome of each main process, in input order.
    pub main: Vec<ProcessReport>,
    /// Outcome of each HPC process, in input order.
    pub hpc: Vec<ProcessReport>,
    /// Final simulated tick.
    pub sim_time: u64,
    /// Ticks executed across all workers.
    pub executed_ticks: u64,
    /// The container's tick budget after normalization.
    pub budget: u64,
    /// Whether the shutdown flag was raised: budget reached, cancellation
    /// observed, or all work done.
    pub time_exhausted: bool,
    /// Aggregate statistics over all processes.
    pub summary: RunSummary,
}

impl RunReport {
    fn from_shared(shared: &Shared) -> Self {
        let (sim_time, executed_ticks, exhausted) = {
            let clk = shared.clock.lock();
            (
                clk.sim_time,
                clk.accumulated_cpu,
                clk.time_exhausted || clk.accumulated_cpu >= shared.clock.budget(),
            )
        };
        let main: Vec<ProcessReport> = shared.main_procs.iter().map(|p| p.report()).collect();
        let hpc: Vec<ProcessReport> = shared.hpc_procs.iter().map(|p| p.report()).collect();

        let all: Vec<ProcessReport> = main.iter().chain(hpc.iter()).cloned().collect();
        let summary = RunSummary::from_reports(&all, executed_ticks);

        Self {
            timeline: shared.timeline.sorted(),
            main,
            hpc,
            sim_time,
            executed_ticks,
            budget: shared.clock.budget(),
            time_exhausted: exhausted,
            summary,
        }
    }

    /// Reports for every process, main pool first.
    pub fn processes(&self) -> impl Iterator<Item = &ProcessReport> {
        self.main.iter().chain(self.hpc.iter())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
