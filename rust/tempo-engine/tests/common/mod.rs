//! Shared helpers for the engine integration suites.
#![allow(dead_code)] // each test binary uses a different subset

use std::collections::BTreeMap;
use std::time::Duration;

use tempo_core::{ProcessSpec, SchedAlg};
use tempo_engine::{Container, ContainerConfig, NoopScratch, RunReport};

/// A tick duration small enough to keep test runs fast but large enough
/// for interleaving to happen.
pub const TEST_TICK: Duration = Duration::from_micros(200);

pub fn spec(burst: u64, priority: i32, arrival: u64) -> ProcessSpec {
    ProcessSpec::new(burst, priority, arrival, 1.0)
}

pub fn weighted(burst: u64, weight: f64, arrival: u64) -> ProcessSpec {
    ProcessSpec::new(burst, 0, arrival, weight)
}

pub fn config(
    cores: i32,
    hpc_threads: i32,
    main_alg: SchedAlg,
    hpc_alg: SchedAlg,
    budget: u64,
) -> ContainerConfig {
    ContainerConfig {
        cores,
        hpc_threads,
        main_alg,
        hpc_alg,
        budget,
        tick: TEST_TICK,
        ..ContainerConfig::default()
    }
}

pub fn run(
    config: ContainerConfig,
    main: Vec<ProcessSpec>,
    hpc: Vec<ProcessSpec>,
) -> RunReport {
    Container::new(config, main, hpc)
        .with_scratch(Box::new(NoopScratch))
        .run()
}

/// The invariants every run must satisfy at join, regardless of algorithm.
pub fn assert_invariants(report: &RunReport) {
    // Completion is equivalent to the end-time equation for real work.
    for r in report.processes() {
        if r.burst > 0 {
            let done = r.remaining == 0;
            let equation = r.end_time == r.first_response + r.burst;
            assert_eq!(
                done, equation,
                "process {}: completion and end-time equation disagree: {r:?}",
                r.id
            );
        }
        if r.responded {
            assert!(
                r.first_response >= r.arrival,
                "process {} responded at {} before its arrival {}",
                r.id,
                r.first_response,
                r.arrival
            );
        }
    }

    // Executed ticks reconcile with the timeline.
    let timeline_ticks: u64 = report.timeline.iter().map(|e| e.len).sum();
    assert_eq!(
        timeline_ticks, report.executed_ticks,
        "timeline and clock disagree on executed work"
    );

    // When everything finished, executed work equals the total burst.
    if report.processes().all(|r| r.completed) {
        let total_burst: u64 = report.processes().map(|r| r.burst).sum();
        assert_eq!(timeline_ticks, total_burst);
    }

    // Slices on the same core never overlap.
    let mut per_core: BTreeMap<i32, Vec<(u64, u64)>> = BTreeMap::new();
    for e in &report.timeline {
        per_core.entry(e.core).or_default().push((e.start, e.len));
    }
    for (core, mut slices) in per_core {
        slices.sort();
        for pair in slices.windows(2) {
            let (start_a, len_a) = pair[0];
            let (start_b, _) = pair[1];
            assert!(
                start_b >= start_a + len_a,
                "core {core}: slice at {start_b} overlaps slice {start_a}+{len_a}"
            );
        }
    }

    // The published timeline is sorted by (core, start).
    let keys: Vec<_> = report.timeline.iter().map(|e| (e.core, e.start)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "timeline not sorted by (core, start)");

    // Every timeline pid belongs to a known process.
    for e in &report.timeline {
        assert!(
            report.processes().any(|r| r.id == e.pid),
            "timeline references unknown pid {}",
            e.pid
        );
    }
}

/// Ticks of service each process received, keyed by pid.
pub fn service_by_pid(report: &RunReport) -> BTreeMap<i32, u64> {
    let mut service = BTreeMap::new();
    for e in &report.timeline {
        *service.entry(e.pid).or_insert(0) += e.len;
    }
    service
}
