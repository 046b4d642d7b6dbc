//! Built-in demo scenarios, one per scheduling feature.

use crate::scenario::{ContainerDef, ProcDef, ScenarioError, ScenarioFile};
use tempo_core::SchedAlg;

fn proc(burst: u64, priority: i32, arrival: u64, weight: f64) -> ProcDef {
    ProcDef {
        burst,
        priority,
        arrival,
        weight,
    }
}

fn container(
    cores: i32,
    hpc_threads: i32,
    main_alg: SchedAlg,
    hpc_alg: SchedAlg,
    budget: u64,
    main: Vec<ProcDef>,
    hpc: Vec<ProcDef>,
) -> ContainerDef {
    ContainerDef {
        cores,
        hpc_threads,
        main_alg,
        hpc_alg,
        budget,
        main,
        hpc,
    }
}

fn single(name: &str, def: ContainerDef) -> ScenarioFile {
    ScenarioFile {
        name: Some(name.to_string()),
        containers: vec![def],
    }
}

/// Every demo: `(name, description, scenario)`.
pub fn all() -> Vec<(&'static str, &'static str, ScenarioFile)> {
    vec![
        (
            "fifo",
            "two staggered processes on one core",
            single(
                "fifo",
                container(
                    1,
                    0,
                    SchedAlg::Fifo,
                    SchedAlg::Hpc,
                    20,
                    vec![proc(3, 5, 0, 1.0), proc(5, 7, 2, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "rr",
            "round-robin over three equal bursts",
            single(
                "rr",
                container(
                    1,
                    0,
                    SchedAlg::Rr,
                    SchedAlg::Hpc,
                    30,
                    vec![proc(4, 0, 0, 1.0), proc(4, 0, 0, 1.0), proc(4, 0, 0, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "sjf",
            "shortest job first with a tie",
            single(
                "sjf",
                container(
                    1,
                    0,
                    SchedAlg::Sjf,
                    SchedAlg::Hpc,
                    30,
                    vec![
                        proc(5, 0, 0, 1.0),
                        proc(2, 0, 0, 1.0),
                        proc(8, 0, 0, 1.0),
                        proc(2, 0, 0, 1.0),
                    ],
                    vec![],
                ),
            ),
        ),
        (
            "priority",
            "non-preemptive priority order",
            single(
                "priority",
                container(
                    1,
                    0,
                    SchedAlg::Priority,
                    SchedAlg::Hpc,
                    30,
                    vec![proc(3, 4, 0, 1.0), proc(3, 1, 0, 1.0), proc(3, 9, 0, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "preempt",
            "a late urgent arrival preempts a long process",
            single(
                "preempt",
                container(
                    1,
                    0,
                    SchedAlg::PrioPreempt,
                    SchedAlg::Hpc,
                    50,
                    vec![proc(8, 5, 0, 1.0), proc(3, 1, 3, 1.0), proc(2, 10, 2, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "bfs",
            "long-quantum FIFO",
            single(
                "bfs",
                container(
                    2,
                    0,
                    SchedAlg::Bfs,
                    SchedAlg::Hpc,
                    40,
                    vec![proc(9, 0, 0, 1.0), proc(6, 0, 0, 1.0), proc(4, 0, 1, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "mlfq",
            "long processes sink to lower levels",
            single(
                "mlfq",
                container(
                    2,
                    0,
                    SchedAlg::Mlfq,
                    SchedAlg::Hpc,
                    80,
                    vec![proc(10, 0, 0, 1.0), proc(5, 0, 0, 1.0), proc(7, 0, 3, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "wfq",
            "weighted fair queueing",
            single(
                "wfq",
                container(
                    2,
                    0,
                    SchedAlg::Wfq,
                    SchedAlg::Hpc,
                    40,
                    vec![proc(6, 0, 0, 2.0), proc(4, 0, 0, 1.0), proc(3, 0, 2, 3.0)],
                    vec![],
                ),
            ),
        ),
        (
            "hpc-steal",
            "no main cores: HPC workers steal the main queue",
            single(
                "hpc-steal",
                container(
                    0,
                    2,
                    SchedAlg::None,
                    SchedAlg::Bfs,
                    40,
                    vec![proc(4, 0, 0, 1.0)],
                    vec![proc(3, 0, 1, 1.0), proc(4, 0, 2, 1.0)],
                ),
            ),
        ),
        (
            "budget",
            "workload larger than the CPU budget",
            single(
                "budget",
                container(
                    2,
                    0,
                    SchedAlg::Rr,
                    SchedAlg::Hpc,
                    10,
                    vec![proc(10, 0, 0, 1.0), proc(10, 0, 0, 1.0), proc(10, 0, 0, 1.0)],
                    vec![],
                ),
            ),
        ),
        (
            "stress",
            "one core per host CPU, a dozen mixed processes",
            single("stress", stress_container()),
        ),
    ]
}

fn stress_container() -> ContainerDef {
    let cores = num_cpus::get() as i32;
    let main = (0..12)
        .map(|i| proc(3 + (i % 5) as u64, (i % 4) as i32, (i / 3) as u64, 1.0))
        .collect();
    container(cores, 0, SchedAlg::Rr, SchedAlg::Hpc, 200, main, vec![])
}

/// Look up a demo scenario by name.
pub fn by_name(name: &str) -> Result<ScenarioFile, ScenarioError> {
    all()
        .into_iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, file)| file)
        .ok_or_else(|| ScenarioError::UnknownDemo(name.to_string()))
}

/// Print the demo catalogue.
pub fn list() {
    println!("available demos:");
    for (name, description, _) in all() {
        println!("  {name:<12} {description}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_resolves_by_name() {
        for (name, _, _) in all() {
            assert!(by_name(name).is_ok(), "demo {name} not found");
        }
    }

    #[test]
    fn unknown_demo_is_an_error() {
        assert!(matches!(
            by_name("nope"),
            Err(ScenarioError::UnknownDemo(_))
        ));
    }

    #[test]
    fn demos_have_containers_and_work() {
        for (name, _, file) in all() {
            assert!(!file.containers.is_empty(), "demo {name} is empty");
            for c in &file.containers {
                let procs = c.main.len() + c.hpc.len();
                assert!(procs > 0, "demo {name} has no processes");
                assert!(c.budget > 0, "demo {name} has no budget");
            }
        }
    }

    #[test]
    fn steal_demo_has_the_stealing_topology() {
        let file = by_name("hpc-steal").unwrap();
        let c = &file.containers[0];
        assert_eq!(c.cores, 0);
        assert!(c.hpc_threads >= 1);
        assert!(!c.main.is_empty());
    }
}
