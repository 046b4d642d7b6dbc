//! Running several containers concurrently.
//!
//! Containers are fully independent — no shared queues, clocks or
//! timelines — so the orchestrator is just spawn-per-container plus join.

use std::thread;

use tracing::error;

use crate::container::{Container, RunReport};

/// Run every container on its own thread and collect the reports.
///
/// A container whose thread cannot be spawned or that panics is dropped
/// from the result; its peers are unaffected.
pub fn run_all(containers: Vec<Container>) -> Vec<RunReport> {
    let mut handles = Vec::with_capacity(containers.len());
    for (i, container) in containers.into_iter().enumerate() {
        let spawn = thread::Builder::new()
            .name(format!("tempo-container-{i}"))
            .spawn(move || container.run());
        match spawn {
            Ok(h) => handles.push(h),
            Err(e) => error!(container = i, error = %e, "failed to spawn container thread"),
        }
    }

    let mut reports = Vec::with_capacity(handles.len());
    for h in handles {
        match h.join() {
            Ok(report) => reports.push(report),
            Err(_) => error!("container thread panicked"),
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerConfig;
    use crate::scratch::NoopScratch;
    use std::time::Duration;
    use tempo_core::ProcessSpec;

    #[test]
    fn containers_run_independently() {
        let mk = |burst| {
            Container::new(
                ContainerConfig {
                    tick: Duration::from_micros(200),
                    budget: 50,
                    ..ContainerConfig::default()
                },
                vec![ProcessSpec::new(burst, 0, 0, 1.0)],
                vec![],
            )
            .with_scratch(Box::new(NoopScratch))
        };

        let reports = run_all(vec![mk(3), mk(5), mk(2)]);
        assert_eq!(reports.len(), 3);
        let executed: Vec<u64> = reports.iter().map(|r| r.executed_ticks).collect();
        assert_eq!(executed, vec![3, 5, 2]);
        for r in &reports {
            assert!(r.main[0].completed);
            // Independent clocks: each container's time starts at zero.
            assert_eq!(r.timeline[0].start, 0);
        }
    }

    #[test]
    fn run_all_with_no_containers_is_empty() {
        assert!(run_all(vec![]).is_empty());
    }
}
