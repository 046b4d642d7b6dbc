//! Aggregate completion statistics for one container run.

use crate::process::ProcessReport;
use serde::Serialize;

/// Summary of a finished run, averaged over the processes that completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Total processes in the container (main + HPC).
    pub total: usize,
    /// Processes whose remaining time reached zero.
    pub completed: usize,
    /// Processes with work left when the run ended.
    pub unfinished: usize,
    /// Ticks executed across all workers.
    pub executed_ticks: u64,
    /// Mean turnaround (end − arrival) over completed, scheduled processes.
    pub avg_turnaround: f64,
    /// Mean waiting time (turnaround − burst) over the same set.
    pub avg_waiting: f64,
    /// Mean response time (first response − arrival) over scheduled
    /// processes, completed or not.
    pub avg_response: f64,
}

impl RunSummary {
    pub fn from_reports(reports: &[ProcessReport], executed_ticks: u64) -> Self {
        let completed = reports.iter().filter(|r| r.completed).count();

        let turnarounds: Vec<u64> = reports.iter().filter_map(|r| r.turnaround).collect();
        let waitings: Vec<u64> = reports.iter().filter_map(|r| r.waiting).collect();
        let responses: Vec<u64> = reports.iter().filter_map(|r| r.response).collect();

        Self {
            total: reports.len(),
            completed,
            unfinished: reports.len() - completed,
            executed_ticks,
            avg_turnaround: mean(&turnarounds),
            avg_waiting: mean(&waitings),
            avg_response: mean(&responses),
        }
    }
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<u64>() as f64 / values.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Process, ProcessSpec};

    fn completed_report(burst: u64, arrival: u64, response_at: u64) -> ProcessReport {
        let p = Process::new(0, ProcessSpec::new(burst, 0, arrival, 1.0));
        p.record_response(response_at);
        p.consume(burst);
        p.record_completion();
        p.report()
    }

    #[test]
    fn summary_over_completed_runs() {
        let reports = vec![
            completed_report(3, 0, 0), // turnaround 3, waiting 0, response 0
            completed_report(5, 2, 3), // turnaround 6, waiting 1, response 1
        ];
        let s = RunSummary::from_reports(&reports, 8);
        assert_eq!(s.total, 2);
        assert_eq!(s.completed, 2);
        assert_eq!(s.unfinished, 0);
        assert_eq!(s.executed_ticks, 8);
        assert_eq!(s.avg_turnaround, 4.5);
        assert_eq!(s.avg_waiting, 0.5);
        assert_eq!(s.avg_response, 0.5);
    }

    #[test]
    fn unscheduled_processes_do_not_skew_averages() {
        let never_ran = Process::new(1, ProcessSpec::new(10, 0, 50, 1.0)).report();
        let reports = vec![completed_report(4, 0, 0), never_ran];
        let s = RunSummary::from_reports(&reports, 4);
        assert_eq!(s.completed, 1);
        assert_eq!(s.unfinished, 1);
        assert_eq!(s.avg_turnaround, 4.0);
    }

    #[test]
    fn empty_run_is_all_zeros() {
        let s = RunSummary::from_reports(&[], 0);
        assert_eq!(s.total, 0);
        assert_eq!(s.avg_turnaround, 0.0);
        assert_eq!(s.avg_response, 0.0);
    }
}
