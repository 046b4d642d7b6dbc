//! Plain-text rendering of run reports: per-core Gantt timelines, a
//! per-process table and the aggregate summary.

use tempo_core::{SchedAlg, TimelineEntry};
use tempo_engine::RunReport;

pub fn print_report(index: usize, name: Option<&str>, report: &RunReport) {
    match name {
        Some(name) => println!("\n=== Container {index}: {name} ==="),
        None => println!("\n=== Container {index} ==="),
    }
    print_timeline(report);
    print_processes(report);
    print_summary(report);
}

/// Group slices per core, main cores first, then HPC workers.
fn print_timeline(report: &RunReport) {
    if report.timeline.is_empty() {
        println!("(no timeline)");
        return;
    }

    let mut entries: Vec<&TimelineEntry> = report.timeline.iter().collect();
    entries.sort_by_key(|e| (e.core < 0, e.core.unsigned_abs(), e.start));

    let mut current: Option<i32> = None;
    for e in entries {
        if current != Some(e.core) {
            if e.core >= 0 {
                println!("Main core {}:", e.core);
            } else {
                println!("HPC worker {}:", -1 - e.core);
            }
            current = Some(e.core);
        }
        let tag = if e.preempted { " [PREEMPT]" } else { "" };
        println!("  T[{}..{}] => P{}{}", e.start, e.start + e.len, e.pid, tag);
    }
}

fn print_processes(report: &RunReport) {
    println!(
        "{:>5} {:>6} {:>5} {:>7} {:>7} {:>5} {:>5} {:>5} {:>5} flags",
        "pid", "burst", "prio", "arrival", "weight", "left", "resp", "end", "turn"
    );
    for r in report.processes() {
        let resp = r
            .response
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        let turn = r
            .turnaround
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        let mut flags = String::new();
        if r.was_preempted {
            flags.push('P');
        }
        if !r.completed {
            flags.push('U');
        }
        println!(
            "{:>5} {:>6} {:>5} {:>7} {:>7.2} {:>5} {:>5} {:>5} {:>5} {}",
            r.id, r.burst, r.priority, r.arrival, r.weight, r.remaining, resp, r.end_time, turn, flags
        );
    }
}

fn print_summary(report: &RunReport) {
    let s = &report.summary;
    println!(
        "{}/{} completed, {} ticks executed of {} budget{}",
        s.completed,
        s.total,
        s.executed_ticks,
        report.budget,
        if report.time_exhausted {
            " (exhausted)"
        } else {
            ""
        }
    );
    println!(
        "avg turnaround {:.2}, avg waiting {:.2}, avg response {:.2}",
        s.avg_turnaround, s.avg_waiting, s.avg_response
    );
}

/// The `tempo algs` listing.
pub fn print_algorithms() {
    println!("{:<14} quantum", "algorithm");
    for alg in SchedAlg::all() {
        if *alg == SchedAlg::Mlfq {
            let ladder: Vec<String> = (0..tempo_core::MLFQ_LEVELS)
                .map(|level| alg.quantum(level).to_string())
                .collect();
            println!("{:<14} {} (levels 0..{})", alg.to_string(), ladder.join("/"), tempo_core::MLFQ_LEVELS - 1);
        } else {
            println!("{:<14} {}", alg.to_string(), alg.quantum(0));
        }
    }
}
