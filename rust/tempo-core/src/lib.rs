//! Data model for the tempo scheduling simulator.
//!
//! This crate holds the thread-agnostic building blocks shared by the engine
//! and the CLI: the [`Process`](process::Process) record, the
//! [`SchedAlg`](alg::SchedAlg) algorithm set with its quantum table, the
//! [`Timeline`](timeline::Timeline) recorder, and the per-run summary
//! statistics. Nothing in here spawns threads; the engine crate does.

pub mod alg;
pub mod process;
pub mod stats;
pub mod timeline;

pub use alg::{SchedAlg, MLFQ_LEVELS};
pub use process::{Process, ProcessReport, ProcessSpec};
pub use stats::RunSummary;
pub use timeline::{Timeline, TimelineEntry};
