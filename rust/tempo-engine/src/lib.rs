//! The tempo scheduling engine.
//!
//! A [`Container`] owns two ready queues (main + HPC), a set of worker
//! threads, the process records, a simulated clock and a slice timeline.
//! Calling [`Container::run`] executes the workload to completion or budget
//! exhaustion and returns a [`RunReport`]; [`orchestrator::run_all`] runs
//! several independent containers concurrently.
//!
//! Time is simulated: one tick of work equals one unit of remaining time,
//! and a short scaled sleep per step makes the thread interleaving
//! observable without measuring the host's CPU.

pub mod cancel;
pub mod container;
pub mod orchestrator;
pub mod queue;
pub mod scratch;

mod clock;
mod exec;
mod worker;

pub use cancel::CancellationToken;
pub use container::{Container, ContainerConfig, RunReport};
pub use orchestrator::run_all;
pub use queue::{Entry, ReadyQueue};
pub use scratch::{NoopScratch, ScratchProvider, TempDirScratch};
