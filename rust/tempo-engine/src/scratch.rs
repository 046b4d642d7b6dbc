//! Scratch-resource provisioning around a container run.
//!
//! The engine acquires one opaque scratch handle before spawning workers and
//! releases it after join. Acquisition failure is logged and the run
//! proceeds without a handle.

use std::any::Any;
use tempfile::TempDir;
use tracing::{info, warn};

/// Opaque handle returned by a provider. The engine never looks inside.
pub type ScratchHandle = Box<dyn Any + Send>;

/// Per-run scratch resource provider.
pub trait ScratchProvider: Send {
    /// Acquire a scratch resource. `None` means the run proceeds without.
    fn acquire(&self) -> Option<ScratchHandle>;
    /// Release a previously acquired handle.
    fn release(&self, handle: ScratchHandle);
}

/// Provider backed by a temporary directory, removed on release.
#[derive(Debug, Default)]
pub struct TempDirScratch;

impl ScratchProvider for TempDirScratch {
    fn acquire(&self) -> Option<ScratchHandle> {
        match tempfile::Builder::new().prefix("container_").tempdir() {
            Ok(dir) => {
                info!(path = %dir.path().display(), "scratch directory created");
                Some(Box::new(dir))
            }
            Err(e) => {
                warn!(error = %e, "scratch directory creation failed");
                None
            }
        }
    }

    fn release(&self, handle: ScratchHandle) {
        if let Ok(dir) = handle.downcast::<TempDir>() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => info!(path = %path.display(), "scratch directory removed"),
                Err(e) => warn!(path = %path.display(), error = %e, "scratch directory removal failed"),
            }
        }
    }
}

/// Provider that hands out nothing. Useful for tests and benchmarks.
#[derive(Debug, Default)]
pub struct NoopScratch;

impl ScratchProvider for NoopScratch {
    fn acquire(&self) -> Option<ScratchHandle> {
        None
    }

    fn release(&self, _handle: ScratchHandle) {}
}
