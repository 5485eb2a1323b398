//! Orphan blob sweep job.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dbox_core::result::AppResult;
use dbox_service::{FileCoordinator, SweepReport};

/// Drains the orphan ledger through the coordinator.
///
/// A tick that fires while the previous sweep is still running is skipped.
#[derive(Debug)]
pub struct OrphanSweepJob {
    coordinator: Arc<FileCoordinator>,
    running: AtomicBool,
}

impl OrphanSweepJob {
    /// Create a new sweep job
    pub fn new(coordinator: Arc<FileCoordinator>) -> Self {
        Self {
            coordinator,
            running: AtomicBool::new(false),
        }
    }

    /// Run one sweep. Returns `None` if another run is in progress.
    pub async fn run(&self) -> AppResult<Option<SweepReport>> {
        let Some(_running) = RunGuard::acquire(&self.running) else {
            tracing::debug!("Orphan sweep already running, skipping tick");
            return Ok(None);
        };

        let report = self.coordinator.sweep_orphans().await?;
        Ok(Some(report))
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let first = RunGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(RunGuard::acquire(&flag).is_none());
        drop(first);
        assert!(RunGuard::acquire(&flag).is_some());
    }
}
