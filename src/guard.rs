use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::error::PipelineError;

/// Busy flag shared by every operation of one [`Crawler`](crate::Crawler).
///
/// At most one run holds a [`RunTicket`] at a time. A second caller is turned
/// away immediately instead of queueing.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    busy: Arc<AtomicBool>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the guard for one run.
    pub fn try_begin(&self) -> Result<RunTicket, PipelineError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("run_rejected_busy");
            return Err(PipelineError::ConcurrentRunRejected);
        }
        Ok(RunTicket {
            busy: Arc::clone(&self.busy),
        })
    }
}

/// Proof of an active run. Dropping it frees the guard, whether the run
/// finished, failed or was abandoned.
#[derive(Debug)]
#[must_use = "the run guard is released as soon as the ticket is dropped"]
pub struct RunTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
