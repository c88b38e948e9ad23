//! Cooperative cancellation for long-running computations

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use poromet_core::{Error, Result};

/// Shared cancellation flag with an optional deadline.
///
/// Clones share the same flag, so a request handler can keep one clone and
/// cancel the computation running on another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Token that only cancels when [`CancelToken::cancel`] is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested or the deadline passed
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Return [`Error::Cancelled`] when the token has fired
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.flag.load(Ordering::Relaxed) {
            return Err(Error::Cancelled(format!("cancelled during {}", stage)));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::Cancelled(format!("deadline exceeded during {}", stage)));
        }
        Ok(())
    }
}
