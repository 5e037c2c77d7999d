//! Wall-clock budget of a global analysis run

use std::time::{Duration, Instant};

use crate::error::TaskAnalysisError;

/// Tracks the time spent since an analysis run started.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    started: Instant,
    timeout: Duration,
}

impl Budget {
    pub fn start(timeout: Duration) -> Self {
        Budget {
            started: Instant::now(),
            timeout,
        }
    }

    pub fn unlimited() -> Self {
        Budget::start(Duration::MAX)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The budget counts as exhausted once the elapsed time reaches
    /// the timeout, so a zero timeout is exhausted immediately.
    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    pub fn check(&self) -> Result<(), TaskAnalysisError> {
        if self.is_exhausted() {
            Err(TaskAnalysisError::Timeout)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_exhausted_immediately() {
        let budget = Budget::start(Duration::ZERO);
        assert!(budget.is_exhausted());
        assert_eq!(budget.check(), Err(TaskAnalysisError::Timeout));
    }

    #[test]
    fn unlimited_budget_never_expires() {
        let budget = Budget::unlimited();
        assert!(!budget.is_exhausted());
        assert_eq!(budget.check(), Ok(()));
    }
}
