use super::{check_timing, Synchronous};
use crate::error::ConfigError;
use crate::time::{Duration, Instant};

/// A time-triggered periodic stream: one activation per `period` at
/// phase `phase`, released anywhere within a window of `jitter`
/// centered on the nominal instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SyncPeriodic {
    hyperperiod: Duration,
    period: Duration,
    jitter: Duration,
    phase: Instant,
}

impl SyncPeriodic {
    /// Fails unless `period` divides `hyperperiod` and `jitter` is
    /// even and non-negative. The phase is reduced modulo the period.
    pub fn new(
        hyperperiod: Duration,
        period: Duration,
        jitter: Duration,
        phase: Instant,
    ) -> Result<Self, ConfigError> {
        check_timing(hyperperiod, period, jitter)?;
        Ok(SyncPeriodic {
            hyperperiod,
            period,
            jitter,
            phase: phase.rem_euclid(period),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }

    pub fn phase(&self) -> Instant {
        self.phase
    }
}

impl Synchronous for SyncPeriodic {
    fn hyperperiod(&self) -> Duration {
        self.hyperperiod
    }

    fn activations_per_hyperperiod(&self) -> usize {
        (self.hyperperiod / self.period) as usize
    }

    fn delta_min(&self, n: usize) -> Instant {
        self.period * n as Instant + self.phase - self.jitter / 2
    }

    fn delta_plus(&self, n: usize) -> Instant {
        self.period * n as Instant + self.phase + self.jitter / 2
    }
}
