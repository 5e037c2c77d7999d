use super::{check_timing, Synchronous};
use crate::error::ConfigError;
use crate::time::{Duration, Instant};

/// A time-triggered stream that emits a sample of `burst` fragments
/// every `period`, the fragments being `fragment_period` apart. Each
/// fragment is released within `jitter` after its nominal instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SyncSample {
    hyperperiod: Duration,
    period: Duration,
    fragment_period: Duration,
    burst: usize,
    jitter: Duration,
    phase: Instant,
}

impl SyncSample {
    pub fn new(
        hyperperiod: Duration,
        period: Duration,
        fragment_period: Duration,
        burst: usize,
        jitter: Duration,
        phase: Instant,
    ) -> Result<Self, ConfigError> {
        check_timing(hyperperiod, period, jitter)?;
        if burst == 0 {
            return Err(ConfigError::EmptyBurst);
        }
        if fragment_period < 0 || (burst as Duration - 1) * fragment_period > period {
            return Err(ConfigError::FragmentsExceedPeriod {
                fragment_period,
                burst,
                period,
            });
        }
        Ok(SyncSample {
            hyperperiod,
            period,
            fragment_period,
            burst,
            jitter,
            phase: phase.rem_euclid(period),
        })
    }

    pub fn burst(&self) -> usize {
        self.burst
    }
}

impl Synchronous for SyncSample {
    fn hyperperiod(&self) -> Duration {
        self.hyperperiod
    }

    fn activations_per_hyperperiod(&self) -> usize {
        (self.hyperperiod / self.period) as usize * self.burst
    }

    fn delta_min(&self, n: usize) -> Instant {
        self.period * (n / self.burst) as Instant
            + (n % self.burst) as Instant * self.fragment_period
            + self.phase
    }

    fn delta_plus(&self, n: usize) -> Instant {
        self.delta_min(n) + self.jitter
    }
}
