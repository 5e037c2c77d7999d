use super::ArrivalBound;
use crate::time::Duration;

/// Periodic batches of frames: every `period`, a sample of `burst`
/// frames is released, consecutive frames of a sample being at least
/// `min_distance` apart. The whole pattern is subject to release
/// `jitter`.
#[derive(Copy, Clone, Debug)]
pub struct Burst {
    pub period: Duration,
    pub burst: usize,
    pub min_distance: Duration,
    pub jitter: Duration,
}

impl Burst {
    /// Offset of the `n`-th activation after the first one in the
    /// nominal, jitter-free pattern.
    fn nominal(&self, n: usize) -> Duration {
        let k = n - 1;
        self.period * (k / self.burst) as Duration
            + (k % self.burst) as Duration * self.min_distance
    }
}

impl ArrivalBound for Burst {
    fn delta_min(&self, n: usize) -> Duration {
        if n < 2 {
            return 0;
        }
        (self.nominal(n) - self.jitter).max((n as Duration - 1) * self.min_distance)
    }

    fn delta_plus(&self, n: usize) -> Duration {
        if n < 2 {
            0
        } else {
            self.nominal(n) + self.jitter
        }
    }

    fn load(&self, _accuracy: Duration) -> f64 {
        self.burst as f64 / self.period as f64
    }

    fn clone_with_jitter(&self, added_jitter: Duration) -> Box<dyn ArrivalBound> {
        let mut ab = Box::new(*self);
        ab.jitter += added_jitter;
        ab
    }
}
