use super::{ArrivalBound, Periodic};
use crate::time::{divide_with_ceil, Duration};

/// The classic sporadic arrival model (originally due to Mok) with
/// release jitter and an optional minimum distance between releases.
///
/// A note on terminology: following standard convention, the
/// *arrival time* of a frame denotes the time at which (conceptually)
/// it is triggered, whereas its *release time* is the time at
/// which it is actually queued at the port.
#[derive(Copy, Clone, Debug)]
pub struct Sporadic {
    /// The minimum inter-arrival separation between any two
    /// *arrivals*.
    pub min_inter_arrival: Duration,
    /// The maximum release jitter, i.e., the maximum time between
    /// the *arrival* and the *release* of a frame.
    pub jitter: Duration,
    /// The minimum separation between two *releases*, which caps the
    /// burstiness introduced by large jitter. Zero if unconstrained.
    pub min_distance: Duration,
}

impl Sporadic {
    pub fn new(min_inter_arrival: Duration, jitter: Duration) -> Self {
        Sporadic {
            min_inter_arrival,
            jitter,
            min_distance: 0,
        }
    }

    pub fn new_zero_jitter(min_inter_arrival: Duration) -> Self {
        Sporadic::new(min_inter_arrival, 0)
    }

    pub fn with_min_distance(self, min_distance: Duration) -> Self {
        Sporadic {
            min_distance,
            ..self
        }
    }
}

impl ArrivalBound for Sporadic {
    fn number_arrivals(&self, delta: Duration) -> usize {
        if delta <= 0 {
            return 0;
        }
        let n = divide_with_ceil(delta + self.jitter, self.min_inter_arrival);
        if self.min_distance > 0 {
            n.min(divide_with_ceil(delta, self.min_distance)) as usize
        } else {
            n as usize
        }
    }

    fn delta_min(&self, n: usize) -> Duration {
        if n < 2 {
            return 0;
        }
        let gaps = n as Duration - 1;
        (gaps * self.min_inter_arrival - self.jitter)
            .max(gaps * self.min_distance)
            .max(0)
    }

    fn delta_plus(&self, n: usize) -> Duration {
        if n < 2 {
            0
        } else {
            (n as Duration - 1) * self.min_inter_arrival + self.jitter
        }
    }

    fn load(&self, _accuracy: Duration) -> f64 {
        1.0 / self.min_inter_arrival as f64
    }

    fn clone_with_jitter(&self, added_jitter: Duration) -> Box<dyn ArrivalBound> {
        let mut ab = Box::new(*self);
        ab.jitter += added_jitter;
        ab
    }
}

impl From<Periodic> for Sporadic {
    fn from(p: Periodic) -> Self {
        Sporadic::new_zero_jitter(p.period)
    }
}
