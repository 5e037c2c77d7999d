use super::{ArrivalBound, Sporadic};
use crate::time::{divide_with_ceil, Duration};

/// Classic jitter-free periodic arrival process as introduced by Liu & Layland.
#[derive(Copy, Clone, Debug)]
pub struct Periodic {
    /// The exact separation between two frame releases.
    pub period: Duration,
}

impl ArrivalBound for Periodic {
    fn number_arrivals(&self, delta: Duration) -> usize {
        if delta > 0 {
            divide_with_ceil(delta, self.period) as usize
        } else {
            0
        }
    }

    fn delta_min(&self, n: usize) -> Duration {
        self.delta_plus(n)
    }

    fn delta_plus(&self, n: usize) -> Duration {
        if n < 2 {
            0
        } else {
            (n as Duration - 1) * self.period
        }
    }

    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        Box::new((0..).map(move |j| j * self.period + 1))
    }

    fn load(&self, _accuracy: Duration) -> f64 {
        1.0 / self.period as f64
    }

    fn clone_with_jitter(&self, jitter: Duration) -> Box<dyn ArrivalBound> {
        let mut ab = Box::new(Sporadic::from(*self));
        ab.jitter = jitter;
        ab
    }
}
