/*! Request-bound functions

A [RequestBound] bounds the cumulative transmission demand of one or
more streams in any interval of a given length. The canonical
instance is the [RBF], which multiplies an arrival bound with a
per-frame transmission time; [Slice] sums the demand of several
sources.
*/

use auto_impl::auto_impl;

use crate::time::{Duration, Instant, Service, EPSILON};

/// The general interface for (arbitrarily shaped) link demand.
/// This can represent the demand of a single task, or the cumulative
/// demand of multiple tasks.
#[auto_impl(&, Box, Rc)]
pub trait RequestBound {
    /// Bound the total amount of service needed in an interval of length `delta`.
    fn service_needed(&self, delta: Duration) -> Service;

    /// Yield an iterator over the points (i.e., values of `delta` in
    /// [RequestBound::service_needed]) at which the cumulative demand changes.
    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a>;
}

/// The offsets within a busy window at which the demand of `rbf`
/// changes. Since the interval `[0, A]` has length `A + 1`, each
/// step `delta` corresponds to the offset `delta - 1`.
pub fn step_offsets<'a, T: RequestBound + ?Sized>(
    rbf: &'a T,
) -> impl Iterator<Item = Instant> + 'a {
    rbf.steps_iter().map(|delta| delta - EPSILON)
}

mod rbf;
mod slice;

pub use rbf::RBF;
pub use slice::Slice;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrival::{Periodic, Sporadic};
    use crate::tests::{d, s};

    #[test]
    fn rbf_scales_arrivals() {
        let rbf = RBF::new(Periodic { period: d(10) }, s(3));
        assert_eq!(rbf.service_needed(d(0)), s(0));
        assert_eq!(rbf.service_needed(d(1)), s(3));
        assert_eq!(rbf.service_needed(d(11)), s(6));
    }

    #[test]
    fn slice_sums_and_merges_steps() {
        let rbfs = vec![
            RBF::new(Sporadic::new_zero_jitter(d(10)), s(1)),
            RBF::new(Sporadic::new_zero_jitter(d(15)), s(2)),
        ];
        let total = Slice::of(&rbfs);
        assert_eq!(total.service_needed(d(11)), s(2 + 2));
        let steps: Vec<_> = total.steps_iter().take(4).collect();
        assert_eq!(steps, vec![d(1), d(11), d(16), d(21)]);
        let offsets: Vec<_> = step_offsets(&total).take(2).collect();
        assert_eq!(offsets, vec![d(0), d(10)]);
    }
}
