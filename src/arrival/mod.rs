/*! Models of sporadic arrival processes (periodic, sporadic, bursty, propagated)

This module provides a central trait, [ArrivalBound], which represents
an event model in distance form: `delta_min(n)` and `delta_plus(n)`
bound the length of the shortest and longest interval that contains
`n` activations, and `number_arrivals(delta)` bounds the number of
activations in any half-open interval of length `delta`. The two views
are pseudo-inverses of each other.

Implementations are provided for the stream shapes found on switched
Ethernet links: strictly [Periodic] senders, [Sporadic] senders with
jitter and a minimum distance, periodic [Burst]s of frames, and
streams [Propagated] through an upstream hop.
*/

use std::fmt::Debug;

use auto_impl::auto_impl;
use itertools::Itertools;

use crate::time::{Duration, EPSILON};

/// The main interface for models describing arrival processes.
#[auto_impl(&, Box, Rc)]
pub trait ArrivalBound: Debug {
    /// Bound the number of activations in any interval of length `delta`.
    ///
    /// Defaults to counting how many `delta_min` values lie below
    /// `delta`; implementors with a closed form should override it.
    fn number_arrivals(&self, delta: Duration) -> usize {
        if delta <= 0 {
            return 0;
        }
        (1..).take_while(|n| self.delta_min(*n) < delta).count()
    }

    /// Lower bound on the length of an interval containing `n`
    /// activations. Zero for `n < 2`.
    fn delta_min(&self, n: usize) -> Duration;

    /// Upper bound on the length of an interval spanned by `n`
    /// consecutive activations. Zero for `n < 2`.
    fn delta_plus(&self, n: usize) -> Duration;

    /// Yield the sequence of interval lengths (i.e., values of `delta` in
    /// [ArrivalBound::number_arrivals]) for which the arrival bound
    /// "steps", i.e., where it shows an increase in the number of
    /// activations.
    ///
    /// More precisely, the iterator yields values of `delta` such that:
    ///
    /// `self.number_arrivals(delta - 1) < self.number_arrivals(delta)`.
    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        Box::new((1..).map(move |n| self.delta_min(n) + EPSILON).dedup())
    }

    /// The long-term activation rate, estimated over a window of
    /// length `accuracy`.
    fn load(&self, accuracy: Duration) -> f64 {
        self.number_arrivals(accuracy) as f64 / accuracy as f64
    }

    /// Clone the arrival model while accounting for added release
    /// jitter. Returns a boxed `dyn` object because the underlying
    /// type may change.
    fn clone_with_jitter(&self, jitter: Duration) -> Box<dyn ArrivalBound>;
}

mod burst;
mod periodic;
mod propagated;
mod sporadic;

pub use burst::Burst;
pub use periodic::Periodic;
pub use propagated::Propagated;
pub use sporadic::Sporadic;

#[cfg(test)]
mod tests;
