/*! Synchronous (time-triggered) event models

In a synchronized network, every stream's activations sit at known
offsets within a repeating hyperperiod. The [Synchronous] trait
exposes these offsets in absolute form: `delta_min(n)` and
`delta_plus(n)` are the earliest and latest release instants of the
`n`-th activation (counting from zero) relative to the epoch of the
hyperperiod. Instants may be negative or extend beyond the first
hyperperiod; callers reduce them with Euclidean remainder.

For use as interference in sporadic busy windows, the same models
are also viewed in distance form ([Synchronous::min_distance],
[Synchronous::max_distance]).
*/

use std::fmt::Debug;

use crate::error::ConfigError;
use crate::time::{Duration, Instant};

/// The interface shared by all synchronous event models.
pub trait Synchronous: Debug {
    /// The length of the repeating pattern.
    fn hyperperiod(&self) -> Duration;

    /// The number of activations in each hyperperiod.
    fn activations_per_hyperperiod(&self) -> usize;

    /// Earliest release instant of the `n`-th activation.
    fn delta_min(&self, n: usize) -> Instant;

    /// Latest release instant of the `n`-th activation.
    fn delta_plus(&self, n: usize) -> Instant;

    /// Number of activations whose earliest release, reduced into its
    /// hyperperiod, lies at or before the absolute instant `t`.
    fn eta_min_sy(&self, t: Instant) -> i64 {
        count_at_or_before(self, t, |n| self.delta_min(n))
    }

    /// Number of activations whose latest release, reduced into its
    /// hyperperiod, lies at or before the absolute instant `t`.
    fn eta_plus_sy(&self, t: Instant) -> i64 {
        count_at_or_before(self, t, |n| self.delta_plus(n))
    }

    /// Lower bound on the length of an interval containing `n`
    /// consecutive releases.
    fn min_distance(&self, n: usize) -> Duration {
        if n < 2 {
            return 0;
        }
        (0..self.activations_per_hyperperiod())
            .map(|i| self.delta_min(i + n - 1) - self.delta_plus(i))
            .min()
            .unwrap_or(0)
            .max(0)
    }

    /// Upper bound on the length of an interval spanned by `n`
    /// consecutive releases.
    fn max_distance(&self, n: usize) -> Duration {
        if n < 2 {
            return 0;
        }
        (0..self.activations_per_hyperperiod())
            .map(|i| self.delta_plus(i + n - 1) - self.delta_min(i))
            .max()
            .unwrap_or(0)
    }

    /// Activations per nanosecond.
    fn load(&self) -> f64 {
        self.activations_per_hyperperiod() as f64 / self.hyperperiod() as f64
    }
}

fn count_at_or_before<S, F>(model: &S, t: Instant, release: F) -> i64
where
    S: Synchronous + ?Sized,
    F: Fn(usize) -> Instant,
{
    let hp = model.hyperperiod();
    let per_hp = model.activations_per_hyperperiod();
    let within = t.rem_euclid(hp);
    let reached = (0..per_hp)
        .filter(|n| release(*n).rem_euclid(hp) <= within)
        .count();
    reached as i64 + per_hp as i64 * t.div_euclid(hp)
}

/// Validation shared by the periodic models.
fn check_timing(hyperperiod: Duration, period: Duration, jitter: Duration) -> Result<(), ConfigError> {
    if period <= 0 {
        return Err(ConfigError::NonPositivePeriod { period });
    }
    if hyperperiod <= 0 {
        return Err(ConfigError::NonPositivePeriod {
            period: hyperperiod,
        });
    }
    if hyperperiod % period != 0 {
        return Err(ConfigError::NonHarmonicPeriod {
            period,
            hyperperiod,
        });
    }
    if jitter < 0 {
        return Err(ConfigError::NegativeJitter { jitter });
    }
    if jitter % 2 != 0 {
        return Err(ConfigError::OddJitter { jitter });
    }
    Ok(())
}

mod periodic;
mod propagated;
mod sample;

pub use periodic::SyncPeriodic;
pub use propagated::SyncPropagated;
pub use sample::SyncSample;

#[cfg(test)]
mod tests;
