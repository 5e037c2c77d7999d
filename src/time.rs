/*! The discrete time model.

All timing quantities are integral nanoseconds. Time is signed: the
earliest arrival of a synchronous activation may precede the epoch
(its phase minus half its jitter), and intermediate load terms are
differences of counts. All reductions into a hyperperiod use
Euclidean remainder and division.
*/

/// This library uses a simple discrete time model (nanoseconds).
pub type Time = i64;

/// Syntactic sugar to give a hint that a time value indicates a
/// point in time or some offset.
pub type Instant = Time;

/// Syntactic sugar to give a hint that a time value denotes an
/// interval length.
pub type Duration = Time;

/// Syntactic sugar to give a hint that a time value represents some
/// amount of link service (i.e., transmission time).
pub type Service = Time;

/// The smallest positive interval length.
pub const EPSILON: Duration = 1;

/// Integer division rounding towards positive infinity.
///
/// Only meaningful for non-negative `a` and positive `b`.
pub fn divide_with_ceil(a: Time, b: Time) -> Time {
    a / b + (a % b > 0) as Time
}

/// Greatest common divisor of two non-negative values.
fn gcd(a: Time, b: Time) -> Time {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Least common multiple of two positive values, or `None` on overflow.
fn lcm(a: Time, b: Time) -> Option<Time> {
    (a / gcd(a, b)).checked_mul(b)
}

/// The hyperperiod of a set of periods, i.e., their least common
/// multiple. Returns `None` for an empty set or on overflow.
pub fn hyperperiod(periods: impl IntoIterator<Item = Duration>) -> Option<Duration> {
    periods
        .into_iter()
        .try_fold(None, |acc: Option<Duration>, p| match acc {
            None => Some(Some(p)),
            Some(h) => lcm(h, p).map(Some),
        })
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_division() {
        assert_eq!(divide_with_ceil(0, 10), 0);
        assert_eq!(divide_with_ceil(1, 10), 1);
        assert_eq!(divide_with_ceil(10, 10), 1);
        assert_eq!(divide_with_ceil(11, 10), 2);
    }

    #[test]
    fn hyperperiod_of_harmonic_and_coprime_periods() {
        assert_eq!(hyperperiod(vec![250_000, 500_000, 1_000_000]), Some(1_000_000));
        assert_eq!(hyperperiod(vec![3, 4, 5]), Some(60));
        assert_eq!(hyperperiod(Vec::new()), None);
        assert_eq!(hyperperiod(vec![i64::MAX, i64::MAX - 1]), None);
    }

    #[test]
    fn euclidean_reduction_of_negative_instants() {
        // an activation 5ns before the epoch sits at the end of the previous hyperperiod
        assert_eq!((-5 as Time).rem_euclid(100), 95);
        assert_eq!((-5 as Time).div_euclid(100), -1);
    }
}
