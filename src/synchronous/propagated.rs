use super::Synchronous;
use crate::time::{Duration, Instant, Service};

/// The input of a downstream hop of a synchronous stream, derived
/// from the finished analysis of the upstream hop.
///
/// The earliest release of each activation is the upstream earliest
/// release plus the upstream best-case transmission time; the latest
/// release is the upstream completion time (its busy time). Before
/// the upstream hop has been analyzed, the latest release is
/// approximated by the upstream latest release plus its worst-case
/// transmission time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncPropagated {
    hyperperiod: Duration,
    delta_min_base: Vec<Instant>,
    delta_plus_base: Vec<Instant>,
}

impl SyncPropagated {
    pub fn from_upstream<S: Synchronous + ?Sized>(
        upstream: &S,
        bcet: Service,
        wcet: Service,
        busy_times: &[Instant],
    ) -> Self {
        let activations = upstream.activations_per_hyperperiod();
        if !busy_times.is_empty() {
            assert_eq!(
                busy_times.len(),
                activations,
                "busy times must cover every activation of the hyperperiod"
            );
        }
        let delta_min_base: Vec<Instant> = (0..activations)
            .map(|n| upstream.delta_min(n) + bcet)
            .collect();
        let delta_plus_base = (0..activations)
            .map(|n| match busy_times.get(n) {
                Some(busy) => {
                    assert!(
                        delta_min_base[n] <= *busy,
                        "activation {} completes at {} before its earliest possible completion {}",
                        n,
                        busy,
                        delta_min_base[n]
                    );
                    *busy
                }
                None => upstream.delta_plus(n) + wcet,
            })
            .collect();
        SyncPropagated {
            hyperperiod: upstream.hyperperiod(),
            delta_min_base,
            delta_plus_base,
        }
    }

    fn unroll(&self, base: &[Instant], n: usize) -> Instant {
        let per_hp = base.len();
        base[n % per_hp] + (n / per_hp) as Instant * self.hyperperiod
    }
}

impl Synchronous for SyncPropagated {
    fn hyperperiod(&self) -> Duration {
        self.hyperperiod
    }

    fn activations_per_hyperperiod(&self) -> usize {
        self.delta_min_base.len()
    }

    fn delta_min(&self, n: usize) -> Instant {
        self.unroll(&self.delta_min_base, n)
    }

    fn delta_plus(&self, n: usize) -> Instant {
        self.unroll(&self.delta_plus_base, n)
    }
}
