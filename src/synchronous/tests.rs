use assert_approx_eq::assert_approx_eq;

use crate::error::ConfigError;
use crate::synchronous::{SyncPeriodic, SyncPropagated, SyncSample, Synchronous};

use crate::tests::d;

fn monotonicity_check<S: Synchronous>(model: &S) {
    for n in 0..50 {
        assert!(model.delta_min(n) <= model.delta_min(n + 1));
        assert!(model.delta_plus(n) <= model.delta_plus(n + 1));
        assert!(model.delta_min(n) <= model.delta_plus(n));
        assert!(model.min_distance(n) <= model.min_distance(n + 1));
        assert!(model.min_distance(n) <= model.max_distance(n));
    }
}

#[test]
fn period_must_divide_hyperperiod() {
    assert_eq!(
        SyncPeriodic::new(d(10_000), d(3_000), d(0), d(0)),
        Err(ConfigError::NonHarmonicPeriod {
            period: d(3_000),
            hyperperiod: d(10_000)
        })
    );
    assert_eq!(
        SyncSample::new(d(10_000), d(4_000), d(100), 2, d(0), d(0)),
        Err(ConfigError::NonHarmonicPeriod {
            period: d(4_000),
            hyperperiod: d(10_000)
        })
    );
}

#[test]
fn jitter_must_be_even_and_non_negative() {
    assert_eq!(
        SyncPeriodic::new(d(10_000), d(5_000), d(3), d(0)),
        Err(ConfigError::OddJitter { jitter: d(3) })
    );
    assert_eq!(
        SyncPeriodic::new(d(10_000), d(5_000), d(-2), d(0)),
        Err(ConfigError::NegativeJitter { jitter: d(-2) })
    );
    assert_eq!(
        SyncSample::new(d(10_000), d(5_000), d(100), 2, d(7), d(0)),
        Err(ConfigError::OddJitter { jitter: d(7) })
    );
}

#[test]
fn period_must_be_positive() {
    assert_eq!(
        SyncPeriodic::new(d(10_000), d(0), d(0), d(0)),
        Err(ConfigError::NonPositivePeriod { period: d(0) })
    );
}

#[test]
fn sample_layout_is_validated() {
    assert_eq!(
        SyncSample::new(d(20_000), d(10_000), d(1_000), 0, d(0), d(0)),
        Err(ConfigError::EmptyBurst)
    );
    assert_eq!(
        SyncSample::new(d(20_000), d(10_000), d(6_000), 3, d(0), d(0)),
        Err(ConfigError::FragmentsExceedPeriod {
            fragment_period: d(6_000),
            burst: 3,
            period: d(10_000)
        })
    );
}

#[test]
fn periodic_deltas() {
    let m = SyncPeriodic::new(d(20_000), d(10_000), d(200), d(25_000)).unwrap();
    assert_eq!(m.phase(), d(5_000));
    assert_eq!(m.activations_per_hyperperiod(), 2);
    assert_eq!(m.delta_min(0), d(4_900));
    assert_eq!(m.delta_plus(0), d(5_100));
    assert_eq!(m.delta_min(1), d(14_900));
    assert_eq!(m.delta_plus(3), d(35_100));
    assert_approx_eq!(m.load(), 1.0e-4);
    monotonicity_check(&m);
}

#[test]
fn sample_deltas() {
    let m = SyncSample::new(d(20_000), d(10_000), d(1_000), 3, d(100), d(0)).unwrap();
    assert_eq!(m.activations_per_hyperperiod(), 6);
    assert_eq!(m.delta_min(2), d(2_000));
    assert_eq!(m.delta_min(4), d(11_000));
    assert_eq!(m.delta_plus(4), d(11_100));
    assert_approx_eq!(m.load(), 3.0e-4);
    monotonicity_check(&m);
}

#[test]
fn activation_counts_within_and_across_hyperperiods() {
    let m = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0)).unwrap();
    assert_eq!(m.eta_min_sy(d(0)), 1);
    assert_eq!(m.eta_min_sy(d(9_999)), 1);
    assert_eq!(m.eta_min_sy(d(10_000)), 2);
    assert_eq!(m.eta_min_sy(d(20_000)), 3);
    assert_eq!(m.eta_min_sy(d(-1)), 0);
}

#[test]
fn activation_counts_reduce_jittered_releases_into_the_hyperperiod() {
    // activation 0 may be released 100ns before the epoch, i.e., at
    // the end of the preceding hyperperiod
    let m = SyncPeriodic::new(d(20_000), d(10_000), d(200), d(0)).unwrap();
    assert_eq!(m.eta_min_sy(d(0)), 0);
    assert_eq!(m.eta_min_sy(d(9_900)), 1);
    assert_eq!(m.eta_min_sy(d(19_900)), 2);
    assert_eq!(m.eta_min_sy(d(-100)), 0);
    assert_eq!(m.eta_plus_sy(d(100)), 1);
    assert_eq!(m.eta_plus_sy(d(10_100)), 2);
}

#[test]
fn distance_view() {
    let m = SyncPeriodic::new(d(20_000), d(10_000), d(200), d(0)).unwrap();
    assert_eq!(m.min_distance(1), d(0));
    assert_eq!(m.min_distance(2), d(9_800));
    assert_eq!(m.max_distance(2), d(10_200));
    assert_eq!(m.min_distance(3), d(19_800));
}

#[test]
fn propagated_from_busy_times() {
    let upstream = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0)).unwrap();
    let m = SyncPropagated::from_upstream(&upstream, d(500), d(1_000), &[d(1_500), d(11_200)]);
    assert_eq!(m.activations_per_hyperperiod(), 2);
    assert_eq!(m.delta_min(0), d(500));
    assert_eq!(m.delta_plus(0), d(1_500));
    assert_eq!(m.delta_min(1), d(10_500));
    assert_eq!(m.delta_plus(1), d(11_200));
    assert_eq!(m.delta_min(2), d(20_500));
    assert_eq!(m.delta_plus(3), d(31_200));
    monotonicity_check(&m);
}

#[test]
fn propagated_before_upstream_analysis() {
    let upstream = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0)).unwrap();
    let m = SyncPropagated::from_upstream(&upstream, d(500), d(1_000), &[]);
    assert_eq!(m.delta_plus(0), d(1_000));
    assert_eq!(m.delta_plus(1), d(11_000));
}

#[test]
#[should_panic]
fn propagated_rejects_impossible_busy_times() {
    let upstream = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0)).unwrap();
    SyncPropagated::from_upstream(&upstream, d(500), d(1_000), &[d(400), d(11_200)]);
}

#[test]
#[should_panic]
fn propagated_rejects_partial_busy_times() {
    let upstream = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0)).unwrap();
    SyncPropagated::from_upstream(&upstream, d(500), d(1_000), &[d(1_500)]);
}
