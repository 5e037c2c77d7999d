use assert_approx_eq::assert_approx_eq;

use crate::arrival::{self, ArrivalBound, Burst, Periodic, Propagated, Sporadic};

use crate::tests::d;

fn brute_force_iter_check<T: ArrivalBound>(ab: &T) {
    let brute_force = (1..)
        .map(d)
        .filter(|delta| ab.number_arrivals(*delta - 1) < ab.number_arrivals(*delta))
        .take(50);

    for (s1, s2) in ab.steps_iter().take(50).zip(brute_force) {
        assert_eq!(s1, s2)
    }
}

fn monotonicity_check<T: ArrivalBound>(ab: &T) {
    for n in 0..100 {
        assert!(ab.delta_min(n) <= ab.delta_min(n + 1));
        assert!(ab.delta_plus(n) <= ab.delta_plus(n + 1));
        assert!(ab.delta_min(n) <= ab.delta_plus(n));
    }
}

#[test]
fn periodic_arrivals() {
    let a = arrival::Periodic { period: d(10) };
    assert_eq!(a.number_arrivals(d(0)), 0);
    assert_eq!(a.number_arrivals(d(1)), 1);
    assert_eq!(a.number_arrivals(d(8)), 1);
    assert_eq!(a.number_arrivals(d(10)), 1);
    assert_eq!(a.number_arrivals(d(11)), 2);
    assert_eq!(a.number_arrivals(d(12)), 2);
    assert_eq!(a.number_arrivals(d(100)), 10);
    assert_eq!(a.number_arrivals(d(105)), 11);
}

#[test]
fn periodic_arrivals_dmin() {
    let ab = arrival::Periodic { period: d(10) };
    let dmin_ref = vec![(0, d(0)), (1, d(0)), (2, d(10)), (3, d(20)), (4, d(30))];
    for (n, should) in dmin_ref {
        assert_eq!(ab.delta_min(n), should);
        assert_eq!(ab.delta_plus(n), should);
    }
    brute_force_iter_check(&ab);
}

#[test]
fn sporadic_with_jitter() {
    let ab = Sporadic::new(d(10), d(3));
    assert_eq!(ab.number_arrivals(d(0)), 0);
    assert_eq!(ab.number_arrivals(d(1)), 1);
    assert_eq!(ab.number_arrivals(d(7)), 1);
    assert_eq!(ab.number_arrivals(d(8)), 2);
    assert_eq!(ab.delta_min(2), d(7));
    assert_eq!(ab.delta_plus(2), d(13));
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn sporadic_min_distance_caps_bursts() {
    let ab = Sporadic::new(d(10), d(25)).with_min_distance(d(2));
    assert_eq!(ab.delta_min(2), d(2));
    assert_eq!(ab.delta_min(3), d(4));
    assert_eq!(ab.delta_min(4), d(6));
    assert_eq!(ab.delta_min(5), d(15));
    assert_eq!(ab.number_arrivals(d(5)), 3);
    assert_eq!(ab.number_arrivals(d(7)), 4);
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn burst_pattern() {
    let ab = Burst {
        period: d(100),
        burst: 3,
        min_distance: d(10),
        jitter: d(0),
    };
    assert_eq!(ab.delta_min(2), d(10));
    assert_eq!(ab.delta_min(3), d(20));
    assert_eq!(ab.delta_min(4), d(100));
    assert_eq!(ab.delta_min(5), d(110));
    assert_eq!(ab.number_arrivals(d(21)), 3);
    assert_eq!(ab.number_arrivals(d(100)), 3);
    assert_eq!(ab.number_arrivals(d(101)), 4);
    assert_approx_eq!(ab.load(d(1000)), 0.03);
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn burst_with_jitter() {
    let ab = Burst {
        period: d(100),
        burst: 3,
        min_distance: d(10),
        jitter: d(15),
    };
    assert_eq!(ab.delta_min(2), d(10));
    assert_eq!(ab.delta_min(4), d(85));
    assert_eq!(ab.delta_plus(4), d(115));
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn propagated_jitter() {
    let ab = Propagated::with_jitter(&Periodic { period: d(10) }, d(5));
    assert_eq!(ab.number_arrivals(d(1)), 1);
    assert_eq!(ab.number_arrivals(d(5)), 1);
    assert_eq!(ab.number_arrivals(d(6)), 2);
    assert_eq!(ab.delta_min(2), d(5));
    assert_eq!(ab.delta_plus(2), d(15));
    assert_approx_eq!(ab.load(d(1000)), 0.1);
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn propagated_min_distance() {
    let ab = Propagated::with_min_distance(&Periodic { period: d(10) }, d(25), d(4));
    assert_eq!(ab.delta_min(2), d(4));
    assert_eq!(ab.delta_min(3), d(8));
    assert_eq!(ab.delta_min(4), d(12));
    assert_eq!(ab.delta_min(5), d(16));
    assert_eq!(ab.delta_min(6), d(25));
    assert_eq!(ab.number_arrivals(d(9)), 3);
    monotonicity_check(&ab);
    brute_force_iter_check(&ab);
}

#[test]
fn jitter_can_be_added_to_any_model() {
    let ab = Periodic { period: d(10) }.clone_with_jitter(d(5));
    assert_eq!(ab.number_arrivals(d(6)), 2);

    let ab = Sporadic::new(d(10), d(3)).clone_with_jitter(d(2));
    assert_eq!(ab.delta_min(2), d(5));

    let ab = Propagated::with_jitter(&Periodic { period: d(10) }, d(5)).clone_with_jitter(d(5));
    assert_eq!(ab.delta_min(2), d(0));
    assert_eq!(ab.number_arrivals(d(1)), 2);
}

#[test]
fn shared_models_are_arrival_bounds() {
    let shared: std::rc::Rc<dyn ArrivalBound> = std::rc::Rc::new(Periodic { period: d(10) });
    let ab = Propagated::with_jitter(&shared, d(0));
    assert_eq!(ab.number_arrivals(d(11)), 2);
    assert_eq!(ab.delta_plus(3), d(20));
}
