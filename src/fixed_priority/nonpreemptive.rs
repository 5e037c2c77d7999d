//! RTA for FP scheduling on non-preemptive links (classic Ethernet)

use super::{analyze_offsets, BusyWindow};
use crate::arrival::ArrivalBound;
use crate::demand::{self, RequestBound};
use crate::fixed_point::{self, SearchFailure};
use crate::time::{Duration, Service, EPSILON};

/// The information about the stream under analysis required to
/// perform the analysis.
pub struct TaskUnderAnalysis<'a, AB: ArrivalBound + ?Sized> {
    /// The worst-case transmission time of one frame.
    pub wcet: Service,

    /// The stream's arrival bound.
    pub arrivals: &'a AB,

    /// Bound on the priority inversion caused by lower-priority
    /// frames, i.e., the longest lower-priority transmission minus
    /// [EPSILON] (or zero).
    pub blocking_bound: Service,
}

/// The blocking bound induced by lower-priority frames of the given
/// transmission times.
pub fn blocking_bound(lower_priority_wcets: impl IntoIterator<Item = Service>) -> Service {
    lower_priority_wcets
        .into_iter()
        .map(|wcet| wcet - EPSILON)
        .max()
        .unwrap_or(0)
        .max(0)
}

/// Try to find a response-time bound for a stream under
/// non-preemptive fixed-priority scheduling on a dedicated link.
///
/// The set of higher-or-equal-priority streams is represented by
/// `interference`; the stream under analysis is given by `tua`.
///
/// If no fixed point is found below the divergence limit given by
/// `limit`, or the busy window holds more than `max_activations`
/// offsets, return a [SearchFailure] instead.
///
/// This analysis is an instantiation of [the abstract RTA of Bozhko
/// and Brandenburg (ECRTS
/// 2020)](https://drops.dagstuhl.de/opus/volltexte/2020/12385/pdf/LIPIcs-ECRTS-2020-22.pdf)
/// for fully non-preemptive jobs.
#[allow(non_snake_case)]
pub fn dedicated_link_rta<RBF, AB>(
    tua: &TaskUnderAnalysis<AB>,
    interference: &RBF,
    limit: Duration,
    max_activations: usize,
) -> Result<BusyWindow, SearchFailure>
where
    RBF: RequestBound + ?Sized,
    AB: ArrivalBound + ?Sized,
{
    // For convenience, define the RBF for the stream under analysis.
    let tua_rbf = demand::RBF::new(tua.arrivals, tua.wcet);

    // First, bound the maximum possible busy-window length.
    let L = fixed_point::search(limit, |L| {
        tua.blocking_bound + interference.service_needed(L) + tua_rbf.service_needed(L)
    })?;

    // Second, the run-to-completion threshold: once the first bit is
    // on the wire, the frame cannot be preempted anymore.
    let rtct = EPSILON;
    // The remaining cost after the run-to-completion threshold has been reached.
    let rem_cost = tua.wcet - rtct;

    // Now define the offset-specific RTA.
    let completion_at = |A: Duration| {
        // RHS of the equation in theorem 31 of the aRTA paper, where AF = A + F.
        let rhs = |AF: Duration| {
            let tua_demand = tua_rbf.service_needed(A + EPSILON) - rem_cost;
            tua.blocking_bound + tua_demand + interference.service_needed(AF)
        };
        // Find the solution A+F that is the least fixed point; the
        // frame completes once the remaining cost has been sent.
        fixed_point::search(limit, rhs).map(|AF| AF + rem_cost)
    };

    // Third, the search space: A=0 and each step below L.
    let search_space = demand::step_offsets(&tua_rbf).take_while(|A| *A < L);

    analyze_offsets(search_space, max_activations, completion_at)
}
