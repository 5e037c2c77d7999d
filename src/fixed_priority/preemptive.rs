//! RTA for FP scheduling on links with frame preemption

use super::{analyze_offsets, BusyWindow};
use crate::arrival::ArrivalBound;
use crate::demand::{self, RequestBound};
use crate::fixed_point::{self, SearchFailure};
use crate::time::{Duration, Service, EPSILON};

/// Try to find a response-time bound for a stream under
/// fully-preemptive fixed-priority scheduling on a dedicated link.
///
/// The total higher-or-equal-priority interference is represented by
/// `interference`; the stream under analysis is given by
/// `tua_wcet` and `tua_arrivals`.
///
/// If no fixed point is found below the divergence limit given by
/// `limit`, or the busy window holds more than `max_activations`
/// offsets, return a [SearchFailure] instead.
///
/// This analysis is an instantiation of [the abstract RTA of Bozhko
/// and Brandenburg (ECRTS
/// 2020)](https://drops.dagstuhl.de/opus/volltexte/2020/12385/pdf/LIPIcs-ECRTS-2020-22.pdf).
#[allow(non_snake_case)]
pub fn dedicated_link_rta<RBF, AB>(
    interference: &RBF,
    tua_wcet: Service,
    tua_arrivals: &AB,
    limit: Duration,
    max_activations: usize,
) -> Result<BusyWindow, SearchFailure>
where
    RBF: RequestBound + ?Sized,
    AB: ArrivalBound + ?Sized,
{
    // For convenience, define the RBF for the stream under analysis.
    let tua = demand::RBF::new(tua_arrivals, tua_wcet);

    // First, bound the maximum possible busy-window length.
    let L = fixed_point::search(limit, |L| {
        interference.service_needed(L) + tua.service_needed(L)
    })?;

    // Second, define the RTA for a given offset A. There is no
    // blocking, and the run-to-completion threshold is the whole
    // frame, so nothing remains to be transmitted after it.
    let completion_at = |A: Duration| {
        // RHS of the equation in theorem 31 of the aRTA paper, where AF = A + F.
        let rhs = |AF: Duration| tua.service_needed(A + EPSILON) + interference.service_needed(AF);
        fixed_point::search(limit, rhs)
    };

    // Third, the search space: A=0 and each step below L of the RBF
    // of the stream under analysis.
    let search_space = demand::step_offsets(&tua).take_while(|A| *A < L);

    analyze_offsets(search_space, max_activations, completion_at)
}
