use crate::time::{Duration, Instant, Service};

use thiserror::Error;

/// Error type returned when a fixed point search fails.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum SearchFailure {
    /// No fixed point found below the given divergence threshold.
    #[error("no fixed point less than {limit} found for offset {offset}")]
    DivergenceLimitExceeded { offset: Instant, limit: Duration },

    /// The busy window contains more activations than allowed.
    #[error("busy window contains more than {limit} activations")]
    ActivationLimitExceeded { limit: usize },
}

pub type SearchResult = Result<Duration, SearchFailure>;

/// Conduct an iterative fixed point search up to a given divergence
/// threshold, assuming a given fixed `offset` within the busy
/// window.
///
/// Output ports transmit at full line rate, so `demand` units of
/// service take exactly `demand` units of time.
pub fn search_with_offset<RHS>(
    offset: Instant,
    divergence_limit: Duration,
    workload: &RHS,
) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    let mut assumed_response_time = 1;
    while assumed_response_time <= divergence_limit {
        let demand = workload(assumed_response_time);
        let response_time_bound = demand - offset;
        if response_time_bound <= assumed_response_time {
            // we have converged
            return Ok(response_time_bound);
        } else {
            // continue iterating
            assumed_response_time = response_time_bound
        }
    }
    // if we get here, we failed to converge => no solution
    Err(SearchFailure::DivergenceLimitExceeded {
        offset,
        limit: divergence_limit,
    })
}

/// Iterative search for the least fixed point of a non-decreasing
/// workload bound, up to a given `divergence_limit`.
pub fn search<RHS>(divergence_limit: Duration, workload_bound: RHS) -> SearchResult
where
    RHS: Fn(Duration) -> Service,
{
    search_with_offset(0, divergence_limit, &workload_bound)
}
