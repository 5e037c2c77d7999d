/*! Busy-window analysis of sporadic streams under fixed-priority scheduling

Two flavors are provided, one per output-port [Policy][crate::model::Policy]:
[preemptive] for links with frame preemption, and [nonpreemptive]
for classic Ethernet ports, where a frame that has started
transmission blocks the port until it is done.

Both analyses return a [BusyWindow]: the completion time of every
activation offset in the critical busy window, from which the
worst-case response time and the critical activation follow.
*/

use crate::fixed_point::SearchFailure;
use crate::time::{Duration, Instant};

pub mod nonpreemptive;
pub mod preemptive;

/// The outcome of a busy-window analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BusyWindow {
    /// Completion time of each activation offset, measured from the
    /// start of the busy window.
    pub busy_times: Vec<Instant>,
    /// The maximum response time over all offsets.
    pub wcrt: Duration,
    /// Index of the offset exhibiting `wcrt`.
    pub q_wcrt: usize,
}

impl BusyWindow {
    fn record(&mut self, offset: Instant, completion: Instant) {
        let response_time = completion - offset;
        if self.busy_times.is_empty() || response_time > self.wcrt {
            self.wcrt = response_time;
            self.q_wcrt = self.busy_times.len();
        }
        self.busy_times.push(completion);
    }
}

/// Apply the offset-specific analysis `completion_at` to every offset
/// of the search space.
fn analyze_offsets<I, F>(
    search_space: I,
    max_activations: usize,
    completion_at: F,
) -> Result<BusyWindow, SearchFailure>
where
    I: Iterator<Item = Instant>,
    F: Fn(Instant) -> Result<Instant, SearchFailure>,
{
    let mut bw = BusyWindow::default();
    for (q, offset) in search_space.enumerate() {
        if q >= max_activations {
            return Err(SearchFailure::ActivationLimitExceeded {
                limit: max_activations,
            });
        }
        bw.record(offset, completion_at(offset)?);
    }
    Ok(bw)
}
