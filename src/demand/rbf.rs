use crate::arrival::ArrivalBound;
use crate::time::{Duration, Service};

use super::RequestBound;

/// The canonical request-bound function (RBF), which connects
/// arrival bounds and per-frame transmission times.
///
/// Given an arrival model and the worst-case transmission time of a
/// frame, the RBF bounds demand over an interval of length `delta`
/// simply as the total cost of the maximum number of frames that
/// can arrive in an interval of length `delta`.
#[derive(Clone, Debug)]
pub struct RBF<B: ArrivalBound> {
    pub wcet: Service,
    pub arrival_bound: B,
}

impl<B: ArrivalBound> RBF<B> {
    pub fn new(arrival_bound: B, wcet: Service) -> Self {
        RBF {
            wcet,
            arrival_bound,
        }
    }
}

impl<B: ArrivalBound> RequestBound for RBF<B> {
    fn service_needed(&self, delta: Duration) -> Service {
        self.wcet * self.arrival_bound.number_arrivals(delta) as Service
    }

    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        self.arrival_bound.steps_iter()
    }
}
