use super::ArrivalBound;
use crate::time::{divide_with_ceil, Duration};

/// A simple model of arrivals induced by a precedence relationship.
///
/// Suppose two hops *A* and *B* of a stream are connected such that
/// each transmission by *A* subsequently triggers one activation of
/// *B*. Then, if `input_event_model` is the arrival model of *A* and
/// the response times of *A* vary by at most `response_time_jitter`,
/// this arrival model upper-bounds the activations of *B*. If *A*
/// cannot emit two frames closer than `min_distance` (e.g., one
/// transmission time), the bound is tightened accordingly.
#[derive(Clone, Debug)]
pub struct Propagated<T: ArrivalBound> {
    pub response_time_jitter: Duration,
    pub min_distance: Duration,
    pub input_event_model: T,
}

impl<T: ArrivalBound + Clone> Propagated<T> {
    pub fn with_jitter(event_model: &T, response_time_jitter: Duration) -> Self {
        Propagated {
            input_event_model: event_model.clone(),
            response_time_jitter,
            min_distance: 0,
        }
    }

    pub fn with_min_distance(
        event_model: &T,
        response_time_jitter: Duration,
        min_distance: Duration,
    ) -> Self {
        Propagated {
            min_distance,
            ..Propagated::with_jitter(event_model, response_time_jitter)
        }
    }
}

impl<T: ArrivalBound + Clone + 'static> ArrivalBound for Propagated<T> {
    fn number_arrivals(&self, delta: Duration) -> usize {
        if delta <= 0 {
            return 0;
        }
        let n = self
            .input_event_model
            .number_arrivals(delta + self.response_time_jitter);
        if self.min_distance > 0 {
            n.min(divide_with_ceil(delta, self.min_distance) as usize)
        } else {
            n
        }
    }

    fn delta_min(&self, n: usize) -> Duration {
        if n < 2 {
            return 0;
        }
        (self.input_event_model.delta_min(n) - self.response_time_jitter)
            .max((n as Duration - 1) * self.min_distance)
            .max(0)
    }

    fn delta_plus(&self, n: usize) -> Duration {
        if n < 2 {
            0
        } else {
            self.input_event_model.delta_plus(n) + self.response_time_jitter
        }
    }

    fn load(&self, accuracy: Duration) -> f64 {
        self.input_event_model.load(accuracy)
    }

    fn clone_with_jitter(&self, added_jitter: Duration) -> Box<dyn ArrivalBound> {
        Box::new(Propagated {
            response_time_jitter: self.response_time_jitter + added_jitter,
            min_distance: self.min_distance,
            input_event_model: self.input_event_model.clone(),
        })
    }
}
