/*! The input event model of a task

A task is activated either by a sporadic arrival process (any
[ArrivalBound]) or by one of the synchronous models. [EventModel]
tags the two families so that the scheduler can dispatch on them.
Every variant is also usable as an [ArrivalBound]: synchronous
models contribute interference to sporadic busy windows through
their distance view.
*/

use std::rc::Rc;

use itertools::Itertools;

use crate::arrival::{ArrivalBound, Propagated};
use crate::synchronous::{SyncPeriodic, SyncPropagated, SyncSample, Synchronous};
use crate::time::{Duration, EPSILON};

#[derive(Clone, Debug)]
pub enum EventModel {
    Sporadic(Rc<dyn ArrivalBound>),
    SyncPeriodic(SyncPeriodic),
    SyncSample(SyncSample),
    Propagated(SyncPropagated),
}

/// Borrowed view of a model by family.
enum View<'a> {
    Sporadic(&'a dyn ArrivalBound),
    Synchronous(&'a dyn Synchronous),
}

impl EventModel {
    pub fn sporadic(arrivals: impl ArrivalBound + 'static) -> Self {
        EventModel::Sporadic(Rc::new(arrivals))
    }

    fn view(&self) -> View<'_> {
        match self {
            EventModel::Sporadic(ab) => View::Sporadic(&**ab),
            EventModel::SyncPeriodic(m) => View::Synchronous(m),
            EventModel::SyncSample(m) => View::Synchronous(m),
            EventModel::Propagated(m) => View::Synchronous(m),
        }
    }

    pub fn is_synchronous(&self) -> bool {
        self.as_synchronous().is_some()
    }

    pub fn as_synchronous(&self) -> Option<&dyn Synchronous> {
        match self.view() {
            View::Sporadic(_) => None,
            View::Synchronous(m) => Some(m),
        }
    }

    /// Activations per hyperperiod, for synchronous models only.
    pub fn activations_per_hyperperiod(&self) -> Option<usize> {
        self.as_synchronous()
            .map(|m| m.activations_per_hyperperiod())
    }
}

impl From<SyncPeriodic> for EventModel {
    fn from(m: SyncPeriodic) -> Self {
        EventModel::SyncPeriodic(m)
    }
}

impl From<SyncSample> for EventModel {
    fn from(m: SyncSample) -> Self {
        EventModel::SyncSample(m)
    }
}

impl From<SyncPropagated> for EventModel {
    fn from(m: SyncPropagated) -> Self {
        EventModel::Propagated(m)
    }
}

impl ArrivalBound for EventModel {
    fn number_arrivals(&self, delta: Duration) -> usize {
        match self.view() {
            View::Sporadic(ab) => ab.number_arrivals(delta),
            View::Synchronous(_) if delta <= 0 => 0,
            View::Synchronous(m) => (1..).take_while(|n| m.min_distance(*n) < delta).count(),
        }
    }

    fn delta_min(&self, n: usize) -> Duration {
        match self.view() {
            View::Sporadic(ab) => ab.delta_min(n),
            View::Synchronous(m) => m.min_distance(n),
        }
    }

    fn delta_plus(&self, n: usize) -> Duration {
        match self.view() {
            View::Sporadic(ab) => ab.delta_plus(n),
            View::Synchronous(m) => m.max_distance(n),
        }
    }

    fn steps_iter<'a>(&'a self) -> Box<dyn Iterator<Item = Duration> + 'a> {
        match self.view() {
            View::Sporadic(ab) => ab.steps_iter(),
            View::Synchronous(m) => {
                Box::new((1..).map(move |n| m.min_distance(n) + EPSILON).dedup())
            }
        }
    }

    fn load(&self, accuracy: Duration) -> f64 {
        match self.view() {
            View::Sporadic(ab) => ab.load(accuracy),
            View::Synchronous(m) => m.load(),
        }
    }

    fn clone_with_jitter(&self, jitter: Duration) -> Box<dyn ArrivalBound> {
        match self {
            EventModel::Sporadic(ab) => ab.clone_with_jitter(jitter),
            _ => Box::new(Propagated::with_jitter(self, jitter)),
        }
    }
}
