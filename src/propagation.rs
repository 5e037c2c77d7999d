//! Output event models: how a task's result shapes its successor's input

use std::rc::Rc;

use crate::analysis::TaskResult;
use crate::arrival::{ArrivalBound, Propagated};
use crate::event_model::EventModel;
use crate::model::Task;
use crate::options::Propagation;
use crate::synchronous::SyncPropagated;

/// Derive the input model of the successor of `upstream`, given the
/// upstream input model and its (possibly still default) result.
///
/// Synchronous streams stay synchronous: the successor is released
/// between the earliest upstream completion and the upstream busy
/// time of each activation. Sporadic streams pick up the
/// response-time jitter of the upstream hop as selected by
/// `strategy`.
pub fn propagate(
    upstream: &Task,
    model: &EventModel,
    result: &TaskResult,
    strategy: Propagation,
) -> EventModel {
    if let Some(sync) = model.as_synchronous() {
        return SyncPropagated::from_upstream(sync, upstream.bcet, upstream.wcet, &result.busy_times)
            .into();
    }
    let jitter = result.jitter();
    match (model, strategy) {
        (EventModel::Sporadic(arrivals), Propagation::JitterDmin) => {
            EventModel::sporadic(Propagated::with_min_distance(arrivals, jitter, upstream.bcet))
        }
        _ => EventModel::Sporadic(Rc::from(model.clone_with_jitter(jitter))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrival::{ArrivalBound, Periodic};
    use crate::model::{Policy, System, TaskSpec};
    use crate::synchronous::SyncPeriodic;
    use crate::tests::d;

    fn first_hop(model: EventModel) -> (System, Task) {
        let mut sys = System::new(d(20_000));
        let r = sys.add_resource("sw0:p0", Policy::NonPreemptive);
        let t = sys
            .add_task(r, TaskSpec::new("s0", d(1_000)).with_bcet(d(800)), model)
            .unwrap();
        let task = sys.task(t).clone();
        (sys, task)
    }

    #[test]
    fn synchronous_busy_times_become_latest_releases() {
        let model: EventModel = SyncPeriodic::new(d(20_000), d(10_000), d(0), d(0))
            .unwrap()
            .into();
        let (_, task) = first_hop(model.clone());
        let result = TaskResult {
            wcrt: d(1_500),
            bcrt: d(800),
            busy_times: vec![d(1_500), d(11_000)],
            q_wcrt: 0,
        };
        let out = propagate(&task, &model, &result, Propagation::Jitter);
        let sync = out.as_synchronous().unwrap();
        assert_eq!(sync.delta_min(0), d(800));
        assert_eq!(sync.delta_plus(0), d(1_500));
        assert_eq!(sync.delta_min(1), d(10_800));
        assert_eq!(sync.delta_plus(1), d(11_000));
    }

    #[test]
    fn sporadic_jitter_strategies() {
        let model = EventModel::sporadic(Periodic { period: d(5_000) });
        let (_, task) = first_hop(model.clone());
        let result = TaskResult {
            wcrt: d(6_000),
            bcrt: d(800),
            busy_times: vec![d(6_000)],
            q_wcrt: 0,
        };

        let jittered = propagate(&task, &model, &result, Propagation::Jitter);
        assert!(!jittered.is_synchronous());
        // two frames may now arrive back to back
        assert_eq!(jittered.number_arrivals(d(1)), 2);
        assert_eq!(jittered.delta_min(2), d(0));
        assert_eq!(jittered.delta_min(3), d(4_800));

        let spaced = propagate(&task, &model, &result, Propagation::JitterDmin);
        assert_eq!(spaced.number_arrivals(d(1)), 1);
        assert_eq!(spaced.delta_min(2), d(800));
        assert_eq!(spaced.delta_min(3), d(4_800));
    }
}
