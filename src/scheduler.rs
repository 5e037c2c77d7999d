/*! Per-task response-time analysis

The [Scheduler] computes the result of one task given the current
input models of all tasks. It dispatches on the task's family:
synchronous tasks read their response times off the schedule of
their priority level, sporadic tasks are analyzed with a
fixed-priority busy window matching the port's [Policy].
*/

use log::debug;

use crate::analysis::TaskResult;
use crate::arrival::ArrivalBound;
use crate::budget::Budget;
use crate::demand::{self, RBF};
use crate::error::{TaskAnalysisError, Unschedulable};
use crate::event_model::EventModel;
use crate::fixed_priority::{nonpreemptive, preemptive, BusyWindow};
use crate::model::{Policy, Priority, ResourceId, System, Task, TaskId};
use crate::options::AnalysisOptions;
use crate::schedule::{ScheduleBuilder, ScheduleCache};
use crate::synchronous::Synchronous;

pub struct Scheduler<'a> {
    system: &'a System,
    models: &'a [EventModel],
    options: &'a AnalysisOptions,
    budget: &'a Budget,
}

impl<'a> Scheduler<'a> {
    /// `models` holds the current input model of every task, indexed
    /// by task id.
    pub fn new(
        system: &'a System,
        models: &'a [EventModel],
        options: &'a AnalysisOptions,
        budget: &'a Budget,
    ) -> Self {
        assert_eq!(models.len(), system.task_count());
        Scheduler {
            system,
            models,
            options,
            budget,
        }
    }

    /// Compute the result of `id`, using (and filling) the schedule
    /// cache of its port.
    pub fn compute(
        &self,
        id: TaskId,
        cache: &mut ScheduleCache,
    ) -> Result<TaskResult, TaskAnalysisError> {
        let task = self.system.task(id);
        let model = &self.models[id.index()];
        match model.as_synchronous() {
            Some(sync) => self.synchronous(id, task, sync, cache),
            None => self.sporadic(id, task, model),
        }
    }

    fn synchronous(
        &self,
        id: TaskId,
        task: &Task,
        model: &dyn Synchronous,
        cache: &mut ScheduleCache,
    ) -> Result<TaskResult, TaskAnalysisError> {
        let hyperperiod = model.hyperperiod();
        // a release window spanning the whole hyperperiod has no
        // well-defined position in the schedule
        for n in 0..model.activations_per_hyperperiod() {
            let jitter = model.delta_plus(n) - model.delta_min(n);
            if jitter >= hyperperiod {
                return Err(Unschedulable::JitterExceedsHyperperiod {
                    activation: n,
                    jitter,
                    hyperperiod,
                }
                .into());
            }
        }
        let schedule = cache.get_or_try_build(task.priority, || {
            self.schedule_builder(task.resource, task.priority)
                .build(self.budget)
        })?;
        let mut result = TaskResult {
            bcrt: task.bcet,
            ..TaskResult::default()
        };
        for n in 0..model.activations_per_hyperperiod() {
            self.budget.check()?;
            let latest = model.delta_plus(n);
            let response_time = schedule.response_time(id, latest).unwrap_or_else(|| {
                panic!("no response time for activation {} of {} at {}", n, id, latest)
            });
            if n == 0 || response_time > result.wcrt {
                result.wcrt = response_time;
                result.q_wcrt = n;
            }
            result.busy_times.push(latest + response_time);
            if result.wcrt >= hyperperiod {
                return Err(Unschedulable::ResponseTimeExceedsHyperperiod {
                    activation: n,
                    wcrt: result.wcrt,
                    hyperperiod,
                }
                .into());
            }
        }
        debug!(
            "{} '{}': wcrt {} at activation {}",
            id, task.name, result.wcrt, result.q_wcrt
        );
        Ok(result)
    }

    /// The schedule of `priority` on `resource`: synchronous tasks at
    /// or above the level, sporadic tasks strictly above it.
    fn schedule_builder(&self, resource: ResourceId, priority: Priority) -> ScheduleBuilder<'a> {
        let mut builder =
            ScheduleBuilder::new(self.system.hyperperiod(), priority).with_options(self.options);
        let models: &'a [EventModel] = self.models;
        for other in self.system.resource(resource).tasks() {
            let t = self.system.task(*other);
            let model = &models[other.index()];
            match model.as_synchronous() {
                Some(sync) if t.priority <= priority => {
                    builder = builder.synchronous(*other, t.wcet, sync);
                }
                None if t.priority < priority => {
                    builder = builder.sporadic(t.wcet, model);
                }
                _ => {}
            }
        }
        builder
    }

    fn sporadic(
        &self,
        id: TaskId,
        task: &Task,
        model: &EventModel,
    ) -> Result<TaskResult, TaskAnalysisError> {
        let resource = self.system.resource(task.resource);
        let others = resource.tasks().iter().filter(|t| **t != id).map(|t| {
            let other = self.system.task(*t);
            (other, &self.models[t.index()])
        });
        let mut interference: Vec<RBF<&dyn ArrivalBound>> = Vec::new();
        let mut lower_priority_wcets = Vec::new();
        for (other, other_model) in others {
            if other.priority <= task.priority {
                interference.push(RBF::new(other_model as &dyn ArrivalBound, other.wcet));
            } else {
                lower_priority_wcets.push(other.wcet);
            }
        }
        let interference = demand::Slice::of(&interference);
        let limit = self.options.divergence_limit;
        let max_activations = self.options.max_iterations;

        let window: BusyWindow = match resource.policy {
            Policy::Preemptive => {
                preemptive::dedicated_link_rta(&interference, task.wcet, model, limit, max_activations)
            }
            Policy::NonPreemptive => {
                let tua = nonpreemptive::TaskUnderAnalysis {
                    wcet: task.wcet,
                    arrivals: model,
                    blocking_bound: nonpreemptive::blocking_bound(lower_priority_wcets),
                };
                nonpreemptive::dedicated_link_rta(&tua, &interference, limit, max_activations)
            }
        }
        .map_err(Unschedulable::from)?;
        self.budget.check()?;

        debug!(
            "{} '{}': wcrt {} at offset {} of {}",
            id,
            task.name,
            window.wcrt,
            window.q_wcrt,
            window.busy_times.len()
        );
        Ok(TaskResult {
            wcrt: window.wcrt,
            bcrt: task.bcet,
            busy_times: window.busy_times,
            q_wcrt: window.q_wcrt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;
    use crate::synchronous::SyncPeriodic;
    use crate::tests::{d, s};

    const HP: i64 = 10_000;

    fn system() -> (System, TaskId) {
        let mut sys = System::new(d(HP));
        let r = sys.add_resource("sw0:p1", Policy::NonPreemptive);
        let t = sys
            .add_task(
                r,
                crate::model::TaskSpec::new("s0", s(1_000)),
                SyncPeriodic::new(d(HP), d(HP), d(0), d(0)).unwrap(),
            )
            .unwrap();
        (sys, t)
    }

    fn models(sys: &System) -> Vec<EventModel> {
        sys.tasks().map(|(_, t)| t.in_event_model.clone()).collect()
    }

    #[test]
    fn schedules_are_built_on_demand() {
        let (sys, t) = system();
        let models = models(&sys);
        let options = AnalysisOptions::default();
        let budget = Budget::unlimited();
        let scheduler = Scheduler::new(&sys, &models, &options, &budget);
        let mut cache = ScheduleCache::new();
        let result = scheduler.compute(t, &mut cache).unwrap();
        assert_eq!(result.wcrt, d(1_000));
        assert_eq!(result.busy_times, vec![d(1_000)]);
        assert_eq!(cache.builds(), 1);
        scheduler.compute(t, &mut cache).unwrap();
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn response_time_reaching_the_hyperperiod_is_unschedulable() {
        let (sys, t) = system();
        let models = models(&sys);
        let options = AnalysisOptions::default();
        let budget = Budget::unlimited();
        let scheduler = Scheduler::new(&sys, &models, &options, &budget);
        let mut cache = ScheduleCache::new();
        cache
            .get_or_try_build(0, || {
                Ok::<_, TaskAnalysisError>(Schedule::with_response_time(d(HP), 0, d(0), t, 0, d(HP)))
            })
            .unwrap();
        assert_eq!(
            scheduler.compute(t, &mut cache),
            Err(TaskAnalysisError::Unschedulable(
                Unschedulable::ResponseTimeExceedsHyperperiod {
                    activation: 0,
                    wcrt: d(HP),
                    hyperperiod: d(HP),
                }
            ))
        );
    }
}
