/*! The global fixed-point analysis

Each task's response time depends on the input models of the tasks
sharing its port, and each task's output shapes the input of its
successor. [Analysis] resolves this circular dependency iteratively:
in every round, it analyzes exactly one dirty task (the first one in
the analysis order), and if the task's jitter or busy times changed,
propagates its output to its successors, marks everything affected
dirty, and drops the stale schedules. The loop ends once no task is
dirty.

While any control task is dirty, best-effort tasks are deferred so
that the control traffic settles first. Tasks flagged to skip the
analysis keep their current result.
*/

use log::{debug, info, warn};

use crate::arrival::ArrivalBound;
use crate::budget::Budget;
use crate::constraints::Violation;
use crate::error::{AnalysisError, ConfigError, TaskAnalysisError, Unschedulable};
use crate::event_model::EventModel;
use crate::model::{PathId, ResourceId, System, TaskId, TrafficClass};
use crate::options::AnalysisOptions;
use crate::order;
use crate::path::{self, Latency};
use crate::propagation;
use crate::schedule::ScheduleCache;
use crate::scheduler::Scheduler;
use crate::time::{Duration, Instant, Service};

mod state;

pub use state::AnalysisState;

/// The analysis result of one task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskResult {
    /// Worst-case response time.
    pub wcrt: Duration,
    /// Best-case response time.
    pub bcrt: Duration,
    /// For synchronous tasks, the latest completion instant of each
    /// activation of the hyperperiod. For sporadic tasks, the
    /// completion of each activation offset relative to the start of
    /// the critical busy window.
    pub busy_times: Vec<Instant>,
    /// The activation exhibiting `wcrt`.
    pub q_wcrt: usize,
}

impl TaskResult {
    /// Output jitter of the task.
    pub fn jitter(&self) -> Duration {
        self.wcrt - self.bcrt
    }
}

pub struct Analysis<'s> {
    system: &'s System,
    options: AnalysisOptions,
    order: Vec<TaskId>,
    state: AnalysisState,
    models: Vec<EventModel>,
    results: Vec<TaskResult>,
    schedules: Vec<ScheduleCache>,
    rounds: usize,
    iterations: usize,
    violations: Vec<Violation>,
}

impl<'s> Analysis<'s> {
    /// Prepare an analysis of `system` that visits dirty tasks in
    /// `order`, which must list every task exactly once.
    pub fn new(
        system: &'s System,
        order: Vec<TaskId>,
        options: AnalysisOptions,
    ) -> Result<Self, ConfigError> {
        let n = system.task_count();
        let mut seen = vec![false; n];
        for t in &order {
            match seen.get_mut(t.index()) {
                Some(s) if !*s => *s = true,
                _ => return Err(ConfigError::InvalidOrder { expected: n }),
            }
        }
        if order.len() != n {
            return Err(ConfigError::InvalidOrder { expected: n });
        }
        Ok(Analysis {
            system,
            options,
            order,
            state: AnalysisState::new(system),
            models: system.tasks().map(|(_, t)| t.in_event_model.clone()).collect(),
            results: vec![TaskResult::default(); n],
            schedules: system.resources().map(|_| ScheduleCache::new()).collect(),
            rounds: 0,
            iterations: 0,
            violations: Vec::new(),
        })
    }

    /// Start over from the results and propagated input models of
    /// `previous`, in the same order. Every task is examined again,
    /// but only results that still change are propagated.
    pub fn resume(previous: &Analysis<'s>, options: AnalysisOptions) -> Self {
        let system = previous.system;
        Analysis {
            system,
            options,
            order: previous.order.clone(),
            state: AnalysisState::new(system),
            models: previous.models.clone(),
            results: previous.results.clone(),
            schedules: system.resources().map(|_| ScheduleCache::new()).collect(),
            rounds: 0,
            iterations: 0,
            violations: Vec::new(),
        }
    }

    /// Iterate until no task is dirty. Running a converged analysis
    /// again does nothing.
    pub fn run(&mut self) -> Result<(), AnalysisError> {
        let budget = Budget::start(self.options.timeout);
        while self.round(&budget)?.is_some() {}
        if !self.options.check_violations {
            self.violations = self.system.constraints().check(self);
            for violation in &self.violations {
                warn!("{}", violation);
            }
        }
        Ok(())
    }

    /// Analyze the next dirty task, if any, and return it.
    fn round(&mut self, budget: &Budget) -> Result<Option<TaskId>, AnalysisError> {
        let id = match self.next_task() {
            Some(id) => id,
            None => return Ok(None),
        };
        self.rounds += 1;
        let task = self.system.task(id);
        info!(
            "round {}: analyzing '{}' ({} dirty)",
            self.rounds,
            task.name,
            self.state.dirty_count()
        );
        self.state.mark_clean(id);
        if task.skip_analysis {
            debug!("'{}': analysis skipped", task.name);
        } else {
            self.analyze(id, budget)?;
            self.iterations += 1;
        }

        if budget.is_exhausted() {
            return Err(self.timed_out(id));
        }
        if self.options.check_violations {
            if let Some(violation) = self.system.constraints().check(self).into_iter().next() {
                return Err(self.not_schedulable(id, Unschedulable::ConstraintViolation(violation)));
            }
        }
        Ok(Some(id))
    }

    /// The first dirty task in the analysis order, skipping
    /// best-effort tasks while control tasks are dirty.
    fn next_task(&self) -> Option<TaskId> {
        let dirty = || self.order.iter().copied().filter(|t| self.state.is_dirty(*t));
        let control_dirty =
            dirty().any(|t| self.system.task(t).class == TrafficClass::Control);
        dirty().find(|t| !control_dirty || self.system.task(*t).class == TrafficClass::Control)
    }

    fn analyze(&mut self, id: TaskId, budget: &Budget) -> Result<(), AnalysisError> {
        let task = self.system.task(id);
        let scheduler = Scheduler::new(self.system, &self.models, &self.options, budget);
        let result = match scheduler.compute(id, &mut self.schedules[task.resource.index()]) {
            Ok(result) => result,
            Err(TaskAnalysisError::Timeout) => return Err(self.timed_out(id)),
            Err(TaskAnalysisError::Unschedulable(reason)) => {
                return Err(self.not_schedulable(id, reason))
            }
        };

        assert!(
            result.wcrt >= task.wcet,
            "wcrt {} of '{}' below its transmission time {}",
            result.wcrt,
            task.name,
            task.wcet
        );
        if !self.models[id.index()].is_synchronous() {
            for pair in result.busy_times.windows(2) {
                assert!(
                    pair[1] - pair[0] >= task.wcet,
                    "busy times of '{}' closer than one transmission",
                    task.name
                );
            }
        }

        let previous = std::mem::replace(&mut self.results[id.index()], result);
        let current = &self.results[id.index()];
        let changed = previous.jitter() != current.jitter() || previous.busy_times != current.busy_times;
        debug!(
            "'{}': wcrt {} bcrt {} ({})",
            task.name,
            current.wcrt,
            current.bcrt,
            if changed { "changed" } else { "stable" }
        );
        if changed {
            self.propagate(id);
        }
        Ok(())
    }

    fn propagate(&mut self, id: TaskId) {
        let task = self.system.task(id);
        for succ in self.state.successors(id).to_vec() {
            let model = propagation::propagate(
                task,
                &self.models[id.index()],
                &self.results[id.index()],
                self.options.propagation,
            );
            self.models[succ.index()] = model;
            let s = self.system.task(succ);
            self.schedules[s.resource.index()].invalidate_from(s.priority);
        }
        self.state.mark_affected_dirty(id);
    }

    fn timed_out(&self, id: TaskId) -> AnalysisError {
        let task = self.system.task(id);
        AnalysisError::Timeout {
            iterations: self.iterations,
            task: Some(task.name.clone()),
            resource: Some(self.system.resource(task.resource).name.clone()),
        }
    }

    fn not_schedulable(&self, id: TaskId, reason: Unschedulable) -> AnalysisError {
        let task = self.system.task(id);
        AnalysisError::NotSchedulable {
            round: self.rounds,
            task: task.name.clone(),
            resource: self.system.resource(task.resource).name.clone(),
            reason,
        }
    }

    pub fn system(&self) -> &'s System {
        self.system
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn result(&self, task: TaskId) -> &TaskResult {
        &self.results[task.index()]
    }

    pub fn results(&self) -> impl Iterator<Item = (TaskId, &TaskResult)> + '_ {
        self.results
            .iter()
            .enumerate()
            .map(|(i, r)| (TaskId::from(i), r))
    }

    /// The current (propagated) input model of `task`.
    pub fn input_model(&self, task: TaskId) -> &EventModel {
        &self.models[task.index()]
    }

    pub fn schedules(&self, resource: ResourceId) -> &ScheduleCache {
        &self.schedules[resource.index()]
    }

    pub fn is_converged(&self) -> bool {
        !self.state.has_dirty()
    }

    /// Number of rounds, i.e., single-task analyses, so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Number of completed task analyses.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Constraint violations found after convergence. Always empty if
    /// violations abort the run instead.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn end_to_end_latency(&self, path: PathId) -> Latency {
        path::end_to_end_latency(self, path)
    }

    /// Utilization of a port: the transmission time requested per
    /// unit of time, with sporadic rates estimated over `accuracy`.
    pub fn resource_load(&self, resource: ResourceId, accuracy: Duration) -> f64 {
        self.system
            .resource(resource)
            .tasks()
            .iter()
            .map(|t| {
                let wcet: Service = self.system.task(*t).wcet;
                wcet as f64 * self.models[t.index()].load(accuracy)
            })
            .sum()
    }
}

/// Analyze `system` in its natural order (see [order::analysis_order]).
pub fn analyze_system(
    system: &System,
    options: AnalysisOptions,
) -> Result<Analysis<'_>, AnalysisError> {
    let mut analysis = Analysis::new(system, order::analysis_order(system), options)?;
    analysis.run()?;
    Ok(analysis)
}
