/*! The system under analysis

A [System] consists of output ports ([Resource]s), the per-hop
[Task]s bound to them, and named [Path]s through the network. Tasks
are linked by precedence: the successor of a task is the next hop of
the same stream, and its input event model is derived from its
predecessor by propagation.

The analysis never mutates a system; the evolving (propagated) input
models and results live in [Analysis][crate::analysis::Analysis].
*/

use derive_more::{Display, From, Into};

use crate::analysis::TaskResult;
use crate::constraints::Constraints;
use crate::error::ConfigError;
use crate::event_model::EventModel;
use crate::options::Propagation;
use crate::propagation;
use crate::time::{self, Duration, Service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[display(fmt = "task #{}", _0)]
pub struct TaskId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[display(fmt = "resource #{}", _0)]
pub struct ResourceId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
#[display(fmt = "path #{}", _0)]
pub struct PathId(usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl ResourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl PathId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Lower values denote higher priorities; equal priorities are served
/// in FIFO order.
pub type Priority = u32;

/// Traffic class of a stream. While any control task awaits
/// (re-)analysis, best-effort tasks are deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrafficClass {
    Control,
    #[default]
    BestEffort,
}

/// How sporadic frames are scheduled on an output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Fixed priority with frame preemption.
    Preemptive,
    /// Fixed priority, frames are sent to completion.
    #[default]
    NonPreemptive,
}

/// The parameters of a task that do not depend on its position in
/// the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: String,
    pub bcet: Service,
    pub wcet: Service,
    pub priority: Priority,
    pub class: TrafficClass,
    pub skip_analysis: bool,
}

impl TaskSpec {
    /// A best-effort task at the highest priority with constant
    /// transmission time `wcet`.
    pub fn new(name: impl Into<String>, wcet: Service) -> Self {
        TaskSpec {
            name: name.into(),
            bcet: wcet,
            wcet,
            priority: 0,
            class: TrafficClass::default(),
            skip_analysis: false,
        }
    }

    pub fn with_bcet(self, bcet: Service) -> Self {
        TaskSpec { bcet, ..self }
    }

    pub fn with_priority(self, priority: Priority) -> Self {
        TaskSpec { priority, ..self }
    }

    pub fn with_class(self, class: TrafficClass) -> Self {
        TaskSpec { class, ..self }
    }

    /// Exclude the task from the analysis: it keeps its initial (or
    /// resumed) result and never propagates.
    pub fn with_skip_analysis(self, skip_analysis: bool) -> Self {
        TaskSpec {
            skip_analysis,
            ..self
        }
    }
}

/// The transmission of one stream's frames on one output port.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub resource: ResourceId,
    pub bcet: Service,
    pub wcet: Service,
    pub priority: Priority,
    pub class: TrafficClass,
    /// The input event model as configured (or initially propagated).
    pub in_event_model: EventModel,
    pub predecessor: Option<TaskId>,
    pub skip_analysis: bool,
}

impl Task {
    pub fn is_synchronous(&self) -> bool {
        self.in_event_model.is_synchronous()
    }
}

/// A shared output port.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub policy: Policy,
    tasks: Vec<TaskId>,
}

impl Resource {
    /// The tasks bound to this port, in insertion order.
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }
}

/// A chain of tasks, each the direct successor of the previous one.
#[derive(Debug, Clone)]
pub struct Path {
    pub name: String,
    pub tasks: Vec<TaskId>,
}

#[derive(Debug, Clone)]
pub struct System {
    hyperperiod: Duration,
    resources: Vec<Resource>,
    tasks: Vec<Task>,
    paths: Vec<Path>,
    constraints: Constraints,
}

impl System {
    /// An empty system whose synchronous schedules repeat every
    /// `hyperperiod`.
    pub fn new(hyperperiod: Duration) -> Self {
        System {
            hyperperiod,
            resources: Vec::new(),
            tasks: Vec::new(),
            paths: Vec::new(),
            constraints: Constraints::default(),
        }
    }

    /// An empty system whose hyperperiod is the least common multiple
    /// of the given stream periods.
    pub fn for_periods(periods: Vec<Duration>) -> Result<Self, ConfigError> {
        if let Some(bad) = periods.iter().find(|p| **p <= 0) {
            return Err(ConfigError::NonPositivePeriod { period: *bad });
        }
        match time::hyperperiod(periods.iter().copied()) {
            Some(hyperperiod) => Ok(System::new(hyperperiod)),
            None => Err(ConfigError::NoHyperperiod { periods }),
        }
    }

    pub fn hyperperiod(&self) -> Duration {
        self.hyperperiod
    }

    pub fn add_resource(&mut self, name: impl Into<String>, policy: Policy) -> ResourceId {
        self.resources.push(Resource {
            name: name.into(),
            policy,
            tasks: Vec::new(),
        });
        ResourceId(self.resources.len() - 1)
    }

    /// Bind a source task (the first hop of a stream) to `resource`.
    pub fn add_task(
        &mut self,
        resource: ResourceId,
        spec: TaskSpec,
        model: impl Into<EventModel>,
    ) -> Result<TaskId, ConfigError> {
        self.bind(resource, spec, model.into(), None)
    }

    /// Bind the next hop of the stream served by `predecessor` to
    /// `resource`. Its input model is propagated from the predecessor.
    pub fn add_successor(
        &mut self,
        predecessor: TaskId,
        resource: ResourceId,
        spec: TaskSpec,
    ) -> Result<TaskId, ConfigError> {
        let upstream = self
            .tasks
            .get(predecessor.0)
            .ok_or(ConfigError::UnknownTask { task: predecessor })?;
        let model = propagation::propagate(
            upstream,
            &upstream.in_event_model,
            &TaskResult::default(),
            Propagation::default(),
        );
        self.bind(resource, spec, model, Some(predecessor))
    }

    fn bind(
        &mut self,
        resource: ResourceId,
        spec: TaskSpec,
        in_event_model: EventModel,
        predecessor: Option<TaskId>,
    ) -> Result<TaskId, ConfigError> {
        if resource.0 >= self.resources.len() {
            return Err(ConfigError::UnknownResource { resource });
        }
        if spec.wcet <= 0 || spec.bcet < 0 || spec.bcet > spec.wcet {
            return Err(ConfigError::InvalidExecutionTime {
                task: spec.name,
                bcet: spec.bcet,
                wcet: spec.wcet,
            });
        }
        if let Some(sync) = in_event_model.as_synchronous() {
            if sync.hyperperiod() != self.hyperperiod {
                return Err(ConfigError::HyperperiodMismatch {
                    task: spec.name,
                    model: sync.hyperperiod(),
                    system: self.hyperperiod,
                });
            }
        }
        let id = TaskId(self.tasks.len());
        self.tasks.push(Task {
            name: spec.name,
            resource,
            bcet: spec.bcet,
            wcet: spec.wcet,
            priority: spec.priority,
            class: spec.class,
            in_event_model,
            predecessor,
            skip_analysis: spec.skip_analysis,
        });
        self.resources[resource.0].tasks.push(id);
        Ok(id)
    }

    /// Register a named chain of tasks for latency queries and
    /// constraints.
    pub fn add_path(
        &mut self,
        name: impl Into<String>,
        tasks: Vec<TaskId>,
    ) -> Result<PathId, ConfigError> {
        let name = name.into();
        if tasks.is_empty() {
            return Err(ConfigError::EmptyPath { path: name });
        }
        if let Some(unknown) = tasks.iter().find(|t| t.0 >= self.tasks.len()) {
            return Err(ConfigError::UnknownTask { task: *unknown });
        }
        for hop in tasks.windows(2) {
            if self.task(hop[1]).predecessor != Some(hop[0]) {
                return Err(ConfigError::BrokenPath {
                    path: name,
                    task: self.task(hop[1]).name.clone(),
                });
            }
        }
        self.paths.push(Path { name, tasks });
        Ok(PathId(self.paths.len() - 1))
    }

    /// Panics if `id` was not issued by this system.
    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    /// Panics if `id` was not issued by this system.
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    /// Panics if `id` was not issued by this system.
    pub fn path(&self, id: PathId) -> &Path {
        &self.paths[id.0]
    }

    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, &Task)> + '_ {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i), t))
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> + '_ {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceId(i), r))
    }

    pub fn paths(&self) -> impl Iterator<Item = (PathId, &Path)> + '_ {
        self.paths.iter().enumerate().map(|(i, p)| (PathId(i), p))
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// The tasks whose input is propagated from `id`.
    pub fn successors(&self, id: TaskId) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks()
            .filter(move |(_, t)| t.predecessor == Some(id))
            .map(|(succ, _)| succ)
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut Constraints {
        &mut self.constraints
    }
}
