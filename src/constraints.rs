/*! Timing constraints

Constraints are attached to a [System] and checked against the
results of an [Analysis]: either after every round (aborting at the
first violation) or once after convergence, depending on
[AnalysisOptions::check_violations][crate::options::AnalysisOptions::check_violations].
*/

use std::collections::BTreeMap;

use derive_more::Display;

use crate::analysis::Analysis;
use crate::model::{PathId, ResourceId, TaskId};
use crate::path;
use crate::time::Duration;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    deadlines: BTreeMap<TaskId, Duration>,
    jitter: BTreeMap<TaskId, Duration>,
    path_latency: BTreeMap<PathId, Duration>,
    load: BTreeMap<ResourceId, f64>,
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Violation {
    #[display(fmt = "{} misses its deadline: wcrt {} > {}", task, wcrt, limit)]
    Deadline {
        task: TaskId,
        wcrt: Duration,
        limit: Duration,
    },
    #[display(fmt = "{} exceeds its jitter limit: {} > {}", task, jitter, limit)]
    Jitter {
        task: TaskId,
        jitter: Duration,
        limit: Duration,
    },
    #[display(fmt = "{} exceeds its latency limit: {} > {}", path, latency, limit)]
    PathLatency {
        path: PathId,
        latency: Duration,
        limit: Duration,
    },
    #[display(fmt = "{} is overloaded: load {:.3} > {:.3}", resource, load, limit)]
    Load {
        resource: ResourceId,
        load: f64,
        limit: f64,
    },
}

impl Constraints {
    /// Require the worst-case response time of `task` to be at most
    /// `limit`.
    pub fn add_deadline(&mut self, task: TaskId, limit: Duration) -> &mut Self {
        self.deadlines.insert(task, limit);
        self
    }

    pub fn add_jitter_limit(&mut self, task: TaskId, limit: Duration) -> &mut Self {
        self.jitter.insert(task, limit);
        self
    }

    pub fn add_path_latency_limit(&mut self, path: PathId, limit: Duration) -> &mut Self {
        self.path_latency.insert(path, limit);
        self
    }

    /// Require the utilization of `resource` to stay at or below
    /// `limit` (a fraction of the line rate).
    pub fn add_load_limit(&mut self, resource: ResourceId, limit: f64) -> &mut Self {
        self.load.insert(resource, limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
            && self.jitter.is_empty()
            && self.path_latency.is_empty()
            && self.load.is_empty()
    }

    /// All constraints violated by the current results of `analysis`.
    pub fn check(&self, analysis: &Analysis) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (task, limit) in &self.deadlines {
            let wcrt = analysis.result(*task).wcrt;
            if wcrt > *limit {
                violations.push(Violation::Deadline {
                    task: *task,
                    wcrt,
                    limit: *limit,
                });
            }
        }
        for (task, limit) in &self.jitter {
            let jitter = analysis.result(*task).jitter();
            if jitter > *limit {
                violations.push(Violation::Jitter {
                    task: *task,
                    jitter,
                    limit: *limit,
                });
            }
        }
        for (p, limit) in &self.path_latency {
            let latency = path::end_to_end_latency(analysis, *p).worst_case;
            if latency > *limit {
                violations.push(Violation::PathLatency {
                    path: *p,
                    latency,
                    limit: *limit,
                });
            }
        }
        let accuracy = analysis.system().hyperperiod();
        for (resource, limit) in &self.load {
            let load = analysis.resource_load(*resource, accuracy);
            if load > *limit {
                violations.push(Violation::Load {
                    resource: *resource,
                    load,
                    limit: *limit,
                });
            }
        }
        violations
    }
}
