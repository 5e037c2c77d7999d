/*! Error types

Configuration problems are detected when models and systems are
constructed ([ConfigError]). Once the analysis runs, a task either
receives a bound or fails with a reason why it has none
([Unschedulable]); the global loop reports this, or an exhausted time
budget, as an [AnalysisError].

Violated numerical invariants (negative loads, response times below
the transmission time, inconsistent propagation) indicate a defect in
the analysis itself and abort via `assert!` instead.
*/

use thiserror::Error;

use crate::constraints::Violation;
use crate::fixed_point::SearchFailure;
use crate::model::{ResourceId, TaskId};
use crate::time::{Duration, Instant, Service};

/// Invalid model or system configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("period must be positive, got {period}")]
    NonPositivePeriod { period: Duration },

    #[error("period {period} does not divide the hyperperiod {hyperperiod}")]
    NonHarmonicPeriod {
        period: Duration,
        hyperperiod: Duration,
    },

    #[error("jitter {jitter} must be even to keep the phase symmetric")]
    OddJitter { jitter: Duration },

    #[error("jitter must not be negative, got {jitter}")]
    NegativeJitter { jitter: Duration },

    #[error("a sample must contain at least one fragment")]
    EmptyBurst,

    #[error("{burst} fragments spaced {fragment_period} apart do not fit into period {period}")]
    FragmentsExceedPeriod {
        fragment_period: Duration,
        burst: usize,
        period: Duration,
    },

    #[error("the periods {periods:?} have no representable hyperperiod")]
    NoHyperperiod { periods: Vec<Duration> },

    #[error("task '{task}' uses hyperperiod {model} but the system hyperperiod is {system}")]
    HyperperiodMismatch {
        task: String,
        model: Duration,
        system: Duration,
    },

    #[error("task '{task}' has invalid execution times (bcet {bcet}, wcet {wcet})")]
    InvalidExecutionTime {
        task: String,
        bcet: Service,
        wcet: Service,
    },

    #[error("unknown task {task}")]
    UnknownTask { task: TaskId },

    #[error("unknown resource {resource}")]
    UnknownResource { resource: ResourceId },

    #[error("path '{path}' contains no tasks")]
    EmptyPath { path: String },

    #[error("path '{path}': task '{task}' does not directly depend on its predecessor in the path")]
    BrokenPath { path: String, task: String },

    #[error("analysis order must list each of the {expected} tasks exactly once")]
    InvalidOrder { expected: usize },
}

/// Why a task has no response-time bound.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Unschedulable {
    #[error(transparent)]
    Search(#[from] SearchFailure),

    #[error("activation {activation} has jitter {jitter}, not less than the hyperperiod {hyperperiod}")]
    JitterExceedsHyperperiod {
        activation: usize,
        jitter: Duration,
        hyperperiod: Duration,
    },

    #[error("response time {wcrt} of activation {activation} reaches the hyperperiod {hyperperiod}")]
    ResponseTimeExceedsHyperperiod {
        activation: usize,
        wcrt: Duration,
        hyperperiod: Duration,
    },

    #[error("busy window starting at {timestamp} does not close within a hyperperiod")]
    Overload { timestamp: Instant },

    #[error("constraint violated: {0}")]
    ConstraintViolation(Violation),
}

/// Failure while computing the response time of a single task.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskAnalysisError {
    #[error("time budget exhausted")]
    Timeout,

    #[error(transparent)]
    Unschedulable(#[from] Unschedulable),
}

/// Failure of the system-level analysis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("analysis timed out after {iterations} iterations")]
    Timeout {
        iterations: usize,
        /// The task analyzed when the budget ran out, with its
        /// resource.
        task: Option<String>,
        resource: Option<String>,
    },

    #[error("task '{task}' on resource '{resource}' is not schedulable (round {round}): {reason}")]
    NotSchedulable {
        round: usize,
        task: String,
        resource: String,
        reason: Unschedulable,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
