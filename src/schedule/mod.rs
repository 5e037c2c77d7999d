/*! Synchronous schedules of an output port

For a given priority level of a port, the [Schedule] summarizes the
synchronous workload over one hyperperiod as a sequence of
[ScheduleBlock]s: the instants at which some interfering activation
may become ready (its earliest release) or must have become ready (its
latest release). Each block records how much queued transmission time
is locked at that instant, how much arrives, and the backlog carried
into it from the preceding blocks.

The latest-release blocks additionally carry the response time of
every activation whose latest release falls on them, found by a
search for the critical instant over all busy windows that contain
the release ([ScheduleBuilder]). Schedules are memoized per priority
level in a [ScheduleCache].
*/

use std::collections::BTreeMap;

use crate::model::{Priority, TaskId};
use crate::time::{Duration, Instant, Service};

mod builder;
mod cache;

use builder::Sweep;

pub use builder::ScheduleBuilder;
pub use cache::ScheduleCache;

/// The state of the port queue at one instant of the hyperperiod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleBlock {
    /// Offset within the hyperperiod.
    pub timestamp: Instant,
    /// Transmission time of activations whose release window ends
    /// here but started earlier.
    pub locked_before: Service,
    /// Transmission time of activations whose release window starts
    /// here or earlier and ends later.
    pub locked_after: Service,
    /// Transmission time of activations that may be released here
    /// at the earliest.
    pub arrival: Service,
    /// Backlog at this instant, including `arrival`.
    pub current_load: Service,
    deadlines: BTreeMap<TaskId, Vec<usize>>,
    response_times: BTreeMap<TaskId, Duration>,
}

impl ScheduleBlock {
    fn new(timestamp: Instant) -> Self {
        ScheduleBlock {
            timestamp,
            locked_before: 0,
            locked_after: 0,
            arrival: 0,
            current_load: 0,
            deadlines: BTreeMap::new(),
            response_times: BTreeMap::new(),
        }
    }

    /// The activations (per task) whose latest release falls on this
    /// block.
    pub fn deadlines(&self) -> impl Iterator<Item = (TaskId, &[usize])> + '_ {
        self.deadlines.iter().map(|(t, ns)| (*t, ns.as_slice()))
    }

    /// The worst-case response time of `task`'s activations released
    /// at the latest here, if any.
    pub fn response_time(&self, task: TaskId) -> Option<Duration> {
        self.response_times.get(&task).copied()
    }

    fn has_deadlines(&self) -> bool {
        !self.deadlines.is_empty()
    }

    fn record_response_time(&mut self, task: TaskId, response_time: Duration) {
        let entry = self.response_times.entry(task).or_insert(response_time);
        *entry = (*entry).max(response_time);
    }
}

/// The synchronous schedule of one priority level of a port.
#[derive(Debug, Clone)]
pub struct Schedule {
    hyperperiod: Duration,
    priority: Priority,
    blocks: Vec<ScheduleBlock>,
    index: BTreeMap<Instant, usize>,
    sweep: Sweep,
}

impl Schedule {
    fn new(hyperperiod: Duration, priority: Priority, blocks: Vec<ScheduleBlock>, sweep: Sweep) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.timestamp, i))
            .collect();
        Schedule {
            hyperperiod,
            priority,
            blocks,
            index,
            sweep,
        }
    }

    pub fn hyperperiod(&self) -> Duration {
        self.hyperperiod
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Number of passes the backlog sweep took.
    pub fn sweep_passes(&self) -> usize {
        self.sweep.passes
    }

    /// Whether the backlog sweep converged before reaching its pass
    /// ceiling.
    pub fn is_settled(&self) -> bool {
        self.sweep.settled
    }

    /// The blocks in timestamp order.
    pub fn blocks(&self) -> &[ScheduleBlock] {
        &self.blocks
    }

    /// The block at the instant `t`, reduced into the hyperperiod.
    pub fn block_at(&self, t: Instant) -> Option<&ScheduleBlock> {
        self.index
            .get(&t.rem_euclid(self.hyperperiod))
            .map(|i| &self.blocks[*i])
    }

    /// The worst-case response time of `task`'s activations whose
    /// latest release is `t`.
    pub fn response_time(&self, task: TaskId, t: Instant) -> Option<Duration> {
        self.block_at(t)?.response_time(task)
    }
}

#[cfg(test)]
impl Schedule {
    /// A schedule with a single block at `timestamp` that reports
    /// `response_time` for the `n`-th activation of `task`.
    pub(crate) fn with_response_time(
        hyperperiod: Duration,
        priority: Priority,
        timestamp: Instant,
        task: TaskId,
        n: usize,
        response_time: Duration,
    ) -> Self {
        let mut block = ScheduleBlock::new(timestamp);
        block.deadlines.insert(task, vec![n]);
        block.record_response_time(task, response_time);
        Schedule::new(
            hyperperiod,
            priority,
            vec![block],
            Sweep {
                passes: 0,
                settled: true,
            },
        )
    }
}
