use std::collections::BTreeMap;

use super::Schedule;
use crate::model::Priority;

/// Memoized schedules of one port, keyed by priority level.
///
/// A schedule depends on the input models of all synchronous tasks at
/// or above its level (and of sporadic tasks above it). When the input
/// model of a task at priority `p` changes, the levels `p` and below
/// (numerically `>= p`) must be rebuilt; see
/// [ScheduleCache::invalidate_from].
#[derive(Debug, Default)]
pub struct ScheduleCache {
    schedules: BTreeMap<Priority, Schedule>,
    builds: usize,
}

impl ScheduleCache {
    pub fn new() -> Self {
        ScheduleCache::default()
    }

    pub fn get(&self, priority: Priority) -> Option<&Schedule> {
        self.schedules.get(&priority)
    }

    /// Return the schedule of `priority`, building it with `build` if
    /// it is not cached.
    pub fn get_or_try_build<F, E>(&mut self, priority: Priority, build: F) -> Result<&Schedule, E>
    where
        F: FnOnce() -> Result<Schedule, E>,
    {
        if !self.schedules.contains_key(&priority) {
            let schedule = build()?;
            self.builds += 1;
            self.schedules.insert(priority, schedule);
        }
        Ok(&self.schedules[&priority])
    }

    /// Drop the schedules of `priority` and all lower priority levels.
    pub fn invalidate_from(&mut self, priority: Priority) {
        self.schedules.split_off(&priority);
    }

    pub fn clear(&mut self) {
        self.schedules.clear();
    }

    /// The number of schedules built through this cache so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// The cached priority levels, in ascending order.
    pub fn levels(&self) -> impl Iterator<Item = Priority> + '_ {
        self.schedules.keys().copied()
    }
}
