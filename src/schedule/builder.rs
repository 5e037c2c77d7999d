use std::collections::BTreeMap;

use log::{debug, trace, warn};

use super::{Schedule, ScheduleBlock};
use crate::arrival::ArrivalBound;
use crate::budget::Budget;
use crate::demand::{self, RequestBound};
use crate::error::{TaskAnalysisError, Unschedulable};
use crate::fixed_point;
use crate::model::{Priority, TaskId};
use crate::options::AnalysisOptions;
use crate::synchronous::Synchronous;
use crate::time::{Duration, Instant, Service, EPSILON};

/// A synchronous task at or above the priority level of a schedule.
struct Interferer<'a> {
    task: TaskId,
    wcet: Service,
    model: &'a dyn Synchronous,
}

/// The release window `[earliest, latest]` of one activation, reduced
/// into the hyperperiod. It wraps if `latest < earliest`.
struct ReleaseWindow {
    earliest: Instant,
    latest: Instant,
}

impl ReleaseWindow {
    fn of(model: &dyn Synchronous, n: usize) -> Self {
        let hp = model.hyperperiod();
        ReleaseWindow {
            earliest: model.delta_min(n).rem_euclid(hp),
            latest: model.delta_plus(n).rem_euclid(hp),
        }
    }

    /// `t` lies in `[earliest, latest)`.
    fn locks_after(&self, t: Instant) -> bool {
        if self.earliest <= self.latest {
            self.earliest <= t && t < self.latest
        } else {
            t >= self.earliest || t < self.latest
        }
    }

    /// `t` lies in `(earliest, latest]`.
    fn locks_before(&self, t: Instant) -> bool {
        if self.earliest <= self.latest {
            self.earliest < t && t <= self.latest
        } else {
            t > self.earliest || t <= self.latest
        }
    }
}

/// Outcome of the backlog sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Sweep {
    pub passes: usize,
    /// The last pass changed no block.
    pub settled: bool,
}

/// Builds the [Schedule] of one priority level of a port.
///
/// Synchronous tasks of higher or equal priority (including the
/// tasks at the level itself) shape the schedule; sporadic tasks of
/// strictly higher priority add their demand to every busy window.
pub struct ScheduleBuilder<'a> {
    hyperperiod: Duration,
    priority: Priority,
    interferers: Vec<Interferer<'a>>,
    sporadic: Vec<demand::RBF<&'a dyn ArrivalBound>>,
    divergence_limit: Duration,
    max_passes: usize,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(hyperperiod: Duration, priority: Priority) -> Self {
        let defaults = AnalysisOptions::default();
        ScheduleBuilder {
            hyperperiod,
            priority,
            interferers: Vec::new(),
            sporadic: Vec::new(),
            divergence_limit: defaults.divergence_limit,
            max_passes: defaults.max_schedule_passes,
        }
    }

    pub fn with_options(self, options: &AnalysisOptions) -> Self {
        ScheduleBuilder {
            divergence_limit: options.divergence_limit,
            max_passes: options.max_schedule_passes.max(1),
            ..self
        }
    }

    pub fn synchronous(mut self, task: TaskId, wcet: Service, model: &'a dyn Synchronous) -> Self {
        assert_eq!(
            model.hyperperiod(),
            self.hyperperiod,
            "synchronous interferers must share the schedule's hyperperiod"
        );
        self.interferers.push(Interferer { task, wcet, model });
        self
    }

    pub fn sporadic(mut self, wcet: Service, arrivals: &'a dyn ArrivalBound) -> Self {
        self.sporadic.push(demand::RBF::new(arrivals, wcet));
        self
    }

    pub fn build(self, budget: &Budget) -> Result<Schedule, TaskAnalysisError> {
        for i in &self.interferers {
            for n in 0..i.model.activations_per_hyperperiod() {
                let jitter = i.model.delta_plus(n) - i.model.delta_min(n);
                if jitter >= self.hyperperiod {
                    return Err(Unschedulable::JitterExceedsHyperperiod {
                        activation: n,
                        jitter,
                        hyperperiod: self.hyperperiod,
                    }
                    .into());
                }
            }
        }
        let mut blocks = self.anchor_blocks();
        let sweep = self.sweep(&mut blocks, budget)?;
        self.search_critical_instants(&mut blocks, budget)?;
        for block in &blocks {
            trace!(
                "prio {} @{}: locked {}/{} arrival {} load {}",
                self.priority,
                block.timestamp,
                block.locked_before,
                block.locked_after,
                block.arrival,
                block.current_load
            );
            for (task, _) in block.deadlines() {
                assert!(
                    block.response_time(task).is_some(),
                    "no response time found for {} at {}",
                    task,
                    block.timestamp
                );
            }
        }
        debug!(
            "built schedule for priority {} with {} blocks",
            self.priority,
            blocks.len()
        );
        Ok(Schedule::new(self.hyperperiod, self.priority, blocks, sweep))
    }

    /// One block per distinct earliest and latest release instant,
    /// classified by the release windows covering it.
    fn anchor_blocks(&self) -> Vec<ScheduleBlock> {
        let hp = self.hyperperiod;
        let mut anchors: BTreeMap<Instant, ScheduleBlock> = BTreeMap::new();
        for i in &self.interferers {
            for n in 0..i.model.activations_per_hyperperiod() {
                let window = ReleaseWindow::of(i.model, n);
                anchors
                    .entry(window.earliest)
                    .or_insert_with(|| ScheduleBlock::new(window.earliest));
                anchors
                    .entry(window.latest)
                    .or_insert_with(|| ScheduleBlock::new(window.latest))
                    .deadlines
                    .entry(i.task)
                    .or_default()
                    .push(n);
            }
        }
        let mut blocks: Vec<ScheduleBlock> = anchors.into_values().collect();
        for block in blocks.iter_mut() {
            let ts = block.timestamp;
            for i in &self.interferers {
                for n in 0..i.model.activations_per_hyperperiod() {
                    let window = ReleaseWindow::of(i.model, n);
                    if window.locks_after(ts) {
                        block.locked_after += i.wcet;
                    }
                    if window.locks_before(ts) {
                        block.locked_before += i.wcet;
                    }
                    if window.earliest == ts {
                        block.arrival += i.wcet;
                    }
                }
            }
        }
        debug_assert!(blocks.iter().all(|b| b.timestamp >= 0 && b.timestamp < hp));
        blocks
    }

    /// Carry the backlog from block to block, cyclically, until a
    /// full pass changes nothing.
    fn sweep(&self, blocks: &mut [ScheduleBlock], budget: &Budget) -> Result<Sweep, TaskAnalysisError> {
        let m = blocks.len();
        if m == 0 {
            return Ok(Sweep {
                passes: 0,
                settled: true,
            });
        }
        blocks[0].current_load = blocks[0].arrival;
        let mut pass = 0;
        loop {
            budget.check()?;
            pass += 1;
            let mut changed = false;
            for c in 0..m {
                let x = (c + 1) % m;
                // with a single block, the next block is the same
                // instant one hyperperiod later
                let dt = if m == 1 {
                    self.hyperperiod
                } else {
                    (blocks[x].timestamp - blocks[c].timestamp).rem_euclid(self.hyperperiod)
                };
                let current = &blocks[c];
                let rest = current.current_load - current.locked_after - dt;
                let next_load = if rest < 0 {
                    current.locked_after + blocks[x].arrival
                } else {
                    current.current_load - dt + blocks[x].arrival
                };
                if blocks[x].current_load != next_load {
                    blocks[x].current_load = next_load;
                    changed = true;
                }
            }
            if !changed {
                trace!("prio {}: load sweep converged after {} passes", self.priority, pass);
                return Ok(Sweep {
                    passes: pass,
                    settled: true,
                });
            }
            if pass >= self.max_passes {
                warn!(
                    "prio {}: load sweep still changing after {} passes, using last values",
                    self.priority, pass
                );
                return Ok(Sweep {
                    passes: pass,
                    settled: false,
                });
            }
        }
    }

    /// Starting from every block that carries latest releases, extend
    /// the busy window block by block and record the response time
    /// of each activation released at the latest in it, until the
    /// window closes.
    ///
    /// Once the scan wraps around a full hyperperiod, every further
    /// candidate repeats an earlier one shifted by the hyperperiod.
    /// The scan then stops, unless the backlog of the start block is
    /// still being served at the repeated release.
    fn search_critical_instants(
        &self,
        blocks: &mut [ScheduleBlock],
        budget: &Budget,
    ) -> Result<(), TaskAnalysisError> {
        let m = blocks.len();
        let hp = self.hyperperiod;
        for start in 0..m {
            if !blocks[start].has_deadlines() {
                continue;
            }
            budget.check()?;
            let t0 = blocks[start].timestamp;
            let l0 = blocks[start].current_load;
            for k in 0.. {
                let idx = (start + k) % m;
                if !blocks[idx].has_deadlines() {
                    continue;
                }
                let offset = blocks[idx].timestamp + ((start + k) / m) as Instant * hp - t0;
                let mut closed = false;
                let mut backlogged = false;
                let mut found = Vec::new();
                for (task, activations) in blocks[idx].deadlines() {
                    for n in activations {
                        let window = self.mixed_busy_window(t0, l0, offset, task, *n)?;
                        backlogged |= window >= offset;
                        let response_time = window - offset + self.interferer(task).wcet;
                        if response_time <= 0 {
                            closed = true;
                        } else {
                            found.push((task, response_time));
                        }
                    }
                }
                for (task, response_time) in found {
                    blocks[idx].record_response_time(task, response_time);
                }
                if closed {
                    break;
                }
                if offset >= hp {
                    if backlogged {
                        return Err(Unschedulable::Overload { timestamp: t0 }.into());
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    /// Length of the busy window that starts at `t0` with backlog `l0`
    /// and serves the `n`-th activation of `task`, released at the
    /// latest at `t0 + offset`.
    fn mixed_busy_window(
        &self,
        t0: Instant,
        l0: Service,
        offset: Duration,
        task: TaskId,
        n: usize,
    ) -> Result<Duration, Unschedulable> {
        let reference = t0 + offset;
        let arriving: Service = self
            .interferers
            .iter()
            .map(|i| i.wcet * (i.model.eta_min_sy(reference) - i.model.eta_min_sy(t0)))
            .sum();
        let own = self.interferer(task);
        // later activations of the task itself that may be queued
        // behind activation n
        let queued_behind = own.wcet
            * (own.model.eta_min_sy(own.model.delta_plus(n))
                - own.model.eta_min_sy(own.model.delta_min(n)));
        let sync_load = l0 - own.wcet + arriving - queued_behind;
        assert!(
            sync_load >= 0,
            "negative synchronous load {} for activation {} of {} at {}",
            sync_load,
            n,
            task,
            reference
        );
        let sporadic = demand::Slice::of(&self.sporadic);
        let window = fixed_point::search(self.divergence_limit, |w| {
            sync_load + sporadic.service_needed(w + EPSILON)
        })?;
        Ok(window)
    }

    fn interferer(&self, task: TaskId) -> &Interferer<'a> {
        self.interferers
            .iter()
            .find(|i| i.task == task)
            .unwrap_or_else(|| panic!("{} is not part of this schedule", task))
    }
}
