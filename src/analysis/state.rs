use std::collections::BTreeSet;

use crate::model::{System, TaskId};

/// Bookkeeping of the global fixed-point loop: which tasks await
/// (re-)analysis and whom a changed result affects.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    dirty: BTreeSet<TaskId>,
    successors: Vec<Vec<TaskId>>,
    affected: Vec<BTreeSet<TaskId>>,
}

impl AnalysisState {
    /// Initially, every task is dirty.
    pub fn new(system: &System) -> Self {
        let successors: Vec<Vec<TaskId>> = system
            .tasks()
            .map(|(id, _)| system.successors(id).collect())
            .collect();
        // A successor's new input model also changes the interference
        // seen by every task sharing its port.
        let affected: Vec<BTreeSet<TaskId>> = successors
            .iter()
            .map(|succs| {
                succs
                    .iter()
                    .flat_map(move |s| {
                        let port = system.task(*s).resource;
                        system.resource(port).tasks().iter().copied()
                    })
                    .collect()
            })
            .collect();
        AnalysisState {
            dirty: system.tasks().map(|(id, _)| id).collect(),
            successors,
            affected,
        }
    }

    pub fn is_dirty(&self, task: TaskId) -> bool {
        self.dirty.contains(&task)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn mark_clean(&mut self, task: TaskId) {
        self.dirty.remove(&task);
    }

    /// The tasks whose input models are propagated from `task`.
    pub fn successors(&self, task: TaskId) -> &[TaskId] {
        &self.successors[task.index()]
    }

    /// Mark everything affected by a changed result of `task` dirty.
    pub fn mark_affected_dirty(&mut self, task: TaskId) {
        self.dirty.extend(self.affected[task.index()].iter().copied());
    }
}
