/*! Analysis order

Tasks are analyzed port by port, following the direction in which
streams flow through the network, so that most input models are
final by the time a task is first analyzed. The port dependency
graph has an edge from port `a` to port `b` if some task on `b` is
the successor of a task on `a`.
*/

use std::collections::BTreeSet;

use crate::model::{ResourceId, System, TaskId, TrafficClass};

/// Adjacency sets of the port dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    successors: Vec<BTreeSet<ResourceId>>,
    predecessors: Vec<BTreeSet<ResourceId>>,
}

impl DependencyGraph {
    pub fn of(system: &System) -> Self {
        let n = system.resource_count();
        let mut graph = DependencyGraph {
            successors: vec![BTreeSet::new(); n],
            predecessors: vec![BTreeSet::new(); n],
        };
        for (_, task) in system.tasks() {
            if let Some(pred) = task.predecessor {
                let from = system.task(pred).resource;
                let to = task.resource;
                if from != to {
                    graph.successors[from.index()].insert(to);
                    graph.predecessors[to.index()].insert(from);
                }
            }
        }
        graph
    }

    pub fn successors(&self, resource: ResourceId) -> &BTreeSet<ResourceId> {
        &self.successors[resource.index()]
    }

    pub fn predecessors(&self, resource: ResourceId) -> &BTreeSet<ResourceId> {
        &self.predecessors[resource.index()]
    }

    /// Sources first. Then, repeatedly, the unordered port with
    /// successors that has the fewest unordered predecessors (the
    /// first one on ties), or else the first unordered sink.
    pub fn resource_order(&self) -> Vec<ResourceId> {
        let n = self.successors.len();
        let mut placed = vec![false; n];
        let mut order = Vec::with_capacity(n);
        for r in 0..n {
            if self.predecessors[r].is_empty() {
                placed[r] = true;
                order.push(ResourceId::from(r));
            }
        }
        while order.len() < n {
            let pending = |r: usize| {
                self.predecessors[r]
                    .iter()
                    .filter(|p| !placed[p.index()])
                    .count()
            };
            let next = (0..n)
                .filter(|r| !placed[*r] && !self.successors[*r].is_empty())
                .min_by_key(|r| pending(*r))
                .or_else(|| (0..n).find(|r| !placed[*r]));
            match next {
                Some(r) => {
                    placed[r] = true;
                    order.push(ResourceId::from(r));
                }
                None => break,
            }
        }
        order
    }
}

/// All control tasks, then all best-effort tasks; within each class,
/// port by port in [DependencyGraph::resource_order], and by priority
/// within a port.
pub fn analysis_order(system: &System) -> Vec<TaskId> {
    let resources = DependencyGraph::of(system).resource_order();
    let mut order = Vec::with_capacity(system.task_count());
    for class in [TrafficClass::Control, TrafficClass::BestEffort] {
        for r in &resources {
            let mut tasks: Vec<TaskId> = system
                .resource(*r)
                .tasks()
                .iter()
                .copied()
                .filter(|t| system.task(*t).class == class)
                .collect();
            tasks.sort_by_key(|t| system.task(*t).priority);
            order.extend(tasks);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrival::Periodic;
    use crate::event_model::EventModel;
    use crate::model::{Policy, TaskSpec};
    use crate::tests::d;

    fn stream() -> EventModel {
        EventModel::sporadic(Periodic { period: d(100_000) })
    }

    #[test]
    fn ports_follow_the_streams() {
        // r2 feeds r1, which feeds r0
        let mut sys = System::new(d(100_000));
        let r0 = sys.add_resource("r0", Policy::NonPreemptive);
        let r1 = sys.add_resource("r1", Policy::NonPreemptive);
        let r2 = sys.add_resource("r2", Policy::NonPreemptive);
        let a = sys.add_task(r2, TaskSpec::new("a.0", d(10)), stream()).unwrap();
        let b = sys.add_successor(a, r1, TaskSpec::new("a.1", d(10))).unwrap();
        sys.add_successor(b, r0, TaskSpec::new("a.2", d(10))).unwrap();

        let graph = DependencyGraph::of(&sys);
        assert!(graph.successors(r2).contains(&r1));
        assert!(graph.predecessors(r0).contains(&r1));
        assert_eq!(graph.resource_order(), vec![r2, r1, r0]);
    }

    #[test]
    fn fewest_pending_predecessors_first() {
        // r0 -> r1 -> r3 and r0 -> r2 -> r3, r4 -> r2
        let mut sys = System::new(d(100_000));
        let r: Vec<_> = (0..5)
            .map(|i| sys.add_resource(format!("r{}", i), Policy::Preemptive))
            .collect();
        let a0 = sys.add_task(r[0], TaskSpec::new("a0", d(10)), stream()).unwrap();
        let a1 = sys.add_successor(a0, r[1], TaskSpec::new("a1", d(10))).unwrap();
        sys.add_successor(a1, r[3], TaskSpec::new("a3", d(10))).unwrap();
        let b0 = sys.add_task(r[0], TaskSpec::new("b0", d(10)), stream()).unwrap();
        let b2 = sys.add_successor(b0, r[2], TaskSpec::new("b2", d(10))).unwrap();
        sys.add_successor(b2, r[3], TaskSpec::new("b3", d(10))).unwrap();
        let c4 = sys.add_task(r[4], TaskSpec::new("c4", d(10)), stream()).unwrap();
        sys.add_successor(c4, r[2], TaskSpec::new("c2", d(10))).unwrap();

        assert_eq!(
            DependencyGraph::of(&sys).resource_order(),
            vec![r[0], r[4], r[1], r[2], r[3]]
        );
    }

    #[test]
    fn control_tasks_come_first() {
        let mut sys = System::new(d(100_000));
        let r0 = sys.add_resource("r0", Policy::NonPreemptive);
        let r1 = sys.add_resource("r1", Policy::NonPreemptive);
        let be = sys
            .add_task(r0, TaskSpec::new("be", d(10)).with_priority(1), stream())
            .unwrap();
        let lo = sys
            .add_task(
                r0,
                TaskSpec::new("lo", d(10))
                    .with_priority(3)
                    .with_class(TrafficClass::Control),
                stream(),
            )
            .unwrap();
        let hi = sys
            .add_task(
                r0,
                TaskSpec::new("hi", d(10))
                    .with_priority(2)
                    .with_class(TrafficClass::Control),
                stream(),
            )
            .unwrap();
        let next = sys
            .add_successor(
                hi,
                r1,
                TaskSpec::new("hi.1", d(10)).with_class(TrafficClass::Control),
            )
            .unwrap();
        assert_eq!(analysis_order(&sys), vec![hi, lo, next, be]);
    }
}
