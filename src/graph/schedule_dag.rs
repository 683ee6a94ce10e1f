use crate::task::{RelationshipType, Task};
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// A declared link whose predecessor id resolved to a task in the current load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLink {
    pub predecessor: usize,
    pub relationship: RelationshipType,
    pub lag_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle detected among tasks: {}", task_ids.join(", "))]
pub struct CycleDetected {
    /// Ids of tasks that sit on at least one cycle, in load order.
    pub task_ids: Vec<String>,
}

/// Dependency graph over dense task indices.
///
/// Node `i` is the task at position `i` of the load, so every per-task array
/// in the calculation passes is indexed the same way as the graph.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDag {
    pub graph: DiGraph<usize, ()>,
    pub id_to_index: HashMap<String, usize>,
    pub ids: Vec<String>,
    pub durations: Vec<u32>,
    /// Per successor: every declared link that resolved, duplicates included.
    pub links: Vec<Vec<ResolvedLink>>,
    pub declared_links: usize,
    pub dropped_links: usize,
}

impl ScheduleDag {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<String, usize> = HashMap::with_capacity(tasks.len());

        // Add nodes first so every predecessor id can be resolved
        for (idx, task) in tasks.iter().enumerate() {
            graph.add_node(idx);
            id_to_index.insert(task.id.clone(), idx);
        }

        let mut links: Vec<Vec<ResolvedLink>> = Vec::with_capacity(tasks.len());
        let mut declared_links = 0;
        let mut dropped_links = 0;

        // Add edges: pred -> task
        for (idx, task) in tasks.iter().enumerate() {
            let mut resolved = Vec::with_capacity(task.predecessors.len());
            for link in &task.predecessors {
                declared_links += 1;
                let Some(&pred_idx) = id_to_index.get(&link.predecessor_id) else {
                    dropped_links += 1;
                    tracing::trace!(
                        task = %task.id,
                        predecessor = %link.predecessor_id,
                        "dropping link to unknown predecessor"
                    );
                    continue;
                };
                // update_edge keeps a single edge per (pred, succ) pair
                graph.update_edge(NodeIndex::new(pred_idx), NodeIndex::new(idx), ());
                resolved.push(ResolvedLink {
                    predecessor: pred_idx,
                    relationship: link.relationship,
                    lag_days: link.lag_days,
                });
            }
            links.push(resolved);
        }

        Self {
            graph,
            id_to_index,
            ids: tasks.iter().map(|task| task.id.clone()).collect(),
            durations: tasks.iter().map(|task| task.duration_days).collect(),
            links,
            declared_links,
            dropped_links,
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn index_of(&self, task_id: &str) -> Option<usize> {
        self.id_to_index.get(task_id).copied()
    }

    /// Distinct successors of the task at `idx`.
    pub fn successors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors_directed(NodeIndex::new(idx), Direction::Outgoing)
            .map(|node| node.index())
    }

    /// Distinct resolved predecessors of the task at `idx`.
    pub fn predecessors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors_directed(NodeIndex::new(idx), Direction::Incoming)
            .map(|node| node.index())
    }

    pub fn has_successors(&self, idx: usize) -> bool {
        self.successors(idx).next().is_some()
    }

    pub fn has_predecessors(&self, idx: usize) -> bool {
        self.predecessors(idx).next().is_some()
    }

    /// Kahn's algorithm. In-degree is the number of distinct resolved
    /// predecessors, matching the single edge kept per pair.
    pub fn topological_order(&self) -> Result<Vec<usize>, CycleDetected> {
        let task_count = self.len();
        let mut in_degree: Vec<usize> = (0..task_count)
            .map(|idx| self.predecessors(idx).count())
            .collect();

        let mut queue: VecDeque<usize> = (0..task_count)
            .filter(|&idx| in_degree[idx] == 0)
            .collect();

        let mut sorted = Vec::with_capacity(task_count);
        while let Some(idx) = queue.pop_front() {
            sorted.push(idx);
            for succ in self.successors(idx) {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(succ);
                }
            }
        }

        if sorted.len() < task_count {
            return Err(CycleDetected {
                task_ids: self.cyclic_task_ids(),
            });
        }
        Ok(sorted)
    }

    /// Tasks on a cycle: members of a strongly connected component with more
    /// than one node, plus self-dependent tasks.
    fn cyclic_task_ids(&self) -> Vec<String> {
        let mut on_cycle = vec![false; self.len()];
        for component in tarjan_scc(&self.graph) {
            let self_loop = component.len() == 1
                && self.graph.contains_edge(component[0], component[0]);
            if component.len() > 1 || self_loop {
                for node in component {
                    on_cycle[node.index()] = true;
                }
            }
        }
        on_cycle
            .iter()
            .enumerate()
            .filter(|(_, cyclic)| **cyclic)
            .map(|(idx, _)| self.ids[idx].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{PredecessorLink, TaskDescriptor};

    fn tasks(descriptors: Vec<TaskDescriptor>) -> Vec<Task> {
        descriptors.iter().map(Task::from_descriptor).collect()
    }

    #[test]
    fn duplicate_links_share_one_edge_but_keep_both_constraints() {
        let dag = ScheduleDag::build(&tasks(vec![
            TaskDescriptor::new("A"),
            TaskDescriptor::new("B")
                .after("A")
                .with_predecessor(PredecessorLink::new("A", RelationshipType::SS, 1)),
        ]));
        assert_eq!(dag.edge_count(), 1);
        assert_eq!(dag.links[1].len(), 2);
        assert_eq!(dag.topological_order(), Ok(vec![0, 1]));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let dag = ScheduleDag::build(&tasks(vec![
            TaskDescriptor::new("A"),
            TaskDescriptor::new("B").after("B"),
        ]));
        let err = dag.topological_order().unwrap_err();
        assert_eq!(err.task_ids, vec!["B".to_string()]);
    }

    #[test]
    fn cycle_report_excludes_downstream_tasks() {
        let dag = ScheduleDag::build(&tasks(vec![
            TaskDescriptor::new("A").after("B"),
            TaskDescriptor::new("B").after("A"),
            TaskDescriptor::new("C").after("B"),
        ]));
        let err = dag.topological_order().unwrap_err();
        assert_eq!(err.task_ids, vec!["A".to_string(), "B".to_string()]);
        assert!(err.to_string().contains("A, B"));
    }
}
