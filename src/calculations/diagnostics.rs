use crate::graph::ScheduleDag;
use crate::result::ScheduleStats;
use crate::task::Task;
use serde::{Deserialize, Serialize};

use super::forward_pass::PROJECT_START_DAY;

/// Ids of critical tasks, in load order.
pub fn critical_path(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .filter(|task| task.is_critical)
        .map(|task| task.id.clone())
        .collect()
}

/// Tasks that look disconnected from the project's start or finish.
pub fn dangling_tasks(tasks: &[Task], dag: &ScheduleDag, project_duration: i64) -> Vec<String> {
    tasks
        .iter()
        .enumerate()
        .filter(|(idx, task)| {
            let open_finish = !dag.has_successors(*idx) && task.early_finish != project_duration;
            let open_start = !dag.has_predecessors(*idx) && task.early_start != PROJECT_START_DAY;
            open_finish || open_start
        })
        .map(|(_, task)| task.id.clone())
        .collect()
}

pub fn schedule_stats(tasks: &[Task], dag: &ScheduleDag, project_duration: i64) -> ScheduleStats {
    let average_float = if tasks.is_empty() {
        0.0
    } else {
        tasks.iter().map(|task| task.total_float as f64).sum::<f64>() / tasks.len() as f64
    };

    ScheduleStats {
        total_tasks: tasks.len(),
        critical_tasks_count: tasks.iter().filter(|task| task.is_critical).count(),
        average_float,
        dangling_tasks: dangling_tasks(tasks, dag, project_duration),
    }
}

/// How much of the task set is tied into dependency logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCoverage {
    pub total_tasks: usize,
    pub total_predecessor_links: usize,
    pub resolved_links: usize,
    pub unresolved_links: usize,
    pub tasks_with_predecessors: usize,
    pub tasks_with_successors: usize,
    pub linked_tasks: usize,
    pub isolated_tasks: usize,
    pub coverage_percent: f64,
}

pub fn dependency_coverage(dag: &ScheduleDag) -> DependencyCoverage {
    let total_tasks = dag.len();
    let tasks_with_predecessors = (0..total_tasks).filter(|&idx| dag.has_predecessors(idx)).count();
    let tasks_with_successors = (0..total_tasks).filter(|&idx| dag.has_successors(idx)).count();
    let linked_tasks = (0..total_tasks)
        .filter(|&idx| dag.has_predecessors(idx) || dag.has_successors(idx))
        .count();

    let coverage_percent = if total_tasks == 0 {
        0.0
    } else {
        (linked_tasks as f64 / total_tasks as f64 * 10_000.0).round() / 100.0
    };

    DependencyCoverage {
        total_tasks,
        total_predecessor_links: dag.declared_links,
        resolved_links: dag.declared_links - dag.dropped_links,
        unresolved_links: dag.dropped_links,
        tasks_with_predecessors,
        tasks_with_successors,
        linked_tasks,
        isolated_tasks: total_tasks - linked_tasks,
        coverage_percent,
    }
}
