use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::diagnostics::{self, DependencyCoverage};
use crate::calculations::float::FloatPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::graph::{CycleDetected, ScheduleDag};
use crate::result::CpmResult;
use crate::task::{Task, TaskDescriptor};
use crate::task_validation::{self, TaskInputError};
use rayon::prelude::*;

/// Holds one loaded task set and its dependency graph.
///
/// `load_tasks` rebuilds everything from scratch; `calculate` never mutates
/// the engine, so repeated calls after one load return the same result.
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    tasks: Vec<Task>,
    dag: ScheduleDag,
}

impl ScheduleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine already loaded with `descriptors`.
    pub fn with_tasks(descriptors: &[TaskDescriptor]) -> Result<Self, TaskInputError> {
        let mut engine = Self::new();
        engine.load_tasks(descriptors)?;
        Ok(engine)
    }

    /// Replaces all internal state. On error the previous state is kept.
    pub fn load_tasks(&mut self, descriptors: &[TaskDescriptor]) -> Result<(), TaskInputError> {
        task_validation::validate_descriptors(descriptors)?;

        let tasks: Vec<Task> = descriptors.iter().map(Task::from_descriptor).collect();
        let dag = ScheduleDag::build(&tasks);
        tracing::debug!(
            tasks = tasks.len(),
            edges = dag.edge_count(),
            dropped_links = dag.dropped_links,
            "loaded task set"
        );

        self.tasks = tasks;
        self.dag = dag;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn dag(&self) -> &ScheduleDag {
        &self.dag
    }

    pub fn coverage(&self) -> DependencyCoverage {
        diagnostics::dependency_coverage(&self.dag)
    }

    /// Runs the four passes, keeping a cycle as a distinct outcome.
    pub fn try_calculate(&self) -> Result<CpmResult, CycleDetected> {
        let order = self.dag.topological_order()?;

        let early = ForwardPass::new(&self.dag).execute(&order);
        let backward = BackwardPass::new(&self.dag, &early);
        let project_duration = backward.project_finish();
        let late = backward.execute(&order);
        let floats = FloatPass::new(&self.dag, &early, &late).execute();

        let tasks: Vec<Task> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| Task {
                early_start: early.start[idx],
                early_finish: early.finish[idx],
                late_start: late.start[idx],
                late_finish: late.finish[idx],
                total_float: floats.total_float[idx],
                free_float: floats.free_float[idx],
                is_critical: floats.is_critical[idx],
                ..task.clone()
            })
            .collect();

        let stats = diagnostics::schedule_stats(&tasks, &self.dag, project_duration);
        let critical_path = diagnostics::critical_path(&tasks);
        tracing::debug!(
            project_duration,
            critical_tasks = stats.critical_tasks_count,
            "calculated schedule"
        );

        Ok(CpmResult {
            tasks,
            critical_path,
            project_duration,
            stats,
        })
    }

    /// Same as [`Self::try_calculate`], except a cyclic task set yields
    /// [`CpmResult::empty`].
    pub fn calculate(&self) -> CpmResult {
        match self.try_calculate() {
            Ok(result) => result,
            Err(cycle) => {
                tracing::warn!(tasks = ?cycle.task_ids, "{cycle}; returning empty schedule");
                CpmResult::empty()
            }
        }
    }
}

/// One-shot load and calculate on a fresh engine.
pub fn calculate(descriptors: &[TaskDescriptor]) -> Result<CpmResult, TaskInputError> {
    Ok(ScheduleEngine::with_tasks(descriptors)?.calculate())
}

/// Calculates independent task sets in parallel, one engine per set.
pub fn calculate_batch(
    task_sets: &[Vec<TaskDescriptor>],
) -> Vec<Result<CpmResult, TaskInputError>> {
    task_sets
        .par_iter()
        .map(|descriptors| calculate(descriptors))
        .collect()
}
