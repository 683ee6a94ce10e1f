use crate::task::Task;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    pub total_tasks: usize,
    pub critical_tasks_count: usize,
    pub average_float: f64,
    /// Tasks whose missing predecessors or successors look like open logic ends.
    pub dangling_tasks: Vec<String>,
}

/// Output of a calculation run.
///
/// A cyclic task set produces the same empty shape as an empty task set;
/// use [`crate::ScheduleEngine::try_calculate`] to tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpmResult {
    pub tasks: Vec<Task>,
    pub critical_path: Vec<String>,
    pub project_duration: i64,
    pub stats: ScheduleStats,
}

impl CpmResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn critical_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.is_critical)
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.stats.total_tasks));
        parts.push(format!("critical={}", self.stats.critical_tasks_count));
        parts.push(format!("duration={}", self.project_duration));
        parts.push(format!("avg_float={:.2}", self.stats.average_float));
        if !self.stats.dangling_tasks.is_empty() {
            parts.push(format!("dangling={}", self.stats.dangling_tasks.len()));
        }
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let ids: Vec<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let names: Vec<&str> = self.tasks.iter().map(|t| t.name.as_str()).collect();
        let wbs: Vec<&str> = self.tasks.iter().map(|t| t.wbs_code.as_str()).collect();
        let durations: Vec<u32> = self.tasks.iter().map(|t| t.duration_days).collect();

        let columns: Vec<Column> = vec![
            Series::new(PlSmallStr::from_static("id"), ids).into_column(),
            Series::new(PlSmallStr::from_static("name"), names).into_column(),
            Series::new(PlSmallStr::from_static("wbs_code"), wbs).into_column(),
            Series::new(PlSmallStr::from_static("duration_days"), durations).into_column(),
            self.i64_column("early_start", |t| t.early_start),
            self.i64_column("early_finish", |t| t.early_finish),
            self.i64_column("late_start", |t| t.late_start),
            self.i64_column("late_finish", |t| t.late_finish),
            self.i64_column("total_float", |t| t.total_float),
            self.i64_column("free_float", |t| t.free_float),
            Series::new(
                PlSmallStr::from_static("is_critical"),
                self.tasks.iter().map(|t| t.is_critical).collect::<Vec<bool>>(),
            )
            .into_column(),
        ];

        DataFrame::new(columns)
    }

    fn i64_column(&self, name: &'static str, value: impl Fn(&Task) -> i64) -> Column {
        let values: Vec<i64> = self.tasks.iter().map(value).collect();
        Series::new(PlSmallStr::from_static(name), values).into_column()
    }
}
