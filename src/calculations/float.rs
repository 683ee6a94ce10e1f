use super::DateWindow;
use crate::graph::ScheduleDag;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloatAnalysis {
    pub total_float: Vec<i64>,
    pub free_float: Vec<i64>,
    pub is_critical: Vec<bool>,
}

pub struct FloatPass<'a> {
    dag: &'a ScheduleDag,
    early: &'a DateWindow,
    late: &'a DateWindow,
}

impl<'a> FloatPass<'a> {
    pub fn new(dag: &'a ScheduleDag, early: &'a DateWindow, late: &'a DateWindow) -> Self {
        Self { dag, early, late }
    }

    pub fn execute(&self) -> FloatAnalysis {
        let task_count = self.dag.len();
        let mut analysis = FloatAnalysis {
            total_float: Vec::with_capacity(task_count),
            free_float: Vec::with_capacity(task_count),
            is_critical: Vec::with_capacity(task_count),
        };

        for idx in 0..task_count {
            let total_float = self.late.start[idx].saturating_sub(self.early.start[idx]);
            analysis.total_float.push(total_float);
            analysis.free_float.push(self.free_float(idx, total_float));
            analysis.is_critical.push(total_float <= 0);
        }

        analysis
    }

    /// Slack before the earliest successor start, read as if every successor
    /// link were finish-to-start. SS/FF/SF successors are not modelled here;
    /// downstream consumers rely on this exact value.
    fn free_float(&self, idx: usize, total_float: i64) -> i64 {
        match self
            .dag
            .successors(idx)
            .map(|succ| self.early.start[succ])
            .min()
        {
            Some(next_start) => next_start.saturating_sub(self.early.finish[idx]).saturating_sub(1).max(0),
            None => total_float,
        }
    }
}
