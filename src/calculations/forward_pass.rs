use super::DateWindow;
use crate::graph::{ResolvedLink, ScheduleDag};
use crate::task::{RelationshipType, span_days};

/// Day on which a task with no predecessors starts.
pub const PROJECT_START_DAY: i64 = 1;

pub struct ForwardPass<'a> {
    dag: &'a ScheduleDag,
}

impl<'a> ForwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag) -> Self {
        Self { dag }
    }

    /// Early dates, visiting tasks in topological `order`.
    pub fn execute(&self, order: &[usize]) -> DateWindow {
        let mut early = DateWindow::zeroed(self.dag.len());

        for &idx in order {
            let duration = i64::from(self.dag.durations[idx]);
            let early_start = self.dag.links[idx]
                .iter()
                .map(|link| Self::start_constraint(link, duration, &early))
                .max()
                .unwrap_or(PROJECT_START_DAY)
                .max(PROJECT_START_DAY);

            early.start[idx] = early_start;
            early.finish[idx] = early_start.saturating_add(span_days(self.dag.durations[idx]));
        }

        early
    }

    /// Earliest start a single link allows, given the predecessor's early dates.
    fn start_constraint(link: &ResolvedLink, duration: i64, early: &DateWindow) -> i64 {
        let pred_start = early.start[link.predecessor];
        let pred_finish = early.finish[link.predecessor];
        let lag = link.lag_days;
        // Links built in code skip the deserializer's lag limit.
        match link.relationship {
            RelationshipType::FS => pred_finish.saturating_add(lag).saturating_add(1),
            RelationshipType::SS => pred_start.saturating_add(lag),
            RelationshipType::FF => pred_finish.saturating_add(lag).saturating_sub(duration - 1),
            RelationshipType::SF => pred_start.saturating_add(lag).saturating_sub(duration - 1),
        }
    }
}
