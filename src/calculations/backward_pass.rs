use super::DateWindow;
use crate::graph::{ResolvedLink, ScheduleDag};
use crate::task::{RelationshipType, span_days};

pub struct BackwardPass<'a> {
    dag: &'a ScheduleDag,
    early: &'a DateWindow,
}

impl<'a> BackwardPass<'a> {
    pub fn new(dag: &'a ScheduleDag, early: &'a DateWindow) -> Self {
        Self { dag, early }
    }

    /// Latest early finish across all tasks; 0 for an empty schedule.
    pub fn project_finish(&self) -> i64 {
        self.early.finish.iter().copied().max().unwrap_or(0)
    }

    /// Late dates, visiting tasks in reverse topological `order`.
    pub fn execute(&self, order: &[usize]) -> DateWindow {
        let project_finish = self.project_finish();
        let mut late = DateWindow::zeroed(self.dag.len());

        for &idx in order.iter().rev() {
            let own_duration = i64::from(self.dag.durations[idx]);

            // Determine allowed late finish from every link a successor declares on this task
            let late_finish = self
                .dag
                .successors(idx)
                .flat_map(|succ| {
                    self.dag.links[succ]
                        .iter()
                        .filter(move |link| link.predecessor == idx)
                        .map(move |link| (succ, link))
                })
                .map(|(succ, link)| Self::finish_constraint(succ, link, own_duration, &late))
                .min()
                .unwrap_or(project_finish);

            late.finish[idx] = late_finish;
            late.start[idx] = late_finish.saturating_sub(span_days(self.dag.durations[idx]));
        }

        late
    }

    /// Latest finish a successor's link allows, given the successor's late dates.
    fn finish_constraint(
        succ: usize,
        link: &ResolvedLink,
        own_duration: i64,
        late: &DateWindow,
    ) -> i64 {
        let succ_start = late.start[succ];
        let succ_finish = late.finish[succ];
        let lag = link.lag_days;
        match link.relationship {
            RelationshipType::FS => succ_start.saturating_sub(lag).saturating_sub(1),
            RelationshipType::SS => succ_start.saturating_sub(lag).saturating_add(own_duration - 1),
            RelationshipType::FF => succ_finish.saturating_sub(lag),
            RelationshipType::SF => succ_finish.saturating_sub(lag).saturating_add(own_duration - 1),
        }
    }
}
