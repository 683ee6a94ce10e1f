pub mod schedule_dag;

pub use schedule_dag::{CycleDetected, ResolvedLink, ScheduleDag};
