pub mod calculations;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
#[cfg(feature = "logging")]
pub mod logging;
pub mod metadata;
pub mod persistence;
pub mod project;
pub mod result;
pub mod schedule;
pub mod task;
pub mod task_validation;

pub use calculations::diagnostics::DependencyCoverage;
pub use graph::{CycleDetected, ScheduleDag};
pub use metadata::ScheduleMetadata;
pub use persistence::{
    PersistenceError, PersistenceResult, PlanStore, export_result_to_csv, load_plan_from_json,
    load_tasks_from_csv, save_plan_to_json, save_tasks_to_csv,
};
#[cfg(feature = "sqlite")]
pub use persistence::SqlitePlanStore;
pub use project::ProjectPlan;
pub use result::{CpmResult, ScheduleStats};
pub use schedule::{ScheduleEngine, calculate, calculate_batch};
pub use task::{PredecessorLink, RelationshipType, Task, TaskDescriptor};
pub use task_validation::TaskInputError;
