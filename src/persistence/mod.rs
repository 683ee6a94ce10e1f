use crate::project::ProjectPlan;
use crate::task_validation::TaskInputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid task set: {0}")]
    InvalidTasks(#[from] TaskInputError),
    #[error("store lock poisoned")]
    Poisoned,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlanStore {
    fn save_plan(&self, plan: &ProjectPlan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<ProjectPlan>>;
}

pub fn validate_plan(plan: &ProjectPlan) -> PersistenceResult<()> {
    plan.validate().map_err(PersistenceError::from)
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_result_to_csv, format_predecessor_list, load_plan_from_json, load_tasks_from_csv,
    parse_predecessor_list, save_plan_to_json, save_tasks_to_csv, write_result_csv,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqlitePlanStore;
