use crate::metadata::ScheduleMetadata;
use crate::result::CpmResult;
use crate::schedule::ScheduleEngine;
use crate::task::TaskDescriptor;
use crate::task_validation::{self, TaskInputError};
use serde::{Deserialize, Serialize};

/// Editable project state: metadata plus the task descriptors fed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    #[serde(default)]
    pub metadata: ScheduleMetadata,
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
}

impl ProjectPlan {
    pub fn new(metadata: ScheduleMetadata) -> Self {
        Self {
            metadata,
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(metadata: ScheduleMetadata, tasks: Vec<TaskDescriptor>) -> Self {
        Self { metadata, tasks }
    }

    pub fn validate(&self) -> Result<(), TaskInputError> {
        task_validation::validate_descriptors(&self.tasks)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&TaskDescriptor> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut TaskDescriptor> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    /// Inserts or replaces by id. Replacing keeps the task's position.
    pub fn upsert_task(&mut self, descriptor: TaskDescriptor) -> Result<(), TaskInputError> {
        task_validation::validate_descriptor(self.tasks.len(), &descriptor)?;
        match self.find_task_mut(&descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => self.tasks.push(descriptor),
        }
        Ok(())
    }

    /// Removes the task and every predecessor link pointing at it.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        if self.tasks.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            task.predecessors.retain(|link| link.predecessor_id != task_id);
        }
        true
    }

    pub fn engine(&self) -> Result<ScheduleEngine, TaskInputError> {
        ScheduleEngine::with_tasks(&self.tasks)
    }

    pub fn calculate(&self) -> Result<CpmResult, TaskInputError> {
        Ok(self.engine()?.calculate())
    }
}
