use crate::task::TaskDescriptor;
use std::collections::HashSet;
use thiserror::Error;

/// Fatal input errors. Raised before any graph state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskInputError {
    #[error("task descriptor #{index} has no id")]
    MissingId { index: usize },
    #[error("duplicate task id '{id}'")]
    DuplicateId { id: String },
}

pub fn validate_descriptor(
    index: usize,
    descriptor: &TaskDescriptor,
) -> Result<(), TaskInputError> {
    if descriptor.id.trim().is_empty() {
        return Err(TaskInputError::MissingId { index });
    }
    Ok(())
}

pub fn validate_descriptors(descriptors: &[TaskDescriptor]) -> Result<(), TaskInputError> {
    let mut seen_ids = HashSet::with_capacity(descriptors.len());
    for (index, descriptor) in descriptors.iter().enumerate() {
        validate_descriptor(index, descriptor)?;
        if !seen_ids.insert(descriptor.id.as_str()) {
            return Err(TaskInputError::DuplicateId {
                id: descriptor.id.clone(),
            });
        }
    }
    Ok(())
}
