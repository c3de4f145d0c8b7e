use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Identifier assigned by the task service. Immutable and unique per user.
pub type TaskId = i64;

/// A task as returned by `GET /tareas`.
///
/// The client only ever holds a transient copy; every list refresh replaces
/// the whole collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "completada")]
    pub completed: bool,
}

/// Payload for `POST /tareas`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Must not be empty; checked before the request is sent.
    #[serde(rename = "contenido")]
    #[validate(length(min = 1, message = "Task content cannot be empty."))]
    pub content: String,
}

impl NewTask {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Partial update for `PUT /tareas/{id}`. Absent fields are left untouched
/// by the service and are not serialized.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default, PartialEq, Eq)]
#[validate(schema(function = "validate_patch_not_empty"))]
pub struct TaskPatch {
    #[serde(rename = "contenido", skip_serializing_if = "Option::is_none", default)]
    #[validate(length(min = 1, message = "Task content cannot be empty."))]
    pub content: Option<String>,
    #[serde(rename = "completada", skip_serializing_if = "Option::is_none", default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    pub fn content(value: impl Into<String>) -> Self {
        Self {
            content: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.completed.is_none()
    }
}

fn validate_patch_not_empty(patch: &TaskPatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        let mut error = ValidationError::new("empty_patch");
        error.message = Some(Cow::Borrowed("Nothing to update."));
        return Err(error);
    }
    Ok(())
}
