//! Field rules shared by the server and the client.
//!
//! Errors are collected rather than returned on the first failure, so a
//! caller sees every problem with a payload at once.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{joined, TaskInput, TaskPatch, TaskPriority, TaskStatus, DESCRIPTION_MAX_CHARS};

pub const DESCRIPTION_REQUIRED: &str = "Description is required and must be valid text";
pub const DESCRIPTION_TOO_LONG: &str = "Description cannot exceed 500 characters";

/// Which fields must be present for a payload to pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Create and full update: every field is checked, missing ones fail.
    All,
    /// Partial update: only the fields present are checked.
    Present,
}

/// A candidate task as it arrives over the wire, before any rule is applied.
///
/// Keys other than the three task fields are ignored. A `null` value counts as
/// absent, and a value that is not a string fails its check like an empty one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFields {
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub priority: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        _ => Some(String::new()),
    })
}

/// Every rule violation found in one payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join(". "))]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Checks `fields` and returns one message per failing field. An empty list
/// means the payload is valid.
pub fn validate(fields: &TaskFields, requirement: Requirement) -> Vec<String> {
    fields.check(requirement).errors
}

struct Checked {
    errors: Vec<String>,
    patch: TaskPatch,
}

impl TaskFields {
    /// Fills in the creation defaults for status and priority when absent.
    pub fn with_defaults(mut self) -> Self {
        if self.status.is_none() {
            self.status = Some(TaskStatus::default().as_str().to_owned());
        }
        if self.priority.is_none() {
            self.priority = Some(TaskPriority::default().as_str().to_owned());
        }
        self
    }

    pub fn into_input(self) -> Result<TaskInput, ValidationError> {
        match self.check(Requirement::All) {
            Checked {
                errors,
                patch:
                    TaskPatch {
                        description: Some(description),
                        status: Some(status),
                        priority: Some(priority),
                    },
            } if errors.is_empty() => Ok(TaskInput {
                description,
                status,
                priority,
            }),
            Checked { errors, .. } => Err(ValidationError(errors)),
        }
    }

    pub fn into_patch(self) -> Result<TaskPatch, ValidationError> {
        let Checked { errors, patch } = self.check(Requirement::Present);
        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(ValidationError(errors))
        }
    }

    fn check(&self, requirement: Requirement) -> Checked {
        let mut errors = Vec::new();

        let description = checked(&self.description, requirement).and_then(|value| match value {
            Some(text) if !text.is_empty() => {
                if text.chars().count() > DESCRIPTION_MAX_CHARS {
                    errors.push(DESCRIPTION_TOO_LONG.to_owned());
                    None
                } else {
                    Some(text.to_owned())
                }
            }
            _ => {
                errors.push(DESCRIPTION_REQUIRED.to_owned());
                None
            }
        });

        let status = checked(&self.status, requirement).and_then(|value| {
            parse_choice::<TaskStatus>(value).or_else(|| {
                errors.push(format!(
                    "Invalid status. Allowed values: {}",
                    joined(&TaskStatus::ALL, TaskStatus::as_str)
                ));
                None
            })
        });

        let priority = checked(&self.priority, requirement).and_then(|value| {
            parse_choice::<TaskPriority>(value).or_else(|| {
                errors.push(format!(
                    "Invalid priority. Allowed values: {}",
                    joined(&TaskPriority::ALL, TaskPriority::as_str)
                ));
                None
            })
        });

        Checked {
            errors,
            patch: TaskPatch {
                description,
                status,
                priority,
            },
        }
    }
}

/// `None` when the field is skipped, `Some(None)` when it is required but
/// missing.
fn checked(value: &Option<String>, requirement: Requirement) -> Option<Option<&str>> {
    match (value, requirement) {
        (Some(value), _) => Some(Some(value.as_str())),
        (None, Requirement::All) => Some(None),
        (None, Requirement::Present) => None,
    }
}

fn parse_choice<T: FromStr>(value: Option<&str>) -> Option<T> {
    value.filter(|v| !v.is_empty()).and_then(|v| v.parse().ok())
}

impl From<&TaskInput> for TaskFields {
    fn from(input: &TaskInput) -> Self {
        Self {
            description: Some(input.description.clone()),
            status: Some(input.status.as_str().to_owned()),
            priority: Some(input.priority.as_str().to_owned()),
        }
    }
}

impl From<&TaskPatch> for TaskFields {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            description: patch.description.clone(),
            status: patch.status.map(|s| s.as_str().to_owned()),
            priority: patch.priority.map(|p| p.as_str().to_owned()),
        }
    }
}
