pub mod validate;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use validate::{validate, Requirement, TaskFields, ValidationError};

pub type TaskId = i64;

/// Longest description accepted, counted in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Lifecycle stage of a task. Each status is one board column.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Some day")]
    SomeDay,
    #[serde(rename = "To do")]
    ToDo,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::SomeDay,
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::SomeDay => "Some day",
            TaskStatus::ToDo => "To do",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`, expected one of: {allowed}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    allowed: String,
}

/// Wire names of `variants`, comma separated.
pub(crate) fn joined<T: Copy>(variants: &[T], as_str: fn(T) -> &'static str) -> String {
    variants.iter().map(|v| as_str(*v)).collect::<Vec<_>>().join(", ")
}

fn parse_variant<T: Copy>(
    kind: &'static str,
    value: &str,
    variants: &[T],
    as_str: fn(T) -> &'static str,
) -> Result<T, ParseEnumError> {
    variants
        .iter()
        .copied()
        .find(|variant| as_str(*variant) == value)
        .ok_or_else(|| ParseEnumError {
            kind,
            value: value.to_owned(),
            allowed: joined(variants, as_str),
        })
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("status", s, &TaskStatus::ALL, TaskStatus::as_str)
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("priority", s, &TaskPriority::ALL, TaskPriority::as_str)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
}

/// Body of a create or a full update: every mutable field is replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Body of a partial update. Only the fields that are set are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none() && self.priority.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub id: TaskId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}
