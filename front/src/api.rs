use std::fmt::Display;

use kanban_api::v1::{
    Deleted, Task, TaskFields, TaskId, TaskInput, TaskPatch, TaskPriority, TaskStatus,
    ValidationError,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("HTTP error {status}: {}", display_body(.body))]
    Status { status: StatusCode, body: String },
    #[error("server response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

fn display_body(body: &str) -> &str {
    match body.is_empty() {
        true => "invalid response",
        false => body,
    }
}

/// HTTP client for the `/tasks` resource.
///
/// Writes are checked with the shared validator before any request is made.
/// Every failure is logged here and then handed back to the caller.
#[derive(Clone, Debug)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.http.get(self.tasks_url()).send().await;
        logged(decode(response).await, "get tasks")
    }

    /// Creates a task; status and priority fall back to their defaults.
    pub async fn create_task(
        &self,
        description: impl Into<String>,
        status: Option<TaskStatus>,
        priority: Option<TaskPriority>,
    ) -> Result<Task, ClientError> {
        let input = TaskInput {
            description: description.into(),
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
        };
        let input = logged(checked(TaskFields::from(&input).into_input()), "create task")?;

        let response = self.http.post(self.tasks_url()).json(&input).send().await;
        logged(decode(response).await, "create task")
    }

    pub async fn update_task(&self, id: TaskId, input: &TaskInput) -> Result<Task, ClientError> {
        let action = format!("update task {id}");
        let input = logged(checked(TaskFields::from(input).into_input()), &action)?;

        let response = (self.http.put(self.tasks_url()))
            .query(&[("id", id)])
            .json(&input)
            .send()
            .await;
        logged(decode(response).await, &action)
    }

    pub async fn patch_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        let action = format!("patch task {id}");
        let patch = logged(checked(TaskFields::from(patch).into_patch()), &action)?;

        let response = (self.http.patch(self.tasks_url()))
            .query(&[("id", id)])
            .json(&patch)
            .send()
            .await;
        logged(decode(response).await, &action)
    }

    pub async fn delete_task(&self, id: TaskId) -> Result<Deleted, ClientError> {
        let response = (self.http.delete(self.tasks_url()))
            .query(&[("id", id)])
            .send()
            .await;
        logged(decode(response).await, format_args!("delete task {id}"))
    }
}

fn checked<T>(result: Result<T, ValidationError>) -> Result<T, ClientError> {
    result.map_err(ClientError::from)
}

fn logged<T>(result: Result<T, ClientError>, action: impl Display) -> Result<T, ClientError> {
    if let Err(err) = &result {
        error!(%err, "failed to {action}");
    }

    result
}

async fn decode<T: DeserializeOwned>(
    response: Result<Response, reqwest::Error>,
) -> Result<T, ClientError> {
    let response = response?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ClientError::Status { status, body });
    }

    serde_json::from_str(&body).map_err(ClientError::InvalidJson)
}
