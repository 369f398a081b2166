use std::str::FromStr;

use chrono::{DateTime, Utc};
use kanban_api::v1::{Deleted, Task, TaskId, TaskInput, TaskPatch};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT    NOT NULL
                CHECK (description <> '' AND length(CAST(description AS BLOB)) <= 2000),
    status      TEXT    NOT NULL DEFAULT 'Some day'
                CHECK (status IN ('Some day', 'To do', 'In progress', 'Done')),
    priority    TEXT    NOT NULL DEFAULT 'medium'
                CHECK (priority IN ('low', 'medium', 'high')),
    created_at  TEXT    NOT NULL
)
"#;

const COLUMNS: &str = "id, description, status, priority, created_at";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("no fields to update")]
    NoFields,
    #[error("task {id} holds an invalid {column}: {value}")]
    Corrupt {
        id: TaskId,
        column: &'static str,
        value: String,
    },
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    description: String,
    status: String,
    priority: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let corrupt = |column, value: &str| StoreError::Corrupt {
            id: row.id,
            column,
            value: value.to_owned(),
        };

        Ok(Task {
            id: row.id,
            status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
            priority: row.priority.parse().map_err(|_| corrupt("priority", &row.priority))?,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Task table accessor. Every statement binds its values as parameters.
#[derive(Clone, Debug)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    /// Opens the database at `url`, creating the file and the table if needed.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// A private database that lives as long as the store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // every connection to `:memory:` is its own database, so pin exactly one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// All tasks, most recently created first.
    pub async fn all(&self) -> Result<Vec<Task>, StoreError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    pub async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Task::try_from).transpose()
    }

    pub async fn exists(&self, id: TaskId) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn create(&self, input: &TaskInput) -> Result<Task, StoreError> {
        let row: TaskRow = sqlx::query_as(&format!(
            "INSERT INTO tasks (description, status, priority, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(input.description.as_str())
        .bind(input.status.as_str())
        .bind(input.priority.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Replaces every mutable field of task `id`.
    pub async fn update(&self, id: TaskId, input: &TaskInput) -> Result<Task, StoreError> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET description = ?, status = ?, priority = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(input.description.as_str())
        .bind(input.status.as_str())
        .bind(input.priority.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound(id))?.try_into()
    }

    /// Writes only the fields set in `patch`.
    pub async fn patch(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::NoFields);
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
        let mut assignments = query.separated(", ");

        if let Some(description) = &patch.description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description.clone());
        }
        if let Some(status) = patch.status {
            assignments.push("status = ");
            assignments.push_bind_unseparated(status.as_str());
        }
        if let Some(priority) = patch.priority {
            assignments.push("priority = ");
            assignments.push_bind_unseparated(priority.as_str());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING ").push(COLUMNS);

        let row: Option<TaskRow> = query
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StoreError::NotFound(id))?.try_into()
    }

    pub async fn delete(&self, id: TaskId) -> Result<Deleted, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(Deleted {
            message: String::from("Task deleted"),
            id,
        })
    }
}
