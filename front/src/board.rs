use std::time::{Duration, Instant};

use kanban_api::v1::{Task, TaskId, TaskStatus};

/// Tasks grouped into one column per status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    columns: [Vec<Task>; 4],
}

fn column_index(status: TaskStatus) -> usize {
    match status {
        TaskStatus::SomeDay => 0,
        TaskStatus::ToDo => 1,
        TaskStatus::InProgress => 2,
        TaskStatus::Done => 3,
    }
}

impl Board {
    /// Groups `tasks`, keeping their order within each column.
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();

        for task in tasks {
            board.columns[column_index(task.status)].push(task);
        }

        board
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[column_index(status)]
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.column(status).len()
    }

    /// Columns left to right, paired with their status.
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> + '_ {
        TaskStatus::ALL
            .into_iter()
            .map(|status| (status, self.column(status)))
    }

    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.columns.iter().flatten().find(|task| task.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }
}

/// The only client state that outlives a render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    /// Task whose edit form is open.
    pub editing: Option<TaskId>,
    pub drag: DragState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task: TaskId,
        from: TaskStatus,
    },
    Hovering {
        task: TaskId,
        from: TaskStatus,
        over: TaskStatus,
    },
}

/// A drop that changes a task's column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub task: TaskId,
    pub status: TaskStatus,
}

impl DragState {
    pub fn start(&mut self, task: TaskId, from: TaskStatus) {
        *self = Self::Dragging { task, from };
    }

    pub fn hover(&mut self, over: TaskStatus) {
        if let Self::Dragging { task, from } | Self::Hovering { task, from, .. } = *self {
            *self = Self::Hovering { task, from, over };
        }
    }

    pub fn leave(&mut self) {
        if let Self::Hovering { task, from, .. } = *self {
            *self = Self::Dragging { task, from };
        }
    }

    /// Ends the drag. Dropping onto the column the task is already in is a
    /// no-op.
    pub fn drop_on(&mut self, target: TaskStatus) -> Option<Move> {
        let dropped = match *self {
            Self::Dragging { task, from } | Self::Hovering { task, from, .. } if from != target => {
                Some(Move {
                    task,
                    status: target,
                })
            }
            _ => None,
        };

        *self = Self::Idle;
        dropped
    }

    /// The drag ended outside any column.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn dragged(&self) -> Option<TaskId> {
        match *self {
            Self::Idle => None,
            Self::Dragging { task, .. } | Self::Hovering { task, .. } => Some(task),
        }
    }

    /// Column currently highlighted as the drop target.
    pub fn highlighted(&self) -> Option<TaskStatus> {
        match *self {
            Self::Hovering { over, .. } => Some(over),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// A transient message shown above the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Error, message)
    }

    fn new(kind: BannerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn ttl(&self) -> Duration {
        match self.kind {
            BannerKind::Success => Duration::from_secs(3),
            BannerKind::Error => Duration::from_secs(5),
        }
    }

    pub fn visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.ttl()
    }
}
