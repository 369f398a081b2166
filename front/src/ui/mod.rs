pub mod desktop;
pub mod render;

use std::{fmt::Display, time::Instant};

use kanban_api::v1::{TaskId, TaskInput, TaskPatch, TaskPriority, TaskStatus};
use tracing::debug;

use crate::{
    api::TaskClient,
    board::{Banner, Board, Move, UiState},
};

use self::render::Renderer;

/// Values of an open edit form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditForm {
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Drives the board: user actions go to the server, and every successful
/// write is followed by a full reload and render.
pub struct BoardController<R> {
    client: TaskClient,
    renderer: R,
    ui: UiState,
    board: Board,
    banner: Option<Banner>,
}

impl<R: Renderer> BoardController<R> {
    pub fn new(client: TaskClient, renderer: R) -> Self {
        Self {
            client,
            renderer,
            ui: UiState::default(),
            board: Board::default(),
            banner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The banner, unless it has already been dismissed by `now`.
    pub fn banner(&self, now: Instant) -> Option<&Banner> {
        (self.banner.as_ref()).filter(|banner| banner.visible_at(now))
    }

    /// Fetches every task and redraws the board. Returns false if the fetch
    /// failed, in which case an error banner is shown.
    pub async fn reload(&mut self) -> bool {
        match self.client.get_tasks().await {
            Ok(tasks) => {
                self.board = Board::new(tasks);
                self.render();
                true
            }
            Err(err) => {
                self.show_error("Failed to load tasks", err);
                false
            }
        }
    }

    /// Creates a task. Returns true once it is on the server.
    pub async fn add_task(
        &mut self,
        description: &str,
        status: TaskStatus,
        priority: TaskPriority,
    ) -> bool {
        let description = description.trim();
        if description.is_empty() {
            self.banner = Some(Banner::error("Description cannot be empty"));
            return false;
        }

        let created = (self.client)
            .create_task(description, Some(status), Some(priority))
            .await;

        match created {
            Ok(task) => {
                debug!(id = task.id, "task created");
                self.reload_with("Task created").await;
                true
            }
            Err(err) => {
                self.show_error("Failed to create task", err);
                false
            }
        }
    }

    /// Opens the edit form for `id`, filled from the loaded board.
    pub fn open_edit(&mut self, id: TaskId) -> Option<EditForm> {
        let task = self.board.find(id)?;
        let form = EditForm {
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
        };

        self.ui.editing = Some(id);
        self.render();

        Some(form)
    }

    pub fn close_edit(&mut self) {
        self.ui.editing = None;
        self.render();
    }

    pub async fn save_edit(&mut self, form: &EditForm) {
        let Some(id) = self.ui.editing else {
            return;
        };

        let description = form.description.trim();
        if description.is_empty() {
            self.banner = Some(Banner::error("Description cannot be empty"));
            return;
        }

        let input = TaskInput {
            description: description.to_owned(),
            status: form.status,
            priority: form.priority,
        };

        match self.client.update_task(id, &input).await {
            Ok(_) => {
                self.ui.editing = None;
                self.reload_with("Task updated").await;
            }
            Err(err) => self.show_error("Failed to update task", err),
        }
    }

    pub async fn delete_task(&mut self, id: TaskId) {
        match self.client.delete_task(id).await {
            Ok(_) => {
                if self.ui.editing == Some(id) {
                    self.ui.editing = None;
                }
                self.reload_with("Task deleted").await;
            }
            Err(err) => self.show_error("Failed to delete task", err),
        }
    }

    /// Starts dragging `id`. Returns false if the task isn't on the board.
    pub fn drag_start(&mut self, id: TaskId) -> bool {
        let Some(from) = self.board.find(id).map(|task| task.status) else {
            return false;
        };

        self.ui.drag.start(id, from);
        self.render();
        true
    }

    pub fn drag_over(&mut self, status: TaskStatus) {
        self.ui.drag.hover(status);
        self.render();
    }

    pub fn drag_leave(&mut self) {
        self.ui.drag.leave();
        self.render();
    }

    /// The drag ended without a drop.
    pub fn drag_end(&mut self) {
        self.ui.drag.cancel();
        self.render();
    }

    /// Drops the dragged task on the `status` column, patching only its
    /// status.
    pub async fn drop_on(&mut self, status: TaskStatus) {
        let Some(Move { task, status }) = self.ui.drag.drop_on(status) else {
            self.render();
            return;
        };

        match self.client.patch_task(task, &TaskPatch::status(status)).await {
            Ok(_) => self.reload_with("Task moved").await,
            Err(err) => {
                self.show_error("Failed to move task", err);
                self.render();
            }
        }
    }

    async fn reload_with(&mut self, success: &str) {
        if self.reload().await {
            self.banner = Some(Banner::success(success));
        }
    }

    fn show_error(&mut self, context: &str, err: impl Display) {
        self.banner = Some(Banner::error(format!("{context}: {err}")));
    }

    fn render(&mut self) {
        self.renderer.render(&self.board, &self.ui);
    }
}
