//! The board as a dioxus app. Components only send [`Action`]s; a single
//! coroutine owns the [`BoardController`] and applies them in order, and the
//! controller's frames come back through a signal.

use std::time::Instant;

use dioxus::prelude::*;
use futures::{channel::mpsc::UnboundedReceiver, StreamExt};
use kanban_api::v1::{Task, TaskId, TaskPriority, TaskStatus};

use super::{render::Renderer, BoardController, EditForm};
use crate::{
    api::TaskClient,
    board::{Banner, BannerKind, Board, UiState},
};

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f4f5f7; margin: 0; }
.app { padding: 16px; }
.banner { padding: 8px 12px; border-radius: 4px; margin-bottom: 12px; }
.banner.success { background: #e3fcef; color: #006644; }
.banner.error { background: #ffebe6; color: #bf2600; }
.new-task { display: flex; gap: 8px; margin-bottom: 16px; }
.new-task input { flex: 1; }
.board { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; }
.column { background: #ebecf0; border-radius: 6px; padding: 8px; min-height: 200px; }
.column.drop-target { outline: 2px dashed #0052cc; background: #deebff; }
.count { color: #5e6c84; font-weight: normal; }
.empty { color: #97a0af; font-style: italic; }
.card { background: white; border-radius: 4px; padding: 8px; margin-bottom: 8px; cursor: grab; }
.card.dragging { opacity: 0.4; }
.card.editing { cursor: default; }
.card textarea { width: 100%; }
.badge { font-size: 12px; padding: 1px 6px; border-radius: 8px; margin-right: 6px; }
.badge.high { background: #ffebe6; }
.badge.medium { background: #fffae6; }
.badge.low { background: #e3fcef; }
.description { white-space: pre-wrap; word-break: break-word; }
"#;

/// Base URL of the task API, provided to [`KanbanApp`] as root context.
#[derive(Clone, Debug)]
pub struct ServerUrl(pub String);

/// What the controller last drew.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardView {
    pub board: Board,
    pub ui: UiState,
}

/// Publishes every frame into a signal for the components to read.
pub struct SignalRenderer {
    view: Signal<BoardView>,
}

impl SignalRenderer {
    pub fn new(view: Signal<BoardView>) -> Self {
        Self { view }
    }
}

impl Renderer for SignalRenderer {
    fn render(&mut self, board: &Board, ui: &UiState) {
        self.view.set(BoardView {
            board: board.clone(),
            ui: ui.clone(),
        });
    }
}

/// Contents of the new task form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

#[derive(Clone, Debug)]
pub enum Action {
    /// Submit the draft.
    Add,
    OpenEdit(TaskId),
    CloseEdit,
    /// Save the open edit form.
    SaveEdit,
    Delete(TaskId),
    DragStart(TaskId),
    DragOver(TaskStatus),
    DragLeave,
    DragEnd,
    Drop(TaskStatus),
}

/// Applies one action to the board. `edit` and `draft` are the form
/// contents the action reads, and are reset when it succeeds.
pub async fn apply<R: Renderer>(
    board: &mut BoardController<R>,
    action: Action,
    edit: &mut Option<EditForm>,
    draft: &mut Draft,
) {
    match action {
        Action::Add => {
            let created = board
                .add_task(&draft.description, draft.status, draft.priority)
                .await;
            if created {
                *draft = Draft::default();
            }
        }
        Action::OpenEdit(id) => *edit = board.open_edit(id),
        Action::CloseEdit => board.close_edit(),
        Action::SaveEdit => {
            if let Some(form) = edit {
                board.save_edit(form).await;
            }
        }
        Action::Delete(id) => board.delete_task(id).await,
        Action::DragStart(id) => {
            board.drag_start(id);
        }
        Action::DragOver(status) => board.drag_over(status),
        Action::DragLeave => board.drag_leave(),
        Action::DragEnd => board.drag_end(),
        Action::Drop(status) => board.drop_on(status).await,
    }
}

async fn run(
    mut actions: UnboundedReceiver<Action>,
    client: TaskClient,
    view: Signal<BoardView>,
    banner: Signal<Option<Banner>>,
    mut edit: Signal<Option<EditForm>>,
    mut draft: Signal<Draft>,
) {
    let mut board = BoardController::new(client, SignalRenderer::new(view));
    board.reload().await;
    publish_banner(&board, banner);

    while let Some(action) = actions.next().await {
        let edit_before = edit.peek().clone();
        let draft_before = draft.peek().clone();
        let mut edit_after = edit_before.clone();
        let mut draft_after = draft_before.clone();

        apply(&mut board, action, &mut edit_after, &mut draft_after).await;

        // only write back what the action changed, the user may have kept typing
        if edit_after != edit_before {
            edit.set(edit_after);
        }
        if draft_after != draft_before {
            draft.set(draft_after);
        }

        publish_banner(&board, banner);
    }
}

/// Shows the controller's banner and clears it again once it expires.
fn publish_banner<R: Renderer>(board: &BoardController<R>, mut shown: Signal<Option<Banner>>) {
    let current = board.banner(Instant::now()).cloned();
    if *shown.peek() == current {
        return;
    }

    if let Some(banner) = &current {
        let ttl = banner.ttl();

        spawn(async move {
            tokio::time::sleep(ttl).await;

            let expired = matches!(
                &*shown.peek(),
                Some(banner) if !banner.visible_at(Instant::now())
            );
            if expired {
                shown.set(None);
            }
        });
    }

    shown.set(current);
}

/// Root component. Expects a [`ServerUrl`] in context.
#[component]
pub fn KanbanApp() -> Element {
    let ServerUrl(url) = use_context::<ServerUrl>();
    let view = use_signal(BoardView::default);
    let banner = use_signal(|| None::<Banner>);
    let edit = use_signal(|| None::<EditForm>);
    let draft = use_signal(Draft::default);

    use_coroutine(move |actions: UnboundedReceiver<Action>| {
        run(
            actions,
            TaskClient::new(url.clone()),
            view,
            banner,
            edit,
            draft,
        )
    });

    let BoardView { board, ui } = view();
    let highlighted = ui.drag.highlighted();
    let dragged = ui.drag.dragged();

    rsx! {
        style { {STYLE} }
        main { class: "app",
            BannerLine { banner: banner() }
            NewTask { draft }
            div { class: "board",
                for (status, tasks) in board.columns() {
                    Column {
                        key: "{status}",
                        status,
                        tasks: tasks.to_vec(),
                        highlighted: highlighted == Some(status),
                        editing: ui.editing,
                        dragged,
                        edit,
                    }
                }
            }
        }
    }
}

#[component]
fn BannerLine(banner: Option<Banner>) -> Element {
    let Some(banner) = banner else {
        return rsx! {};
    };

    let class = match banner.kind {
        BannerKind::Success => "banner success",
        BannerKind::Error => "banner error",
    };

    rsx! {
        div { class, "{banner.message}" }
    }
}

#[component]
fn NewTask(draft: Signal<Draft>) -> Element {
    let actions = use_coroutine_handle::<Action>();
    let mut draft = draft;
    let Draft {
        description,
        status,
        priority,
    } = draft();

    rsx! {
        div { class: "new-task",
            input {
                placeholder: "What needs doing?",
                maxlength: "500",
                value: "{description}",
                oninput: move |evt: FormEvent| {
                    draft.write().description = evt.value();
                },
                onkeydown: move |evt: KeyboardEvent| {
                    if evt.key() == Key::Enter {
                        actions.send(Action::Add);
                    }
                },
            }
            select {
                onchange: move |evt: FormEvent| {
                    if let Ok(status) = evt.value().parse::<TaskStatus>() {
                        draft.write().status = status;
                    }
                },
                {choices(&TaskStatus::ALL, status)}
            }
            select {
                onchange: move |evt: FormEvent| {
                    if let Ok(priority) = evt.value().parse::<TaskPriority>() {
                        draft.write().priority = priority;
                    }
                },
                {choices(&TaskPriority::ALL, priority)}
            }
            button { onclick: move |_| actions.send(Action::Add), "Add task" }
        }
    }
}

#[component]
fn Column(
    status: TaskStatus,
    tasks: Vec<Task>,
    highlighted: bool,
    editing: Option<TaskId>,
    dragged: Option<TaskId>,
    edit: Signal<Option<EditForm>>,
) -> Element {
    let actions = use_coroutine_handle::<Action>();
    let class = if highlighted {
        "column drop-target"
    } else {
        "column"
    };
    let count = tasks.len();

    rsx! {
        section {
            class,
            // a drop is only allowed where dragover is cancelled
            ondragover: move |evt: DragEvent| {
                evt.prevent_default();
                if !highlighted {
                    actions.send(Action::DragOver(status));
                }
            },
            ondragleave: move |_| actions.send(Action::DragLeave),
            ondrop: move |evt: DragEvent| {
                evt.prevent_default();
                actions.send(Action::Drop(status));
            },
            h2 { "{status} " span { class: "count", "({count})" } }
            if tasks.is_empty() {
                p { class: "empty", "No tasks" }
            }
            for task in tasks.iter() {
                Card {
                    key: "{task.id}",
                    task: task.clone(),
                    editing: editing == Some(task.id),
                    dragging: dragged == Some(task.id),
                    edit,
                }
            }
        }
    }
}

#[component]
fn Card(task: Task, editing: bool, dragging: bool, edit: Signal<Option<EditForm>>) -> Element {
    let actions = use_coroutine_handle::<Action>();
    let mut confirming = use_signal(|| false);
    let id = task.id;

    if editing {
        return rsx! {
            EditCard { edit }
        };
    }

    let class = if dragging { "card dragging" } else { "card" };
    let priority = task.priority;

    rsx! {
        article {
            class,
            draggable: "true",
            ondragstart: move |_| actions.send(Action::DragStart(id)),
            ondragend: move |_| actions.send(Action::DragEnd),
            div {
                span { class: "badge {priority}", "{priority}" }
                span { "#{id}" }
            }
            p { class: "description", "{task.description}" }
            div {
                if confirming() {
                    span { "Delete this task? " }
                    button {
                        onclick: move |_| {
                            confirming.set(false);
                            actions.send(Action::Delete(id));
                        },
                        "Delete"
                    }
                    button { onclick: move |_| confirming.set(false), "Keep" }
                } else {
                    button { onclick: move |_| actions.send(Action::OpenEdit(id)), "Edit" }
                    button { onclick: move |_| confirming.set(true), "Delete" }
                }
            }
        }
    }
}

#[component]
fn EditCard(edit: Signal<Option<EditForm>>) -> Element {
    let actions = use_coroutine_handle::<Action>();
    let mut edit = edit;
    let Some(form) = edit() else {
        return rsx! {};
    };

    rsx! {
        article { class: "card editing",
            textarea {
                maxlength: "500",
                value: "{form.description}",
                oninput: move |evt: FormEvent| {
                    let description = evt.value();
                    edit.with_mut(|form| {
                        if let Some(form) = form {
                            form.description = description;
                        }
                    });
                },
            }
            select {
                onchange: move |evt: FormEvent| {
                    if let Ok(status) = evt.value().parse::<TaskStatus>() {
                        edit.with_mut(|form| {
                            if let Some(form) = form {
                                form.status = status;
                            }
                        });
                    }
                },
                {choices(&TaskStatus::ALL, form.status)}
            }
            select {
                onchange: move |evt: FormEvent| {
                    if let Ok(priority) = evt.value().parse::<TaskPriority>() {
                        edit.with_mut(|form| {
                            if let Some(form) = form {
                                form.priority = priority;
                            }
                        });
                    }
                },
                {choices(&TaskPriority::ALL, form.priority)}
            }
            div {
                button { onclick: move |_| actions.send(Action::SaveEdit), "Save" }
                button { onclick: move |_| actions.send(Action::CloseEdit), "Cancel" }
            }
        }
    }
}

/// `<option>`s for every value in `all`, with `selected` preselected.
fn choices<T>(all: &[T], selected: T) -> Element
where
    T: Copy + PartialEq + std::fmt::Display,
{
    rsx! {
        for choice in all.iter().copied() {
            option {
                key: "{choice}",
                value: "{choice}",
                selected: choice == selected,
                "{choice}"
            }
        }
    }
}
