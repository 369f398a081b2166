use std::fmt;

use kanban_api::v1::{Task, TaskPriority};

use crate::board::{Board, UiState};

/// Draws the board. The controller only ever calls this with the complete
/// board, so a renderer is free to rebuild from scratch or to diff.
pub trait Renderer {
    fn render(&mut self, board: &Board, ui: &UiState);
}

/// Renders the board as plain text, one column after another.
#[derive(Debug, Default)]
pub struct TextRenderer {
    frame: String,
}

impl TextRenderer {
    /// The last frame drawn.
    pub fn frame(&self) -> &str {
        &self.frame
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, board: &Board, ui: &UiState) {
        self.frame = Frame(board, ui).to_string();
    }
}

/// One text frame of the board.
struct Frame<'a>(&'a Board, &'a UiState);

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Frame(board, ui) = *self;
        let highlighted = ui.drag.highlighted();
        let dragged = ui.drag.dragged();

        for (status, tasks) in board.columns() {
            let marker = if highlighted == Some(status) { "> " } else { "" };
            writeln!(f, "{marker}{status} ({})", tasks.len())?;

            if tasks.is_empty() {
                writeln!(f, "    -")?;
            }

            for task in tasks {
                write!(f, "    {}", card(task))?;

                if ui.editing == Some(task.id) {
                    write!(f, "  [editing]")?;
                }
                if dragged == Some(task.id) {
                    write!(f, "  [dragging]")?;
                }

                writeln!(f)?;
            }
        }

        Ok(())
    }
}

fn card(task: &Task) -> String {
    format!(
        "#{:<4} {} {:<6}  {}",
        task.id,
        badge(task.priority),
        task.priority,
        escape(&task.description),
    )
}

fn badge(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => "🔴",
        TaskPriority::Medium => "🟡",
        TaskPriority::Low => "🟢",
    }
}

/// Keeps a card on one line whatever the description holds.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }

    escaped
}
