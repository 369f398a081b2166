use std::{
    io::{self, Write},
    time::Instant,
};

use clap::{Parser, Subcommand};
use kanban_api::v1::{TaskId, TaskPriority, TaskStatus};
use kanban_front::{BannerKind, BoardController, TaskClient, TextRenderer};

#[derive(Debug, Parser)]
#[command(about = "Task board in the terminal")]
struct Cli {
    /// Base URL of the task API.
    #[arg(long, env = "KANBAN_URL", default_value = "http://localhost:7890")]
    url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the board (the default).
    Board,
    /// Add a task.
    Add {
        description: String,
        #[arg(long, default_value_t = TaskStatus::SomeDay)]
        status: TaskStatus,
        #[arg(long, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
    },
    /// Edit a task; fields not given keep their current value.
    Edit {
        id: TaskId,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
    },
    /// Move a task to another column.
    Move { id: TaskId, status: TaskStatus },
    /// Delete a task.
    Delete {
        id: TaskId,
        /// Don't ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut board = BoardController::new(TaskClient::new(cli.url), TextRenderer::default());

    if !board.reload().await {
        return finish(&board);
    }

    match cli.command.unwrap_or(Command::Board) {
        Command::Board => {}
        Command::Add {
            description,
            status,
            priority,
        } => {
            board.add_task(&description, status, priority).await;
        }
        Command::Edit {
            id,
            description,
            status,
            priority,
        } => {
            let Some(mut form) = board.open_edit(id) else {
                eyre::bail!("task {id} is not on the board");
            };

            form.description = description.unwrap_or(form.description);
            form.status = status.unwrap_or(form.status);
            form.priority = priority.unwrap_or(form.priority);

            board.save_edit(&form).await;
        }
        Command::Move { id, status } => {
            if !board.drag_start(id) {
                eyre::bail!("task {id} is not on the board");
            }

            board.drag_over(status);
            board.drop_on(status).await;
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(id)? {
                return Ok(());
            }

            board.delete_task(id).await;
        }
    }

    finish(&board)
}

fn finish(board: &BoardController<TextRenderer>) -> eyre::Result<()> {
    print!("{}", board.renderer().frame());

    match board.banner(Instant::now()) {
        Some(banner) if banner.kind == BannerKind::Error => eyre::bail!("{}", banner.message),
        Some(banner) => println!("{}", banner.message),
        None => {}
    }

    Ok(())
}

fn confirm(id: TaskId) -> eyre::Result<bool> {
    print!("Delete task {id}? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
