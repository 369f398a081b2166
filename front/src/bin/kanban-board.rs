use clap::Parser;
use dioxus::desktop::{Config, WindowBuilder};
use kanban_front::ui::desktop::{KanbanApp, ServerUrl};

#[derive(Debug, Parser)]
#[command(about = "Task board in a desktop window")]
struct Cli {
    /// Base URL of the task API.
    #[arg(long, env = "KANBAN_URL", default_value = "http://localhost:7890")]
    url: String,
}

fn main() {
    let cli = Cli::parse();

    // the webview's own file drop handling swallows HTML drag events
    let config = Config::new()
        .with_window(WindowBuilder::new().with_title("Tasks"))
        .with_disable_drag_drop_handler(true);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(config)
        .with_context(ServerUrl(cli.url))
        .launch(KanbanApp);
}
