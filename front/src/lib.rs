pub mod api;
pub mod board;
pub mod ui;

pub use api::{ClientError, TaskClient};
pub use board::{Banner, BannerKind, Board, DragState, Move, UiState};
pub use ui::{
    render::{Renderer, TextRenderer},
    BoardController, EditForm,
};
