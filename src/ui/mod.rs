//! Terminal UI for browsing and searching generated emails

mod app;
mod render;
mod theme;
mod widgets;

pub use app::UiApp;
