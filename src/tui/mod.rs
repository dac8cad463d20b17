// Gateway module for the terminal UI - follows the Train Station Pattern
// All external access must go through this gateway

mod app;
mod render;
mod ui;

pub use app::{App, Focus};
pub use ui::run_ui;
