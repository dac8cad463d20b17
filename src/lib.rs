pub mod app;
pub mod cli;
pub mod constants;
pub mod gateway;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use gateway::{Gateway, GatewayError, HttpGateway, OfflineGateway};
pub use session::{SessionManager, TurnOutcome};
pub use tui::run_ui;
pub use utils::AdewinError;
