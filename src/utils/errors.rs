use thiserror::Error;

use crate::gateway::GatewayError;

/// Main error type for Adewin
#[derive(Error, Debug)]
pub enum AdewinError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("UI error: {0}")]
    UIError(String),
}
