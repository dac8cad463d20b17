use thiserror::Error;

/// Why a gateway call did not produce usable data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend could not be reached (connection refused, DNS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}: {body}")]
    Protocol { status: u16, body: String },

    /// The backend answered 2xx but the body could not be read
    #[error("Malformed backend response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Short label used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Protocol { .. } => "protocol",
            Self::Decode(_) => "decode",
        }
    }
}
