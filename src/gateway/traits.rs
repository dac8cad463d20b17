use async_trait::async_trait;

use super::error::GatewayError;
use super::types::{ContinueRequest, ContinueResponse, StartRequest, StartResponse};

/// The two remote operations the assistant backend offers
///
/// Implementations own their timeout policy. Callers only distinguish data
/// from failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Open a backend session with the first message of a chat
    async fn start_conversation(&self, request: &StartRequest)
        -> Result<StartResponse, GatewayError>;

    /// Send a follow-up message within an existing backend session
    async fn continue_conversation(
        &self,
        request: &ContinueRequest,
    ) -> Result<ContinueResponse, GatewayError>;
}
