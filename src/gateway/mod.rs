// Gateway module for the backend - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod error;
mod http;
mod offline;
mod traits;
mod types;

// Public re-exports - the ONLY way to access backend functionality
pub use error::GatewayError;
pub use http::HttpGateway;
pub use offline::OfflineGateway;
pub use traits::Gateway;
#[cfg(test)]
pub use traits::MockGateway;
pub use types::{ContinueRequest, ContinueResponse, StartRequest, StartResponse};
