use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::GatewayError;
use super::traits::Gateway;
use super::types::{ContinueRequest, ContinueResponse, StartRequest, StartResponse};
use crate::app::GatewayConfig;
use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;

/// Gateway talking JSON over HTTP to the assistant backend
pub struct HttpGateway {
    client: Client,
    base_url: String,
    start_path: String,
    chat_path: String,
    send_history: bool,
}

impl HttpGateway {
    /// Create a gateway from configuration
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            start_path: config.start_path.clone(),
            chat_path: config.chat_path.clone(),
            send_history: config.send_history,
        })
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Probe the base URL. Returns the status code, or `None` if nothing answered.
    pub async fn health_check(&self) -> Option<u16> {
        let request = self
            .client
            .get(&self.base_url)
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS));

        match request.send().await {
            Ok(response) => {
                debug!(status = %response.status(), "backend answered health check");
                Some(response.status().as_u16())
            }
            Err(e) => {
                debug!(error = %e, "backend health check failed");
                None
            }
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path);
        debug!(%url, "posting to backend");

        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(%url, error = %e, "backend unreachable");
            GatewayError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Protocol {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn start_conversation(
        &self,
        request: &StartRequest,
    ) -> Result<StartResponse, GatewayError> {
        let body = json!({ "text": request.text });
        self.post(&self.start_path, &body).await
    }

    async fn continue_conversation(
        &self,
        request: &ContinueRequest,
    ) -> Result<ContinueResponse, GatewayError> {
        let mut body = json!({ "message": request.message });
        if let Some(session_id) = &request.session_id {
            body["session_id"] = json!(session_id);
        }
        if self.send_history {
            body["conversation_history"] = json!(request.history);
        }
        self.post(&self.chat_path, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.to_string(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let gateway = HttpGateway::new(&config("http://localhost:8000/")).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8000");
        assert_eq!(
            gateway.endpoint("/api/v1/chat"),
            "http://localhost:8000/api/v1/chat"
        );
        assert_eq!(
            gateway.endpoint("api/v1/chat"),
            "http://localhost:8000/api/v1/chat"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback
        let gateway = HttpGateway::new(&config("http://127.0.0.1:9")).unwrap();
        let result = gateway
            .start_conversation(&StartRequest {
                text: "Hello".to_string(),
            })
            .await;

        match result {
            Err(GatewayError::Transport(_)) => {}
            other => panic!("Expected transport error, got {:?}", other),
        }
        assert_eq!(gateway.health_check().await, None);
    }
}
