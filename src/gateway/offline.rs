use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::GatewayError;
use super::traits::Gateway;
use super::types::{ContinueRequest, ContinueResponse, StartRequest, StartResponse};
use crate::constants::{
    OFFLINE_KEYWORDS, OFFLINE_QUESTIONS, OFFLINE_RESPONSE, OFFLINE_SESSION_PREFIX, OFFLINE_STAGE,
};

/// Canned backend used with `--offline`, for demos without a server
#[derive(Debug, Default)]
pub struct OfflineGateway {
    sessions: AtomicU64,
}

impl OfflineGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for OfflineGateway {
    async fn start_conversation(
        &self,
        _request: &StartRequest,
    ) -> Result<StartResponse, GatewayError> {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(StartResponse {
            session_id: format!("{}-{}", OFFLINE_SESSION_PREFIX, n),
            extracted_keywords: OFFLINE_KEYWORDS.iter().map(|k| json!(k)).collect(),
            questions: OFFLINE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        })
    }

    async fn continue_conversation(
        &self,
        request: &ContinueRequest,
    ) -> Result<ContinueResponse, GatewayError> {
        Ok(ContinueResponse {
            session_id: request.session_id.clone().unwrap_or_default(),
            response: OFFLINE_RESPONSE.to_string(),
            stage: OFFLINE_STAGE.to_string(),
            conversation_history: request.history.iter().map(|h| json!(h)).collect(),
        })
    }
}
