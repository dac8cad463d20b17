use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a "start conversation" call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    pub text: String,
}

/// Reply to a "start conversation" call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    #[serde(default)]
    pub extracted_keywords: Vec<Value>,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// A "continue conversation" call
///
/// `history` holds the content of every message in the chat so far, oldest
/// first, ending with `message`. Whether it is transmitted is up to the
/// gateway implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinueRequest {
    pub session_id: Option<String>,
    pub message: String,
    pub history: Vec<String>,
}

/// Reply to a "continue conversation" call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueResponse {
    #[serde(default)]
    pub session_id: String,
    pub response: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub conversation_history: Vec<Value>,
}
