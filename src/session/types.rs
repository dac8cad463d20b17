use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ELLIPSIS, PREVIEW_MAX_CHARS, TEMPORARY_CHAT_ID, TITLE_MAX_CHARS};

/// Opaque chat identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the unlisted temporary chat
    pub fn temporary() -> Self {
        Self(TEMPORARY_CHAT_ID.to_string())
    }

    pub fn is_temporary(&self) -> bool {
        self.0 == TEMPORARY_CHAT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backend-issued session identifier
pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One message in a chat. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Summary of a listed chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub last_message: String,
    pub timestamp: DateTime<Utc>,
}

/// How a send decides between "start" and "continue"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTurnPolicy {
    /// First turn iff the chat had no messages before this send
    #[default]
    EmptyHistory,
    /// First turn iff the chat has no session bound
    UnboundSession,
}

/// Scope of the guard against overlapping sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// At most one send in flight across all chats
    #[default]
    Global,
    /// At most one send in flight per chat
    PerChat,
}

/// Which gateway call a turn uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    FirstTurn,
    Continuation,
}

/// Where a chat is in its conversation with the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStage {
    NoMessages,
    FirstTurnPending,
    SessionBound,
    ContinuationPending,
    /// Has messages but no session, e.g. after a failed first turn
    Unbound,
}

/// Title for a promoted chat: the first message, cut to 30 characters
pub fn derive_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        let head: String = content.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        content.to_string()
    }
}

/// Sidebar preview of an assistant reply: first 50 characters and a marker
pub fn derive_preview(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_MAX_CHARS).collect();
    format!("{}{}", head, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncation() {
        assert_eq!(derive_title("Hello"), "Hello");
        assert_eq!(derive_title(&"a".repeat(30)), "a".repeat(30));
        assert_eq!(
            derive_title(&"a".repeat(31)),
            format!("{}...", "a".repeat(30))
        );
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let title = derive_title(&"é".repeat(40));
        assert_eq!(title, format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_preview_always_marked() {
        assert_eq!(derive_preview("Short"), "Short...");
        assert_eq!(
            derive_preview(&"b".repeat(80)),
            format!("{}...", "b".repeat(50))
        );
    }

    #[test]
    fn test_temporary_chat_id() {
        assert!(ChatId::temporary().is_temporary());
        assert_eq!(ChatId::temporary().as_str(), "temp-chat");
        assert!(!ChatId::new("1700000000000").is_temporary());
    }

    #[test]
    fn test_policy_names() {
        let policy: FirstTurnPolicy = serde_json::from_str("\"unbound_session\"").unwrap();
        assert_eq!(policy, FirstTurnPolicy::UnboundSession);
        let policy: InFlightPolicy = serde_json::from_str("\"per_chat\"").unwrap();
        assert_eq!(policy, InFlightPolicy::PerChat);
    }
}
