/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";
pub const START_CONVERSATION_PATH: &str = "/api/v1/prompt/start";
pub const CONTINUE_CONVERSATION_PATH: &str = "/api/v1/chat";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_CHANNEL_CAPACITY: usize = 16;

// Chats
pub const TEMPORARY_CHAT_ID: &str = "temp-chat";
pub const DEFAULT_CHAT_TITLE: &str = "New Campaign";
pub const EMPTY_CHAT_PREVIEW: &str = "No messages yet";
pub const TITLE_MAX_CHARS: usize = 30;
pub const PREVIEW_MAX_CHARS: usize = 50;
pub const ELLIPSIS: &str = "...";

/// Separator placed between the questions returned by a first turn
pub const QUESTION_SEPARATOR: &str = "\n\n";

/// Assistant reply used whenever the gateway call fails
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble processing your request right now. Please try again.";

// Offline mode
pub const OFFLINE_SESSION_PREFIX: &str = "offline";
pub const OFFLINE_KEYWORDS: &[&str] = &["campaign", "audience", "budget"];
pub const OFFLINE_QUESTIONS: &[&str] = &[
    "Who is the primary audience for this campaign?",
    "What is the main goal you want the campaign to achieve?",
    "Do you have a budget range or timeline in mind?",
];
pub const OFFLINE_RESPONSE: &str =
    "Thanks, that helps. The assistant is running offline, so this is a placeholder reply. \
     Connect to the backend for a tailored answer.";
pub const OFFLINE_STAGE: &str = "offline";
