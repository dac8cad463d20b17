/// Session management module - Gateway

mod manager;
mod store;
mod types;

pub use manager::{
    dispatch, Intent, IntentEffect, PendingTurn, SendRejected, SessionManager, SessionView,
    TurnOutcome, TurnReply, TurnRequest,
};
pub use store::{ChatRegistry, MessageStore, SessionStore};
pub use types::{
    derive_preview, derive_title, Chat, ChatId, FirstTurnPolicy, InFlightPolicy, Message,
    MessageRole, SessionId, TurnKind, TurnStage,
};
