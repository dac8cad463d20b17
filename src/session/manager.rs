use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::store::{ChatRegistry, MessageStore, SessionStore};
use super::types::{
    derive_preview, derive_title, Chat, ChatId, FirstTurnPolicy, InFlightPolicy, Message,
    MessageRole, SessionId, TurnKind, TurnStage,
};
use crate::app::SessionConfig;
use crate::constants::{
    DEFAULT_CHAT_TITLE, EMPTY_CHAT_PREVIEW, FALLBACK_REPLY, QUESTION_SEPARATOR,
};
use crate::gateway::{ContinueRequest, Gateway, GatewayError, StartRequest};

/// Why a send was refused before anything was changed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    #[error("message is empty")]
    EmptyContent,

    #[error("a message is already being sent")]
    AlreadyInFlight,
}

/// The gateway call a pending turn needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRequest {
    Start(StartRequest),
    Continue(ContinueRequest),
}

impl TurnRequest {
    pub fn kind(&self) -> TurnKind {
        match self {
            Self::Start(_) => TurnKind::FirstTurn,
            Self::Continue(_) => TurnKind::Continuation,
        }
    }
}

/// What the gateway produced for a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReply {
    Started {
        session_id: SessionId,
        content: String,
    },
    Continued {
        content: String,
    },
}

/// A send whose user message is already recorded, awaiting its reply
#[derive(Debug, Clone)]
pub struct PendingTurn {
    chat_id: ChatId,
    request: TurnRequest,
    epoch: u64,
}

impl PendingTurn {
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn request(&self) -> &TurnRequest {
        &self.request
    }

    pub fn kind(&self) -> TurnKind {
        self.request.kind()
    }
}

/// How a turn was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The assistant reply was appended
    Answered { chat_id: ChatId, kind: TurnKind },
    /// The gateway failed and the fallback reply was appended instead
    FellBack {
        chat_id: ChatId,
        kind: TurnKind,
        reason: GatewayError,
    },
    /// The chat was deleted or reset while the call was running
    Discarded { chat_id: ChatId },
}

impl TurnOutcome {
    pub fn chat_id(&self) -> &ChatId {
        match self {
            Self::Answered { chat_id, .. }
            | Self::FellBack { chat_id, .. }
            | Self::Discarded { chat_id } => chat_id,
        }
    }
}

/// A user intent raised by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectChat(Option<ChatId>),
    NewChat,
    DeleteChat(ChatId),
    SendMessage(String),
    PromoteTemporaryChat,
}

/// Result of applying an intent
#[derive(Debug, Clone)]
pub enum IntentEffect {
    Done,
    /// The send was accepted; dispatch the request and call `complete_send`
    Send(PendingTurn),
    Rejected(SendRejected),
    Promoted(ChatId),
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView<'a> {
    pub chats: &'a [Chat],
    pub messages: &'a [Message],
    pub is_loading: bool,
    pub has_chat_history: bool,
    pub is_temporary_chat: bool,
    pub selected_chat_id: Option<&'a ChatId>,
}

/// Run the gateway call for a pending turn
///
/// Touches no manager state, so it can run on a spawned task.
pub async fn dispatch<G: Gateway + ?Sized>(
    gateway: &G,
    request: &TurnRequest,
) -> Result<TurnReply, GatewayError> {
    match request {
        TurnRequest::Start(start) => {
            let response = gateway.start_conversation(start).await?;
            Ok(TurnReply::Started {
                session_id: response.session_id,
                content: response.questions.join(QUESTION_SEPARATOR),
            })
        }
        TurnRequest::Continue(next) => {
            let response = gateway.continue_conversation(next).await?;
            debug!(stage = %response.stage, "continuation answered");
            Ok(TurnReply::Continued {
                content: response.response,
            })
        }
    }
}

/// Owns every chat, message and session binding, and routes user intents
///
/// All mutation happens through `&mut self`; the only suspension point is the
/// gateway call between `begin_send` and `complete_send`.
#[derive(Debug)]
pub struct SessionManager {
    registry: ChatRegistry,
    messages: MessageStore,
    sessions: SessionStore,
    selected: Option<ChatId>,
    in_flight: HashMap<ChatId, TurnKind>,
    config: SessionConfig,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            registry: ChatRegistry::default(),
            messages: MessageStore::default(),
            sessions: SessionStore::default(),
            selected: None,
            in_flight: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Selected chat, `None` in temporary-chat mode
    pub fn selected_chat_id(&self) -> Option<&ChatId> {
        self.selected.as_ref()
    }

    /// Chat that sends and the message pane currently target
    pub fn active_chat_id(&self) -> ChatId {
        self.selected.clone().unwrap_or_else(ChatId::temporary)
    }

    pub fn chats(&self) -> &[Chat] {
        self.registry.as_slice()
    }

    pub fn chat(&self, id: &ChatId) -> Option<&Chat> {
        self.registry.get(id)
    }

    pub fn messages(&self, id: &ChatId) -> &[Message] {
        self.messages.messages(id)
    }

    pub fn session_id(&self, id: &ChatId) -> Option<&SessionId> {
        self.sessions.get(id)
    }

    pub fn has_chat_history(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn is_temporary_chat(&self) -> bool {
        self.selected.is_none()
    }

    /// Whether input should be disabled for the active chat
    pub fn is_loading(&self) -> bool {
        match self.config.in_flight {
            InFlightPolicy::Global => !self.in_flight.is_empty(),
            InFlightPolicy::PerChat => self.in_flight.contains_key(&self.active_chat_id()),
        }
    }

    pub fn turn_stage(&self, id: &ChatId) -> TurnStage {
        if let Some(kind) = self.in_flight.get(id) {
            return match kind {
                TurnKind::FirstTurn => TurnStage::FirstTurnPending,
                TurnKind::Continuation => TurnStage::ContinuationPending,
            };
        }
        if self.messages.len(id) == 0 {
            TurnStage::NoMessages
        } else if self.sessions.contains(id) {
            TurnStage::SessionBound
        } else {
            TurnStage::Unbound
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            chats: self.registry.as_slice(),
            messages: self.messages.messages(&self.active_chat_id()),
            is_loading: self.is_loading(),
            has_chat_history: self.has_chat_history(),
            is_temporary_chat: self.is_temporary_chat(),
            selected_chat_id: self.selected.as_ref(),
        }
    }

    /// Apply a presentation intent
    pub fn apply(&mut self, intent: Intent) -> IntentEffect {
        match intent {
            Intent::SelectChat(id) => {
                self.select_chat(id);
                IntentEffect::Done
            }
            Intent::NewChat => {
                self.start_new_chat();
                IntentEffect::Done
            }
            Intent::DeleteChat(id) => {
                self.delete_chat(&id);
                IntentEffect::Done
            }
            Intent::SendMessage(content) => match self.begin_send(&content) {
                Ok(pending) => IntentEffect::Send(pending),
                Err(rejected) => IntentEffect::Rejected(rejected),
            },
            Intent::PromoteTemporaryChat => match self.promote_temporary_chat() {
                Ok(id) => IntentEffect::Promoted(id),
                Err(rejected) => IntentEffect::Rejected(rejected),
            },
        }
    }

    /// Select a listed chat, or the temporary chat with `None`. Unknown ids are ignored.
    pub fn select_chat(&mut self, id: Option<ChatId>) -> bool {
        if let Some(id) = &id {
            if !self.registry.contains(id) {
                warn!(chat = %id, "ignoring selection of a chat that is not listed");
                return false;
            }
        }
        self.selected = id;
        true
    }

    /// Abandon the temporary chat and switch to it
    pub fn start_new_chat(&mut self) {
        let temp = ChatId::temporary();
        self.messages.reset(&temp);
        self.sessions.take(&temp);
        self.selected = None;
    }

    /// Remove a listed chat with its messages and session. Unknown ids are ignored.
    pub fn delete_chat(&mut self, id: &ChatId) -> bool {
        if self.registry.remove(id).is_none() {
            return false;
        }
        self.messages.remove(id);
        self.sessions.take(id);
        self.selected = self.registry.first().map(|chat| chat.id.clone());

        info!(chat = %id, "chat deleted");
        true
    }

    /// Turn the temporary chat into a listed chat ("launch campaign")
    ///
    /// Refused while the temporary chat waits for a reply, since the reply
    /// would be dropped and its session lost.
    pub fn promote_temporary_chat(&mut self) -> Result<ChatId, SendRejected> {
        let temp = ChatId::temporary();
        if self.in_flight.contains_key(&temp) {
            return Err(SendRejected::AlreadyInFlight);
        }
        let now = Utc::now();
        let id = self.allocate_chat_id(now);

        let history = self.messages.messages(&temp);
        let title = history
            .first()
            .map(|m| derive_title(&m.content))
            .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());
        let last_message = history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| EMPTY_CHAT_PREVIEW.to_string());

        self.registry.push_front(Chat {
            id: id.clone(),
            title,
            last_message,
            timestamp: now,
        });
        self.messages.copy(&temp, &id);

        if let Some(session_id) = self.sessions.take(&temp) {
            if self.config.carry_session_on_promote {
                self.sessions.bind(&id, session_id);
            }
        }

        self.selected = Some(id.clone());
        self.messages.reset(&temp);

        info!(chat = %id, "temporary chat promoted");
        Ok(id)
    }

    /// Record the user message and decide which gateway call the turn needs
    pub fn begin_send(&mut self, content: &str) -> Result<PendingTurn, SendRejected> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SendRejected::EmptyContent);
        }

        let chat_id = self.active_chat_id();
        let busy = match self.config.in_flight {
            InFlightPolicy::Global => !self.in_flight.is_empty(),
            InFlightPolicy::PerChat => self.in_flight.contains_key(&chat_id),
        };
        if busy {
            return Err(SendRejected::AlreadyInFlight);
        }

        self.messages.ensure(&chat_id);
        let was_empty = self.messages.len(&chat_id) == 0;

        let now = Utc::now();
        self.messages
            .append(&chat_id, MessageRole::User, content.to_string(), now);
        if !chat_id.is_temporary() {
            self.registry.touch(&chat_id, content.to_string(), now);
        }

        let first_turn = match self.config.first_turn {
            FirstTurnPolicy::EmptyHistory => was_empty,
            FirstTurnPolicy::UnboundSession => !self.sessions.contains(&chat_id),
        };

        let request = if first_turn {
            TurnRequest::Start(StartRequest {
                text: content.to_string(),
            })
        } else {
            let session_id = self.sessions.get(&chat_id).cloned();
            if session_id.is_none() {
                warn!(chat = %chat_id, "continuing a chat that has no session");
            }
            TurnRequest::Continue(ContinueRequest {
                session_id,
                message: content.to_string(),
                history: self.messages.history(&chat_id),
            })
        };

        let epoch = self.messages.epoch(&chat_id).unwrap_or_default();
        self.in_flight.insert(chat_id.clone(), request.kind());
        debug!(chat = %chat_id, kind = ?request.kind(), "turn started");

        Ok(PendingTurn {
            chat_id,
            request,
            epoch,
        })
    }

    /// Reconcile a finished gateway call with the stores
    pub fn complete_send(
        &mut self,
        pending: PendingTurn,
        result: Result<TurnReply, GatewayError>,
    ) -> TurnOutcome {
        let PendingTurn {
            chat_id,
            request,
            epoch,
        } = pending;
        let kind = request.kind();
        self.in_flight.remove(&chat_id);

        if self.messages.epoch(&chat_id) != Some(epoch) {
            warn!(chat = %chat_id, "chat changed while waiting for the backend, reply dropped");
            return TurnOutcome::Discarded { chat_id };
        }

        let now = Utc::now();
        match result {
            Ok(reply) => {
                let content = match reply {
                    TurnReply::Started {
                        session_id,
                        content,
                    } => {
                        info!(chat = %chat_id, session = %session_id, "session bound");
                        self.sessions.bind(&chat_id, session_id);
                        content
                    }
                    TurnReply::Continued { content } => content,
                };

                if !chat_id.is_temporary() {
                    self.registry.touch(&chat_id, derive_preview(&content), now);
                }
                self.messages
                    .append(&chat_id, MessageRole::Assistant, content, now);

                TurnOutcome::Answered { chat_id, kind }
            }
            Err(reason) => {
                warn!(chat = %chat_id, kind = reason.kind(), error = %reason, "backend call failed, using fallback reply");
                self.messages.append(
                    &chat_id,
                    MessageRole::Assistant,
                    FALLBACK_REPLY.to_string(),
                    now,
                );

                TurnOutcome::FellBack {
                    chat_id,
                    kind,
                    reason,
                }
            }
        }
    }

    /// Send a message and wait for the backend in one call
    pub async fn send_message<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        content: &str,
    ) -> Result<TurnOutcome, SendRejected> {
        let pending = self.begin_send(content)?;
        let result = dispatch(gateway, pending.request()).await;
        Ok(self.complete_send(pending, result))
    }

    fn allocate_chat_id(&self, now: DateTime<Utc>) -> ChatId {
        let mut stamp = now.timestamp_millis();
        loop {
            let id = ChatId::new(stamp.to_string());
            if !self.registry.contains(&id) && !self.messages.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }
}
