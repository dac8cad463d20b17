use crate::gateway::GatewayError;
use crate::session::{
    ChatId, Intent, IntentEffect, PendingTurn, SendRejected, SessionManager, TurnOutcome,
    TurnReply,
};

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Sidebar,
}

/// Application state
pub struct App {
    /// Chats, messages and sessions
    pub manager: SessionManager,
    /// User input buffer
    pub input: String,
    /// Is the app running?
    pub running: bool,
    /// Pane receiving keys
    pub focus: Focus,
    /// Highlighted row in the chat list
    pub sidebar_index: usize,
    /// Show the chat list when chats exist
    pub show_sidebar: bool,
    /// Backend name for display
    pub backend: String,
    /// Status message
    pub status_message: Option<String>,
    /// Scroll offset for chat view
    pub scroll_offset: u16,
}

impl App {
    /// Create a new app instance
    pub fn new(manager: SessionManager, backend: String, show_sidebar: bool) -> Self {
        Self {
            manager,
            input: String::new(),
            running: true,
            focus: Focus::default(),
            sidebar_index: 0,
            show_sidebar,
            backend,
            status_message: None,
            scroll_offset: 0,
        }
    }

    /// Whether the chat list is drawn
    pub fn sidebar_visible(&self) -> bool {
        self.show_sidebar && self.manager.has_chat_history()
    }

    /// Send the input buffer. Returns the turn to dispatch, if one started.
    pub fn submit_input(&mut self) -> Option<PendingTurn> {
        match self.manager.apply(Intent::SendMessage(self.input.clone())) {
            IntentEffect::Send(pending) => {
                self.input.clear();
                self.clear_status();
                self.scroll_offset = 0;
                Some(pending)
            }
            IntentEffect::Rejected(SendRejected::AlreadyInFlight) => {
                self.set_status("Waiting for the assistant to answer...");
                None
            }
            _ => None,
        }
    }

    /// Apply a finished backend call
    pub fn finish_turn(
        &mut self,
        pending: PendingTurn,
        result: Result<TurnReply, GatewayError>,
    ) -> TurnOutcome {
        let outcome = self.manager.complete_send(pending, result);
        if let TurnOutcome::FellBack { reason, .. } = &outcome {
            self.set_status(format!("Backend unavailable: {}", reason));
        }
        self.scroll_offset = 0;
        outcome
    }

    /// Switch to a fresh temporary chat
    pub fn new_chat(&mut self) {
        self.manager.apply(Intent::NewChat);
        self.focus = Focus::Input;
        self.set_status("New chat");
    }

    /// Return to the temporary chat without clearing it
    pub fn show_temporary_chat(&mut self) {
        self.manager.apply(Intent::SelectChat(None));
        self.focus = Focus::Input;
    }

    /// Turn the temporary chat into a listed chat ("launch campaign")
    pub fn launch_campaign(&mut self) {
        if !self.manager.is_temporary_chat() || self.manager.view().messages.is_empty() {
            self.set_status("Nothing to launch: start a conversation first");
            return;
        }
        match self.manager.apply(Intent::PromoteTemporaryChat) {
            IntentEffect::Promoted(id) => {
                self.sidebar_index = self.index_of(&id).unwrap_or(0);
                self.set_status("Campaign launched");
            }
            IntentEffect::Rejected(_) => {
                self.set_status("Wait for the assistant to answer before launching");
            }
            _ => {}
        }
    }

    /// Delete the chat highlighted in the sidebar
    pub fn delete_highlighted(&mut self) {
        let Some(chat) = self.manager.chats().get(self.sidebar_index) else {
            return;
        };
        let id = chat.id.clone();
        self.manager.apply(Intent::DeleteChat(id));
        self.sync_sidebar_index();
        if !self.manager.has_chat_history() {
            self.focus = Focus::Input;
        }
        self.set_status("Chat deleted");
    }

    /// Highlight and select the next chat
    pub fn select_next(&mut self) {
        let count = self.manager.chats().len();
        if count == 0 {
            return;
        }
        self.sidebar_index = (self.sidebar_index + 1).min(count - 1);
        self.select_highlighted();
    }

    /// Highlight and select the previous chat
    pub fn select_previous(&mut self) {
        if self.manager.chats().is_empty() {
            return;
        }
        self.sidebar_index = self.sidebar_index.saturating_sub(1);
        self.select_highlighted();
    }

    /// Move focus between the input box and the chat list
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input if self.sidebar_visible() => {
                self.sync_sidebar_index();
                Focus::Sidebar
            }
            _ => Focus::Input,
        };
    }

    fn select_highlighted(&mut self) {
        let id = self.manager.chats()[self.sidebar_index].id.clone();
        self.manager.apply(Intent::SelectChat(Some(id)));
        self.scroll_offset = 0;
    }

    fn index_of(&self, id: &ChatId) -> Option<usize> {
        self.manager.chats().iter().position(|c| &c.id == id)
    }

    /// Point the highlight at the selected chat, or keep it in range
    fn sync_sidebar_index(&mut self) {
        let count = self.manager.chats().len();
        self.sidebar_index = match self.manager.selected_chat_id() {
            Some(id) => self.index_of(id).unwrap_or(0),
            None => self.sidebar_index.min(count.saturating_sub(1)),
        };
    }

    /// Scroll chat view up
    pub fn scroll_up(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(SessionManager::default(), "test".to_string(), true)
    }

    fn answer(app: &mut App, pending: PendingTurn) {
        let reply = match pending.request() {
            crate::session::TurnRequest::Start(_) => TurnReply::Started {
                session_id: "S1".to_string(),
                content: "Question?".to_string(),
            },
            crate::session::TurnRequest::Continue(_) => TurnReply::Continued {
                content: "Answer.".to_string(),
            },
        };
        app.finish_turn(pending, Ok(reply));
    }

    /// Launch a campaign from a one-turn temporary chat
    fn launch(app: &mut App, text: &str) -> ChatId {
        app.new_chat();
        app.input = text.to_string();
        let pending = app.submit_input().unwrap();
        answer(app, pending);
        app.launch_campaign();
        app.manager.selected_chat_id().unwrap().clone()
    }

    #[test]
    fn test_submit_clears_input_and_blocks_while_loading() {
        let mut app = app();
        app.input = "Hello".to_string();

        let pending = app.submit_input().unwrap();
        assert!(app.input.is_empty());
        assert!(app.manager.is_loading());

        app.input = "Again".to_string();
        assert!(app.submit_input().is_none());
        assert_eq!(app.input, "Again");
        assert!(app.status_message.is_some());

        answer(&mut app, pending);
        assert!(!app.manager.is_loading());
        assert_eq!(app.manager.view().messages.len(), 2);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut app = app();
        app.input = "   ".to_string();
        assert!(app.submit_input().is_none());
        assert!(app.manager.view().messages.is_empty());
    }

    #[test]
    fn test_fallback_sets_status() {
        let mut app = app();
        app.input = "Hello".to_string();
        let pending = app.submit_input().unwrap();

        app.finish_turn(pending, Err(GatewayError::Transport("refused".to_string())));
        assert!(app.status_message.unwrap().contains("refused"));
    }

    #[test]
    fn test_launch_requires_messages() {
        let mut app = app();
        app.launch_campaign();
        assert!(!app.manager.has_chat_history());
        assert!(!app.sidebar_visible());

        let id = launch(&mut app, "Hello");
        assert!(app.sidebar_visible());
        assert_eq!(app.manager.chats()[0].id, id);
        assert_eq!(app.sidebar_index, 0);
    }

    #[test]
    fn test_sidebar_navigation_and_delete() {
        let mut app = app();
        let older = launch(&mut app, "First");
        let newer = launch(&mut app, "Second");

        app.toggle_focus();
        assert_eq!(app.focus, Focus::Sidebar);
        assert_eq!(app.sidebar_index, 0);

        app.select_next();
        assert_eq!(app.manager.selected_chat_id(), Some(&older));
        app.select_next();
        assert_eq!(app.sidebar_index, 1);
        app.select_previous();
        assert_eq!(app.manager.selected_chat_id(), Some(&newer));

        app.delete_highlighted();
        assert_eq!(app.manager.selected_chat_id(), Some(&older));
        assert_eq!(app.sidebar_index, 0);

        app.delete_highlighted();
        assert!(app.manager.is_temporary_chat());
        assert_eq!(app.focus, Focus::Input);
        assert!(!app.sidebar_visible());
    }

    #[test]
    fn test_focus_stays_on_input_without_chats() {
        let mut app = app();
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn test_launch_waits_for_pending_reply() {
        let mut app = app();
        app.input = "Plan a launch".to_string();
        let pending = app.submit_input().unwrap();

        app.launch_campaign();
        assert!(app.manager.is_temporary_chat());
        assert!(!app.manager.has_chat_history());
        assert!(app.status_message.as_deref().unwrap().contains("Wait"));

        answer(&mut app, pending);
        app.launch_campaign();
        let id = app.manager.selected_chat_id().unwrap().clone();
        assert_eq!(app.manager.messages(&id).len(), 2);
        assert_eq!(app.manager.session_id(&id).map(String::as_str), Some("S1"));
    }
}
