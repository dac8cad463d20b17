use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

use super::types::{Chat, ChatId, Message, MessageRole, SessionId};

/// Ordered list of chats shown to the user
#[derive(Debug, Default)]
pub struct ChatRegistry {
    chats: Vec<Chat>,
}

impl ChatRegistry {
    /// Insert a chat at the head of the list
    pub fn push_front(&mut self, chat: Chat) {
        self.chats.insert(0, chat);
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.chats.iter().any(|c| &c.id == id)
    }

    pub fn get(&self, id: &ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| &c.id == id)
    }

    pub fn remove(&mut self, id: &ChatId) -> Option<Chat> {
        let index = self.chats.iter().position(|c| &c.id == id)?;
        Some(self.chats.remove(index))
    }

    pub fn first(&self) -> Option<&Chat> {
        self.chats.first()
    }

    pub fn as_slice(&self) -> &[Chat] {
        &self.chats
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Refresh a chat's preview and timestamp. Returns false if unknown.
    pub fn touch(&mut self, id: &ChatId, last_message: String, now: DateTime<Utc>) -> bool {
        match self.chats.iter_mut().find(|c| &c.id == id) {
            Some(chat) => {
                chat.last_message = last_message;
                chat.timestamp = now;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug)]
struct MessageLog {
    messages: Vec<Message>,
    /// Millisecond stamp of the newest message id
    last_stamp: i64,
    /// Changes every time the log is created or reset
    epoch: u64,
}

/// Append-only message sequences, one per chat
#[derive(Debug, Default)]
pub struct MessageStore {
    logs: HashMap<ChatId, MessageLog>,
    next_epoch: u64,
}

impl MessageStore {
    fn fresh_log(&mut self, messages: Vec<Message>, last_stamp: i64) -> MessageLog {
        self.next_epoch += 1;
        MessageLog {
            messages,
            last_stamp,
            epoch: self.next_epoch,
        }
    }

    /// Create an empty entry for a chat if none exists
    pub fn ensure(&mut self, id: &ChatId) {
        if !self.logs.contains_key(id) {
            let log = self.fresh_log(Vec::new(), 0);
            self.logs.insert(id.clone(), log);
        }
    }

    /// Replace a chat's entry with an empty one
    pub fn reset(&mut self, id: &ChatId) {
        let log = self.fresh_log(Vec::new(), 0);
        self.logs.insert(id.clone(), log);
    }

    /// Give `to` a copy of every message in `from`
    pub fn copy(&mut self, from: &ChatId, to: &ChatId) {
        let (messages, last_stamp) = match self.logs.get(from) {
            Some(log) => (log.messages.clone(), log.last_stamp),
            None => (Vec::new(), 0),
        };
        let log = self.fresh_log(messages, last_stamp);
        self.logs.insert(to.clone(), log);
    }

    pub fn remove(&mut self, id: &ChatId) -> bool {
        self.logs.remove(id).is_some()
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.logs.contains_key(id)
    }

    pub fn epoch(&self, id: &ChatId) -> Option<u64> {
        self.logs.get(id).map(|log| log.epoch)
    }

    /// Messages of a chat, empty if the chat has no entry
    pub fn messages(&self, id: &ChatId) -> &[Message] {
        self.logs
            .get(id)
            .map(|log| log.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self, id: &ChatId) -> usize {
        self.messages(id).len()
    }

    /// Content of every message in order
    pub fn history(&self, id: &ChatId) -> Vec<String> {
        self.messages(id).iter().map(|m| m.content.clone()).collect()
    }

    /// Append a message to an existing entry
    ///
    /// Ids are `<chat id>-<unix millis>`; a stamp already used in this chat
    /// is bumped to the next free millisecond.
    pub fn append(
        &mut self,
        id: &ChatId,
        role: MessageRole,
        content: String,
        now: DateTime<Utc>,
    ) -> Option<&Message> {
        let Some(log) = self.logs.get_mut(id) else {
            warn!(chat = %id, "append to a chat without a message entry");
            return None;
        };

        let stamp = now.timestamp_millis().max(log.last_stamp + 1);
        log.last_stamp = stamp;
        log.messages.push(Message {
            id: format!("{}-{}", id, stamp),
            role,
            content,
            timestamp: now,
        });
        log.messages.last()
    }
}

/// Backend session bound to each chat
#[derive(Debug, Default)]
pub struct SessionStore {
    bindings: HashMap<ChatId, SessionId>,
}

impl SessionStore {
    /// Bind a session to a chat. A chat keeps the first session it was given.
    pub fn bind(&mut self, id: &ChatId, session_id: SessionId) -> bool {
        if let Some(existing) = self.bindings.get(id) {
            warn!(chat = %id, %existing, ignored = %session_id, "chat already has a session");
            return false;
        }
        self.bindings.insert(id.clone(), session_id);
        true
    }

    pub fn get(&self, id: &ChatId) -> Option<&SessionId> {
        self.bindings.get(id)
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.bindings.contains_key(id)
    }

    pub fn take(&mut self, id: &ChatId) -> Option<SessionId> {
        self.bindings.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_message_ids_unique_within_chat() {
        let mut store = MessageStore::default();
        let chat = ChatId::new("c1");
        store.ensure(&chat);

        let now = at(1_000);
        store.append(&chat, MessageRole::User, "a".into(), now);
        store.append(&chat, MessageRole::Assistant, "b".into(), now);
        store.append(&chat, MessageRole::User, "c".into(), at(500));

        let ids: Vec<_> = store.messages(&chat).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c1-1000", "c1-1001", "c1-1002"]);
    }

    #[test]
    fn test_append_requires_entry() {
        let mut store = MessageStore::default();
        assert!(store
            .append(&ChatId::new("missing"), MessageRole::User, "x".into(), at(1))
            .is_none());
        assert!(store.messages(&ChatId::new("missing")).is_empty());
    }

    #[test]
    fn test_reset_changes_epoch_and_empties() {
        let mut store = MessageStore::default();
        let chat = ChatId::temporary();
        store.ensure(&chat);
        store.append(&chat, MessageRole::User, "a".into(), at(1));
        let before = store.epoch(&chat);

        store.ensure(&chat);
        assert_eq!(store.epoch(&chat), before);
        assert_eq!(store.len(&chat), 1);

        store.reset(&chat);
        assert_ne!(store.epoch(&chat), before);
        assert_eq!(store.len(&chat), 0);
    }

    #[test]
    fn test_copy_keeps_order_and_stamp() {
        let mut store = MessageStore::default();
        let from = ChatId::temporary();
        let to = ChatId::new("c2");
        store.ensure(&from);
        store.append(&from, MessageRole::User, "a".into(), at(10));
        store.append(&from, MessageRole::Assistant, "b".into(), at(10));

        store.copy(&from, &to);
        assert_eq!(store.history(&to), vec!["a", "b"]);

        let next = store
            .append(&to, MessageRole::User, "c".into(), at(10))
            .unwrap();
        assert_eq!(next.id, "c2-12");
    }

    #[test]
    fn test_registry_order_and_touch() {
        let mut registry = ChatRegistry::default();
        for id in ["a", "b"] {
            registry.push_front(Chat {
                id: ChatId::new(id),
                title: id.into(),
                last_message: String::new(),
                timestamp: at(0),
            });
        }
        assert_eq!(registry.first().unwrap().id, ChatId::new("b"));

        assert!(registry.touch(&ChatId::new("a"), "hi".into(), at(5)));
        assert_eq!(registry.get(&ChatId::new("a")).unwrap().last_message, "hi");
        assert!(!registry.touch(&ChatId::new("zzz"), "hi".into(), at(5)));

        assert!(registry.remove(&ChatId::new("b")).is_some());
        assert!(registry.remove(&ChatId::new("b")).is_none());
        assert_eq!(registry.as_slice().len(), 1);
    }

    #[test]
    fn test_session_bound_once() {
        let mut sessions = SessionStore::default();
        let chat = ChatId::new("c1");
        assert!(sessions.bind(&chat, "S1".into()));
        assert!(!sessions.bind(&chat, "S2".into()));
        assert_eq!(sessions.get(&chat).map(String::as_str), Some("S1"));
        assert_eq!(sessions.take(&chat).as_deref(), Some("S1"));
        assert!(!sessions.contains(&chat));
    }
}
