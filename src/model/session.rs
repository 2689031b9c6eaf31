//! Conversation sessions and their message history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Title given to every freshly created session
pub const DEFAULT_SESSION_TITLE: &str = "New Conversation";

/// Stable session identifier, never reused once assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Assistant reply still being filled in by the compose collaborator
    #[serde(default)]
    pub streaming: bool,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            streaming: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// First fragment of an assistant reply that is still arriving
    pub fn streaming_reply(content: impl Into<String>) -> Self {
        Self {
            streaming: true,
            ..Self::assistant(content)
        }
    }
}

/// One independent conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh empty session with a new id
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Bump `last_updated_at`; called by every session mutation
    pub(crate) fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }

    /// Append at the end of the history, returning the message position
    pub(crate) fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.touch();
        self.messages.len() - 1
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.touch();
    }

    /// Position of the reply currently streaming in, if any
    pub fn streaming_position(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.streaming)
    }

    /// Mark replies cut off by a previous exit as complete; true if any were
    pub(crate) fn settle_streaming(&mut self) -> bool {
        let mut settled = false;
        for message in self.messages.iter_mut().filter(|m| m.streaming) {
            message.streaming = false;
            settled = true;
        }
        settled
    }

    /// Last message content, for the sidebar preview line
    pub fn preview(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_have_distinct_ids() {
        let a = Session::new();
        let b = Session::new();
        assert_ne!(a.id, b.id);
        assert!(a.is_empty());
        assert_eq!(a.title, DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn push_keeps_insertion_order_and_touches() {
        let mut session = Session::new();
        let before = session.last_updated_at;
        assert_eq!(session.push(Message::user("first")), 0);
        assert_eq!(session.push(Message::assistant("second")), 1);
        let contents: Vec<_> = session.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert!(session.last_updated_at >= before);
        assert_eq!(session.preview(), Some("second"));
    }

    #[test]
    fn streaming_position_finds_open_reply() {
        let mut session = Session::new();
        session.push(Message::user("hi"));
        assert_eq!(session.streaming_position(), None);
        session.push(Message::streaming_reply("hel"));
        assert_eq!(session.streaming_position(), Some(1));

        assert!(session.settle_streaming());
        assert_eq!(session.streaming_position(), None);
        assert!(!session.settle_streaming());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let session = Session::new();
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastUpdatedAt").is_some());
    }
}
