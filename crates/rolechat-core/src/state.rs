//! UI-agnostic chat state types
//!
//! Messages live only in the in-memory log of a [`crate::ChatSession`]; they
//! are never written to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque unique token identifying a message within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The role of a chat message sender, named the way the Gemini API names turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// A chat message in the conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_loading: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            is_loading: false,
        }
    }

    /// Provisional model message shown while a reply is pending
    pub fn placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Model,
            content: String::new(),
            timestamp: Utc::now(),
            is_loading: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_is_loading_model_turn() {
        let msg = Message::placeholder();
        assert_eq!(msg.role, MessageRole::Model);
        assert!(msg.is_loading);
        assert!(msg.content.is_empty());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::Model).unwrap(), "\"model\"");
        assert_eq!(MessageRole::User.as_str(), "user");
    }
}
