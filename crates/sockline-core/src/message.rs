//! The message type exchanged over the WebSocket connection.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Message kind used for the authorization handshake.
///
/// The server is expected to validate the token carried in `content`
/// before trusting the connection.
pub const AUTHORIZATION_KIND: &str = "authorization";

/// A single unit of communication.
///
/// `kind` identifies how the message should be handled on the remote
/// side (chat message, sync notification, ...); `content` is the
/// payload and is opaque to the connection manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Purpose/routing tag. Never empty in valid usage.
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload, opaque to the transport layer.
    pub content: String,
    /// Send time in epoch milliseconds. Filled in at send time if
    /// absent; never overwritten once set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Message {
    /// Create a message with no timestamp (stamped on send).
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    /// Create the authorization handshake message for a token.
    ///
    /// Stamped at construction so it is wire-ready immediately.
    pub fn authorization(token: impl Into<String>) -> Self {
        Self {
            kind: AUTHORIZATION_KIND.to_string(),
            content: token.into(),
            timestamp: Some(now_ms()),
        }
    }

    /// Set the timestamp if it is not already set.
    ///
    /// A pre-set timestamp is preserved exactly.
    pub fn stamp_timestamp(&mut self, now_ms: i64) {
        if self.timestamp.is_none() {
            self.timestamp = Some(now_ms);
        }
    }

    /// Check whether this message is the authorization handshake.
    pub fn is_authorization(&self) -> bool {
        self.kind == AUTHORIZATION_KIND
    }
}

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_has_no_timestamp() {
        let msg = Message::new("chat", "hello");
        assert_eq!(msg.kind, "chat");
        assert_eq!(msg.content, "hello");
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn test_stamp_fills_missing_timestamp() {
        let mut msg = Message::new("chat", "hello");
        msg.stamp_timestamp(1234);
        assert_eq!(msg.timestamp, Some(1234));
    }

    #[test]
    fn test_stamp_preserves_existing_timestamp() {
        let mut msg = Message::new("chat", "hello");
        msg.timestamp = Some(42);
        msg.stamp_timestamp(1234);
        assert_eq!(msg.timestamp, Some(42));
    }

    #[test]
    fn test_authorization_message() {
        let msg = Message::authorization("tok1");
        assert!(msg.is_authorization());
        assert_eq!(msg.content, "tok1");
        assert!(msg.timestamp.is_some());
    }
}
