//! Wire codec for messages.
//!
//! Messages travel as UTF-8 text frames, each frame the JSON encoding
//! of exactly one `Message` with fields `type`, `content`, `timestamp`.

use crate::error::{CodecError, Result};
use crate::message::Message;

/// Encode a message for the wire.
///
/// The timestamp must already be set; the send path stamps messages
/// before they reach the codec, so `MissingTimestamp` indicates a bug
/// in the caller rather than an expected runtime condition.
pub fn encode(message: &Message) -> Result<String> {
    if message.timestamp.is_none() {
        return Err(CodecError::MissingTimestamp);
    }
    Ok(serde_json::to_string(message)?)
}

/// Decode one inbound text frame into a message.
pub fn decode(frame: &str) -> Result<Message> {
    Ok(serde_json::from_str(frame)?)
}
