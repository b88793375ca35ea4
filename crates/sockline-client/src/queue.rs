//! Pending message queue.
//!
//! Buffers messages that could not be sent because the connection was
//! not open. Owned exclusively by the connection manager; drained in
//! FIFO order on each transition into the open state.

use sockline_core::Message;
use std::collections::VecDeque;

/// Ordered buffer of messages awaiting transmission.
#[derive(Debug, Default)]
pub struct PendingQueue {
    messages: VecDeque<Message>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the back.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// Take a snapshot of the queued messages and clear the queue.
    ///
    /// A message removed here is gone from the queue before its resend
    /// is attempted, so a resend failure re-enqueues it at the back
    /// through the normal send-failure path instead of leaving it in a
    /// half state. Messages enqueued during the resulting flush are
    /// not part of the snapshot and survive for the next one.
    pub fn drain_all(&mut self) -> Vec<Message> {
        self.messages.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
