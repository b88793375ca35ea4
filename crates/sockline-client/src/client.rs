//! Client facade for the connection manager.
//!
//! A cheap, cloneable handle exposing the public surface: send a
//! message, subscribe to inbound messages, and read whether the
//! connection is currently open.

use crate::connection::ConnectionState;
use crate::registry::{SubscriberRegistry, SubscriptionId};
use parking_lot::RwLock;
use sockline_core::{message::now_ms, Message};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Handle for interacting with a running `ConnectionManager`.
///
/// All operations are fire-and-forget and never block: connectivity
/// problems surface through logs and through `connection_open`, never
/// as errors from `send`.
#[derive(Clone)]
pub struct WsHandle {
    outbound_tx: mpsc::UnboundedSender<Message>,
    state: Arc<RwLock<ConnectionState>>,
    registry: Arc<SubscriberRegistry>,
}

impl WsHandle {
    pub(crate) fn new(
        outbound_tx: mpsc::UnboundedSender<Message>,
        state: Arc<RwLock<ConnectionState>>,
        registry: Arc<SubscriberRegistry>,
    ) -> Self {
        Self {
            outbound_tx,
            state,
            registry,
        }
    }

    /// Send a message to the server.
    ///
    /// The timestamp is stamped with the current time if absent and
    /// never overwritten. If the connection is not open the message is
    /// buffered and resent, in order, on the next open; if the manager
    /// has been torn down the message is dropped with a warning.
    pub fn send(&self, mut message: Message) {
        message.stamp_timestamp(now_ms());
        if self.outbound_tx.send(message).is_err() {
            warn!("connection manager is gone, message dropped");
        }
    }

    /// Register a callback for inbound messages, optionally filtered
    /// by message kind. Returns a token for `unsubscribe`.
    pub fn subscribe<F>(&self, callback: F, kind_filters: Option<Vec<String>>) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.registry.subscribe(callback, kind_filters)
    }

    /// Remove a registration. Idempotent.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.unsubscribe(id);
    }

    /// Whether the connection is currently open.
    pub fn connection_open(&self) -> bool {
        *self.state.read() == ConnectionState::Open
    }
}
