//! Resilient client-side WebSocket connection manager.
//!
//! Provides robust WebSocket connectivity with:
//! - Automatic reconnection with a fixed, bounded retry policy
//! - Message buffering while disconnected, flushed in order on reconnect
//! - An authorization handshake sent as soon as the connection opens
//! - A publish/subscribe interface for inbound messages
//!
//! The [`ConnectionManager`] owns the connection lifecycle; cloneable
//! [`WsHandle`]s give the rest of the application a fire-and-forget
//! send path and subscription registration.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod queue;
pub mod registry;

pub use client::WsHandle;
pub use config::ClientConfig;
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{WsError, WsResult};
pub use queue::PendingQueue;
pub use registry::{SubscriberRegistry, SubscriptionId};

pub use sockline_core::{Message, AUTHORIZATION_KIND};
