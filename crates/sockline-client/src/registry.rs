//! Subscriber registry for inbound message dispatch.
//!
//! Holds callback registrations, each optionally filtered by message
//! kind, and fans every decoded inbound message out to the matching
//! ones. Shared between the client facade (which registers) and the
//! connection manager (which dispatches).

use parking_lot::Mutex;
use sockline_core::Message;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token identifying one registration. Returned by `subscribe` and
/// passed to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn Fn(&Message) + Send + Sync>;

struct Subscriber {
    id: u64,
    /// `None` matches every message; otherwise the message kind must
    /// be a member of the list.
    kind_filters: Option<Vec<String>>,
    callback: Callback,
}

impl Subscriber {
    fn matches(&self, message: &Message) -> bool {
        match &self.kind_filters {
            None => true,
            Some(filters) => filters.iter().any(|f| f == &message.kind),
        }
    }
}

/// Set of callback registrations invoked on every inbound message.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, optionally filtered by message kind.
    pub fn subscribe<F>(&self, callback: F, kind_filters: Option<Vec<String>>) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Arc::new(Subscriber {
            id,
            kind_filters,
            callback: Box::new(callback),
        }));
        SubscriptionId(id)
    }

    /// Remove a registration. Safe to call more than once; removing an
    /// unknown token is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|s| s.id != id.0);
    }

    /// Invoke every matching callback for one inbound message,
    /// synchronously and in registration order.
    pub fn dispatch(&self, message: &Message) {
        // Snapshot so callbacks may subscribe/unsubscribe re-entrantly
        // without deadlocking on the registry lock.
        let subscribers: Vec<Arc<Subscriber>> = self.subscribers.lock().iter().cloned().collect();
        for subscriber in subscribers {
            if subscriber.matches(message) {
                (subscriber.callback)(message);
            }
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}
