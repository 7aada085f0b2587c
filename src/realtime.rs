//! Topic-based realtime messaging
//!
//! Callers subscribe to a topic with a callback; each published message body
//! is decoded from JSON once and handed to every subscriber of that topic.
//! Dropping the returned [`Subscription`] unsubscribes.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, warn};

/// Subscriber callback, receives the decoded message body
pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

type Topics = HashMap<String, Vec<(u64, Callback)>>;

/// Publish/subscribe channel keyed by topic string
pub trait RealtimeChannel: Send + Sync {
    fn subscribe(&self, topic: &str, callback: Callback) -> Subscription;
}

/// Live subscription handle
pub struct Subscription {
    id: u64,
    topic: String,
    topics: Weak<Mutex<Topics>>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Same as dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(topics) = self.topics.upgrade() else {
            return;
        };
        let Ok(mut topics) = topics.lock() else {
            return;
        };
        if let Some(subscribers) = topics.get_mut(&self.topic) {
            subscribers.retain(|(id, _)| *id != self.id);
            if subscribers.is_empty() {
                topics.remove(&self.topic);
            }
        }
        debug!("Unsubscribed {} from {}", self.id, self.topic);
    }
}

/// In-process channel
#[derive(Default)]
pub struct LocalChannel {
    topics: Arc<Mutex<Topics>>,
    next_id: AtomicU64,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `body` to every subscriber of `topic`. Returns the number of
    /// callbacks invoked; a body that is not valid JSON is dropped.
    pub fn publish(&self, topic: &str, body: &str) -> usize {
        let message: Value = match serde_json::from_str(body) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping malformed message on {}: {}", topic, e);
                return 0;
            }
        };

        // Callbacks run without the lock held so they may subscribe or drop
        // their own subscriptions
        let callbacks: Vec<Callback> = match self.topics.lock() {
            Ok(topics) => topics
                .get(topic)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default(),
            Err(_) => {
                warn!("Realtime channel lock poisoned, dropping message on {}", topic);
                return 0;
            }
        };

        for callback in &callbacks {
            callback(&message);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .map(|topics| topics.get(topic).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl RealtimeChannel for LocalChannel {
    fn subscribe(&self, topic: &str, callback: Callback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.topics.lock() {
            Ok(mut topics) => {
                topics.entry(topic.to_string()).or_default().push((id, callback));
                debug!("Subscribed {} to {}", id, topic);
            }
            Err(_) => warn!(
                "Realtime channel lock poisoned, subscription {} to {} will receive nothing",
                id, topic
            ),
        }
        Subscription {
            id,
            topic: topic.to_string(),
            topics: Arc::downgrade(&self.topics),
        }
    }
}
