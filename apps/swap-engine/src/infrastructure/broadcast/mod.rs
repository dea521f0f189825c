//! Status broadcaster: per-order live subscriber channels.
//!
//! Maps order id to one live subscriber channel and pushes lifecycle events
//! to it, best-effort. Events published with no open subscriber are dropped,
//! not queued; the persisted order record is the durable source of truth.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use crate::application::ports::{StatusEvent, StatusPublisherPort};
use crate::domain::shared::OrderId;

/// Best-effort fan-out of order status events to live subscribers.
#[derive(Debug, Default)]
pub struct StatusBroadcaster {
    channels: RwLock<HashMap<String, mpsc::UnboundedSender<StatusEvent>>>,
}

impl StatusBroadcaster {
    /// Create an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a live status channel for one order.
    ///
    /// At most one subscriber per order: a new subscription replaces the
    /// prior one, whose receiver ends immediately.
    #[must_use]
    pub fn subscribe(&self, order_id: &OrderId) -> mpsc::UnboundedReceiver<StatusEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if channels.insert(order_id.to_string(), sender).is_some() {
            tracing::debug!(order_id = %order_id, "replaced existing status subscription");
        }
        receiver
    }

    /// Drop the subscription for an order, if any.
    pub fn unsubscribe(&self, order_id: &OrderId) {
        self.channels
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(order_id.as_str());
    }

    /// Number of open subscriber channels.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    fn remove_if_same(&self, key: &str, dead: &mpsc::UnboundedSender<StatusEvent>) {
        let mut channels = self
            .channels
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // A fresh subscription may have replaced the dead channel in the
        // meantime; only evict the one that actually failed.
        if channels
            .get(key)
            .is_some_and(|sender| sender.same_channel(dead))
        {
            channels.remove(key);
            tracing::debug!(order_id = %key, "removed closed status channel");
        }
    }
}

impl StatusPublisherPort for StatusBroadcaster {
    fn publish(&self, event: StatusEvent) {
        let key = event.order_id.to_string();
        let dead = {
            let channels = self
                .channels
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match channels.get(&key) {
                Some(sender) => sender.send(event).err().map(|_| sender.clone()),
                None => {
                    // No subscriber: the event is dropped by design.
                    tracing::trace!(order_id = %key, "status event dropped, no subscriber");
                    None
                }
            }
        };
        if let Some(sender) = dead {
            self.remove_if_same(&key, &sender);
        }
    }
}
