//! Publish/subscribe channel for configuration changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::sync::{ConfigurationSnapshot, Section};

/// Capacity of the async event stream before slow receivers lag.
const STREAM_CAPACITY: usize = 64;

/// Kinds of events a subscriber can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConfigSaved,
    MenuSaved,
}

/// A configuration change notification.
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// Site or appearance settings were saved (or failed to save).
    ConfigSaved {
        snapshot: Arc<ConfigurationSnapshot>,
        success: bool,
        failed_sections: Vec<Section>,
    },
    /// The menu was saved. Listeners re-pull the menu themselves.
    MenuSaved,
}

impl ConfigEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ConfigSaved { .. } => EventKind::ConfigSaved,
            Self::MenuSaved => EventKind::MenuSaved,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&ConfigEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

/// Fan-out event bus owned by a sync engine.
///
/// Delivery is synchronous to callback subscribers and buffered for
/// stream subscribers. Nothing is replayed: a subscriber only sees events
/// published after it subscribed.
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
    stream: broadcast::Sender<ConfigEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (stream, _) = broadcast::channel(STREAM_CAPACITY);
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            stream,
        }
    }

    /// Call `handler` for every future event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber {
            id,
            kind,
            handler: Arc::new(handler),
        });
        debug!("Subscriber {:?} attached to {:?}", id, kind);
        id
    }

    /// Detach a subscriber. Returns `false` if it was not attached.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }

    /// Receive every future event as an async stream.
    pub fn subscribe_stream(&self) -> broadcast::Receiver<ConfigEvent> {
        self.stream.subscribe()
    }

    /// Deliver `event` to every matching subscriber.
    ///
    /// Returns how many callback subscribers were called.
    pub fn publish(&self, event: ConfigEvent) -> usize {
        let kind = event.kind();

        // Handlers run outside the lock so they may subscribe or unsubscribe.
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        for handler in &handlers {
            handler(&event);
        }

        // No stream receivers is fine
        let _ = self.stream.send(event);

        debug!("Published {:?} to {} subscribers", kind, handlers.len());
        handlers.len()
    }

    /// Number of callback subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Drop every callback subscriber.
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("stream_receivers", &self.stream.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn config_saved() -> ConfigEvent {
        ConfigEvent::ConfigSaved {
            snapshot: Arc::new(ConfigurationSnapshot::default()),
            success: true,
            failed_sections: Vec::new(),
        }
    }

    #[test]
    fn test_fan_out_by_kind() {
        let bus = EventBus::new();
        let config_hits = Arc::new(AtomicUsize::new(0));
        let menu_hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let hits = Arc::clone(&config_hits);
            bus.subscribe(EventKind::ConfigSaved, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        let hits = Arc::clone(&menu_hits);
        bus.subscribe(EventKind::MenuSaved, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(config_saved()), 2);
        assert_eq!(config_hits.load(Ordering::SeqCst), 2);
        assert_eq!(menu_hits.load(Ordering::SeqCst), 0);

        assert_eq!(bus.publish(ConfigEvent::MenuSaved), 1);
        assert_eq!(menu_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = bus.subscribe(EventKind::MenuSaved, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(ConfigEvent::MenuSaved);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(ConfigEvent::MenuSaved), 0);
    }

    #[tokio::test]
    async fn test_late_stream_subscriber_sees_no_replay() {
        let bus = EventBus::new();
        bus.publish(ConfigEvent::MenuSaved);

        let mut rx = bus.subscribe_stream();
        assert!(rx.try_recv().is_err());

        bus.publish(config_saved());
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), EventKind::ConfigSaved);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself() {
        let bus = Arc::new(EventBus::new());
        let slot: Arc<parking_lot::Mutex<Option<SubscriptionId>>> = Arc::default();

        let inner_bus = Arc::clone(&bus);
        let inner_slot = Arc::clone(&slot);
        let id = bus.subscribe(EventKind::MenuSaved, move |_| {
            if let Some(id) = *inner_slot.lock() {
                inner_bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        bus.publish(ConfigEvent::MenuSaved);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
