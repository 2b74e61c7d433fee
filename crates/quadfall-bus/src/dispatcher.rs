//! The topic table and synchronous publish.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// One published event, as seen by a handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<P> {
    pub topic: String,
    pub payload: P,
}

/// Something that reacts to events on a topic.
///
/// The dispatcher passes itself into `handle`, so a handler can publish
/// follow-up events without owning an `Arc` back to the dispatcher.
///
/// Any `Fn(&Dispatcher<P>, &Event<P>)` closure is a handler too:
///
/// ```rust
/// use quadfall_bus::{Dispatcher, Event};
///
/// let bus: Dispatcher<u32> = Dispatcher::new();
/// bus.subscribe_fn("ping", |bus: &Dispatcher<u32>, event: &Event<u32>| {
///     bus.publish("pong", event.payload + 1);
/// });
/// bus.publish("ping", 1);
/// ```
pub trait Handler<P>: Send + Sync {
    fn handle(&self, bus: &Dispatcher<P>, event: &Event<P>);
}

impl<P, F> Handler<P> for F
where
    F: Fn(&Dispatcher<P>, &Event<P>) + Send + Sync,
{
    fn handle(&self, bus: &Dispatcher<P>, event: &Event<P>) {
        self(bus, event)
    }
}

type HandlerList<P> = Vec<Arc<dyn Handler<P>>>;

/// Maps topic names to ordered handler lists.
///
/// ## Delivery rules
///
/// - Handlers run synchronously on the publisher's thread, in the order
///   they subscribed.
/// - Publishing to a topic nobody subscribed to does nothing.
/// - The handler list is copied out before any handler runs, and the lock
///   is released first. A handler may publish or subscribe re-entrantly;
///   a handler subscribed mid-publish sees only later events.
///
/// Share one instance between tasks with `Arc<Dispatcher<P>>`.
pub struct Dispatcher<P> {
    topics: RwLock<HashMap<String, HandlerList<P>>>,
}

impl<P> Dispatcher<P> {
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Appends `handler` to the list for `topic`.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Arc<dyn Handler<P>>) {
        let topic = topic.into();
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let list = topics.entry(topic.clone()).or_default();
        list.push(handler);
        tracing::debug!(topic, handlers = list.len(), "handler subscribed");
    }

    /// Subscribes a closure.
    pub fn subscribe_fn<F>(&self, topic: impl Into<String>, f: F)
    where
        F: Fn(&Dispatcher<P>, &Event<P>) + Send + Sync + 'static,
        P: 'static,
    {
        self.subscribe(topic, Arc::new(f));
    }

    /// Delivers `payload` to every handler currently subscribed to `topic`.
    pub fn publish(&self, topic: &str, payload: P) {
        let handlers = {
            let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
            match topics.get(topic) {
                Some(list) => list.clone(),
                None => {
                    tracing::trace!(topic, "no subscribers");
                    return;
                }
            }
        };

        let event = Event {
            topic: topic.to_owned(),
            payload,
        };
        for handler in &handlers {
            handler.handle(self, &event);
        }
    }

    /// Number of handlers subscribed to `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl<P> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (topic, list) in topics.iter() {
            map.entry(topic, &list.len());
        }
        map.finish()
    }
}
