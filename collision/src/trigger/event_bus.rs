//! Typed publish/subscribe keyed by event name.
//!
//! Subscribers run synchronously, in subscription order. A failing subscriber is
//! not caught: it stops the `post` and its error is returned to the poster.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

pub type SubscriberError = Box<dyn Error + Send + Sync>;
pub type Subscriber<E> = Arc<dyn Fn(&E) -> Result<(), SubscriberError> + Send + Sync>;

/// Anything that can travel on the bus. The name selects the channel.
pub trait BusEvent {
    fn name(&self) -> &str;
}

/// Default event type: a name plus an optional source object name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub name: String,
    pub source: Option<String>,
}

impl GameEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
        }
    }
}

impl BusEvent for GameEvent {
    fn name(&self) -> &str {
        &self.name
    }
}

pub struct EventBus<E = GameEvent> {
    channels: HashMap<String, Vec<Subscriber<E>>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `subscriber` to channel `name`. Keep a clone to unsubscribe later.
    pub fn subscribe(&mut self, name: impl Into<String>, subscriber: Subscriber<E>) {
        self.channels.entry(name.into()).or_default().push(subscriber);
    }

    /// Remove `subscriber` (by identity) from channel `name`. No-op if absent.
    pub fn unsubscribe(&mut self, name: &str, subscriber: &Subscriber<E>) {
        if let Some(subscribers) = self.channels.get_mut(name)
            && let Some(index) = subscribers.iter().position(|s| Arc::ptr_eq(s, subscriber))
        {
            subscribers.remove(index);
        }
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.channels.get(name).map_or(0, Vec::len)
    }

    /// Deliver `event` to every subscriber of its channel.
    ///
    /// Returns how many subscribers ran.
    pub fn post(&self, event: &E) -> Result<usize, SubscriberError> {
        let Some(subscribers) = self.channels.get(event.name()) else {
            return Ok(0);
        };
        for subscriber in subscribers {
            subscriber(event)?;
        }
        Ok(subscribers.len())
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut channels: Vec<_> = self
            .channels
            .iter()
            .map(|(name, subs)| (name.as_str(), subs.len()))
            .collect();
        channels.sort();
        f.debug_struct("EventBus").field("channels", &channels).finish()
    }
}
