//! In-process publish/subscribe.
//!
//! Subscribers are plain callbacks keyed by event name. `publish` runs them
//! synchronously on the caller's task, in subscription order, over a snapshot
//! of the listener list taken when the publish starts. Callbacks may subscribe
//! or unsubscribe re-entrantly; the change applies to the next publish.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, error};

use crate::error::ClientError;

/// A subscriber callback. Returning `Err` counts as a delivery failure.
pub type Callback<P> = Arc<dyn Fn(&P) -> anyhow::Result<()> + Send + Sync>;

/// What `publish` does when a subscriber fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Log the failure and keep delivering to the remaining subscribers.
    Isolate,
    /// Stop at the first failure and return it to the publisher.
    FailFast,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: String,
    id: u64,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Outcome of a single `publish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

struct Listener<P> {
    id: u64,
    callback: Callback<P>,
}

pub struct EventBus<P = Value> {
    name: &'static str,
    policy: DeliveryPolicy,
    listeners: Mutex<HashMap<String, Vec<Listener<P>>>>,
    next_id: AtomicU64,
}

impl<P> EventBus<P> {
    /// `name` only labels log lines.
    pub fn new(name: &'static str, policy: DeliveryPolicy) -> Self {
        Self {
            name,
            policy,
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `callback` for `event`. Delivery order is registration order.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let event = event.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .entry(event.clone())
            .or_default()
            .push(Listener { id, callback: Arc::new(callback) });
        debug!(bus = self.name, event = %event, id, "Subscribed");
        Subscription { event, id }
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut listeners = self.lock();
        let Some(list) = listeners.get_mut(&subscription.event) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != subscription.id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&subscription.event);
        }
        removed
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Deliver `payload` to every subscriber of `event`.
    ///
    /// Under [`DeliveryPolicy::FailFast`] the first failing subscriber aborts
    /// the publish and its error is returned; under
    /// [`DeliveryPolicy::Isolate`] this never returns `Err`.
    pub fn publish(&self, event: &str, payload: &P) -> Result<Delivery, ClientError> {
        let snapshot: Vec<Callback<P>> = match self.lock().get(event) {
            Some(list) => list.iter().map(|l| Arc::clone(&l.callback)).collect(),
            None => return Ok(Delivery::default()),
        };

        debug!(bus = self.name, event, subscribers = snapshot.len(), "Publishing event");

        let mut delivery = Delivery::default();
        for callback in snapshot {
            match callback(payload) {
                Ok(()) => delivery.delivered += 1,
                Err(e) => match self.policy {
                    DeliveryPolicy::Isolate => {
                        error!(bus = self.name, event, error = %e, "Subscriber failed");
                        delivery.failed += 1;
                    }
                    DeliveryPolicy::FailFast => {
                        return Err(ClientError::Subscriber { event: event.to_string(), source: e });
                    }
                },
            }
        }
        Ok(delivery)
    }

    // Callbacks never run under this lock, so poisoning can only come from a
    // panic inside the bookkeeping above; the map is still consistent then.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener<P>>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
