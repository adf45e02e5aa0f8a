//! Event Bus for fanning out typed events to subscribers.
//!
//! One generic registry backs every subscription surface in the crate: game
//! messages from the server, connection lifecycle events, and store
//! notifications. Subscribers register a callback for one event kind and are
//! invoked synchronously, in registration order, when an event of that kind is
//! published.

use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An event that can be routed by kind.
pub trait BusEvent {
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Token returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

struct Registration<E: BusEvent> {
    kind: E::Kind,
    id: SubscriptionId,
    handler: Handler<E>,
}

struct Registry<E: BusEvent> {
    next_id: u64,
    entries: Vec<Registration<E>>,
}

/// Event bus keyed by event kind.
///
/// Cloning yields another handle to the same registry. Handlers are cloned out
/// of the registry before they run, so a handler may subscribe, unsubscribe or
/// publish without deadlocking.
pub struct EventBus<E: BusEvent> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Create a new EventBus with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry<E>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to one event kind.
    pub fn subscribe(
        &self,
        kind: E::Kind,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut registry = self.registry();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push(Registration {
            kind,
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered under `kind`.
    pub fn unsubscribe(&self, kind: E::Kind, id: SubscriptionId) -> bool {
        let mut registry = self.registry();
        let before = registry.entries.len();
        registry
            .entries
            .retain(|entry| !(entry.kind == kind && entry.id == id));
        registry.entries.len() != before
    }

    /// Deliver an event to every handler registered for its kind.
    ///
    /// A panicking handler is logged and skipped; delivery continues with the
    /// next one. Returns the number of handlers that completed.
    pub fn publish(&self, event: &E) -> usize {
        let kind = event.kind();
        let handlers: Vec<Handler<E>> = self
            .registry()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Arc::clone(&entry.handler))
            .collect();

        let mut delivered = 0;
        for handler in handlers {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    tracing::error!(
                        kind = ?kind,
                        panic = panic_message(payload.as_ref()),
                        "Event handler panicked"
                    );
                }
            }
        }
        delivered
    }

    /// Get the number of subscribers for one kind.
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.registry()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Clear all subscribers.
    pub fn clear(&self) {
        self.registry().entries.clear();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
