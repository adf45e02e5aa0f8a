//! Event Bus messaging infrastructure.
//!
//! - `EventBus`: generic kind-keyed publish/subscribe registry
//! - `connection`: connection state and lifecycle events
//! - `MessageRouter`: decodes inbound frames, updates the store, publishes
//!
//! The websocket session connects these to the actual transport.

pub mod connection;
pub mod event_bus;
pub mod router;

pub use connection::{ConnectionState, ConnectionStateObserver, LifecycleEvent, LifecycleKind};
pub use event_bus::{BusEvent, EventBus, SubscriptionId};
pub use router::{MessageRouter, RouteOutcome};
