//! Infrastructure: transport, dispatch and HTTP adapters.

pub mod http_client;
pub mod messaging;
pub mod websocket;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use http_client::HttpGameApi;
pub use messaging::{ConnectionState, EventBus, MessageRouter};
