//! Ballot player client.
//!
//! Session synchronization core for a hidden-role game client: the duplex
//! session with bounded reconnection, typed message dispatch, the
//! authoritative snapshot store, and the local action and visibility rules
//! evaluated against that snapshot.

pub mod application;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod ports;
pub mod state;

pub use application::{check, is_eligible, visible_allies, Ineligible, PlayerAction};
pub use config::{ClientConfig, ReconnectPolicy};
pub use error::ClientError;
pub use infrastructure::messaging::{
    BusEvent, ConnectionState, ConnectionStateObserver, EventBus, LifecycleEvent, LifecycleKind,
    SubscriptionId,
};
pub use infrastructure::websocket::{GameSession, SessionHandle};
pub use state::{GameStateStore, LocalFlags};
