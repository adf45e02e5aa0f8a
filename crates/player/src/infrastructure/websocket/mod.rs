//! WebSocket session with the game server
//!
//! - `core`: runtime-free connection state machine and reconnect budget
//! - `session`: `GameSession`, the machine wired to routing, store and buses
//! - `client`: tokio-tungstenite driver behind a cloneable `SessionHandle`
//! - `shared`: endpoint construction and reconnect defaults

mod client;
mod core;
mod session;
pub(crate) mod shared;


pub use client::SessionHandle;
pub use self::core::{BackoffState, Directive, SessionMachine, Step};
pub use session::{GameSession, SessionIdentity};
pub use shared::session_url;
