//! Connection lifecycle management.
//!
//! This module provides the connection state shared with observers and the
//! lifecycle events published as the session moves between states.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::event_bus::BusEvent;

/// Connection state for the game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session; `connect` has not been called or the session was torn down
    Idle,
    /// Transport handshake in flight
    Connecting,
    /// Transport open, frames flowing
    Open,
    /// Connection lost, waiting to retry
    Reconnecting,
    /// Retries exhausted; only an explicit `connect` leaves this state
    Failed,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Idle => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Reconnecting => 3,
            ConnectionState::Failed => 4,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Failed,
            _ => ConnectionState::Idle,
        }
    }

    /// Whether `connect` may start a session without tearing one down first.
    pub fn accepts_fresh_connect(self) -> bool {
        matches!(self, ConnectionState::Idle | ConnectionState::Failed)
    }
}

/// Lifecycle event published on the connection bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Connected,
    Disconnected,
    /// Transport error; the session stays up and the close path handles recovery
    Error { message: String },
    /// A retry is scheduled
    Reconnecting { attempt: u32, delay: Duration },
    /// Retry budget exhausted; terminal until the next `connect`
    ReconnectFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    Connected,
    Disconnected,
    Error,
    Reconnecting,
    ReconnectFailed,
}

impl BusEvent for LifecycleEvent {
    type Kind = LifecycleKind;

    fn kind(&self) -> LifecycleKind {
        match self {
            LifecycleEvent::Connected => LifecycleKind::Connected,
            LifecycleEvent::Disconnected => LifecycleKind::Disconnected,
            LifecycleEvent::Error { .. } => LifecycleKind::Error,
            LifecycleEvent::Reconnecting { .. } => LifecycleKind::Reconnecting,
            LifecycleEvent::ReconnectFailed => LifecycleKind::ReconnectFailed,
        }
    }
}

/// Observable connection state for UI binding.
///
/// Multiple observers can share the same underlying state; the session is the
/// only writer.
#[derive(Clone, Debug, Default)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
    attempt: Arc<AtomicU32>,
}

impl ConnectionStateObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Retry attempt counter; zero while open or idle.
    pub fn reconnect_attempt(&self) -> u32 {
        self.attempt.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, state: ConnectionState, attempt: u32) {
        self.attempt.store(attempt, Ordering::SeqCst);
        self.state.store(state.to_u8(), Ordering::SeqCst);
    }
}
