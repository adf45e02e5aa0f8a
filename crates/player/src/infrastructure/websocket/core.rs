//! Platform-agnostic connection state machine.
//!
//! This is deliberately free of any runtime dependencies (no tokio, no
//! sockets, no timers). The driver owns the actual transport and retry timer,
//! feeds transport happenings into [`SessionMachine`], and carries out the
//! [`Directive`]s it returns. Lifecycle events come back alongside so the
//! caller can publish them after the transition is complete.

use std::time::Duration;

use url::Url;

use crate::config::ReconnectPolicy;
use crate::infrastructure::messaging::{ConnectionState, LifecycleEvent};

/// Fixed-delay retry budget shared by reconnect logic.
#[derive(Debug, Clone, Copy)]
pub struct BackoffState {
    attempts: u32,
    policy: ReconnectPolicy,
}

impl BackoffState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            attempts: 0,
            policy,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Advance to the next attempt.
    ///
    /// Returns the attempt number and the delay to wait before performing it,
    /// or `None` when the budget is spent.
    pub fn next_delay_and_advance(&mut self) -> Option<(u32, Duration)> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.policy.delay))
    }
}

/// Side effect the driver must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Start a transport handshake; report `opened` or `closed` back
    OpenTransport(Url),
    /// Close the current transport or abandon the handshake in flight
    CloseTransport,
    /// Arm the retry timer; report `retry_elapsed(attempt)` when it fires
    ScheduleRetry { attempt: u32, delay: Duration },
    /// Drop the retry timer
    CancelRetry,
    /// Send a text frame on the open transport
    Transmit(String),
}

/// Result of one transition.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub directives: Vec<Directive>,
    pub events: Vec<LifecycleEvent>,
}

impl Step {
    fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    fn event(mut self, event: LifecycleEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Chain another step after this one.
    pub fn then(mut self, other: Step) -> Self {
        self.directives.extend(other.directives);
        self.events.extend(other.events);
        self
    }
}

/// Connection lifecycle with bounded, fixed-delay reconnection.
///
/// ```text
/// Idle -> Connecting -> Open
///           ^   |         |
///           |   +- close -+-> Reconnecting(n) -- timer --> Connecting
///           |                      |
///           |                      +- budget spent --> Failed
///           +---------- connect() from Idle or Failed
/// ```
#[derive(Debug)]
pub struct SessionMachine {
    state: ConnectionState,
    backoff: BackoffState,
    target: Option<Url>,
}

impl SessionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ConnectionState::Idle,
            backoff: BackoffState::new(policy),
            target: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current retry attempt; zero unless reconnecting.
    pub fn attempt(&self) -> u32 {
        self.backoff.attempts()
    }

    pub fn target(&self) -> Option<&Url> {
        self.target.as_ref()
    }

    /// Start a session against `url`, tearing down any active one first.
    pub fn connect(&mut self, url: Url) -> Step {
        let teardown = if self.state.accepts_fresh_connect() {
            Step::default()
        } else {
            self.disconnect()
        };

        self.state = ConnectionState::Connecting;
        self.backoff.reset();
        self.target = Some(url.clone());
        teardown.directive(Directive::OpenTransport(url))
    }

    /// The handshake completed.
    pub fn opened(&mut self) -> Step {
        if self.state != ConnectionState::Connecting {
            tracing::debug!(state = ?self.state, "Ignoring transport open outside a handshake");
            return Step::default().directive(Directive::CloseTransport);
        }
        self.state = ConnectionState::Open;
        self.backoff.reset();
        Step::default().event(LifecycleEvent::Connected)
    }

    /// The transport reported an error. The session stays up; a close follows
    /// if the transport is actually gone.
    pub fn transport_error(&mut self, message: impl Into<String>) -> Step {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                Step::default().event(LifecycleEvent::Error {
                    message: message.into(),
                })
            }
            _ => Step::default(),
        }
    }

    /// The transport closed or the handshake failed, without us asking.
    pub fn closed(&mut self) -> Step {
        if !matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            return Step::default();
        }

        let step = Step::default().event(LifecycleEvent::Disconnected);
        match self.backoff.next_delay_and_advance() {
            Some((attempt, delay)) => {
                self.state = ConnectionState::Reconnecting;
                step.directive(Directive::ScheduleRetry { attempt, delay })
                    .event(LifecycleEvent::Reconnecting { attempt, delay })
            }
            None => {
                self.state = ConnectionState::Failed;
                self.target = None;
                step.event(LifecycleEvent::ReconnectFailed)
            }
        }
    }

    /// The retry timer for `attempt` fired. Stale timers are ignored.
    pub fn retry_elapsed(&mut self, attempt: u32) -> Step {
        let current = self.state == ConnectionState::Reconnecting
            && attempt == self.backoff.attempts();
        match (&self.target, current) {
            (Some(url), true) => {
                let url = url.clone();
                self.state = ConnectionState::Connecting;
                Step::default().directive(Directive::OpenTransport(url))
            }
            _ => {
                tracing::debug!(attempt, state = ?self.state, "Ignoring stale retry timer");
                Step::default()
            }
        }
    }

    /// Intentional teardown. Idempotent.
    pub fn disconnect(&mut self) -> Step {
        let step = match self.state {
            ConnectionState::Open => Step::default()
                .directive(Directive::CloseTransport)
                .event(LifecycleEvent::Disconnected),
            ConnectionState::Connecting => Step::default().directive(Directive::CloseTransport),
            ConnectionState::Reconnecting => Step::default().directive(Directive::CancelRetry),
            ConnectionState::Idle | ConnectionState::Failed => Step::default(),
        };
        self.state = ConnectionState::Idle;
        self.backoff.reset();
        self.target = None;
        step
    }
}
