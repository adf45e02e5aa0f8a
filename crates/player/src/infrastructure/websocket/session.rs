//! One game connection: state machine, routing, store and subscriber surfaces.
//!
//! `GameSession` performs no I/O. Every method returns the [`Directive`]s the
//! driver must carry out; lifecycle events and store updates have already been
//! published by the time the method returns.

use ballot_shared::{ClientMessage, GameSnapshot, ServerMessage};

use super::core::{Directive, SessionMachine, Step};
use super::shared::session_url;
use crate::application::{check, ChoiceError, ExecutiveChoice, Ineligible, PlayerAction};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::infrastructure::messaging::{
    ConnectionState, ConnectionStateObserver, EventBus, LifecycleEvent, MessageRouter,
    RouteOutcome,
};
use crate::state::GameStateStore;

/// Who this session is connected as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub game_id: String,
    pub player_name: String,
}

pub struct GameSession {
    config: ClientConfig,
    machine: SessionMachine,
    router: MessageRouter,
    lifecycle: EventBus<LifecycleEvent>,
    store: GameStateStore,
    observer: ConnectionStateObserver,
    identity: Option<SessionIdentity>,
}

impl GameSession {
    pub fn new(config: ClientConfig) -> Self {
        let store = GameStateStore::new();
        Self {
            machine: SessionMachine::new(config.reconnect),
            router: MessageRouter::new(EventBus::new(), store.clone()),
            lifecycle: EventBus::new(),
            store,
            observer: ConnectionStateObserver::new(),
            identity: None,
            config,
        }
    }

    /// Typed server messages, published after the store has been updated.
    pub fn messages(&self) -> &EventBus<ServerMessage> {
        self.router.bus()
    }

    pub fn lifecycle(&self) -> &EventBus<LifecycleEvent> {
        &self.lifecycle
    }

    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    pub fn observer(&self) -> &ConnectionStateObserver {
        &self.observer
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Latest authoritative snapshot.
    pub fn snapshot(&self) -> Option<std::sync::Arc<GameSnapshot>> {
        self.store.current()
    }

    /// Open a session for `player_name` in `game_id`.
    ///
    /// Any active session is torn down first. On an invalid endpoint nothing
    /// changes.
    pub fn connect(
        &mut self,
        game_id: &str,
        player_name: &str,
    ) -> Result<Vec<Directive>, ClientError> {
        let url = session_url(
            &self.config.ws_host,
            self.config.secure,
            game_id,
            player_name,
        )?;

        tracing::info!(game_id = %game_id, player = %player_name, url = %url, "Connecting");
        let step = self.machine.connect(url);
        self.identity = Some(SessionIdentity {
            game_id: game_id.to_string(),
            player_name: player_name.to_string(),
        });
        self.store.bind_viewer(player_name);
        Ok(self.finish(step))
    }

    /// The transport finished its handshake. Takes a seat with `join_game`.
    pub fn handle_open(&mut self) -> Vec<Directive> {
        let mut step = self.machine.opened();
        if step.events.contains(&LifecycleEvent::Connected) {
            let join = ClientMessage::JoinGame {};
            match join.to_frame() {
                Ok(frame) => step.directives.push(Directive::Transmit(frame)),
                Err(e) => tracing::error!(error = %e, "Failed to encode join_game"),
            }
        }
        self.finish(step)
    }

    /// Route one inbound text frame.
    pub fn handle_frame(&self, text: &str) -> RouteOutcome {
        self.router.route(text)
    }

    pub fn handle_transport_error(&mut self, message: impl Into<String>) -> Vec<Directive> {
        let step = self.machine.transport_error(message);
        self.finish(step)
    }

    /// The transport closed, or a handshake failed, without a `disconnect`.
    pub fn handle_closed(&mut self) -> Vec<Directive> {
        let step = self.machine.closed();
        self.finish(step)
    }

    pub fn handle_retry_elapsed(&mut self, attempt: u32) -> Vec<Directive> {
        let step = self.machine.retry_elapsed(attempt);
        self.finish(step)
    }

    /// Transmit `message` if the transport is open. Never queued.
    pub fn send(&self, message: &ClientMessage) -> Result<Vec<Directive>, ClientError> {
        if self.machine.state() != ConnectionState::Open {
            tracing::warn!(
                action = message.action_name(),
                state = ?self.machine.state(),
                "Dropping outbound message while not connected"
            );
            return Err(ClientError::NotConnected);
        }

        let frame = message.to_frame()?;
        if matches!(message, ClientMessage::Ready {}) {
            self.store.mark_ready_requested();
        }
        tracing::debug!(action = message.action_name(), "Sending");
        Ok(vec![Directive::Transmit(frame)])
    }

    /// Authorize `action` against the current snapshot, then send it.
    pub fn perform(&self, action: PlayerAction) -> Result<Vec<Directive>, ClientError> {
        let player = self
            .identity
            .as_ref()
            .map(|identity| identity.player_name.as_str())
            .ok_or(ClientError::NotConnected)?;
        let snapshot = self.store.current().ok_or(Ineligible::NoSnapshot)?;

        if let Err(reason) = check(&snapshot, player, &action) {
            tracing::info!(action = action.name(), reason = %reason, "Action rejected locally");
            return Err(reason.into());
        }
        self.send(&action.to_message())
    }

    /// Resolve the pending executive choice and send the resulting action.
    pub fn choose_executive(
        &self,
        choice: ExecutiveChoice,
    ) -> Result<Vec<Directive>, ClientError> {
        let pending = self
            .store
            .pending_choice()
            .ok_or(ChoiceError::NothingPending)?;
        let action = pending.resolve(choice)?;
        let directives = self.perform(action)?;
        self.store.clear_pending_choice();
        Ok(directives)
    }

    /// Tear the session down. Idempotent.
    ///
    /// Message subscribers and the identity are dropped; lifecycle subscribers
    /// and the last snapshot are kept.
    pub fn disconnect(&mut self) -> Vec<Directive> {
        let step = self.machine.disconnect();
        self.router.bus().clear();
        if let Some(identity) = self.identity.take() {
            tracing::info!(
                game_id = %identity.game_id,
                player = %identity.player_name,
                "Disconnecting"
            );
        }
        self.finish(step)
    }

    fn finish(&self, step: Step) -> Vec<Directive> {
        self.observer.set(self.machine.state(), self.machine.attempt());

        for event in &step.events {
            match event {
                LifecycleEvent::Connected => tracing::info!("Connected"),
                LifecycleEvent::Disconnected => tracing::info!("Disconnected"),
                LifecycleEvent::Error { message } => {
                    tracing::error!(error = %message, "Transport error")
                }
                LifecycleEvent::Reconnecting { attempt, delay } => tracing::info!(
                    attempt,
                    max = self.config.reconnect.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting"
                ),
                LifecycleEvent::ReconnectFailed => {
                    tracing::error!(
                        max = self.config.reconnect.max_attempts,
                        "Reconnection attempts exhausted"
                    )
                }
            }
            self.lifecycle.publish(event);
        }
        step.directives
    }
}
