//! Routes decoded server frames to the store and to message subscribers.

use ballot_shared::{decode_server_frame, DecodedFrame, MessageKind, ServerMessage};

use super::event_bus::{BusEvent, EventBus};
use crate::state::GameStateStore;

impl BusEvent for ServerMessage {
    type Kind = MessageKind;

    fn kind(&self) -> MessageKind {
        ServerMessage::kind(self)
    }
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered(MessageKind),
    /// Valid frame of a type this client does not handle
    Unrecognized(String),
    Malformed,
}

#[derive(Clone)]
pub struct MessageRouter {
    bus: EventBus<ServerMessage>,
    store: GameStateStore,
}

impl MessageRouter {
    pub fn new(bus: EventBus<ServerMessage>, store: GameStateStore) -> Self {
        Self { bus, store }
    }

    pub fn bus(&self) -> &EventBus<ServerMessage> {
        &self.bus
    }

    /// Decode one text frame, apply it to the store, then publish it.
    ///
    /// Malformed and unrecognized frames are logged and dropped.
    pub fn route(&self, text: &str) -> RouteOutcome {
        let message = match decode_server_frame(text) {
            Ok(DecodedFrame::Message(message)) => message,
            Ok(DecodedFrame::Unrecognized { kind }) => {
                tracing::debug!(kind = %kind, "Ignoring unrecognized frame type");
                return RouteOutcome::Unrecognized(kind);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
                return RouteOutcome::Malformed;
            }
        };

        self.apply(&message);
        self.bus.publish(&message);
        RouteOutcome::Delivered(message.kind())
    }

    fn apply(&self, message: &ServerMessage) {
        match message {
            ServerMessage::GameState(snapshot) => {
                self.store.replace(snapshot.as_ref().clone());
            }
            ServerMessage::GameStarted(snapshot) => {
                self.store.replace_revealing_role(snapshot.as_ref().clone());
            }
            ServerMessage::ExecutiveActionAvailable {
                action_type,
                game_state,
            } => {
                if self
                    .store
                    .offer_choice(action_type, game_state.as_deref())
                    .is_none()
                {
                    tracing::warn!(offer = %action_type, "Executive offer had no usable powers");
                }
            }
            ServerMessage::Error { message } => {
                tracing::warn!(message = %message, "Server reported an error");
            }
            _ => {}
        }
    }
}
