//! WebSocket frame types for server-player communication
//!
//! Inbound frames are `{"type": <kind>, "payload": {...}}` and outbound frames are
//! `{"action": <kind>, "payload": {...}}`. Both directions are closed enums so
//! every message kind is handled exhaustively at compile time.
//!
//! ## Forward compatibility
//!
//! Servers may add frame types. [`decode_server_frame`] reports those as
//! [`DecodedFrame::Unrecognized`] instead of failing, so callers can tell them
//! apart from malformed input.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};

use crate::executive::ExecutivePower;
use crate::snapshot::{ChatEntry, Faction, GameSnapshot, Loyalty, Phase, Policy};

/// Rule option name to value, as edited by the host.
pub type RuleValues = BTreeMap<String, serde_json::Value>;

/// The server writes empty strings where it means "none".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let de: serde::de::value::StrDeserializer<'_, D::Error> = value.into_deserializer();
            T::deserialize(de).map(Some)
        }
    }
}

// =============================================================================
// Server Messages (Server → Player)
// =============================================================================

/// Discriminant of [`ServerMessage`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    GameState,
    GameStarted,
    PlayerJoined,
    PlayerDisconnected,
    Error,
    ChatMessage,
    InvestigationResult,
    PolicyPeek,
    ExecutiveActionAvailable,
    ChancellorNominated,
    VoteCast,
    ElectionResolved,
    PolicyEnacted,
    ExecutiveActionExecuted,
    PlayerReady,
    AllPlayersReady,
    RulesUpdated,
}

impl MessageKind {
    pub const ALL: [MessageKind; 17] = [
        MessageKind::GameState,
        MessageKind::GameStarted,
        MessageKind::PlayerJoined,
        MessageKind::PlayerDisconnected,
        MessageKind::Error,
        MessageKind::ChatMessage,
        MessageKind::InvestigationResult,
        MessageKind::PolicyPeek,
        MessageKind::ExecutiveActionAvailable,
        MessageKind::ChancellorNominated,
        MessageKind::VoteCast,
        MessageKind::ElectionResolved,
        MessageKind::PolicyEnacted,
        MessageKind::ExecutiveActionExecuted,
        MessageKind::PlayerReady,
        MessageKind::AllPlayersReady,
        MessageKind::RulesUpdated,
    ];

    /// Wire name used in the frame's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::GameState => "game_state",
            MessageKind::GameStarted => "game_started",
            MessageKind::PlayerJoined => "player_joined",
            MessageKind::PlayerDisconnected => "player_disconnected",
            MessageKind::Error => "error",
            MessageKind::ChatMessage => "chat_message",
            MessageKind::InvestigationResult => "investigation_result",
            MessageKind::PolicyPeek => "policy_peek",
            MessageKind::ExecutiveActionAvailable => "executive_action_available",
            MessageKind::ChancellorNominated => "chancellor_nominated",
            MessageKind::VoteCast => "vote_cast",
            MessageKind::ElectionResolved => "election_resolved",
            MessageKind::PolicyEnacted => "policy_enacted",
            MessageKind::ExecutiveActionExecuted => "executive_action_executed",
            MessageKind::PlayerReady => "player_ready",
            MessageKind::AllPlayersReady => "all_players_ready",
            MessageKind::RulesUpdated => "rules_updated",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Messages from the server to a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full replacement snapshot
    GameState(Box<GameSnapshot>),
    /// Full replacement snapshot sent once roles are dealt
    GameStarted(Box<GameSnapshot>),
    PlayerJoined {
        player_name: String,
        total_players: usize,
    },
    PlayerDisconnected {
        player_name: String,
    },
    /// The server rejected an action or a frame
    Error {
        message: String,
    },
    ChatMessage(ChatEntry),
    /// Private to the investigating president
    InvestigationResult {
        target: String,
        result: Loyalty,
    },
    /// Private to the president: top three policies
    PolicyPeek {
        policies: Vec<Policy>,
    },
    /// Private to the president: powers now available
    ExecutiveActionAvailable {
        action_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_state: Option<Box<GameSnapshot>>,
    },
    ChancellorNominated {
        chancellor_name: String,
        phase: Phase,
    },
    VoteCast {
        player_name: String,
        vote: bool,
    },
    ElectionResolved {
        votes: BTreeMap<String, bool>,
        passed: bool,
        election_tracker: u8,
        phase: Phase,
    },
    PolicyEnacted {
        policy_type: Policy,
        liberal_policies: u8,
        fascist_policies: u8,
        #[serde(default, deserialize_with = "blank_as_none")]
        winner: Option<Faction>,
        phase: Phase,
    },
    ExecutiveActionExecuted {
        action_type: String,
        #[serde(default, deserialize_with = "blank_as_none")]
        target: Option<String>,
        phase: Phase,
    },
    PlayerReady {
        player_name: String,
        all_ready: bool,
    },
    AllPlayersReady {},
    RulesUpdated {
        rules: RuleValues,
    },
}

impl ServerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            ServerMessage::GameState(_) => MessageKind::GameState,
            ServerMessage::GameStarted(_) => MessageKind::GameStarted,
            ServerMessage::PlayerJoined { .. } => MessageKind::PlayerJoined,
            ServerMessage::PlayerDisconnected { .. } => MessageKind::PlayerDisconnected,
            ServerMessage::Error { .. } => MessageKind::Error,
            ServerMessage::ChatMessage(_) => MessageKind::ChatMessage,
            ServerMessage::InvestigationResult { .. } => MessageKind::InvestigationResult,
            ServerMessage::PolicyPeek { .. } => MessageKind::PolicyPeek,
            ServerMessage::ExecutiveActionAvailable { .. } => {
                MessageKind::ExecutiveActionAvailable
            }
            ServerMessage::ChancellorNominated { .. } => MessageKind::ChancellorNominated,
            ServerMessage::VoteCast { .. } => MessageKind::VoteCast,
            ServerMessage::ElectionResolved { .. } => MessageKind::ElectionResolved,
            ServerMessage::PolicyEnacted { .. } => MessageKind::PolicyEnacted,
            ServerMessage::ExecutiveActionExecuted { .. } => MessageKind::ExecutiveActionExecuted,
            ServerMessage::PlayerReady { .. } => MessageKind::PlayerReady,
            ServerMessage::AllPlayersReady {} => MessageKind::AllPlayersReady,
            ServerMessage::RulesUpdated { .. } => MessageKind::RulesUpdated,
        }
    }

    /// The snapshot carried by full-replacement messages.
    ///
    /// `executive_action_available` embeds a snapshot too, but only as context
    /// for the president's choice; it does not replace the stored state.
    pub fn full_snapshot(&self) -> Option<&GameSnapshot> {
        match self {
            ServerMessage::GameState(snapshot) | ServerMessage::GameStarted(snapshot) => {
                Some(snapshot)
            }
            _ => None,
        }
    }
}

/// Outcome of decoding one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Message(ServerMessage),
    /// Well-formed frame of a kind this client does not know
    Unrecognized { kind: String },
}

/// Decode an inbound text frame.
///
/// Errors mean the frame is malformed: not JSON, no `type`, or a known `type`
/// with a payload of the wrong shape.
pub fn decode_server_frame(text: &str) -> Result<DecodedFrame, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let kind = match value.get("type").and_then(serde_json::Value::as_str) {
        Some(kind) => kind.to_string(),
        None => {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "frame has no string `type` field",
            ))
        }
    };

    if MessageKind::from_wire(&kind).is_none() {
        return Ok(DecodedFrame::Unrecognized { kind });
    }

    Ok(DecodedFrame::Message(serde_json::from_value(value)?))
}

// =============================================================================
// Client Messages (Player → Server)
// =============================================================================

/// Messages from a player to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat in the lobby
    JoinGame {},
    /// Host starts the game
    StartGame {},
    NominateChancellor {
        chancellor_name: String,
    },
    /// `true` = Ja, `false` = Nein
    CastVote {
        vote: bool,
    },
    /// Index into the president's three-card hand
    PresidentDiscard {
        policy_index: usize,
    },
    /// Index into the chancellor's two-card hand
    ChancellorEnact {
        policy_index: usize,
    },
    ExecutiveAction {
        action_type: ExecutivePower,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    Ready {},
    ChatMessage {
        message: String,
    },
    /// Host edits rule options
    UpdateRules(RuleValues),
    /// Ask the server to resend this player's snapshot
    GetGameState {},
}

impl ClientMessage {
    /// Wire name used in the frame's `action` field.
    pub fn action_name(&self) -> &'static str {
        match self {
            ClientMessage::JoinGame {} => "join_game",
            ClientMessage::StartGame {} => "start_game",
            ClientMessage::NominateChancellor { .. } => "nominate_chancellor",
            ClientMessage::CastVote { .. } => "cast_vote",
            ClientMessage::PresidentDiscard { .. } => "president_discard",
            ClientMessage::ChancellorEnact { .. } => "chancellor_enact",
            ClientMessage::ExecutiveAction { .. } => "executive_action",
            ClientMessage::Ready {} => "ready",
            ClientMessage::ChatMessage { .. } => "chat_message",
            ClientMessage::UpdateRules(_) => "update_rules",
            ClientMessage::GetGameState {} => "get_game_state",
        }
    }

    /// Encode as a text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
