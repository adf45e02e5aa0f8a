//! Authoritative game snapshot pushed by the server
//!
//! The server sends a complete `GameSnapshot` on every relevant transition,
//! tailored per recipient: roles and policy hands appear only where the
//! recipient is entitled to see them. Clients replace their copy wholesale
//! and never patch it.
//!
//! Every field defaults when absent. Defaults are chosen so that an
//! incomplete snapshot grants nothing: unknown phase, nobody alive, no host.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Read an explicit `null` as the empty value, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Game phase as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Election,
    Voting,
    Legislative,
    Executive,
    #[serde(rename = "Game_Over")]
    GameOver,
    /// Unrecognized or missing phase string
    #[default]
    #[serde(other)]
    Unknown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lobby => "Lobby",
            Phase::Election => "Election",
            Phase::Voting => "Voting",
            Phase::Legislative => "Legislative",
            Phase::Executive => "Executive",
            Phase::GameOver => "Game_Over",
            Phase::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret role. Hitler belongs to the fascist faction but plays blind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

impl Role {
    pub fn faction(&self) -> Faction {
        match self {
            Role::Liberal => Faction::Liberal,
            Role::Fascist | Role::Hitler => Faction::Fascist,
        }
    }
}

/// Team affiliation, used for winners and investigation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Liberal,
    Fascist,
}

/// Party membership revealed by an investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Loyalty {
    Liberal,
    Fascist,
    /// The server has no role on record for the target
    #[serde(other)]
    Unknown,
}

/// Policy tile drawn from the shared deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    Liberal,
    Fascist,
}

/// One seat at the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    /// Stable identity, unique within a game
    pub name: String,
    pub username: Option<String>,
    #[serde(rename = "profilePictureUrl")]
    pub profile_picture_url: Option<String>,
    #[serde(rename = "selectedEmotes", deserialize_with = "null_as_default")]
    pub selected_emotes: Vec<String>,
    /// Present only when the server lets this recipient see it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub is_alive: bool,
    pub is_president: bool,
    pub is_chancellor: bool,
    /// `true` = Ja, `false` = Nein, `None` = not cast this election
    pub vote: Option<bool>,
    pub is_executed: bool,
    pub is_bot: bool,
}

impl Player {
    /// Name to show in the UI: the chosen username, falling back to the seat name.
    pub fn display_name(&self) -> &str {
        match self.username.as_deref() {
            Some(username) if !username.trim().is_empty() => username,
            _ => &self.name,
        }
    }
}

/// Whether a chat line came from a player or from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    #[serde(rename = "PLAYER_MESSAGE")]
    Player,
    #[serde(rename = "SYSTEM_MESSAGE")]
    System,
}

/// A chat transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub sender: String,
    pub message: String,
    /// Server-local timestamp without zone, e.g. `2025-03-01T19:04:11.52`
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

impl ChatEntry {
    /// Parse the timestamp. The server may drop trailing seconds when they are zero.
    pub fn sent_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M"))
            .ok()
    }
}

/// Complete, recipient-tailored game state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    pub game_id: String,
    #[serde(rename = "current_phase")]
    pub phase: Phase,
    #[serde(deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
    pub liberal_policies: u8,
    pub fascist_policies: u8,
    pub election_tracker: u8,
    pub current_president: Option<String>,
    pub nominated_chancellor: Option<String>,
    /// Term-limit memory for nominations
    pub last_chancellor_name: Option<String>,
    pub last_president_name: Option<String>,
    pub president_hand: Option<Vec<Policy>>,
    pub chancellor_hand: Option<Vec<Policy>>,
    #[serde(deserialize_with = "null_as_default")]
    pub votes: BTreeMap<String, bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub ready_status: BTreeMap<String, bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub chat_history: Vec<ChatEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub rules: BTreeMap<String, serde_json::Value>,
    /// Powers offered to the president, joined by `_or_`
    pub executive_action_available: Option<String>,
    pub executive_action_target: Option<String>,
    pub winner: Option<Faction>,
    pub game_started: bool,
    pub host_name: Option<String>,
    pub custom_card_image_url: Option<String>,
    pub custom_board_image_url: Option<String>,
}

impl GameSnapshot {
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_players().count()
    }

    /// Cards visible to this recipient as president; empty when hidden.
    pub fn president_cards(&self) -> &[Policy] {
        self.president_hand.as_deref().unwrap_or_default()
    }

    /// Cards visible to this recipient as chancellor; empty when hidden.
    pub fn chancellor_cards(&self) -> &[Policy] {
        self.chancellor_hand.as_deref().unwrap_or_default()
    }

    pub fn is_host(&self, name: &str) -> bool {
        self.host_name.as_deref() == Some(name)
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver || self.winner.is_some()
    }
}
