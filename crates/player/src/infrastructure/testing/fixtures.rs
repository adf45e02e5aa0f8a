//! Simple test fixtures used across unit tests.

use ballot_shared::{GameSnapshot, Phase, Player, Policy, Role};
use serde_json::{json, Value};

pub const GAME_ID: &str = "TEST0001";

/// Five seats, the smallest legal table.
pub const FIVE: [&str; 5] = ["alice", "bob", "carol", "dave", "erin"];

pub fn alive(name: &str) -> Player {
    Player {
        name: name.to_string(),
        is_alive: true,
        ..Default::default()
    }
}

pub fn with_role(mut player: Player, role: Role) -> Player {
    player.role = Some(role);
    player
}

/// All seats alive, phase unknown.
pub fn table(names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        game_id: GAME_ID.to_string(),
        players: names.iter().map(|name| alive(name)).collect(),
        ..Default::default()
    }
}

pub fn kill(snapshot: &mut GameSnapshot, name: &str) {
    for player in snapshot.players.iter_mut().filter(|p| p.name == name) {
        player.is_alive = false;
        player.is_executed = true;
    }
}

pub fn lobby(host: &str, names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        phase: Phase::Lobby,
        host_name: Some(host.to_string()),
        ..table(names)
    }
}

pub fn election(president: &str, names: &[&str]) -> GameSnapshot {
    let mut snapshot = GameSnapshot {
        phase: Phase::Election,
        host_name: names.first().map(|n| n.to_string()),
        current_president: Some(president.to_string()),
        game_started: true,
        ..table(names)
    };
    for player in snapshot.players.iter_mut() {
        player.is_president = player.name == president;
    }
    snapshot
}

pub fn voting(president: &str, chancellor: &str, names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        phase: Phase::Voting,
        nominated_chancellor: Some(chancellor.to_string()),
        ..election(president, names)
    }
}

/// Legislative session as seen by the president: three cards in hand.
pub fn president_legislating(president: &str, chancellor: &str, names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        phase: Phase::Legislative,
        president_hand: Some(vec![Policy::Fascist, Policy::Liberal, Policy::Fascist]),
        ..voting(president, chancellor, names)
    }
}

/// Legislative session as seen by the chancellor: two cards in hand.
pub fn chancellor_legislating(president: &str, chancellor: &str, names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        phase: Phase::Legislative,
        chancellor_hand: Some(vec![Policy::Liberal, Policy::Fascist]),
        ..voting(president, chancellor, names)
    }
}

pub fn executive(president: &str, offer: &str, names: &[&str]) -> GameSnapshot {
    GameSnapshot {
        phase: Phase::Executive,
        executive_action_available: Some(offer.to_string()),
        ..election(president, names)
    }
}

/// Inbound text frame with an arbitrary payload.
pub fn frame(kind: &str, payload: Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

/// Inbound `game_state` / `game_started` frame carrying `snapshot`.
pub fn snapshot_frame(kind: &str, snapshot: &GameSnapshot) -> String {
    let payload = serde_json::to_value(snapshot).unwrap_or(Value::Null);
    frame(kind, payload)
}
