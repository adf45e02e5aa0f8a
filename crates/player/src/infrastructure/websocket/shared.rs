//! Runtime-agnostic helpers for the WebSocket session.

use url::Url;

use crate::error::ClientError;

// Reconnection defaults
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Build `{ws|wss}://{host}/ws/{game_id}/{player_name}`.
///
/// Path segments are percent-encoded, so names with spaces or slashes stay a
/// single segment.
pub fn session_url(
    host: &str,
    secure: bool,
    game_id: &str,
    player_name: &str,
) -> Result<Url, ClientError> {
    if game_id.trim().is_empty() {
        return Err(ClientError::Endpoint("game id is empty".to_string()));
    }
    if player_name.trim().is_empty() {
        return Err(ClientError::Endpoint("player name is empty".to_string()));
    }

    let scheme = if secure { "wss" } else { "ws" };
    let mut url = Url::parse(&format!("{scheme}://{host}/"))
        .map_err(|e| ClientError::Endpoint(format!("host '{host}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Endpoint(format!("host '{host}' cannot carry a path")))?
        .clear()
        .extend(["ws", game_id, player_name]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_plain_url() {
        let url = session_url("localhost:8000", false, "AB12CD34", "alice").expect("url");
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/AB12CD34/alice");
    }

    #[test]
    fn secure_uses_wss() {
        let url = session_url("ballot.example", true, "G1", "bob").expect("url");
        assert_eq!(url.scheme(), "wss");
    }

    #[test]
    fn player_name_is_percent_encoded() {
        let url = session_url("localhost:8000", false, "G1", "Ann Lee/2").expect("url");
        assert_eq!(url.path(), "/ws/G1/Ann%20Lee%2F2");
    }

    #[test]
    fn rejects_empty_identity() {
        assert!(session_url("localhost:8000", false, "", "alice").is_err());
        assert!(session_url("localhost:8000", false, "G1", "  ").is_err());
        assert!(session_url("", false, "G1", "alice").is_err());
    }
}
