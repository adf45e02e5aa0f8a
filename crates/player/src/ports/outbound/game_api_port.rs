//! Game API Port - Outbound port for the lobby REST endpoints
//!
//! Creating games and looking them up happens over plain HTTP before a
//! player opens the WebSocket session.

use async_trait::async_trait;
use ballot_shared::{GameSnapshot, ServerInfo, UpdateProfileRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Lobby endpoints of the game server.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GameApi: Send + Sync {
    /// `POST /api/create-game`; returns the new game id.
    async fn create_game(&self, host_name: Option<String>) -> Result<String, ApiError>;

    /// `GET /api/game/{id}`
    async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError>;

    /// `GET /api/server-info`
    async fn server_info(&self) -> Result<ServerInfo, ApiError>;

    /// `POST /api/create-test-game`; `num_bots` must be 5 to 10.
    async fn create_test_game(&self, num_bots: u8, host_name: &str) -> Result<String, ApiError>;

    /// `PUT /api/player/{name}/profile`; `NotFound` when no game seats the player.
    async fn update_profile(
        &self,
        player_name: &str,
        profile: UpdateProfileRequest,
    ) -> Result<(), ApiError>;
}
