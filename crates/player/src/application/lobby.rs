//! Lobby use cases on top of the REST port.

use std::sync::Arc;

use ballot_shared::{requests::TEST_GAME_BOTS, GameSnapshot, ServerInfo, UpdateProfileRequest};
use url::Url;

use crate::ports::outbound::{ApiError, GameApi};

/// A game created by the local player, with the link to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedGame {
    pub game_id: String,
    /// `None` when the server did not say where it is reachable
    pub join_url: Option<Url>,
}

#[derive(Clone)]
pub struct LobbyService {
    api: Arc<dyn GameApi>,
}

impl LobbyService {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self { api }
    }

    /// Create a game hosted by `host_name`.
    pub async fn host_game(&self, host_name: &str, secure: bool) -> Result<HostedGame, ApiError> {
        let game_id = self.api.create_game(Some(host_name.to_string())).await?;
        tracing::info!(game_id = %game_id, host = %host_name, "Created game");
        Ok(self.with_join_url(game_id, secure).await)
    }

    /// Create a game pre-filled with bots.
    pub async fn host_test_game(
        &self,
        host_name: &str,
        num_bots: u8,
        secure: bool,
    ) -> Result<HostedGame, ApiError> {
        if !TEST_GAME_BOTS.contains(&num_bots) {
            return Err(ApiError::InvalidRequest(format!(
                "num_bots must be between 5 and 10, got {num_bots}"
            )));
        }
        let game_id = self.api.create_test_game(num_bots, host_name).await?;
        tracing::info!(game_id = %game_id, num_bots, "Created test game");
        Ok(self.with_join_url(game_id, secure).await)
    }

    /// Fetch the public snapshot of a game, e.g. to check it exists before joining.
    pub async fn lookup(&self, game_id: &str) -> Result<GameSnapshot, ApiError> {
        self.api.get_game(game_id).await
    }

    /// Change how `player_name` is shown to the table. The player must be seated.
    pub async fn update_profile(
        &self,
        player_name: &str,
        profile: UpdateProfileRequest,
    ) -> Result<(), ApiError> {
        self.api.update_profile(player_name, profile).await?;
        tracing::info!(player = %player_name, "Updated profile");
        Ok(())
    }

    async fn with_join_url(&self, game_id: String, secure: bool) -> HostedGame {
        let join_url = match self.api.server_info().await {
            Ok(info) => join_url(&info, secure, &game_id)
                .map_err(|e| tracing::warn!(error = %e, "Server advertised an unusable address"))
                .ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch server info");
                None
            }
        };
        HostedGame { game_id, join_url }
    }
}

/// `{http|https}://{host}[:{port}]/join/{game_id}`; default ports are omitted.
pub fn join_url(info: &ServerInfo, secure: bool, game_id: &str) -> Result<Url, ApiError> {
    let scheme = if secure { "https" } else { "http" };
    let mut url = Url::parse(&format!("{scheme}://{}/", info.host))
        .map_err(|e| ApiError::InvalidResponse(format!("host '{}': {e}", info.host)))?;
    let port = (!matches!(info.port, 80 | 443)).then_some(info.port);
    url.set_port(port)
        .map_err(|_| ApiError::InvalidResponse(format!("port {}", info.port)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidResponse(format!("host '{}'", info.host)))?
        .clear()
        .extend(["join", game_id]);
    Ok(url)
}
