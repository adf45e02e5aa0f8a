//! Response bodies from the lobby REST endpoints

use serde::{Deserialize, Serialize};

/// Reply to `POST /api/create-game` and `POST /api/create-test-game`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: String,
}

/// Reply to `GET /api/server-info`: where players should point their browsers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}

/// Reply to `PUT /api/player/{name}/profile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdatedResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Error body the server returns with non-success statuses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(alias = "message", alias = "detail")]
    pub error: String,
}
