//! Request bodies for the lobby REST endpoints

use serde::{Deserialize, Serialize};

/// Bot seats allowed in a test game.
pub const TEST_GAME_BOTS: std::ops::RangeInclusive<u8> = 5..=10;

/// Body for `POST /api/create-game`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Seat name of the creating player, who becomes host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

/// Body for `POST /api/create-test-game`: a game pre-filled with bots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTestGameRequest {
    pub num_bots: u8,
    pub host_name: String,
}

impl CreateTestGameRequest {
    /// Callers check `num_bots` against [`TEST_GAME_BOTS`] first.
    pub fn new(num_bots: u8, host_name: impl Into<String>) -> Self {
        Self {
            num_bots,
            host_name: host_name.into(),
        }
    }
}

/// Body for `PUT /api/player/{name}/profile`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        rename = "profilePictureUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_picture_url: Option<String>,
    #[serde(
        rename = "selectedEmotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selected_emotes: Option<Vec<String>>,
}
