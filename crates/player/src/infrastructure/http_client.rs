//! reqwest client for the lobby REST endpoints

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use ballot_shared::{
    requests::TEST_GAME_BOTS, ApiErrorBody, CreateGameRequest, CreateGameResponse,
    CreateTestGameRequest, GameSnapshot, ProfileUpdatedResponse, ServerInfo,
    UpdateProfileRequest,
};

use crate::config::ClientConfig;
use crate::ports::outbound::{ApiError, GameApi};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct HttpGameApi {
    client: Client,
    base_url: Url,
}

impl HttpGameApi {
    pub fn new(base_url: Url) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_base.clone())
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a response into `T`, mapping non-success statuses to [`ApiError`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn create_game(&self, host_name: Option<String>) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["api", "create-game"])?)
            .json(&CreateGameRequest { host_name })
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let created: CreateGameResponse = decode(response).await?;
        Ok(created.game_id)
    }

    async fn get_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "game", game_id])?)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    async fn server_info(&self) -> Result<ServerInfo, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["api", "server-info"])?)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        decode(response).await
    }

    async fn create_test_game(&self, num_bots: u8, host_name: &str) -> Result<String, ApiError> {
        if !TEST_GAME_BOTS.contains(&num_bots) {
            return Err(ApiError::InvalidRequest(format!(
                "num_bots must be between 5 and 10, got {num_bots}"
            )));
        }

        let response = self
            .client
            .post(self.endpoint(&["api", "create-test-game"])?)
            .json(&CreateTestGameRequest::new(num_bots, host_name))
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let created: CreateGameResponse = decode(response).await?;
        Ok(created.game_id)
    }

    async fn update_profile(
        &self,
        player_name: &str,
        profile: UpdateProfileRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.endpoint(&["api", "player", player_name, "profile"])?)
            .json(&profile)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let updated: ProfileUpdatedResponse = decode(response).await?;
        if !updated.success {
            return Err(ApiError::InvalidResponse(format!(
                "profile update not applied: {}",
                updated.message
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::fixtures::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::net::SocketAddr;

    async fn serve_router(router: Router) -> Url {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");
        let actual_addr = listener.local_addr().expect("addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Url::parse(&format!("http://{actual_addr}")).expect("url")
    }

    fn lobby_server() -> Router {
        Router::new()
            .route(
                "/api/create-game",
                post(|Json(req): Json<CreateGameRequest>| async move {
                    match req.host_name.as_deref() {
                        Some("crash") => Err((
                            AxumStatus::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "database unavailable"})),
                        )),
                        _ => Ok(Json(CreateGameResponse {
                            game_id: "AB12CD34".to_string(),
                        })),
                    }
                }),
            )
            .route(
                "/api/game/{id}",
                get(|Path(id): Path<String>| async move {
                    if id == GAME_ID {
                        Ok(Json(lobby("alice", &FIVE)))
                    } else {
                        Err((
                            AxumStatus::NOT_FOUND,
                            Json(json!({"detail": "Game not found"})),
                        ))
                    }
                }),
            )
            .route(
                "/api/server-info",
                get(|| async {
                    Json(ServerInfo {
                        host: "192.168.1.20".to_string(),
                        port: 8000,
                    })
                }),
            )
            .route(
                "/api/create-test-game",
                post(|Json(req): Json<Value>| async move {
                    let bots = req["num_bots"].as_u64().unwrap_or_default();
                    Json(CreateGameResponse {
                        game_id: format!("BOTS{bots}"),
                    })
                }),
            )
            .route(
                "/api/player/{name}/profile",
                put(
                    |Path(name): Path<String>, Json(req): Json<UpdateProfileRequest>| async move {
                        if name != "alice" {
                            return Err((
                                AxumStatus::NOT_FOUND,
                                Json(json!({"error": "Player not found"})),
                            ));
                        }
                        if req.username.as_deref() != Some("Alice") {
                            return Err((
                                AxumStatus::BAD_REQUEST,
                                Json(json!({"error": "unexpected body"})),
                            ));
                        }
                        Ok(Json(json!({"success": true, "message": "Profile updated"})))
                    },
                ),
            )
    }

    #[tokio::test]
    async fn test_create_game_returns_id() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);
        let id = api
            .create_game(Some("alice".to_string()))
            .await
            .expect("create");
        assert_eq!(id, "AB12CD34");
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);
        let err = api
            .create_game(Some("crash".to_string()))
            .await
            .expect_err("500");
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "database unavailable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_game_and_not_found() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);

        let snapshot = api.get_game(GAME_ID).await.expect("game");
        assert_eq!(snapshot.host_name.as_deref(), Some("alice"));
        assert_eq!(snapshot.players.len(), 5);

        assert_eq!(api.get_game("MISSING").await, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_server_info() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);
        let info = api.server_info().await.expect("info");
        assert_eq!(info.host, "192.168.1.20");
        assert_eq!(info.port, 8000);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);
        let profile = UpdateProfileRequest {
            username: Some("Alice".to_string()),
            ..Default::default()
        };

        assert_eq!(api.update_profile("alice", profile.clone()).await, Ok(()));
        assert_eq!(
            api.update_profile("zed", profile).await,
            Err(ApiError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_create_test_game_checks_bot_count() {
        let api = HttpGameApi::new(serve_router(lobby_server()).await);

        assert_eq!(
            api.create_test_game(7, "alice").await,
            Ok("BOTS7".to_string())
        );
        assert!(matches!(
            api.create_test_game(4, "alice").await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let api = HttpGameApi::new(Url::parse(&format!("http://{addr}")).expect("url"));
        assert!(matches!(
            api.server_info().await,
            Err(ApiError::RequestFailed(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpGameApi::new(Url::parse("http://host:8000/ballot/").expect("url"));
        let url = api.endpoint(&["api", "game", "A B"]).expect("url");
        assert_eq!(url.as_str(), "http://host:8000/ballot/api/game/A%20B");
    }
}
