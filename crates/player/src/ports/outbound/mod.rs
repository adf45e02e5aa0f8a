//! Outbound ports - Interfaces for external services

pub mod game_api_port;

pub use game_api_port::{ApiError, GameApi};

#[cfg(any(test, feature = "testing"))]
pub use game_api_port::MockGameApi;
