//! Ballot Shared - Wire types for server and player communication
//!
//! This crate contains all types exchanged between the game server and the player client:
//! - WebSocket frames (`ServerMessage` inbound, `ClientMessage` outbound)
//! - The authoritative `GameSnapshot` and its player records
//! - Executive power vocabulary
//! - REST request/response bodies for the lobby endpoints
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and chrono
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Fail closed** - Missing snapshot fields decode to values that grant nothing

pub mod executive;
pub mod messages;
pub mod requests;
pub mod responses;
pub mod snapshot;

pub use executive::{parse_offered_powers, ExecutivePower};
pub use messages::{
    decode_server_frame, ClientMessage, DecodedFrame, MessageKind, RuleValues, ServerMessage,
};
pub use requests::{CreateGameRequest, CreateTestGameRequest, UpdateProfileRequest};
pub use responses::{ApiErrorBody, CreateGameResponse, ProfileUpdatedResponse, ServerInfo};
pub use snapshot::{
    ChatEntry, ChatKind, Faction, GameSnapshot, Loyalty, Phase, Player, Policy, Role,
};
