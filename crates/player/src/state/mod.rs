//! Client-side state containers.

mod game_state_store;
mod local_flags;

pub use game_state_store::{GameStateStore, StoreEvent, StoreEventKind};
pub use local_flags::LocalFlags;
