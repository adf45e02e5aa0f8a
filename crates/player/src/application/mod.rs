//! Application layer: rules evaluated against the current snapshot, and the
//! lobby use cases.

pub mod authorizer;
pub mod lobby;
pub mod pending_choice;
pub mod visibility;

#[cfg(test)]
mod authorizer_tests;

pub use authorizer::{check, is_eligible, Ineligible, PlayerAction};
pub use lobby::{join_url, HostedGame, LobbyService};
pub use pending_choice::{ChoiceError, ExecutiveChoice, PendingChoice};
pub use visibility::visible_allies;
