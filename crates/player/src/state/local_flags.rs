//! UI-only flags the client tracks alongside the server snapshot.
//!
//! These are never sent and never consulted by the authorizer.

use ballot_shared::{GameSnapshot, Phase};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFlags {
    /// The role card has been shown to the player for the current game
    pub role_revealed: bool,
    /// The player pressed "ready" and the server has not confirmed it yet
    pub ready_requested: bool,
}

impl LocalFlags {
    /// Reconcile against a replacement snapshot.
    ///
    /// `ready_requested` clears once the server records the viewer as ready,
    /// once the ready map is reset after having entries, or on any phase change.
    /// `role_revealed` clears when the table is back in the lobby.
    pub fn reconcile(
        &mut self,
        previous: Option<&GameSnapshot>,
        next: &GameSnapshot,
        viewer: Option<&str>,
    ) {
        if self.ready_requested {
            let confirmed = viewer
                .and_then(|name| next.ready_status.get(name))
                .copied()
                .unwrap_or(false);
            let ready_reset = previous.is_some_and(|p| !p.ready_status.is_empty())
                && next.ready_status.is_empty();
            let phase_changed = previous.is_some_and(|p| p.phase != next.phase);

            if confirmed || ready_reset || phase_changed {
                self.ready_requested = false;
            }
        }

        if next.phase == Phase::Lobby {
            self.role_revealed = false;
        }
    }
}
