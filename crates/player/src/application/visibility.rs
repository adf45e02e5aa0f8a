//! Which teammates a viewer may see.
//!
//! Ordinary fascists know each other and Hitler. Hitler plays blind, and
//! liberals see nobody.

use ballot_shared::{Faction, GameSnapshot, Player, Role};

/// Other alive fascist-faction players visible to `viewer`, in snapshot order.
///
/// Reads only what the snapshot states; a viewer that is missing or has no
/// role sees nobody.
pub fn visible_allies<'a>(snapshot: &'a GameSnapshot, viewer: &str) -> Vec<&'a Player> {
    let viewer_role = snapshot.player(viewer).and_then(|p| p.role);
    if viewer_role != Some(Role::Fascist) {
        return Vec::new();
    }

    snapshot
        .players
        .iter()
        .filter(|p| p.name != viewer && p.is_alive)
        .filter(|p| p.role.is_some_and(|role| role.faction() == Faction::Fascist))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::fixtures::{alive, with_role};

    fn names(players: Vec<&Player>) -> Vec<&str> {
        players.into_iter().map(|p| p.name.as_str()).collect()
    }

    fn seven_seat_table() -> GameSnapshot {
        let mut dead_fascist = with_role(alive("gus"), Role::Fascist);
        dead_fascist.is_alive = false;

        GameSnapshot {
            players: vec![
                with_role(alive("alice"), Role::Fascist),
                with_role(alive("bob"), Role::Liberal),
                with_role(alive("carol"), Role::Hitler),
                with_role(alive("dave"), Role::Fascist),
                with_role(alive("erin"), Role::Liberal),
                alive("frank"),
                dead_fascist,
            ],
            ..Default::default()
        }
    }

    #[test]
    fn fascist_sees_alive_fascists_and_hitler() {
        let snapshot = seven_seat_table();
        assert_eq!(names(visible_allies(&snapshot, "alice")), vec!["carol", "dave"]);
        assert_eq!(names(visible_allies(&snapshot, "dave")), vec!["alice", "carol"]);
    }

    #[test]
    fn liberal_and_hitler_see_nobody() {
        let snapshot = seven_seat_table();
        assert!(visible_allies(&snapshot, "bob").is_empty());
        assert!(visible_allies(&snapshot, "carol").is_empty());
    }

    #[test]
    fn unknown_viewer_or_role_sees_nobody() {
        let snapshot = seven_seat_table();
        assert!(visible_allies(&snapshot, "frank").is_empty());
        assert!(visible_allies(&snapshot, "zed").is_empty());
    }

    #[test]
    fn unstated_roles_are_not_inferred() {
        let snapshot = GameSnapshot {
            players: vec![with_role(alive("alice"), Role::Fascist), alive("bob")],
            ..Default::default()
        };
        assert!(visible_allies(&snapshot, "alice").is_empty());
    }
}
