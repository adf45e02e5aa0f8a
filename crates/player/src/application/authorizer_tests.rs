//! Eligibility tests for every phase and action.
//!
//! Each section walks one row of the phase table, then the cross-cutting
//! rules: dead players and finished games deny everything.

use ballot_shared::{ExecutivePower, GameSnapshot, Phase};

use super::authorizer::{check, is_eligible, Ineligible, PlayerAction};
use crate::infrastructure::testing::fixtures::*;

fn every_action() -> Vec<PlayerAction> {
    vec![
        PlayerAction::StartGame,
        PlayerAction::NominateChancellor {
            chancellor_name: "bob".to_string(),
        },
        PlayerAction::CastVote { vote: true },
        PlayerAction::PresidentDiscard { policy_index: 0 },
        PlayerAction::ChancellorEnact { policy_index: 0 },
        PlayerAction::ExecutiveAction {
            power: ExecutivePower::Investigate,
            target: Some("bob".to_string()),
        },
    ]
}

fn nominate(name: &str) -> PlayerAction {
    PlayerAction::NominateChancellor {
        chancellor_name: name.to_string(),
    }
}

fn execute(power: ExecutivePower, target: Option<&str>) -> PlayerAction {
    PlayerAction::ExecutiveAction {
        power,
        target: target.map(str::to_string),
    }
}

// =============================================================================
// Lobby
// =============================================================================

#[test]
fn test_host_starts_with_five_players() {
    let snapshot = lobby("alice", &FIVE);
    assert_eq!(check(&snapshot, "alice", &PlayerAction::StartGame), Ok(()));
}

#[test]
fn test_non_host_cannot_start() {
    let snapshot = lobby("alice", &FIVE);
    assert_eq!(
        check(&snapshot, "bob", &PlayerAction::StartGame),
        Err(Ineligible::NotHost)
    );
}

#[test]
fn test_start_requires_five_to_ten_alive() {
    let four = lobby("alice", &FIVE[..4]);
    assert_eq!(
        check(&four, "alice", &PlayerAction::StartGame),
        Err(Ineligible::PlayerCount { alive: 4 })
    );

    let names: Vec<String> = (0..11).map(|i| format!("p{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let eleven = lobby("p0", &refs);
    assert_eq!(
        check(&eleven, "p0", &PlayerAction::StartGame),
        Err(Ineligible::PlayerCount { alive: 11 })
    );

    let ten = lobby("p0", &refs[..10]);
    assert!(is_eligible(&ten, "p0", &PlayerAction::StartGame));
}

#[test]
fn test_start_denied_without_host() {
    let mut snapshot = lobby("alice", &FIVE);
    snapshot.host_name = None;
    assert_eq!(
        check(&snapshot, "alice", &PlayerAction::StartGame),
        Err(Ineligible::NotHost)
    );
}

// =============================================================================
// Election
// =============================================================================

#[test]
fn test_president_nominates_alive_player() {
    let snapshot = election("alice", &FIVE);
    assert_eq!(check(&snapshot, "alice", &nominate("carol")), Ok(()));
}

#[test]
fn test_only_president_nominates() {
    let snapshot = election("alice", &FIVE);
    assert_eq!(
        check(&snapshot, "bob", &nominate("carol")),
        Err(Ineligible::NotPresident)
    );
}

#[test]
fn test_nomination_denied_without_president() {
    let mut snapshot = election("alice", &FIVE);
    snapshot.current_president = None;
    assert_eq!(
        check(&snapshot, "alice", &nominate("carol")),
        Err(Ineligible::NotPresident)
    );
}

#[test]
fn test_cannot_nominate_self_dead_or_absent() {
    let mut snapshot = election("alice", &FIVE);
    kill(&mut snapshot, "erin");

    assert_eq!(
        check(&snapshot, "alice", &nominate("alice")),
        Err(Ineligible::SelfNomination)
    );
    assert_eq!(
        check(&snapshot, "alice", &nominate("erin")),
        Err(Ineligible::InvalidTarget("erin".to_string()))
    );
    assert_eq!(
        check(&snapshot, "alice", &nominate("zed")),
        Err(Ineligible::InvalidTarget("zed".to_string()))
    );
}

#[test]
fn test_last_chancellor_term_limited_above_five_alive() {
    let six = ["alice", "bob", "carol", "dave", "erin", "frank"];
    let mut snapshot = election("alice", &six);
    snapshot.last_chancellor_name = Some("bob".to_string());

    assert_eq!(
        check(&snapshot, "alice", &nominate("bob")),
        Err(Ineligible::TermLimited("bob".to_string()))
    );

    // Down to five alive: the limit lifts.
    kill(&mut snapshot, "frank");
    assert_eq!(check(&snapshot, "alice", &nominate("bob")), Ok(()));
}

#[test]
fn test_last_chancellor_allowed_at_five() {
    let mut snapshot = election("alice", &FIVE);
    snapshot.last_chancellor_name = Some("bob".to_string());
    assert!(is_eligible(&snapshot, "alice", &nominate("bob")));
}

// =============================================================================
// Voting
// =============================================================================

#[test]
fn test_alive_player_votes_once() {
    let mut snapshot = voting("alice", "bob", &FIVE);
    let vote = PlayerAction::CastVote { vote: false };

    assert_eq!(check(&snapshot, "carol", &vote), Ok(()));

    snapshot.votes.insert("carol".to_string(), false);
    assert_eq!(check(&snapshot, "carol", &vote), Err(Ineligible::AlreadyVoted));
}

#[test]
fn test_player_vote_field_also_counts() {
    let mut snapshot = voting("alice", "bob", &FIVE);
    for player in snapshot.players.iter_mut().filter(|p| p.name == "dave") {
        player.vote = Some(true);
    }
    assert_eq!(
        check(&snapshot, "dave", &PlayerAction::CastVote { vote: true }),
        Err(Ineligible::AlreadyVoted)
    );
}

// =============================================================================
// Legislative
// =============================================================================

#[test]
fn test_president_discards_from_three() {
    let snapshot = president_legislating("alice", "bob", &FIVE);
    for index in 0..3 {
        assert!(is_eligible(
            &snapshot,
            "alice",
            &PlayerAction::PresidentDiscard { policy_index: index }
        ));
    }
    assert_eq!(
        check(&snapshot, "alice", &PlayerAction::PresidentDiscard { policy_index: 3 }),
        Err(Ineligible::PolicyIndex { index: 3, hand: 3 })
    );
    assert_eq!(
        check(&snapshot, "bob", &PlayerAction::PresidentDiscard { policy_index: 0 }),
        Err(Ineligible::NotPresident)
    );
}

#[test]
fn test_president_needs_full_hand() {
    let mut snapshot = president_legislating("alice", "bob", &FIVE);
    snapshot.president_hand = None;
    assert_eq!(
        check(&snapshot, "alice", &PlayerAction::PresidentDiscard { policy_index: 0 }),
        Err(Ineligible::HandSize { expected: 3, actual: 0 })
    );
}

#[test]
fn test_chancellor_enacts_from_two() {
    let snapshot = chancellor_legislating("alice", "bob", &FIVE);
    assert_eq!(
        check(&snapshot, "bob", &PlayerAction::ChancellorEnact { policy_index: 1 }),
        Ok(())
    );
    assert_eq!(
        check(&snapshot, "alice", &PlayerAction::ChancellorEnact { policy_index: 1 }),
        Err(Ineligible::NotChancellor)
    );
    assert_eq!(
        check(&snapshot, "bob", &PlayerAction::ChancellorEnact { policy_index: 2 }),
        Err(Ineligible::PolicyIndex { index: 2, hand: 2 })
    );
}

#[test]
fn test_chancellor_waits_for_discard() {
    // The president has not discarded yet, so the chancellor holds nothing.
    let snapshot = president_legislating("alice", "bob", &FIVE);
    assert_eq!(
        check(&snapshot, "bob", &PlayerAction::ChancellorEnact { policy_index: 0 }),
        Err(Ineligible::HandSize { expected: 2, actual: 0 })
    );
}

// =============================================================================
// Executive
// =============================================================================

#[test]
fn test_president_uses_offered_power() {
    let snapshot = executive("alice", "investigate_or_policy_peek", &FIVE);
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::Investigate, Some("bob"))),
        Ok(())
    );
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::PolicyPeek, None)),
        Ok(())
    );
}

#[test]
fn test_power_must_be_offered() {
    let snapshot = executive("alice", "investigate", &FIVE);
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::Execution, Some("bob"))),
        Err(Ineligible::PowerNotOffered(ExecutivePower::Execution))
    );

    let mut nothing_offered = snapshot.clone();
    nothing_offered.executive_action_available = None;
    assert_eq!(
        check(&nothing_offered, "alice", &execute(ExecutivePower::Investigate, Some("bob"))),
        Err(Ineligible::PowerNotOffered(ExecutivePower::Investigate))
    );
}

#[test]
fn test_executive_targets() {
    let mut snapshot = executive("alice", "execution_or_policy_peek", &FIVE);
    kill(&mut snapshot, "erin");

    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::Execution, None)),
        Err(Ineligible::MissingTarget(ExecutivePower::Execution))
    );
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::Execution, Some("alice"))),
        Err(Ineligible::InvalidTarget("alice".to_string()))
    );
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::Execution, Some("erin"))),
        Err(Ineligible::InvalidTarget("erin".to_string()))
    );
    assert_eq!(
        check(&snapshot, "alice", &execute(ExecutivePower::PolicyPeek, Some("bob"))),
        Err(Ineligible::UnexpectedTarget(ExecutivePower::PolicyPeek))
    );
}

#[test]
fn test_only_president_uses_powers() {
    let snapshot = executive("alice", "investigate", &FIVE);
    assert_eq!(
        check(&snapshot, "bob", &execute(ExecutivePower::Investigate, Some("carol"))),
        Err(Ineligible::NotPresident)
    );
}

// =============================================================================
// Cross-cutting
// =============================================================================

#[test]
fn test_actions_outside_their_phase_are_denied() {
    let snapshot = election("alice", &FIVE);
    assert_eq!(
        check(&snapshot, "alice", &PlayerAction::CastVote { vote: true }),
        Err(Ineligible::WrongPhase {
            action: "cast_vote",
            phase: Phase::Election
        })
    );
}

#[test]
fn test_dead_players_are_ineligible_everywhere() {
    let phases: Vec<GameSnapshot> = vec![
        lobby("alice", &FIVE),
        election("alice", &FIVE),
        voting("carol", "bob", &FIVE),
        president_legislating("alice", "bob", &FIVE),
        chancellor_legislating("carol", "alice", &FIVE),
        executive("alice", "investigate", &FIVE),
    ];

    for mut snapshot in phases {
        kill(&mut snapshot, "alice");
        for action in every_action() {
            assert_eq!(
                check(&snapshot, "alice", &action),
                Err(Ineligible::NotAlive),
                "{action:?} during {}",
                snapshot.phase
            );
        }
    }
}

#[test]
fn test_game_over_denies_everything() {
    let mut snapshot = executive("alice", "investigate", &FIVE);
    snapshot.phase = Phase::GameOver;
    for action in every_action() {
        assert_eq!(check(&snapshot, "alice", &action), Err(Ineligible::GameOver));
    }
}

#[test]
fn test_unknown_phase_and_strangers_are_denied() {
    let mut snapshot = election("alice", &FIVE);
    snapshot.phase = Phase::Unknown;
    for action in every_action() {
        assert!(!is_eligible(&snapshot, "alice", &action));
    }

    let snapshot = election("alice", &FIVE);
    assert_eq!(
        check(&snapshot, "zed", &nominate("bob")),
        Err(Ineligible::UnknownPlayer)
    );
}

#[test]
fn test_empty_snapshot_denies() {
    let snapshot = GameSnapshot::default();
    for action in every_action() {
        assert!(!is_eligible(&snapshot, "alice", &action));
    }
}
