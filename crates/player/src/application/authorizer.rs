//! Phase-gated action eligibility.
//!
//! A pure function of `(snapshot, player, action)`. The server remains the
//! authority; this only keeps the UI from offering moves it would reject.
//! Anything missing from the snapshot denies.

use ballot_shared::{parse_offered_powers, ClientMessage, ExecutivePower, GameSnapshot, Phase};

/// Player counts a game can start with.
pub const PLAYER_COUNT: std::ops::RangeInclusive<usize> = 5..=10;

/// At or below this many alive players the last chancellor may be renominated.
pub const TERM_LIMIT_EXEMPT_ALIVE: usize = 5;

pub const PRESIDENT_HAND: usize = 3;
pub const CHANCELLOR_HAND: usize = 2;

/// A move the local player can attempt that is gated on game phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    StartGame,
    NominateChancellor { chancellor_name: String },
    CastVote { vote: bool },
    PresidentDiscard { policy_index: usize },
    ChancellorEnact { policy_index: usize },
    ExecutiveAction {
        power: ExecutivePower,
        target: Option<String>,
    },
}

impl PlayerAction {
    /// Wire action name, as in the outbound frame.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::StartGame => "start_game",
            PlayerAction::NominateChancellor { .. } => "nominate_chancellor",
            PlayerAction::CastVote { .. } => "cast_vote",
            PlayerAction::PresidentDiscard { .. } => "president_discard",
            PlayerAction::ChancellorEnact { .. } => "chancellor_enact",
            PlayerAction::ExecutiveAction { .. } => "executive_action",
        }
    }

    /// The outbound frame that carries this action.
    pub fn to_message(&self) -> ClientMessage {
        match self {
            PlayerAction::StartGame => ClientMessage::StartGame {},
            PlayerAction::NominateChancellor { chancellor_name } => {
                ClientMessage::NominateChancellor {
                    chancellor_name: chancellor_name.clone(),
                }
            }
            PlayerAction::CastVote { vote } => ClientMessage::CastVote { vote: *vote },
            PlayerAction::PresidentDiscard { policy_index } => ClientMessage::PresidentDiscard {
                policy_index: *policy_index,
            },
            PlayerAction::ChancellorEnact { policy_index } => ClientMessage::ChancellorEnact {
                policy_index: *policy_index,
            },
            PlayerAction::ExecutiveAction { power, target } => ClientMessage::ExecutiveAction {
                action_type: *power,
                target: target.clone(),
            },
        }
    }
}

/// Why an action was refused locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Ineligible {
    #[error("no game state received yet")]
    NoSnapshot,
    #[error("not seated in this game")]
    UnknownPlayer,
    #[error("dead players cannot act")]
    NotAlive,
    #[error("the game is over")]
    GameOver,
    #[error("{action} is not allowed during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("only the host can start the game")]
    NotHost,
    #[error("{alive} players present, need 5 to 10")]
    PlayerCount { alive: usize },
    #[error("only the president can do this")]
    NotPresident,
    #[error("only the nominated chancellor can do this")]
    NotChancellor,
    #[error("the president cannot nominate themselves")]
    SelfNomination,
    #[error("{0} is not an eligible target")]
    InvalidTarget(String),
    #[error("{0} was the last chancellor")]
    TermLimited(String),
    #[error("vote already cast this election")]
    AlreadyVoted,
    #[error("expected {expected} cards in hand, found {actual}")]
    HandSize { expected: usize, actual: usize },
    #[error("card {index} is outside a hand of {hand}")]
    PolicyIndex { index: usize, hand: usize },
    #[error("{0} is not on offer")]
    PowerNotOffered(ExecutivePower),
    #[error("{0} needs a target")]
    MissingTarget(ExecutivePower),
    #[error("{0} takes no target")]
    UnexpectedTarget(ExecutivePower),
}

/// Check whether `player` may perform `action` given `snapshot`.
pub fn check(
    snapshot: &GameSnapshot,
    player: &str,
    action: &PlayerAction,
) -> Result<(), Ineligible> {
    let requester = snapshot.player(player).ok_or(Ineligible::UnknownPlayer)?;
    if !requester.is_alive {
        return Err(Ineligible::NotAlive);
    }

    match (snapshot.phase, action) {
        (Phase::GameOver, _) => Err(Ineligible::GameOver),
        (Phase::Lobby, PlayerAction::StartGame) => check_start(snapshot, player),
        (Phase::Election, PlayerAction::NominateChancellor { chancellor_name }) => {
            check_nomination(snapshot, player, chancellor_name)
        }
        (Phase::Voting, PlayerAction::CastVote { .. }) => {
            let voted = snapshot.votes.contains_key(player) || requester.vote.is_some();
            if voted {
                Err(Ineligible::AlreadyVoted)
            } else {
                Ok(())
            }
        }
        (Phase::Legislative, PlayerAction::PresidentDiscard { policy_index }) => {
            require_president(snapshot, player)?;
            check_hand(snapshot.president_cards().len(), PRESIDENT_HAND, *policy_index)
        }
        (Phase::Legislative, PlayerAction::ChancellorEnact { policy_index }) => {
            if snapshot.nominated_chancellor.as_deref() != Some(player) {
                return Err(Ineligible::NotChancellor);
            }
            check_hand(snapshot.chancellor_cards().len(), CHANCELLOR_HAND, *policy_index)
        }
        (Phase::Executive, PlayerAction::ExecutiveAction { power, target }) => {
            check_executive(snapshot, player, *power, target.as_deref())
        }
        (phase, action) => Err(Ineligible::WrongPhase {
            action: action.name(),
            phase,
        }),
    }
}

/// Boolean form of [`check`].
pub fn is_eligible(snapshot: &GameSnapshot, player: &str, action: &PlayerAction) -> bool {
    check(snapshot, player, action).is_ok()
}

fn check_start(snapshot: &GameSnapshot, player: &str) -> Result<(), Ineligible> {
    if !snapshot.is_host(player) {
        return Err(Ineligible::NotHost);
    }
    let alive = snapshot.alive_count();
    if !PLAYER_COUNT.contains(&alive) {
        return Err(Ineligible::PlayerCount { alive });
    }
    Ok(())
}

fn require_president(snapshot: &GameSnapshot, player: &str) -> Result<(), Ineligible> {
    if snapshot.current_president.as_deref() == Some(player) {
        Ok(())
    } else {
        Err(Ineligible::NotPresident)
    }
}

fn check_nomination(
    snapshot: &GameSnapshot,
    player: &str,
    nominee: &str,
) -> Result<(), Ineligible> {
    require_president(snapshot, player)?;
    if nominee == player {
        return Err(Ineligible::SelfNomination);
    }
    if !snapshot.player(nominee).is_some_and(|p| p.is_alive) {
        return Err(Ineligible::InvalidTarget(nominee.to_string()));
    }
    let term_limited = snapshot.last_chancellor_name.as_deref() == Some(nominee);
    if term_limited && snapshot.alive_count() > TERM_LIMIT_EXEMPT_ALIVE {
        return Err(Ineligible::TermLimited(nominee.to_string()));
    }
    Ok(())
}

fn check_hand(actual: usize, expected: usize, index: usize) -> Result<(), Ineligible> {
    if actual != expected {
        return Err(Ineligible::HandSize { expected, actual });
    }
    if index >= actual {
        return Err(Ineligible::PolicyIndex { index, hand: actual });
    }
    Ok(())
}

fn check_executive(
    snapshot: &GameSnapshot,
    player: &str,
    power: ExecutivePower,
    target: Option<&str>,
) -> Result<(), Ineligible> {
    require_president(snapshot, player)?;

    let offered = snapshot
        .executive_action_available
        .as_deref()
        .map(parse_offered_powers)
        .unwrap_or_default();
    if !offered.contains(&power) {
        return Err(Ineligible::PowerNotOffered(power));
    }

    match (power.requires_target(), target) {
        (false, None) => Ok(()),
        (false, Some(_)) => Err(Ineligible::UnexpectedTarget(power)),
        (true, None) => Err(Ineligible::MissingTarget(power)),
        (true, Some(name)) => {
            let valid = name != player && snapshot.player(name).is_some_and(|p| p.is_alive);
            if valid {
                Ok(())
            } else {
                Err(Ineligible::InvalidTarget(name.to_string()))
            }
        }
    }
}
