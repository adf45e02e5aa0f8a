//! Executive power selection as an explicit state object.
//!
//! When the server offers the president one or more powers, the store records
//! a [`PendingChoice`]. The UI resolves it with an [`ExecutiveChoice`] whenever
//! the player decides; resolution validates the choice against the offer and
//! yields the action to perform.

use ballot_shared::{parse_offered_powers, ExecutivePower, GameSnapshot};

use super::authorizer::PlayerAction;

/// Powers on offer and the players they may target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChoice {
    pub powers: Vec<ExecutivePower>,
    /// Alive players other than the viewer, in seating order
    pub candidates: Vec<String>,
}

/// The president's answer to a [`PendingChoice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutiveChoice {
    pub power: ExecutivePower,
    pub target: Option<String>,
}

impl ExecutiveChoice {
    pub fn targeted(power: ExecutivePower, target: impl Into<String>) -> Self {
        Self {
            power,
            target: Some(target.into()),
        }
    }

    pub fn untargeted(power: ExecutivePower) -> Self {
        Self {
            power,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceError {
    #[error("no executive choice is pending")]
    NothingPending,
    #[error("{0} was not offered")]
    PowerNotOffered(ExecutivePower),
    #[error("{0} needs a target")]
    MissingTarget(ExecutivePower),
    #[error("{0} takes no target")]
    UnexpectedTarget(ExecutivePower),
    #[error("{0} is not a candidate")]
    InvalidTarget(String),
}

impl PendingChoice {
    /// Build from the server's offer string. `None` when nothing usable is offered.
    pub fn from_offer(offer: &str, snapshot: &GameSnapshot, viewer: &str) -> Option<Self> {
        let powers = parse_offered_powers(offer);
        if powers.is_empty() {
            return None;
        }
        let candidates = snapshot
            .alive_players()
            .filter(|p| p.name != viewer)
            .map(|p| p.name.clone())
            .collect();
        Some(Self { powers, candidates })
    }

    /// The only power on offer, if there is exactly one.
    pub fn sole_power(&self) -> Option<ExecutivePower> {
        match self.powers.as_slice() {
            [power] => Some(*power),
            _ => None,
        }
    }

    pub fn offers(&self, power: ExecutivePower) -> bool {
        self.powers.contains(&power)
    }

    /// Validate a choice and turn it into the action to perform.
    pub fn resolve(&self, choice: ExecutiveChoice) -> Result<PlayerAction, ChoiceError> {
        let ExecutiveChoice { power, target } = choice;
        if !self.offers(power) {
            return Err(ChoiceError::PowerNotOffered(power));
        }
        let target = match (power.requires_target(), target) {
            (false, None) => None,
            (false, Some(_)) => return Err(ChoiceError::UnexpectedTarget(power)),
            (true, None) => return Err(ChoiceError::MissingTarget(power)),
            (true, Some(name)) if self.candidates.contains(&name) => Some(name),
            (true, Some(name)) => return Err(ChoiceError::InvalidTarget(name)),
        };
        Ok(PlayerAction::ExecutiveAction { power, target })
    }
}
