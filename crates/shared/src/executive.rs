//! Executive powers unlocked by enacted fascist policies

use serde::{Deserialize, Serialize};

/// Power the president may exercise during the Executive phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutivePower {
    /// Learn another player's party membership
    Investigate,
    /// Choose the next presidential candidate
    SpecialElection,
    /// Look at the top three policies of the deck
    PolicyPeek,
    /// Kill a player
    Execution,
}

impl ExecutivePower {
    pub const ALL: [ExecutivePower; 4] = [
        ExecutivePower::Investigate,
        ExecutivePower::SpecialElection,
        ExecutivePower::PolicyPeek,
        ExecutivePower::Execution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutivePower::Investigate => "investigate",
            ExecutivePower::SpecialElection => "special_election",
            ExecutivePower::PolicyPeek => "policy_peek",
            ExecutivePower::Execution => "execution",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|power| power.as_str() == s)
    }

    /// Whether the power is exercised on another player.
    pub fn requires_target(&self) -> bool {
        !matches!(self, ExecutivePower::PolicyPeek)
    }
}

impl std::fmt::Display for ExecutivePower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the server's offer string, e.g. `investigate_or_special_election_or_policy_peek`.
///
/// Unknown names are skipped. Order follows the offer; duplicates are dropped.
pub fn parse_offered_powers(offer: &str) -> Vec<ExecutivePower> {
    let mut powers = Vec::new();
    for name in offer.split("_or_") {
        if let Some(power) = ExecutivePower::from_wire(name.trim()) {
            if !powers.contains(&power) {
                powers.push(power);
            }
        }
    }
    powers
}
