use serde::Serialize;

use crate::storage::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
/// Result of confirming a return.
pub enum ReturnOutcome {
    /// Items returned and the finder was paid.
    Rewarded {
        finder: UserId,
        amount: u64,
        finder_balance: u64,
    },
    /// Items returned; lost and found items share an owner, so nobody was paid.
    SelfMatch,
    /// The match was already returned; nothing changed.
    AlreadyReturned,
}

impl ReturnOutcome {
    /// Returns `true` if this confirmation changed state.
    pub fn is_transition(&self) -> bool {
        !matches!(self, ReturnOutcome::AlreadyReturned)
    }

    pub fn reward(&self) -> u64 {
        match self {
            ReturnOutcome::Rewarded { amount, .. } => *amount,
            ReturnOutcome::SelfMatch | ReturnOutcome::AlreadyReturned => 0,
        }
    }
}

impl std::fmt::Display for ReturnOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnOutcome::Rewarded { finder, amount, .. } => {
                write!(f, "REWARDED ({} coins to user {})", amount, finder)
            }
            ReturnOutcome::SelfMatch => write!(f, "SELF_MATCH"),
            ReturnOutcome::AlreadyReturned => write!(f, "ALREADY_RETURNED"),
        }
    }
}
