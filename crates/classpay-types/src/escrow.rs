//! Escrow model owned by the payment escrow.
//!
//! ```text
//!   ┌──────┐   release   ┌──────────┐
//!   │ HELD ├────────────▶│ RELEASED │
//!   └──────┘             └──────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::{Amount, ClassId, Currency, EscrowId, Identity, Sequence};

/// Custody state of an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Funds are in custody against the class.
    Held,
    /// Custody ended. **Irreversible.**
    Released,
}

impl EscrowStatus {
    /// Can this escrow transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Held, Self::Released))
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        *self == Self::Held
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Held => write!(f, "HELD"),
            Self::Released => write!(f, "RELEASED"),
        }
    }
}

/// A participant's deposit held against a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub id: EscrowId,
    pub class_id: ClassId,
    pub participant: Identity,
    pub amount: Amount,
    pub currency: Currency,
    pub created_at: Sequence,
    pub status: EscrowStatus,
}

/// The single-slot audit record of the latest escrow amount edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowUpdate {
    pub amount: Amount,
    pub updated_at: Sequence,
    pub updater: Identity,
}

/// A release of custody funds to the payout engine.
///
/// Releases are not tied to a specific [`Escrow`]: the amount is supplied by
/// the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub class_id: ClassId,
    pub amount: Amount,
    pub currency: Currency,
    pub recipient: Identity,
    pub released_at: Sequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_releases_once() {
        assert!(EscrowStatus::Held.can_transition_to(EscrowStatus::Released));
        assert!(!EscrowStatus::Released.can_transition_to(EscrowStatus::Held));
        assert!(!EscrowStatus::Released.can_transition_to(EscrowStatus::Released));
    }
}
