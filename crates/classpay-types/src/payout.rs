//! Payout model owned by the settlement engine.

use serde::{Deserialize, Serialize};

use crate::{Amount, ClassId, Identity, PayoutId, Sequence};

/// Lifecycle state of a payout record.
///
/// Every payout is created `Active`. No operation moves it to `Settled`;
/// split edits are only accepted once it is no longer active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutStatus {
    Active,
    Settled,
}

impl PayoutStatus {
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }
}

impl std::fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// Arguments to `process_payout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRequest {
    pub class_id: ClassId,
    pub total_amount: Amount,
    pub instructor_split: u8,
    pub instructor: Identity,
    pub venue: Identity,
}

/// A recorded three-way settlement of a class.
///
/// `instructor_amount + venue_amount + platform_amount == total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub class_id: ClassId,
    pub total_amount: Amount,
    pub instructor_split: u8,
    pub instructor_amount: Amount,
    pub venue_amount: Amount,
    pub platform_amount: Amount,
    pub instructor: Identity,
    pub venue: Identity,
    pub created_at: Sequence,
    pub status: PayoutStatus,
}

impl Payout {
    /// Sum of the three legs.
    #[must_use]
    pub fn distributed(&self) -> Amount {
        self.instructor_amount + self.venue_amount + self.platform_amount
    }
}

/// The single-slot audit record of the latest split edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutUpdate {
    pub instructor_split: u8,
    pub updated_at: Sequence,
    pub updater: Identity,
}
