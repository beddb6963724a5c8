//! Class model owned by the registry.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────┐  complete (instructor)  ┌────────┐
//!   │ OPEN ├────────────────────────▶│ CLOSED │
//!   └──────┘                         └────────┘
//! ```
//!
//! Closing is terminal. There is no reopen.

use serde::{Deserialize, Serialize};

use crate::{Amount, ClassId, Currency, Identity, Sequence};

/// Lifecycle state of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassStatus {
    /// Accepting registrations, deposits, and instructor edits.
    Open,
    /// Completed by the instructor. **Irreversible.**
    Closed,
}

impl ClassStatus {
    /// Can this class transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }

    /// The raw boolean status flag as the registry stores it: `true` while
    /// open, `false` once closed.
    #[must_use]
    pub fn flag(&self) -> bool {
        self.is_open()
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Arguments to `create_class`.
///
/// `currency` is the raw symbol; the registry validates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClass {
    pub name: String,
    pub price: Amount,
    pub capacity: u32,
    pub instructor_split: u8,
    pub instructor: Identity,
    pub venue: Identity,
    pub currency: String,
}

/// A class definition persisted by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub price: Amount,
    pub capacity: u32,
    /// Percentage of post-fee proceeds owed to the instructor (1–99).
    pub instructor_split: u8,
    pub instructor: Identity,
    pub venue: Identity,
    pub currency: Currency,
    pub created_at: Sequence,
    pub status: ClassStatus,
}

/// The single-slot audit record of the latest class edit.
///
/// Overwritten on every successful update; there is no history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassUpdate {
    pub name: String,
    pub price: Amount,
    pub updated_at: Sequence,
    pub updater: Identity,
}
