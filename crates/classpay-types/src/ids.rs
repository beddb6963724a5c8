//! Monotonic identifiers and the environment-supplied sequence counter.
//!
//! Every store hands out ids from its own counter starting at zero. Ids are
//! never reused and never skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Amounts, prices, and fees in minor currency units.
pub type Amount = u64;

macro_rules! counter_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The id that follows this one.
            #[must_use]
            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }

            /// Whether this is the zero id.
            #[must_use]
            pub fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

counter_id!(
    /// Identifier of a class, issued by the registry.
    ClassId,
    "class"
);

counter_id!(
    /// Identifier of an escrow, issued by the payment escrow.
    EscrowId,
    "escrow"
);

counter_id!(
    /// Identifier of a payout, issued by the settlement engine.
    PayoutId,
    "payout"
);

/// Monotonically increasing counter supplied by the execution environment.
/// Used in place of wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(pub u64);

impl Sequence {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq:{}", self.0)
    }
}
