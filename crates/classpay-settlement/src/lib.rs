//! # classpay-settlement
//!
//! **Settlement**: split payouts, settlement receipts, supply conservation,
//! and the atomic transaction boundary across all stores.
//!
//! ## Architecture
//!
//! [`SplitPayoutEngine::process_payout`] settles a class:
//! 1. Validates arguments, wiring, class status, and uniqueness
//! 2. Splits the total into platform / instructor / venue legs
//! 3. Releases the total from the payment escrow to itself
//! 4. Pays the three legs through the asset transfer service
//! 5. Records the payout and a [`SettlementReceipt`]
//!
//! [`Marketplace`] owns the registry, escrow, engine, and asset ledger and
//! runs every mutation as one staged transaction, committing only if the
//! operation succeeds and [`SupplyConservation`] still holds.

pub mod engine;
pub mod marketplace;
pub mod receipt;
pub mod split;
pub mod supply_conservation;

pub use engine::SplitPayoutEngine;
pub use marketplace::{Deployment, Ledgers, Marketplace};
pub use receipt::{SettlementLeg, SettlementReceipt};
pub use split::{SplitBreakdown, compute_split};
pub use supply_conservation::SupplyConservation;
