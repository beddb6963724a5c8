//! # classpay-escrow
//!
//! **Payment Escrow**: holds each participant's deposit against a class and
//! releases custody funds only to the wired settlement engine.
//!
//! ## Architecture
//!
//! 1. **AssetLedger**: in-memory asset transfer service, tracking per-(identity, currency) balances
//! 2. **PaymentEscrow**: the escrow store; reads class status from the wired registry
//!
//! ## Deposit Flow
//!
//! ```text
//! escrow_payment → registry.class_status() open? → AssetLedger.transfer(participant → custody)
//!     → Escrow{HELD} + (class, participant) index
//! ```
//!
//! ## Release Flow
//!
//! ```text
//! engine → release_payment → registry.class_status() → AssetLedger.transfer(custody → engine)
//!     → ReleaseEvent
//! ```

pub mod asset_ledger;
pub mod escrow;

pub use asset_ledger::{AssetLedger, TransferRecord};
pub use escrow::PaymentEscrow;
