//! # classpay-types
//!
//! Shared types, errors, and configuration for the **ClassPay** settlement
//! ledgers.
//!
//! This crate is the leaf dependency of the workspace; every store crate
//! depends on it. It defines:
//!
//! - **Identities**: [`Identity`] (opaque principal) and the reserved burn identity
//! - **Identifiers**: [`ClassId`], [`EscrowId`], [`PayoutId`], [`Sequence`]
//! - **Currency**: [`Currency`], the closed two-symbol set
//! - **Class model**: [`Class`], [`ClassStatus`], [`ClassUpdate`], [`NewClass`]
//! - **Escrow model**: [`Escrow`], [`EscrowStatus`], [`EscrowUpdate`], [`ReleaseEvent`]
//! - **Payout model**: [`Payout`], [`PayoutStatus`], [`PayoutUpdate`], [`PayoutRequest`]
//! - **Wiring**: [`Wiring`], the set-once collaborator reference
//! - **Reentrancy**: [`ReentrancyGuard`], the per-class in-flight set
//! - **Journals**: [`Transactional`], [`JournaledMap`], [`JournaledLog`], [`Checkpoint`]
//! - **Call context**: [`CallContext`], the caller + sequence supplied by the host
//! - **Collaborators**: [`AssetTransfer`], [`ClassStatusQuery`], [`PaymentRelease`]
//! - **Configuration**: [`MarketplaceConfig`]
//! - **Errors**: [`ClasspayError`] with `CP_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod class;
pub mod collaborator;
pub mod config;
pub mod constants;
pub mod context;
pub mod currency;
pub mod error;
pub mod escrow;
pub mod identity;
pub mod ids;
pub mod journal;
pub mod payout;
pub mod reentrancy;
pub mod wiring;

// Re-export all primary types at crate root for ergonomic imports:
//   use classpay_types::{Class, Escrow, Payout, Identity, ...};

pub use class::*;
pub use collaborator::*;
pub use config::*;
pub use context::*;
pub use currency::*;
pub use error::*;
pub use escrow::*;
pub use identity::*;
pub use ids::*;
pub use journal::*;
pub use payout::*;
pub use reentrancy::*;
pub use wiring::*;

// Constants are accessed via `classpay_types::constants::FOO`
// (not re-exported to avoid name collisions).
