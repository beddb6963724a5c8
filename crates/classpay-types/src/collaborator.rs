//! Interfaces between the stores and the asset transfer service.
//!
//! Stores never touch each other's state. The escrow and the engine only
//! *read* class status through [`ClassStatusQuery`]; the engine only triggers
//! releases through [`PaymentRelease`]; value only moves through
//! [`AssetTransfer`].

use serde::{Deserialize, Serialize};

use crate::{Amount, CallContext, ClassId, ClassStatus, Currency, Identity, Result};

/// External collaborator that moves value between identities.
pub trait AssetTransfer {
    /// Move `amount` of `currency` from `from` to `to`.
    ///
    /// A failed transfer must leave every balance unchanged.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if `from` holds less than `amount`.
    fn transfer(
        &mut self,
        currency: Currency,
        amount: Amount,
        from: &Identity,
        to: &Identity,
    ) -> Result<()>;
}

/// What a registry reports about a class to other stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStatusView {
    pub status: ClassStatus,
    pub currency: Currency,
}

/// Read-only view of the class registry.
pub trait ClassStatusQuery {
    /// The registry's own identity, checked against wiring.
    fn identity(&self) -> &Identity;

    /// Status and currency of a class, or `None` if it does not exist.
    fn class_status(&self, class_id: ClassId) -> Option<ClassStatusView>;
}

/// Release side of the payment escrow, as seen by the settlement engine.
pub trait PaymentRelease {
    /// The escrow's own identity, checked against wiring.
    fn identity(&self) -> &Identity;

    /// Move `amount` out of custody to the caller.
    ///
    /// # Errors
    /// Authorization, validation, wiring, class-status, and transfer
    /// failures as defined by the implementing store.
    fn release_payment(
        &mut self,
        ctx: &CallContext,
        registry: &dyn ClassStatusQuery,
        transfers: &mut dyn AssetTransfer,
        class_id: ClassId,
        amount: Amount,
    ) -> Result<()>;
}
