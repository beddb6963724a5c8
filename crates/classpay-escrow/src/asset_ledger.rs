//! In-memory asset transfer service.
//!
//! Tracks per-(identity, currency) balances in minor units. All mutations
//! are atomic: either the full transfer succeeds or no balance changes.
//! Balances and the transfer log are journaled while a transaction is open.

use classpay_types::{
    Amount, AssetTransfer, ClasspayError, Currency, Identity, JournaledLog, JournaledMap, Result,
    Transactional,
};
use serde::{Deserialize, Serialize};

/// One successful transfer, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub currency: Currency,
    pub amount: Amount,
    pub from: Identity,
    pub to: Identity,
}

/// Balances plus the log of every transfer that moved them.
///
/// Value enters only through [`AssetLedger::deposit`]; [`AssetTransfer::transfer`]
/// moves it without creating or destroying any.
#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    /// Per-(identity, currency) balances.
    balances: JournaledMap<(Identity, Currency), Amount>,
    /// Successful transfers in execution order.
    transfers: JournaledLog<TransferRecord>,
}

impl AssetLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `holder` with funds from outside the system.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would overflow.
    pub fn deposit(&mut self, holder: &Identity, currency: Currency, amount: Amount) -> Result<()> {
        let credited = self
            .balance(holder, currency)
            .checked_add(amount)
            .ok_or_else(|| {
                ClasspayError::ArithmeticOverflow(format!("{holder} {currency} balance"))
            })?;
        self.balances.insert((holder.clone(), currency), credited);
        Ok(())
    }

    /// Balance of `holder` in `currency`; zero if never credited.
    #[must_use]
    pub fn balance(&self, holder: &Identity, currency: Currency) -> Amount {
        self.balances
            .get(&(holder.clone(), currency))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of every holder's balance in `currency`.
    #[must_use]
    pub fn total_supply(&self, currency: Currency) -> u128 {
        self.balances
            .iter()
            .filter(|((_, c), _)| *c == currency)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }

    /// Every successful transfer so far.
    #[must_use]
    pub fn transfers(&self) -> &[TransferRecord] {
        self.transfers.as_slice()
    }
}

impl Transactional for AssetLedger {
    fn begin(&mut self) {
        self.balances.begin();
        self.transfers.begin();
    }

    fn commit(&mut self) {
        self.balances.commit();
        self.transfers.commit();
    }

    fn rollback(&mut self) {
        self.balances.rollback();
        self.transfers.rollback();
    }
}

impl AssetTransfer for AssetLedger {
    fn transfer(
        &mut self,
        currency: Currency,
        amount: Amount,
        from: &Identity,
        to: &Identity,
    ) -> Result<()> {
        let available = self.balance(from, currency);
        if available < amount {
            return Err(ClasspayError::InsufficientBalance {
                holder: from.clone(),
                currency,
                needed: amount,
                available,
            });
        }
        if from != to {
            let credited = self.balance(to, currency).checked_add(amount).ok_or_else(|| {
                ClasspayError::ArithmeticOverflow(format!("{to} {currency} balance"))
            })?;
            self.balances
                .insert((from.clone(), currency), available - amount);
            self.balances.insert((to.clone(), currency), credited);
        }

        tracing::debug!(
            currency = %currency,
            amount,
            from = %from,
            to = %to,
            "Transfer executed"
        );
        self.transfers.push(TransferRecord {
            currency,
            amount,
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }
}
