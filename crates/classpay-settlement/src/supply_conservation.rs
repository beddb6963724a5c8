//! Supply conservation invariant checker.
//!
//! Enforced after every committed transaction:
//! ```text
//! ∀ currency: Σ(ledger balances) == Σ(external deposits)
//! ```
//!
//! Escrow, release, and payout only move value between identities. If the
//! ledger total ever drifts from what was deposited, the transaction that
//! caused it is rejected.

use classpay_types::{Amount, ClasspayError, Currency, JournaledMap, Result, Transactional};

/// Tracks per-currency deposit totals and validates the ledger against them.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total external deposits per currency since deployment.
    deposits: JournaledMap<Currency, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record funds entering the system.
    pub fn record_deposit(&mut self, currency: Currency, amount: Amount) {
        let total = self.expected_supply(currency) + u128::from(amount);
        self.deposits.insert(currency, total);
    }

    /// Expected total supply for a currency.
    #[must_use]
    pub fn expected_supply(&self, currency: Currency) -> u128 {
        self.deposits.get(&currency).copied().unwrap_or(0)
    }

    /// Verify that `actual_supply` (sum of every ledger balance) matches
    /// recorded deposits.
    ///
    /// # Errors
    /// Returns [`ClasspayError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, currency: Currency, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(currency);
        if actual_supply != expected {
            tracing::warn!(
                currency = %currency,
                actual = %actual_supply,
                expected = %expected,
                "Supply conservation violated"
            );
            return Err(ClasspayError::SupplyInvariantViolation {
                reason: format!(
                    "Currency {currency}: actual supply {actual_supply} != deposited {expected}"
                ),
            });
        }
        Ok(())
    }

    /// Verify every supported currency against `supply_of`.
    ///
    /// # Errors
    /// The first [`ClasspayError::SupplyInvariantViolation`] found.
    pub fn verify_all(&self, supply_of: impl Fn(Currency) -> u128) -> Result<()> {
        Currency::ALL
            .iter()
            .try_for_each(|&currency| self.verify(currency, supply_of(currency)))
    }
}

impl Transactional for SupplyConservation {
    fn begin(&mut self) {
        self.deposits.begin();
    }

    fn commit(&mut self) {
        self.deposits.commit();
    }

    fn rollback(&mut self) {
        self.deposits.rollback();
    }
}
