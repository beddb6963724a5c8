//! Atomic transaction coordinator over the three stores and the asset ledger.
//!
//! Every mutating operation runs with the undo journals of [`Ledgers`] open.
//! The writes are kept only if the operation succeeds and supply
//! conservation still holds afterwards; on any error they are undone entry
//! by entry. A payout that releases from escrow and then fails on the venue
//! transfer therefore leaves the escrow, the engine, and every balance
//! exactly as they were. The cost of a transaction is proportional to what
//! it writes, not to the size of the stores.

use classpay_escrow::{AssetLedger, PaymentEscrow};
use classpay_registry::ClassRegistry;
use classpay_types::{
    Amount, CallContext, ClassId, Currency, EscrowId, Identity, MarketplaceConfig, NewClass,
    PaymentRelease, PayoutId, PayoutRequest, Result, Sequence, Transactional, constants,
};

use crate::engine::SplitPayoutEngine;
use crate::supply_conservation::SupplyConservation;

/// The identities a deployment is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Owner of all three stores; receives platform fees.
    pub owner: Identity,
    pub registry: Identity,
    pub escrow: Identity,
    pub engine: Identity,
}

/// Everything a transaction may touch.
#[derive(Debug)]
pub struct Ledgers {
    pub registry: ClassRegistry,
    pub escrow: PaymentEscrow,
    pub engine: SplitPayoutEngine,
    pub assets: AssetLedger,
    pub supply: SupplyConservation,
}

impl Ledgers {
    /// Check every currency's ledger total against recorded deposits.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` on the first mismatch.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply
            .verify_all(|currency| self.assets.total_supply(currency))
    }
}

impl Transactional for Ledgers {
    fn begin(&mut self) {
        self.registry.begin();
        self.escrow.begin();
        self.engine.begin();
        self.assets.begin();
        self.supply.begin();
    }

    fn commit(&mut self) {
        self.registry.commit();
        self.escrow.commit();
        self.engine.commit();
        self.assets.commit();
        self.supply.commit();
    }

    fn rollback(&mut self) {
        self.registry.rollback();
        self.escrow.rollback();
        self.engine.rollback();
        self.assets.rollback();
        self.supply.rollback();
    }
}

/// A deployed, wired marketplace with all-or-nothing operations.
#[derive(Debug)]
pub struct Marketplace {
    state: Ledgers,
    /// Number of committed transactions.
    commits: u64,
}

impl Marketplace {
    /// Build the three stores from `config` and wire them to each other.
    ///
    /// # Errors
    /// - `Configuration` if `config` is invalid
    /// - any wiring error (e.g. `InvalidRecipient` for a burn identity)
    pub fn deploy(config: &MarketplaceConfig, deployment: Deployment) -> Result<Self> {
        config.validate()?;
        let Deployment {
            owner,
            registry,
            escrow,
            engine,
        } = deployment;

        let mut state = Ledgers {
            registry: ClassRegistry::from_config(registry.clone(), owner.clone(), config),
            escrow: PaymentEscrow::from_config(escrow.clone(), owner.clone(), config),
            engine: SplitPayoutEngine::from_config(engine.clone(), owner.clone(), config)?,
            assets: AssetLedger::new(),
            supply: SupplyConservation::new(),
        };

        let ctx = CallContext::new(owner, Sequence::default());
        state.registry.set_escrow_contract(&ctx, escrow.clone())?;
        state.escrow.set_registry_contract(&ctx, registry.clone())?;
        state.escrow.set_payout_contract(&ctx, engine)?;
        state.engine.set_escrow_contract(&ctx, escrow)?;
        state.engine.set_registry_contract(&ctx, registry)?;

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            owner = %ctx.caller,
            max_classes = config.max_classes,
            max_escrows = config.max_escrows,
            max_payouts = config.max_payouts,
            platform_fee = config.platform_fee,
            "Marketplace deployed"
        );
        Ok(Self { state, commits: 0 })
    }

    /// Run `op` with the journals open and keep its writes only on success.
    ///
    /// Supply conservation is checked before committing; a violation rolls
    /// the transaction back like any other error.
    ///
    /// # Errors
    /// Whatever `op` returns, or `SupplyInvariantViolation`.
    pub fn transact<T>(
        &mut self,
        operation: &str,
        op: impl FnOnce(&mut Ledgers) -> Result<T>,
    ) -> Result<T> {
        self.state.begin();
        let outcome = op(&mut self.state).and_then(|value| {
            self.state.verify_supply()?;
            Ok(value)
        });
        match outcome {
            Ok(value) => {
                self.state.commit();
                self.commits += 1;
                tracing::debug!(operation, commits = self.commits, "Transaction committed");
                Ok(value)
            }
            Err(err) => {
                self.state.rollback();
                tracing::warn!(
                    operation,
                    code = %err.category(),
                    error = %err,
                    "Transaction rolled back"
                );
                Err(err)
            }
        }
    }

    /// Credit `holder` with funds from outside the system.
    ///
    /// # Errors
    /// `ArithmeticOverflow` if the balance would overflow.
    pub fn fund(&mut self, holder: &Identity, currency: Currency, amount: Amount) -> Result<()> {
        self.transact("fund", |l| {
            l.assets.deposit(holder, currency, amount)?;
            l.supply.record_deposit(currency, amount);
            Ok(())
        })
    }

    // ---- ClassRegistry ----

    /// # Errors
    /// See [`ClassRegistry::create_class`].
    pub fn create_class(&mut self, ctx: &CallContext, new_class: NewClass) -> Result<ClassId> {
        self.transact("create_class", |l| l.registry.create_class(ctx, new_class))
    }

    /// # Errors
    /// See [`ClassRegistry::register_for_class`].
    pub fn register_for_class(&mut self, ctx: &CallContext, class_id: ClassId) -> Result<()> {
        self.transact("register_for_class", |l| {
            l.registry.register_for_class(ctx, class_id)
        })
    }

    /// # Errors
    /// See [`ClassRegistry::complete_class`].
    pub fn complete_class(&mut self, ctx: &CallContext, class_id: ClassId) -> Result<()> {
        self.transact("complete_class", |l| l.registry.complete_class(ctx, class_id))
    }

    /// # Errors
    /// See [`ClassRegistry::update_class`].
    pub fn update_class(
        &mut self,
        ctx: &CallContext,
        class_id: ClassId,
        name: &str,
        price: Amount,
    ) -> Result<()> {
        self.transact("update_class", |l| {
            l.registry.update_class(ctx, class_id, name, price)
        })
    }

    /// # Errors
    /// See [`ClassRegistry::set_max_classes`].
    pub fn set_max_classes(&mut self, ctx: &CallContext, max_classes: u64) -> Result<()> {
        self.transact("set_max_classes", |l| {
            l.registry.set_max_classes(ctx, max_classes)
        })
    }

    // ---- PaymentEscrow ----

    /// # Errors
    /// See [`PaymentEscrow::escrow_payment`].
    pub fn escrow_payment(
        &mut self,
        ctx: &CallContext,
        class_id: ClassId,
        amount: Amount,
        currency: &str,
    ) -> Result<EscrowId> {
        self.transact("escrow_payment", |l| {
            l.escrow
                .escrow_payment(ctx, &l.registry, &mut l.assets, class_id, amount, currency)
        })
    }

    /// Release custody funds directly. Only the wired engine may call this.
    ///
    /// # Errors
    /// See [`PaymentEscrow::release_payment`](PaymentRelease::release_payment).
    pub fn release_payment(
        &mut self,
        ctx: &CallContext,
        class_id: ClassId,
        amount: Amount,
    ) -> Result<()> {
        self.transact("release_payment", |l| {
            l.escrow
                .release_payment(ctx, &l.registry, &mut l.assets, class_id, amount)
        })
    }

    /// # Errors
    /// See [`PaymentEscrow::update_escrow_amount`].
    pub fn update_escrow_amount(
        &mut self,
        ctx: &CallContext,
        escrow_id: EscrowId,
        new_amount: Amount,
    ) -> Result<()> {
        self.transact("update_escrow_amount", |l| {
            l.escrow.update_escrow_amount(ctx, escrow_id, new_amount)
        })
    }

    /// # Errors
    /// See [`PaymentEscrow::set_max_escrows`].
    pub fn set_max_escrows(&mut self, ctx: &CallContext, max_escrows: u64) -> Result<()> {
        self.transact("set_max_escrows", |l| {
            l.escrow.set_max_escrows(ctx, max_escrows)
        })
    }

    // ---- SplitPayoutEngine ----

    /// Settle a class across escrow, engine, and ledger in one transaction.
    ///
    /// # Errors
    /// See [`SplitPayoutEngine::process_payout`].
    pub fn process_payout(&mut self, ctx: &CallContext, request: PayoutRequest) -> Result<PayoutId> {
        self.transact("process_payout", |l| {
            l.engine
                .process_payout(ctx, &mut l.escrow, &l.registry, &mut l.assets, request)
        })
    }

    /// # Errors
    /// See [`SplitPayoutEngine::update_payout_split`].
    pub fn update_payout_split(
        &mut self,
        ctx: &CallContext,
        payout_id: PayoutId,
        new_split: u8,
    ) -> Result<()> {
        self.transact("update_payout_split", |l| {
            l.engine.update_payout_split(ctx, payout_id, new_split)
        })
    }

    /// # Errors
    /// See [`SplitPayoutEngine::set_platform_fee`].
    pub fn set_platform_fee(&mut self, ctx: &CallContext, fee: u8) -> Result<()> {
        self.transact("set_platform_fee", |l| l.engine.set_platform_fee(ctx, fee))
    }

    /// # Errors
    /// See [`SplitPayoutEngine::set_max_payouts`].
    pub fn set_max_payouts(&mut self, ctx: &CallContext, max_payouts: u64) -> Result<()> {
        self.transact("set_max_payouts", |l| {
            l.engine.set_max_payouts(ctx, max_payouts)
        })
    }

    // ---- Reads ----

    #[must_use]
    pub fn registry(&self) -> &ClassRegistry {
        &self.state.registry
    }

    #[must_use]
    pub fn escrow(&self) -> &PaymentEscrow {
        &self.state.escrow
    }

    #[must_use]
    pub fn engine(&self) -> &SplitPayoutEngine {
        &self.state.engine
    }

    #[must_use]
    pub fn assets(&self) -> &AssetLedger {
        &self.state.assets
    }

    #[must_use]
    pub fn balance(&self, holder: &Identity, currency: Currency) -> Amount {
        self.state.assets.balance(holder, currency)
    }

    /// Number of committed transactions since deployment.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }
}
