//! Payment escrow. Takes deposits into custody and releases them to the
//! settlement engine.
//!
//! The escrow atomically moves a participant's deposit into custody and
//! records an [`Escrow`]. If the transfer fails, no escrow is recorded.
//! Releases move custody funds to the wired payout engine; the engine
//! supplies the amount.

use classpay_types::{
    Amount, AssetTransfer, CallContext, Checkpoint, ClassId, ClassStatusQuery, ClassStatusView,
    ClasspayError, Currency, Escrow, EscrowId, EscrowStatus, EscrowUpdate, Identity,
    JournaledLog, JournaledMap, MarketplaceConfig, PaymentRelease, ReentrancyGuard, ReleaseEvent,
    Result, Transactional, Wiring,
};

const REGISTRY_SLOT: &str = "escrow registry";

/// Owns per-(class, participant) deposits and the custody balance.
#[derive(Debug, Clone)]
pub struct PaymentEscrow {
    /// This store's own identity; custody funds are held under it.
    identity: Identity,
    /// Principal allowed to wire and configure the store.
    owner: Identity,
    /// Next id to hand out; also the number of escrows created.
    next_escrow_id: Checkpoint<EscrowId>,
    /// Ceiling on `next_escrow_id`.
    max_escrows: Checkpoint<u64>,
    /// Registry consulted for class status.
    registry_contract: Checkpoint<Wiring>,
    /// The only identity allowed to trigger releases.
    payout_contract: Checkpoint<Wiring>,
    /// All escrows indexed by id.
    escrows: JournaledMap<EscrowId, Escrow>,
    /// (class, participant) → escrow id.
    escrows_by_class: JournaledMap<(ClassId, Identity), EscrowId>,
    /// Latest amount edit per escrow.
    escrow_updates: JournaledMap<EscrowId, EscrowUpdate>,
    /// Every release, in order.
    releases: JournaledLog<ReleaseEvent>,
    in_flight: ReentrancyGuard,
}

impl PaymentEscrow {
    /// Create an empty escrow store.
    #[must_use]
    pub fn new(identity: Identity, owner: Identity, max_escrows: u64) -> Self {
        Self {
            identity,
            owner,
            next_escrow_id: Checkpoint::new(EscrowId::default()),
            max_escrows: Checkpoint::new(max_escrows),
            registry_contract: Checkpoint::new(Wiring::Unset),
            payout_contract: Checkpoint::new(Wiring::Unset),
            escrows: JournaledMap::new(),
            escrows_by_class: JournaledMap::new(),
            escrow_updates: JournaledMap::new(),
            releases: JournaledLog::new(),
            in_flight: ReentrancyGuard::new(),
        }
    }

    /// Create an empty escrow store sized by `config`.
    #[must_use]
    pub fn from_config(identity: Identity, owner: Identity, config: &MarketplaceConfig) -> Self {
        Self::new(identity, owner, config.max_escrows)
    }

    /// Wire the registry consulted for class status. Owner-only, set-once.
    ///
    /// # Errors
    /// See [`Wiring::set`].
    pub fn set_registry_contract(&mut self, ctx: &CallContext, registry: Identity) -> Result<()> {
        self.registry_contract
            .get_mut()
            .set(&self.owner, ctx, registry)?;
        tracing::info!(
            escrow = %self.identity,
            registry = ?self.registry_contract.get(),
            "Escrow registry wired"
        );
        Ok(())
    }

    /// Wire the payout engine allowed to trigger releases. Owner-only, set-once.
    ///
    /// # Errors
    /// See [`Wiring::set`].
    pub fn set_payout_contract(&mut self, ctx: &CallContext, payout: Identity) -> Result<()> {
        self.payout_contract
            .get_mut()
            .set(&self.owner, ctx, payout)?;
        tracing::info!(
            escrow = %self.identity,
            payout = ?self.payout_contract.get(),
            "Escrow payout engine wired"
        );
        Ok(())
    }

    /// Change the escrow ceiling. Owner-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if the caller is not the owner
    /// - `InvalidUpdateParam` if `max_escrows` is zero
    pub fn set_max_escrows(&mut self, ctx: &CallContext, max_escrows: u64) -> Result<()> {
        ctx.require(&self.owner)?;
        if max_escrows == 0 {
            return Err(ClasspayError::InvalidUpdateParam {
                reason: "max_escrows must be > 0".into(),
            });
        }
        self.max_escrows.set(max_escrows);
        Ok(())
    }

    /// Take `amount` from the caller into custody against an open class.
    ///
    /// 1. Validate arguments and wiring
    /// 2. Read the class status from the registry; it must be open
    /// 3. Transfer `amount` from the caller to custody
    /// 4. Record the escrow (HELD) and its (class, participant) index
    ///
    /// # Errors
    /// - `MaxEscrowsExceeded`, `InvalidClassId`, `InvalidAmount`, `InvalidCurrency`
    /// - `AuthorityNotVerified` if the registry is unwired or `registry` is not it
    /// - `ClassNotOpen` if the class is closed or unknown
    /// - `AlreadyEscrowed` if the caller already has an escrow for the class
    /// - `ReentrantCall` if a call for this class is already in flight
    /// - `InsufficientBalance` if the caller cannot fund the deposit
    pub fn escrow_payment(
        &mut self,
        ctx: &CallContext,
        registry: &dyn ClassStatusQuery,
        transfers: &mut dyn AssetTransfer,
        class_id: ClassId,
        amount: Amount,
        currency: &str,
    ) -> Result<EscrowId> {
        let max = *self.max_escrows;
        if self.next_escrow_id.0 >= max {
            return Err(ClasspayError::MaxEscrowsExceeded { max });
        }
        validate_class_id(class_id)?;
        validate_amount(amount)?;
        let currency: Currency = currency.parse()?;
        self.registry_contract
            .verify(REGISTRY_SLOT, registry.identity())?;
        require_open(registry, class_id)?;
        let key = (class_id, ctx.caller.clone());
        if self.escrows_by_class.contains_key(&key) {
            return Err(ClasspayError::AlreadyEscrowed {
                class_id,
                participant: ctx.caller.clone(),
            });
        }

        self.in_flight.enter(class_id)?;
        let funded = transfers.transfer(currency, amount, &ctx.caller, &self.identity);
        self.in_flight.exit(class_id);
        funded?;

        let id = *self.next_escrow_id;
        self.escrows.insert(
            id,
            Escrow {
                id,
                class_id,
                participant: ctx.caller.clone(),
                amount,
                currency,
                created_at: ctx.sequence,
                status: EscrowStatus::Held,
            },
        );
        self.escrows_by_class.insert(key, id);
        self.next_escrow_id.set(id.next());

        tracing::info!(
            escrow_id = %id,
            class_id = %class_id,
            participant = %ctx.caller,
            amount,
            currency = %currency,
            "Payment escrowed"
        );
        Ok(id)
    }

    /// Change the amount recorded on a held escrow. Participant-only.
    ///
    /// Only the record changes; no funds move. Overwrites the escrow's single
    /// audit slot.
    ///
    /// # Errors
    /// - `EscrowNotFound` if the escrow does not exist
    /// - `NotAuthorized` if the caller is not the participant
    /// - `EscrowAlreadyReleased` if the escrow is no longer held
    /// - `InvalidAmount` if `new_amount` is zero
    pub fn update_escrow_amount(
        &mut self,
        ctx: &CallContext,
        escrow_id: EscrowId,
        new_amount: Amount,
    ) -> Result<()> {
        let escrow = self
            .escrows
            .get(&escrow_id)
            .ok_or(ClasspayError::EscrowNotFound(escrow_id))?;
        ctx.require(&escrow.participant)?;
        if !escrow.status.is_held() {
            return Err(ClasspayError::EscrowAlreadyReleased(escrow_id));
        }
        validate_amount(new_amount)?;

        if let Some(escrow) = self.escrows.get_mut(&escrow_id) {
            escrow.amount = new_amount;
        }
        self.escrow_updates.insert(
            escrow_id,
            EscrowUpdate {
                amount: new_amount,
                updated_at: ctx.sequence,
                updater: ctx.caller.clone(),
            },
        );
        tracing::debug!(escrow_id = %escrow_id, amount = new_amount, "Escrow amount updated");
        Ok(())
    }

    /// Look up an escrow by id.
    #[must_use]
    pub fn get_escrow(&self, escrow_id: EscrowId) -> Option<&Escrow> {
        self.escrows.get(&escrow_id)
    }

    /// The escrow id for a (class, participant) pair.
    #[must_use]
    pub fn get_escrow_by_class(&self, class_id: ClassId, participant: &Identity) -> Option<EscrowId> {
        self.escrows_by_class
            .get(&(class_id, participant.clone()))
            .copied()
    }

    /// Number of escrows ever created (equal to the next escrow id).
    #[must_use]
    pub fn get_escrow_count(&self) -> u64 {
        self.next_escrow_id.0
    }

    /// The latest amount edit of an escrow, if any.
    #[must_use]
    pub fn get_escrow_update(&self, escrow_id: EscrowId) -> Option<&EscrowUpdate> {
        self.escrow_updates.get(&escrow_id)
    }

    /// Every release so far, in order.
    #[must_use]
    pub fn release_events(&self) -> &[ReleaseEvent] {
        self.releases.as_slice()
    }

    #[must_use]
    pub fn registry_contract(&self) -> Option<&Identity> {
        self.registry_contract.get()
    }

    #[must_use]
    pub fn payout_contract(&self) -> Option<&Identity> {
        self.payout_contract.get()
    }

    #[must_use]
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    #[must_use]
    pub fn max_escrows(&self) -> u64 {
        *self.max_escrows
    }
}

impl Transactional for PaymentEscrow {
    fn begin(&mut self) {
        self.next_escrow_id.begin();
        self.max_escrows.begin();
        self.registry_contract.begin();
        self.payout_contract.begin();
        self.escrows.begin();
        self.escrows_by_class.begin();
        self.escrow_updates.begin();
        self.releases.begin();
    }

    fn commit(&mut self) {
        self.next_escrow_id.commit();
        self.max_escrows.commit();
        self.registry_contract.commit();
        self.payout_contract.commit();
        self.escrows.commit();
        self.escrows_by_class.commit();
        self.escrow_updates.commit();
        self.releases.commit();
    }

    fn rollback(&mut self) {
        self.next_escrow_id.rollback();
        self.max_escrows.rollback();
        self.registry_contract.rollback();
        self.payout_contract.rollback();
        self.escrows.rollback();
        self.escrows_by_class.rollback();
        self.escrow_updates.rollback();
        self.releases.rollback();
    }
}

impl PaymentRelease for PaymentEscrow {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Move `amount` of the class currency from custody to the caller.
    ///
    /// The class status must read as open. No specific escrow record is
    /// consulted or marked; the amount is trusted.
    ///
    /// # Errors
    /// - `NotAuthorized` if the caller is not the wired payout engine
    /// - `InvalidClassId`, `InvalidAmount`
    /// - `AuthorityNotVerified` if the registry is unwired or `registry` is not it
    /// - `ClassNotOpen` if the class is closed or unknown
    /// - `ReentrantCall` if a call for this class is already in flight
    /// - `InsufficientBalance` if custody holds less than `amount`
    fn release_payment(
        &mut self,
        ctx: &CallContext,
        registry: &dyn ClassStatusQuery,
        transfers: &mut dyn AssetTransfer,
        class_id: ClassId,
        amount: Amount,
    ) -> Result<()> {
        if !self.payout_contract.is(&ctx.caller) {
            return Err(ClasspayError::NotAuthorized {
                caller: ctx.caller.clone(),
            });
        }
        validate_class_id(class_id)?;
        validate_amount(amount)?;
        self.registry_contract
            .verify(REGISTRY_SLOT, registry.identity())?;
        let view = require_open(registry, class_id)?;

        self.in_flight.enter(class_id)?;
        let released = transfers.transfer(view.currency, amount, &self.identity, &ctx.caller);
        self.in_flight.exit(class_id);
        released?;

        self.releases.push(ReleaseEvent {
            class_id,
            amount,
            currency: view.currency,
            recipient: ctx.caller.clone(),
            released_at: ctx.sequence,
        });
        tracing::info!(
            class_id = %class_id,
            amount,
            currency = %view.currency,
            recipient = %ctx.caller,
            "Payment released"
        );
        Ok(())
    }
}

/// Test-only state forcing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl PaymentEscrow {
    /// Move an escrow to RELEASED. No public operation does this.
    pub fn force_release(&mut self, escrow_id: EscrowId) -> Result<()> {
        let escrow = self
            .escrows
            .get_mut(&escrow_id)
            .ok_or(ClasspayError::EscrowNotFound(escrow_id))?;
        if !escrow.status.can_transition_to(EscrowStatus::Released) {
            return Err(ClasspayError::EscrowAlreadyReleased(escrow_id));
        }
        escrow.status = EscrowStatus::Released;
        Ok(())
    }
}

fn validate_class_id(class_id: ClassId) -> Result<()> {
    if class_id.is_zero() {
        return Err(ClasspayError::InvalidClassId(class_id));
    }
    Ok(())
}

fn validate_amount(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(ClasspayError::InvalidAmount(amount));
    }
    Ok(())
}

fn require_open(registry: &dyn ClassStatusQuery, class_id: ClassId) -> Result<ClassStatusView> {
    registry
        .class_status(class_id)
        .filter(|view| view.status.is_open())
        .ok_or(ClasspayError::ClassNotOpen(class_id))
}
