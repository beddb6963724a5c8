//! Split payout engine.
//!
//! Settles a class in one pass:
//! 1. Validate arguments, wiring, class status, and uniqueness
//! 2. Compute the platform / instructor / venue split
//! 3. Release the total from escrow to the engine
//! 4. Pay the instructor, then the venue, then the platform owner
//! 5. Record the [`Payout`] and its [`SettlementReceipt`]
//!
//! Steps 3 and 4 touch other stores and the asset ledger. The engine itself
//! writes nothing until they all succeed, but it cannot undo a release once
//! a later transfer fails; callers that need all-or-nothing semantics across
//! stores run it inside [`Marketplace`](crate::Marketplace).

use classpay_types::{
    AssetTransfer, CallContext, Checkpoint, ClassId, ClassStatusQuery, ClasspayError, Currency,
    Identity, JournaledMap, MarketplaceConfig, Payout, PayoutId, PayoutRequest, PayoutStatus,
    PayoutUpdate, PaymentRelease, ReentrancyGuard, Result, Transactional, Wiring, constants,
};

use crate::receipt::SettlementReceipt;
use crate::split::{SplitBreakdown, compute_split};

const ESCROW_SLOT: &str = "payout escrow";
const REGISTRY_SLOT: &str = "payout registry";

/// Computes and executes three-way payouts, one per class.
#[derive(Debug, Clone)]
pub struct SplitPayoutEngine {
    /// Identity releases are paid to and legs are paid from.
    identity: Identity,
    /// Principal allowed to configure the engine; receives the platform leg.
    owner: Identity,
    next_payout_id: Checkpoint<PayoutId>,
    max_payouts: Checkpoint<u64>,
    /// Whole percent of each total kept by the platform.
    platform_fee: Checkpoint<u8>,
    escrow_contract: Checkpoint<Wiring>,
    registry_contract: Checkpoint<Wiring>,
    payouts: JournaledMap<PayoutId, Payout>,
    /// class → its single payout.
    payouts_by_class: JournaledMap<ClassId, PayoutId>,
    payout_updates: JournaledMap<PayoutId, PayoutUpdate>,
    receipts: JournaledMap<PayoutId, SettlementReceipt>,
    in_flight: ReentrancyGuard,
}

impl SplitPayoutEngine {
    /// Create an engine with no payouts.
    ///
    /// # Errors
    /// Returns `InvalidPlatformFee` if `platform_fee` exceeds
    /// [`constants::MAX_PLATFORM_FEE`].
    pub fn new(
        identity: Identity,
        owner: Identity,
        max_payouts: u64,
        platform_fee: u8,
    ) -> Result<Self> {
        if platform_fee > constants::MAX_PLATFORM_FEE {
            return Err(ClasspayError::InvalidPlatformFee(platform_fee));
        }
        Ok(Self {
            identity,
            owner,
            next_payout_id: Checkpoint::new(PayoutId::default()),
            max_payouts: Checkpoint::new(max_payouts),
            platform_fee: Checkpoint::new(platform_fee),
            escrow_contract: Checkpoint::new(Wiring::Unset),
            registry_contract: Checkpoint::new(Wiring::Unset),
            payouts: JournaledMap::new(),
            payouts_by_class: JournaledMap::new(),
            payout_updates: JournaledMap::new(),
            receipts: JournaledMap::new(),
            in_flight: ReentrancyGuard::new(),
        })
    }

    /// # Errors
    /// Returns `Configuration` if `config` fails [`MarketplaceConfig::validate`].
    pub fn from_config(
        identity: Identity,
        owner: Identity,
        config: &MarketplaceConfig,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(identity, owner, config.max_payouts, config.platform_fee)
    }

    /// Wire the escrow releases are drawn from. Owner-only, set-once.
    ///
    /// # Errors
    /// See [`Wiring::set`].
    pub fn set_escrow_contract(&mut self, ctx: &CallContext, escrow: Identity) -> Result<()> {
        self.escrow_contract
            .get_mut()
            .set(&self.owner, ctx, escrow)?;
        tracing::info!(
            engine = %self.identity,
            escrow = ?self.escrow_contract.get(),
            "Payout escrow wired"
        );
        Ok(())
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
            engine = %self.identity,
            registry = ?self.registry_contract.get(),
            "Payout registry wired"
        );
        Ok(())
    }

    /// Change the platform fee. Owner-only. No lower bound.
    ///
    /// # Errors
    /// - `NotAuthorized` if the caller is not the owner
    /// - `InvalidPlatformFee` if `fee` exceeds [`constants::MAX_PLATFORM_FEE`]
    pub fn set_platform_fee(&mut self, ctx: &CallContext, fee: u8) -> Result<()> {
        ctx.require(&self.owner)?;
        if fee > constants::MAX_PLATFORM_FEE {
            return Err(ClasspayError::InvalidPlatformFee(fee));
        }
        tracing::info!(old = *self.platform_fee, new = fee, "Platform fee changed");
        self.platform_fee.set(fee);
        Ok(())
    }

    /// Change the payout ceiling. Owner-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if the caller is not the owner
    /// - `InvalidUpdateParam` if `max_payouts` is zero
    pub fn set_max_payouts(&mut self, ctx: &CallContext, max_payouts: u64) -> Result<()> {
        ctx.require(&self.owner)?;
        if max_payouts == 0 {
            return Err(ClasspayError::InvalidUpdateParam {
                reason: "max_payouts must be > 0".into(),
            });
        }
        self.max_payouts.set(max_payouts);
        Ok(())
    }

    /// Settle a class: release its total from escrow and split it three ways.
    ///
    /// The class status flag must read `true` through `registry`. That is the
    /// same flag the escrow requires for a release, so a class settles while
    /// it is still open and fails `ClassNotCompleted` once completed.
    ///
    /// # Errors
    /// - `MaxPayoutsExceeded`, `InvalidClassId`, `InvalidAmount`, `InvalidSplit`
    /// - `InvalidInstructor` / `InvalidVenue` if either equals the caller
    /// - `AuthorityNotVerified` if escrow or registry is unwired or the
    ///   supplied collaborator is not the wired one
    /// - `ClassNotCompleted` if the flag does not read `true` or the class is unknown
    /// - `PayoutAlreadyProcessed` if the class already has a payout
    /// - `ReentrantCall` if a payout for this class is already in flight
    /// - any error from the release or the three transfers
    pub fn process_payout(
        &mut self,
        ctx: &CallContext,
        escrow: &mut dyn PaymentRelease,
        registry: &dyn ClassStatusQuery,
        transfers: &mut dyn AssetTransfer,
        request: PayoutRequest,
    ) -> Result<PayoutId> {
        let max = *self.max_payouts;
        if self.next_payout_id.0 >= max {
            return Err(ClasspayError::MaxPayoutsExceeded { max });
        }
        let class_id = request.class_id;
        if class_id.is_zero() {
            return Err(ClasspayError::InvalidClassId(class_id));
        }
        if request.total_amount == 0 {
            return Err(ClasspayError::InvalidAmount(request.total_amount));
        }
        validate_split(request.instructor_split)?;
        if ctx.is(&request.instructor) {
            return Err(ClasspayError::InvalidInstructor(request.instructor));
        }
        if ctx.is(&request.venue) {
            return Err(ClasspayError::InvalidVenue(request.venue));
        }
        self.escrow_contract.verify(ESCROW_SLOT, escrow.identity())?;
        self.registry_contract
            .verify(REGISTRY_SLOT, registry.identity())?;
        let view = registry
            .class_status(class_id)
            .filter(|view| view.status.flag())
            .ok_or(ClasspayError::ClassNotCompleted(class_id))?;
        if self.payouts_by_class.contains_key(&class_id) {
            return Err(ClasspayError::PayoutAlreadyProcessed(class_id));
        }

        let split = compute_split(request.total_amount, *self.platform_fee, request.instructor_split);

        self.in_flight.enter(class_id)?;
        let paid = self.pay_out(ctx, escrow, registry, transfers, &request, view.currency, split);
        self.in_flight.exit(class_id);
        if let Err(err) = paid {
            tracing::warn!(class_id = %class_id, error = %err, "Payout rejected");
            return Err(err);
        }

        let id = *self.next_payout_id;
        let payout = Payout {
            id,
            class_id,
            total_amount: request.total_amount,
            instructor_split: request.instructor_split,
            instructor_amount: split.instructor_amount,
            venue_amount: split.venue_amount,
            platform_amount: split.platform_amount,
            instructor: request.instructor,
            venue: request.venue,
            created_at: ctx.sequence,
            status: PayoutStatus::Active,
        };
        let receipt = SettlementReceipt::new(&payout, view.currency, &self.owner);

        tracing::info!(
            payout_id = %id,
            class_id = %class_id,
            total = payout.total_amount,
            instructor_amount = payout.instructor_amount,
            venue_amount = payout.venue_amount,
            platform_amount = payout.platform_amount,
            digest = %receipt.digest,
            "Payout processed"
        );

        self.payouts.insert(id, payout);
        self.payouts_by_class.insert(class_id, id);
        self.receipts.insert(id, receipt);
        self.next_payout_id.set(id.next());
        Ok(id)
    }

    #[allow(clippy::too_many_arguments)]
    fn pay_out(
        &self,
        ctx: &CallContext,
        escrow: &mut dyn PaymentRelease,
        registry: &dyn ClassStatusQuery,
        transfers: &mut dyn AssetTransfer,
        request: &PayoutRequest,
        currency: Currency,
        split: SplitBreakdown,
    ) -> Result<()> {
        let as_engine = ctx.on_behalf_of(&self.identity);
        escrow.release_payment(
            &as_engine,
            registry,
            transfers,
            request.class_id,
            request.total_amount,
        )?;
        transfers.transfer(
            currency,
            split.instructor_amount,
            &self.identity,
            &request.instructor,
        )?;
        transfers.transfer(currency, split.venue_amount, &self.identity, &request.venue)?;
        transfers.transfer(currency, split.platform_amount, &self.identity, &self.owner)
    }

    /// Change the instructor split recorded on a payout. Instructor-only.
    ///
    /// Accepted only once the payout is no longer active, which no public
    /// operation brings about. Amounts are not recomputed.
    ///
    /// # Errors
    /// - `PayoutNotFound` if the payout does not exist
    /// - `NotAuthorized` if the caller is not the payout's instructor
    /// - `UpdateNotAllowed` while the payout is active
    /// - `InvalidSplit` for a split outside (0, 100)
    pub fn update_payout_split(
        &mut self,
        ctx: &CallContext,
        payout_id: PayoutId,
        new_split: u8,
    ) -> Result<()> {
        let payout = self
            .payouts
            .get(&payout_id)
            .ok_or_else(|| ClasspayError::PayoutNotFound {
                reason: payout_id.to_string(),
            })?;
        ctx.require(&payout.instructor)?;
        if payout.status.is_active() {
            return Err(ClasspayError::UpdateNotAllowed {
                reason: format!("{payout_id} is {}", payout.status),
            });
        }
        validate_split(new_split)?;

        if let Some(payout) = self.payouts.get_mut(&payout_id) {
            payout.instructor_split = new_split;
        }
        self.payout_updates.insert(
            payout_id,
            PayoutUpdate {
                instructor_split: new_split,
                updated_at: ctx.sequence,
                updater: ctx.caller.clone(),
            },
        );
        tracing::debug!(payout_id = %payout_id, split = new_split, "Payout split updated");
        Ok(())
    }

    #[must_use]
    pub fn get_payout(&self, payout_id: PayoutId) -> Option<&Payout> {
        self.payouts.get(&payout_id)
    }

    /// The payout id recorded for a class, if any.
    #[must_use]
    pub fn get_payout_by_class(&self, class_id: ClassId) -> Option<PayoutId> {
        self.payouts_by_class.get(&class_id).copied()
    }

    /// The payout recorded for a class.
    ///
    /// # Errors
    /// Returns `PayoutNotFound` if the class has none.
    pub fn get_payout_history(&self, class_id: ClassId) -> Result<&Payout> {
        self.get_payout_by_class(class_id)
            .and_then(|id| self.payouts.get(&id))
            .ok_or_else(|| ClasspayError::PayoutNotFound {
                reason: format!("no payout for {class_id}"),
            })
    }

    /// Number of payouts ever recorded (equal to the next payout id).
    #[must_use]
    pub fn get_payout_count(&self) -> u64 {
        self.next_payout_id.0
    }

    #[must_use]
    pub fn get_payout_update(&self, payout_id: PayoutId) -> Option<&PayoutUpdate> {
        self.payout_updates.get(&payout_id)
    }

    /// The settlement receipt of a payout.
    #[must_use]
    pub fn receipt(&self, payout_id: PayoutId) -> Option<&SettlementReceipt> {
        self.receipts.get(&payout_id)
    }

    #[must_use]
    pub fn platform_fee(&self) -> u8 {
        *self.platform_fee
    }

    #[must_use]
    pub fn max_payouts(&self) -> u64 {
        *self.max_payouts
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    #[must_use]
    pub fn escrow_contract(&self) -> Option<&Identity> {
        self.escrow_contract.get()
    }

    #[must_use]
    pub fn registry_contract(&self) -> Option<&Identity> {
        self.registry_contract.get()
    }
}

impl Transactional for SplitPayoutEngine {
    fn begin(&mut self) {
        self.next_payout_id.begin();
        self.max_payouts.begin();
        self.platform_fee.begin();
        self.escrow_contract.begin();
        self.registry_contract.begin();
        self.payouts.begin();
        self.payouts_by_class.begin();
        self.payout_updates.begin();
        self.receipts.begin();
    }

    fn commit(&mut self) {
        self.next_payout_id.commit();
        self.max_payouts.commit();
        self.platform_fee.commit();
        self.escrow_contract.commit();
        self.registry_contract.commit();
        self.payouts.commit();
        self.payouts_by_class.commit();
        self.payout_updates.commit();
        self.receipts.commit();
    }

    fn rollback(&mut self) {
        self.next_payout_id.rollback();
        self.max_payouts.rollback();
        self.platform_fee.rollback();
        self.escrow_contract.rollback();
        self.registry_contract.rollback();
        self.payouts.rollback();
        self.payouts_by_class.rollback();
        self.payout_updates.rollback();
        self.receipts.rollback();
    }
}

/// Test-only state forcing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SplitPayoutEngine {
    /// Move a payout to SETTLED. No public operation does this.
    pub fn force_settle(&mut self, payout_id: PayoutId) -> Result<()> {
        let payout = self
            .payouts
            .get_mut(&payout_id)
            .ok_or_else(|| ClasspayError::PayoutNotFound {
                reason: payout_id.to_string(),
            })?;
        payout.status = PayoutStatus::Settled;
        Ok(())
    }
}

fn validate_split(split: u8) -> Result<()> {
    if split <= constants::MIN_SPLIT_EXCLUSIVE || split >= constants::MAX_SPLIT_EXCLUSIVE {
        return Err(ClasspayError::InvalidSplit(split));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use classpay_escrow::{AssetLedger, PaymentEscrow, TransferRecord};
    use classpay_types::{ClassStatus, ClassStatusView, Sequence};

    const OWNER: &str = "ST1OWNER";
    const CALLER: &str = "ST1CALLER";
    const INSTRUCTOR: &str = "ST4INSTRUCTOR";
    const VENUE: &str = "ST5VENUE";
    const PARTICIPANT: &str = "ST6PARTICIPANT";
    const ENGINE: &str = "ST3PAYOUT";
    const ESCROW: &str = "ST2ESCROW";
    const REGISTRY: &str = "ST2REGISTRY";

    struct StubRegistry {
        identity: Identity,
        statuses: HashMap<ClassId, ClassStatusView>,
    }

    impl StubRegistry {
        fn with(class_id: u64, status: ClassStatus) -> Self {
            let mut statuses = HashMap::new();
            statuses.insert(
                ClassId(class_id),
                ClassStatusView {
                    status,
                    currency: Currency::Stx,
                },
            );
            Self {
                identity: Identity::new(REGISTRY),
                statuses,
            }
        }
    }

    impl ClassStatusQuery for StubRegistry {
        fn identity(&self) -> &Identity {
            &self.identity
        }

        fn class_status(&self, class_id: ClassId) -> Option<ClassStatusView> {
            self.statuses.get(&class_id).copied()
        }
    }

    struct Fixture {
        engine: SplitPayoutEngine,
        escrow: PaymentEscrow,
        registry: StubRegistry,
        ledger: AssetLedger,
    }

    impl Fixture {
        fn process(&mut self, caller: &str, request: PayoutRequest) -> Result<PayoutId> {
            self.engine.process_payout(
                &CallContext::new(caller, Sequence(40)),
                &mut self.escrow,
                &self.registry,
                &mut self.ledger,
                request,
            )
        }
    }

    fn as_caller(caller: &str) -> CallContext {
        CallContext::new(caller, Sequence(0))
    }

    fn request(class_id: u64, total: u64) -> PayoutRequest {
        PayoutRequest {
            class_id: ClassId(class_id),
            total_amount: total,
            instructor_split: 70,
            instructor: Identity::new(INSTRUCTOR),
            venue: Identity::new(VENUE),
        }
    }

    fn engine() -> SplitPayoutEngine {
        SplitPayoutEngine::new(
            Identity::new(ENGINE),
            Identity::new(OWNER),
            constants::DEFAULT_MAX_PAYOUTS,
            constants::DEFAULT_PLATFORM_FEE,
        )
        .unwrap()
    }

    /// Engine and escrow wired to each other; one participant has escrowed
    /// 1000 STX against class 1.
    fn fixture(status: ClassStatus) -> Fixture {
        let mut engine = engine();
        engine
            .set_escrow_contract(&as_caller(OWNER), Identity::new(ESCROW))
            .unwrap();
        engine
            .set_registry_contract(&as_caller(OWNER), Identity::new(REGISTRY))
            .unwrap();

        let mut escrow = PaymentEscrow::new(
            Identity::new(ESCROW),
            Identity::new(OWNER),
            constants::DEFAULT_MAX_ESCROWS,
        );
        escrow
            .set_registry_contract(&as_caller(OWNER), Identity::new(REGISTRY))
            .unwrap();
        escrow
            .set_payout_contract(&as_caller(OWNER), Identity::new(ENGINE))
            .unwrap();

        let mut ledger = AssetLedger::new();
        ledger
            .deposit(&Identity::new(PARTICIPANT), Currency::Stx, 1000)
            .unwrap();
        let open = StubRegistry::with(1, ClassStatus::Open);
        escrow
            .escrow_payment(&as_caller(PARTICIPANT), &open, &mut ledger, ClassId(1), 1000, "STX")
            .unwrap();

        Fixture {
            engine,
            escrow,
            registry: StubRegistry::with(1, status),
            ledger,
        }
    }

    #[test]
    fn sets_wiring_once() {
        let mut engine = engine();
        engine
            .set_escrow_contract(&as_caller(OWNER), Identity::new(ESCROW))
            .unwrap();
        for caller in [OWNER, "ST3FAKE"] {
            let err = engine
                .set_escrow_contract(&as_caller(caller), Identity::new("ST9ESCROW"))
                .unwrap_err();
            assert!(matches!(err, ClasspayError::AuthorityNotVerified { .. }));
        }
        assert_eq!(engine.escrow_contract(), Some(&Identity::new(ESCROW)));

        let err = engine
            .set_registry_contract(&as_caller("ST3FAKE"), Identity::new(REGISTRY))
            .unwrap_err();
        assert!(matches!(err, ClasspayError::NotAuthorized { .. }));
        let err = engine
            .set_registry_contract(&as_caller(OWNER), Identity::burn())
            .unwrap_err();
        assert!(matches!(err, ClasspayError::InvalidRecipient(_)));
    }

    #[test]
    fn sets_platform_fee() {
        let mut engine = engine();
        engine.set_platform_fee(&as_caller(OWNER), 8).unwrap();
        assert_eq!(engine.platform_fee(), 8);
        engine.set_platform_fee(&as_caller(OWNER), 0).unwrap();
        assert_eq!(engine.platform_fee(), 0);

        let err = engine.set_platform_fee(&as_caller(OWNER), 11).unwrap_err();
        assert_eq!(err, ClasspayError::InvalidPlatformFee(11));
        let err = engine.set_platform_fee(&as_caller("ST3FAKE"), 11).unwrap_err();
        assert!(matches!(err, ClasspayError::NotAuthorized { .. }));
        assert_eq!(engine.platform_fee(), 0);
    }

    #[test]
    fn construction_rejects_fee_above_ceiling() {
        let err = SplitPayoutEngine::new(
            Identity::new(ENGINE),
            Identity::new(OWNER),
            constants::DEFAULT_MAX_PAYOUTS,
            11,
        )
        .unwrap_err();
        assert_eq!(err, ClasspayError::InvalidPlatformFee(11));

        let config = MarketplaceConfig {
            platform_fee: 200,
            ..MarketplaceConfig::default()
        };
        let err = SplitPayoutEngine::from_config(Identity::new(ENGINE), Identity::new(OWNER), &config)
            .unwrap_err();
        assert!(matches!(err, ClasspayError::Configuration(_)));

        let config = MarketplaceConfig {
            max_payouts: 0,
            ..MarketplaceConfig::default()
        };
        assert!(
            SplitPayoutEngine::from_config(Identity::new(ENGINE), Identity::new(OWNER), &config)
                .is_err()
        );

        let engine = SplitPayoutEngine::new(
            Identity::new(ENGINE),
            Identity::new(OWNER),
            constants::DEFAULT_MAX_PAYOUTS,
            constants::MAX_PLATFORM_FEE,
        )
        .unwrap();
        assert_eq!(engine.platform_fee(), constants::MAX_PLATFORM_FEE);
    }

    #[test]
    fn sets_max_payouts() {
        let mut engine = engine();
        engine.set_max_payouts(&as_caller(OWNER), 5000).unwrap();
        assert_eq!(engine.max_payouts(), 5000);
        let err = engine.set_max_payouts(&as_caller(OWNER), 0).unwrap_err();
        assert!(matches!(err, ClasspayError::InvalidUpdateParam { .. }));
    }

    #[test]
    fn processes_payout() {
        let mut fx = fixture(ClassStatus::Open);
        let id = fx.process(CALLER, request(1, 1000)).unwrap();
        assert_eq!(id, PayoutId(0));

        let payout = fx.engine.get_payout(id).unwrap();
        assert_eq!(payout.platform_amount, 50);
        assert_eq!(payout.instructor_amount, 665);
        assert_eq!(payout.venue_amount, 285);
        assert_eq!(payout.distributed(), 1000);
        assert_eq!(payout.status, PayoutStatus::Active);
        assert_eq!(payout.created_at, Sequence(40));
        assert_eq!(fx.engine.get_payout_by_class(ClassId(1)), Some(id));
        assert_eq!(fx.engine.get_payout_count(), 1);

        let legs: Vec<_> = fx.ledger.transfers()[1..].to_vec();
        assert_eq!(
            legs,
            vec![
                TransferRecord {
                    currency: Currency::Stx,
                    amount: 1000,
                    from: Identity::new(ESCROW),
                    to: Identity::new(ENGINE),
                },
                TransferRecord {
                    currency: Currency::Stx,
                    amount: 665,
                    from: Identity::new(ENGINE),
                    to: Identity::new(INSTRUCTOR),
                },
                TransferRecord {
                    currency: Currency::Stx,
                    amount: 285,
                    from: Identity::new(ENGINE),
                    to: Identity::new(VENUE),
                },
                TransferRecord {
                    currency: Currency::Stx,
                    amount: 50,
                    from: Identity::new(ENGINE),
                    to: Identity::new(OWNER),
                },
            ]
        );
        assert_eq!(fx.ledger.balance(&Identity::new(ENGINE), Currency::Stx), 0);

        let receipt = fx.engine.receipt(id).unwrap();
        assert!(receipt.verify());
        assert_eq!(receipt.distributed(), 1000);
    }

    #[test]
    fn completed_class_reads_not_completed() {
        let mut fx = fixture(ClassStatus::Closed);
        let err = fx.process(CALLER, request(1, 1000)).unwrap_err();
        assert_eq!(err, ClasspayError::ClassNotCompleted(ClassId(1)));

        let err = fx.process(CALLER, request(2, 1000)).unwrap_err();
        assert_eq!(err, ClasspayError::ClassNotCompleted(ClassId(2)));
    }

    #[test]
    fn rejects_duplicate_payout() {
        let mut fx = fixture(ClassStatus::Open);
        fx.process(CALLER, request(1, 1000)).unwrap();
        let err = fx.process(CALLER, request(1, 1000)).unwrap_err();
        assert_eq!(err, ClasspayError::PayoutAlreadyProcessed(ClassId(1)));
        assert_eq!(fx.engine.get_payout_count(), 1);
    }

    #[test]
    fn rejects_invalid_requests() {
        let mut fx = fixture(ClassStatus::Open);
        let cases = [
            (request(0, 1000), ClasspayError::InvalidClassId(ClassId(0))),
            (request(1, 0), ClasspayError::InvalidAmount(0)),
            (
                PayoutRequest {
                    instructor_split: 0,
                    ..request(1, 1000)
                },
                ClasspayError::InvalidSplit(0),
            ),
            (
                PayoutRequest {
                    instructor_split: 100,
                    ..request(1, 1000)
                },
                ClasspayError::InvalidSplit(100),
            ),
            (
                PayoutRequest {
                    instructor: Identity::new(CALLER),
                    ..request(1, 1000)
                },
                ClasspayError::InvalidInstructor(Identity::new(CALLER)),
            ),
            (
                PayoutRequest {
                    venue: Identity::new(CALLER),
                    ..request(1, 1000)
                },
                ClasspayError::InvalidVenue(Identity::new(CALLER)),
            ),
        ];
        for (req, expected) in cases {
            assert_eq!(fx.process(CALLER, req).unwrap_err(), expected);
        }
        assert_eq!(fx.engine.get_payout_count(), 0);
        assert_eq!(fx.ledger.transfers().len(), 1);
    }

    #[test]
    fn requires_wiring() {
        let mut fx = fixture(ClassStatus::Open);
        fx.engine = engine();
        let err = fx.process(CALLER, request(1, 1000)).unwrap_err();
        assert!(matches!(err, ClasspayError::AuthorityNotVerified { .. }));
    }

    #[test]
    fn capacity_ceiling_blocks_payout() {
        let mut fx = fixture(ClassStatus::Open);
        fx.engine.set_max_payouts(&as_caller(OWNER), 1).unwrap();
        fx.process(CALLER, request(1, 500)).unwrap();
        let err = fx.process(CALLER, request(1, 500)).unwrap_err();
        assert_eq!(err, ClasspayError::MaxPayoutsExceeded { max: 1 });
    }

    #[test]
    fn failed_release_records_nothing() {
        let mut fx = fixture(ClassStatus::Open);
        let err = fx.process(CALLER, request(1, 5000)).unwrap_err();
        assert!(matches!(err, ClasspayError::InsufficientBalance { .. }));
        assert_eq!(fx.engine.get_payout_count(), 0);
        assert!(fx.engine.get_payout_by_class(ClassId(1)).is_none());
        assert!(fx.engine.in_flight.is_idle());
    }

    #[test]
    fn payout_for_in_flight_class_is_rejected() {
        let mut fx = fixture(ClassStatus::Open);
        // An outer payout for class 1 has not returned yet.
        fx.engine.in_flight.enter(ClassId(1)).unwrap();

        let err = fx.process(CALLER, request(1, 1000)).unwrap_err();
        assert_eq!(err, ClasspayError::ReentrantCall(ClassId(1)));
        assert_eq!(fx.engine.get_payout_count(), 0);
        assert!(fx.escrow.release_events().is_empty());
        assert_eq!(fx.ledger.transfers().len(), 1);
        assert!(fx.engine.in_flight.is_in_flight(ClassId(1)));

        fx.engine.in_flight.exit(ClassId(1));
        fx.process(CALLER, request(1, 1000)).unwrap();
        assert!(fx.engine.in_flight.is_idle());
    }

    #[test]
    fn rollback_undoes_writes_since_begin() {
        let mut fx = fixture(ClassStatus::Open);
        fx.engine.begin();
        fx.engine.set_platform_fee(&as_caller(OWNER), 9).unwrap();
        fx.engine.set_max_payouts(&as_caller(OWNER), 3).unwrap();
        let id = fx.process(CALLER, request(1, 1000)).unwrap();
        fx.engine.rollback();

        assert_eq!(fx.engine.get_payout_count(), 0);
        assert!(fx.engine.get_payout(id).is_none());
        assert!(fx.engine.get_payout_by_class(ClassId(1)).is_none());
        assert!(fx.engine.receipt(id).is_none());
        assert_eq!(fx.engine.platform_fee(), constants::DEFAULT_PLATFORM_FEE);
        assert_eq!(fx.engine.max_payouts(), constants::DEFAULT_MAX_PAYOUTS);
    }

    #[test]
    fn payout_history_requires_payout() {
        let mut fx = fixture(ClassStatus::Open);
        let err = fx.engine.get_payout_history(ClassId(1)).unwrap_err();
        assert!(matches!(err, ClasspayError::PayoutNotFound { .. }));

        fx.process(CALLER, request(1, 1000)).unwrap();
        let payout = fx.engine.get_payout_history(ClassId(1)).unwrap();
        assert_eq!(payout.total_amount, 1000);
    }

    #[test]
    fn split_update_blocked_while_active() {
        let mut fx = fixture(ClassStatus::Open);
        let id = fx.process(CALLER, request(1, 1000)).unwrap();

        let err = fx
            .engine
            .update_payout_split(&as_caller(INSTRUCTOR), id, 60)
            .unwrap_err();
        assert!(matches!(err, ClasspayError::UpdateNotAllowed { .. }));

        let err = fx
            .engine
            .update_payout_split(&as_caller("ST3FAKE"), id, 60)
            .unwrap_err();
        assert!(matches!(err, ClasspayError::NotAuthorized { .. }));

        let err = fx
            .engine
            .update_payout_split(&as_caller(INSTRUCTOR), PayoutId(9), 60)
            .unwrap_err();
        assert!(matches!(err, ClasspayError::PayoutNotFound { .. }));
    }

    #[test]
    fn split_update_after_forced_settle() {
        let mut fx = fixture(ClassStatus::Open);
        let id = fx.process(CALLER, request(1, 1000)).unwrap();
        fx.engine.force_settle(id).unwrap();

        let err = fx
            .engine
            .update_payout_split(&as_caller(INSTRUCTOR), id, 100)
            .unwrap_err();
        assert_eq!(err, ClasspayError::InvalidSplit(100));

        fx.engine
            .update_payout_split(&CallContext::new(INSTRUCTOR, Sequence(50)), id, 60)
            .unwrap();
        let payout = fx.engine.get_payout(id).unwrap();
        assert_eq!(payout.instructor_split, 60);
        // Amounts stay as settled.
        assert_eq!(payout.instructor_amount, 665);
        let update = fx.engine.get_payout_update(id).unwrap();
        assert_eq!(update.instructor_split, 60);
        assert_eq!(update.updated_at, Sequence(50));
        assert_eq!(update.updater, Identity::new(INSTRUCTOR));
    }
}
