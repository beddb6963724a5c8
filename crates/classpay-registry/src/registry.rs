//! Class registry. Creates classes, records registrations, and closes
//! classes on completion.
//!
//! Every mutation validates fully before writing anything, so a rejected
//! call leaves the registry unchanged. Writes are journaled while a
//! transaction is open; see [`Transactional`].

use classpay_types::{
    Amount, CallContext, Checkpoint, Class, ClassId, ClassStatus, ClassStatusQuery,
    ClassStatusView, ClassUpdate, ClasspayError, Currency, Identity, JournaledMap,
    MarketplaceConfig, NewClass, Result, Sequence, Transactional, Wiring, constants,
};

/// Owns class definitions, registrations, and the class edit audit slot.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    /// This store's own identity.
    identity: Identity,
    /// Principal allowed to wire and configure the store.
    owner: Identity,
    /// Next id to hand out; also the number of classes created.
    next_class_id: Checkpoint<ClassId>,
    /// Ceiling on `next_class_id`.
    max_classes: Checkpoint<u64>,
    /// Escrow this registry trusts.
    escrow_contract: Checkpoint<Wiring>,
    /// All classes indexed by id.
    classes: JournaledMap<ClassId, Class>,
    /// (class, participant) → sequence of the registration.
    registrations: JournaledMap<(ClassId, Identity), Sequence>,
    /// Latest edit per class.
    class_updates: JournaledMap<ClassId, ClassUpdate>,
}

impl ClassRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(identity: Identity, owner: Identity, max_classes: u64) -> Self {
        Self {
            identity,
            owner,
            next_class_id: Checkpoint::new(ClassId::default()),
            max_classes: Checkpoint::new(max_classes),
            escrow_contract: Checkpoint::new(Wiring::Unset),
            classes: JournaledMap::new(),
            registrations: JournaledMap::new(),
            class_updates: JournaledMap::new(),
        }
    }

    /// Create an empty registry sized by `config`.
    #[must_use]
    pub fn from_config(identity: Identity, owner: Identity, config: &MarketplaceConfig) -> Self {
        Self::new(identity, owner, config.max_classes)
    }

    /// Wire the escrow this registry trusts. Owner-only, set-once.
    ///
    /// # Errors
    /// `AuthorityNotVerified`, `NotAuthorized`, or `InvalidRecipient`; see
    /// [`Wiring::set`].
    pub fn set_escrow_contract(&mut self, ctx: &CallContext, escrow: Identity) -> Result<()> {
        self.escrow_contract
            .get_mut()
            .set(&self.owner, ctx, escrow)?;
        tracing::info!(
            registry = %self.identity,
            escrow = ?self.escrow_contract.get(),
            "Registry escrow wired"
        );
        Ok(())
    }

    /// Change the class ceiling. Owner-only.
    ///
    /// # Errors
    /// - `NotAuthorized` if the caller is not the owner
    /// - `InvalidUpdateParam` if `max_classes` is zero
    pub fn set_max_classes(&mut self, ctx: &CallContext, max_classes: u64) -> Result<()> {
        ctx.require(&self.owner)?;
        if max_classes == 0 {
            return Err(ClasspayError::InvalidUpdateParam {
                reason: "max_classes must be > 0".into(),
            });
        }
        self.max_classes.set(max_classes);
        Ok(())
    }

    /// Create a new open class.
    ///
    /// # Errors
    /// - `MaxClassesExceeded` if the class counter reached its ceiling
    /// - `InvalidName`, `InvalidAmount`, `InvalidCapacity`, `InvalidSplit`
    /// - `InvalidInstructor` / `InvalidVenue` if either equals the caller
    /// - `InvalidCurrency` for an unsupported symbol
    pub fn create_class(&mut self, ctx: &CallContext, new_class: NewClass) -> Result<ClassId> {
        let max = *self.max_classes;
        if self.next_class_id.0 >= max {
            return Err(ClasspayError::MaxClassesExceeded { max });
        }
        validate_name(&new_class.name)?;
        validate_price(new_class.price)?;
        if new_class.capacity == 0 {
            return Err(ClasspayError::InvalidCapacity(new_class.capacity));
        }
        validate_split(new_class.instructor_split)?;
        if ctx.is(&new_class.instructor) {
            return Err(ClasspayError::InvalidInstructor(new_class.instructor));
        }
        if ctx.is(&new_class.venue) {
            return Err(ClasspayError::InvalidVenue(new_class.venue));
        }
        let currency: Currency = new_class.currency.parse()?;

        let id = *self.next_class_id;
        let class = Class {
            id,
            name: new_class.name,
            price: new_class.price,
            capacity: new_class.capacity,
            instructor_split: new_class.instructor_split,
            instructor: new_class.instructor,
            venue: new_class.venue,
            currency,
            created_at: ctx.sequence,
            status: ClassStatus::Open,
        };

        tracing::info!(
            class_id = %id,
            name = %class.name,
            instructor = %class.instructor,
            venue = %class.venue,
            currency = %currency,
            "Class created"
        );

        self.classes.insert(id, class);
        self.next_class_id.set(id.next());
        Ok(id)
    }

    /// Register the caller for an open class.
    ///
    /// # Errors
    /// - `ClassNotFound` if the class does not exist
    /// - `ClassNotOpen` if the class is closed
    /// - `AlreadyRegistered` if the caller is already registered
    pub fn register_for_class(&mut self, ctx: &CallContext, class_id: ClassId) -> Result<()> {
        let class = self.class_ref(class_id)?;
        if !class.status.is_open() {
            return Err(ClasspayError::ClassNotOpen(class_id));
        }
        let key = (class_id, ctx.caller.clone());
        if self.registrations.contains_key(&key) {
            return Err(ClasspayError::AlreadyRegistered {
                class_id,
                participant: ctx.caller.clone(),
            });
        }
        self.registrations.insert(key, ctx.sequence);
        tracing::info!(class_id = %class_id, participant = %ctx.caller, "Participant registered");
        Ok(())
    }

    /// Close a class. Instructor-only and irreversible.
    ///
    /// # Errors
    /// - `ClassNotFound` if the class does not exist
    /// - `NotAuthorized` if the caller is not the instructor
    /// - `ClassNotOpen` if the class is already closed
    pub fn complete_class(&mut self, ctx: &CallContext, class_id: ClassId) -> Result<()> {
        let class = self.class_ref(class_id)?;
        ctx.require(&class.instructor)?;
        if !class.status.can_transition_to(ClassStatus::Closed) {
            return Err(ClasspayError::ClassNotOpen(class_id));
        }
        if let Some(class) = self.classes.get_mut(&class_id) {
            class.status = ClassStatus::Closed;
        }
        tracing::info!(class_id = %class_id, instructor = %ctx.caller, "Class completed");
        Ok(())
    }

    /// Rename and reprice an open class. Instructor-only.
    ///
    /// Overwrites the class's single audit slot.
    ///
    /// # Errors
    /// - `ClassNotFound` if the class does not exist
    /// - `NotAuthorized` if the caller is not the instructor
    /// - `UpdateNotAllowed` if the class is closed
    /// - `InvalidName` / `InvalidAmount` for bad new values
    pub fn update_class(
        &mut self,
        ctx: &CallContext,
        class_id: ClassId,
        new_name: &str,
        new_price: Amount,
    ) -> Result<()> {
        let class = self.class_ref(class_id)?;
        ctx.require(&class.instructor)?;
        if !class.status.is_open() {
            return Err(ClasspayError::UpdateNotAllowed {
                reason: format!("{class_id} is {}", class.status),
            });
        }
        validate_name(new_name)?;
        validate_price(new_price)?;

        if let Some(class) = self.classes.get_mut(&class_id) {
            class.name = new_name.to_string();
            class.price = new_price;
        }
        let previous = self.class_updates.insert(
            class_id,
            ClassUpdate {
                name: new_name.to_string(),
                price: new_price,
                updated_at: ctx.sequence,
                updater: ctx.caller.clone(),
            },
        );
        tracing::debug!(
            class_id = %class_id,
            name = new_name,
            price = new_price,
            overwrote = previous.is_some(),
            "Class updated"
        );
        Ok(())
    }

    /// Look up a class by id.
    #[must_use]
    pub fn get_class(&self, class_id: ClassId) -> Option<&Class> {
        self.classes.get(&class_id)
    }

    /// Current status of a class.
    ///
    /// # Errors
    /// Returns `ClassNotFound` if the class does not exist.
    pub fn get_class_status(&self, class_id: ClassId) -> Result<ClassStatus> {
        self.class_ref(class_id).map(|class| class.status)
    }

    /// Number of classes ever created (equal to the next class id).
    #[must_use]
    pub fn get_class_count(&self) -> u64 {
        self.next_class_id.0
    }

    /// Whether `participant` is registered for the class.
    #[must_use]
    pub fn is_registered(&self, class_id: ClassId, participant: &Identity) -> bool {
        self.registrations
            .contains_key(&(class_id, participant.clone()))
    }

    /// Sequence at which `participant` registered for the class.
    #[must_use]
    pub fn registered_at(&self, class_id: ClassId, participant: &Identity) -> Option<Sequence> {
        self.registrations
            .get(&(class_id, participant.clone()))
            .copied()
    }

    /// The latest edit of a class, if it was ever edited.
    #[must_use]
    pub fn get_class_update(&self, class_id: ClassId) -> Option<&ClassUpdate> {
        self.class_updates.get(&class_id)
    }

    /// The escrow this registry trusts, if wired.
    #[must_use]
    pub fn escrow_contract(&self) -> Option<&Identity> {
        self.escrow_contract.get()
    }

    #[must_use]
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    #[must_use]
    pub fn max_classes(&self) -> u64 {
        *self.max_classes
    }

    fn class_ref(&self, class_id: ClassId) -> Result<&Class> {
        self.classes
            .get(&class_id)
            .ok_or(ClasspayError::ClassNotFound(class_id))
    }
}

impl Transactional for ClassRegistry {
    fn begin(&mut self) {
        self.next_class_id.begin();
        self.max_classes.begin();
        self.escrow_contract.begin();
        self.classes.begin();
        self.registrations.begin();
        self.class_updates.begin();
    }

    fn commit(&mut self) {
        self.next_class_id.commit();
        self.max_classes.commit();
        self.escrow_contract.commit();
        self.classes.commit();
        self.registrations.commit();
        self.class_updates.commit();
    }

    fn rollback(&mut self) {
        self.next_class_id.rollback();
        self.max_classes.rollback();
        self.escrow_contract.rollback();
        self.classes.rollback();
        self.registrations.rollback();
        self.class_updates.rollback();
    }
}

impl ClassStatusQuery for ClassRegistry {
    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn class_status(&self, class_id: ClassId) -> Option<ClassStatusView> {
        self.classes.get(&class_id).map(|class| ClassStatusView {
            status: class.status,
            currency: class.currency,
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClasspayError::InvalidName);
    }
    Ok(())
}

fn validate_price(price: Amount) -> Result<()> {
    if price == 0 {
        return Err(ClasspayError::InvalidAmount(price));
    }
    Ok(())
}

fn validate_split(split: u8) -> Result<()> {
    if split <= constants::MIN_SPLIT_EXCLUSIVE || split >= constants::MAX_SPLIT_EXCLUSIVE {
        return Err(ClasspayError::InvalidSplit(split));
    }
    Ok(())
}
