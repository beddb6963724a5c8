//! Error types for the ClassPay ledgers.
//!
//! All errors use the `CP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by category:
//! - 1xx: Authorization errors
//! - 2xx: Validation errors
//! - 3xx: Not-found errors
//! - 4xx: State conflict errors
//! - 5xx: Capacity errors
//! - 6xx: Asset transfer errors
//! - 9xx: General / internal errors

use std::fmt;

use thiserror::Error;

use crate::{Amount, ClassId, Currency, EscrowId, Identity};

/// The coarse category every [`ClasspayError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The caller is not the required principal.
    Authorization,
    /// An argument is out of its allowed range or set.
    Validation,
    /// A referenced class, escrow, or payout does not exist.
    NotFound,
    /// Duplicate entity, wrong lifecycle state, or wiring conflict.
    StateConflict,
    /// A monotonic id counter reached its configured ceiling.
    CapacityExceeded,
    /// The external asset transfer service refused a transfer.
    Transfer,
    /// Configuration, serialization, or invariant failure.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::StateConflict => write!(f, "STATE_CONFLICT"),
            Self::CapacityExceeded => write!(f, "CAPACITY_EXCEEDED"),
            Self::Transfer => write!(f, "TRANSFER"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all ClassPay operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClasspayError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller is not the owner, instructor, participant, or wired
    /// collaborator the operation requires.
    #[error("CP_ERR_100: Not authorized: {caller}")]
    NotAuthorized { caller: Identity },

    // =================================================================
    // Validation Errors (2xx)
    // =================================================================
    /// Class name is empty.
    #[error("CP_ERR_200: Invalid class name")]
    InvalidName,

    /// Price or amount is zero.
    #[error("CP_ERR_201: Invalid amount: {0}")]
    InvalidAmount(Amount),

    /// Class capacity is zero.
    #[error("CP_ERR_202: Invalid capacity: {0}")]
    InvalidCapacity(u32),

    /// Instructor split outside the exclusive (0, 100) range.
    #[error("CP_ERR_203: Invalid split percentage: {0}")]
    InvalidSplit(u8),

    /// Instructor equals the caller (self-dealing guard).
    #[error("CP_ERR_204: Invalid instructor: {0}")]
    InvalidInstructor(Identity),

    /// Venue equals the caller (self-dealing guard).
    #[error("CP_ERR_205: Invalid venue: {0}")]
    InvalidVenue(Identity),

    /// Currency symbol is outside the supported set.
    #[error("CP_ERR_206: Invalid currency: {0}")]
    InvalidCurrency(String),

    /// Class id is zero where a positive id is required.
    #[error("CP_ERR_207: Invalid class id: {0}")]
    InvalidClassId(ClassId),

    /// Platform fee above the permitted ceiling.
    #[error("CP_ERR_208: Invalid platform fee: {0}")]
    InvalidPlatformFee(u8),

    /// A store parameter update was out of range (e.g. a zero ceiling).
    #[error("CP_ERR_209: Invalid update parameter: {reason}")]
    InvalidUpdateParam { reason: String },

    /// A wiring target was the reserved burn identity.
    #[error("CP_ERR_210: Invalid recipient: {0}")]
    InvalidRecipient(Identity),

    // =================================================================
    // Not-Found Errors (3xx)
    // =================================================================
    /// No class with this id.
    #[error("CP_ERR_300: Class not found: {0}")]
    ClassNotFound(ClassId),

    /// No escrow with this id.
    #[error("CP_ERR_301: Escrow not found: {0}")]
    EscrowNotFound(EscrowId),

    /// No payout with this id, or none recorded for the class.
    #[error("CP_ERR_302: Payout not found: {reason}")]
    PayoutNotFound { reason: String },

    // =================================================================
    // State Conflict Errors (4xx)
    // =================================================================
    /// The class is closed (or unknown to the queried registry).
    #[error("CP_ERR_400: Class not open: {0}")]
    ClassNotOpen(ClassId),

    /// The class status did not read as completed.
    #[error("CP_ERR_401: Class not completed: {0}")]
    ClassNotCompleted(ClassId),

    /// The caller is already registered for this class.
    #[error("CP_ERR_402: Already registered for {class_id}: {participant}")]
    AlreadyRegistered {
        class_id: ClassId,
        participant: Identity,
    },

    /// An escrow already exists for this (class, participant).
    #[error("CP_ERR_403: Already escrowed for {class_id}: {participant}")]
    AlreadyEscrowed {
        class_id: ClassId,
        participant: Identity,
    },

    /// The escrow is no longer held.
    #[error("CP_ERR_404: Escrow already released: {0}")]
    EscrowAlreadyReleased(EscrowId),

    /// A payout already exists for this class.
    #[error("CP_ERR_405: Payout already processed for {0}")]
    PayoutAlreadyProcessed(ClassId),

    /// The entity is not in a state that permits this update.
    #[error("CP_ERR_406: Update not allowed: {reason}")]
    UpdateNotAllowed { reason: String },

    /// A wiring slot is already set, or a required one is still unset,
    /// or a collaborator does not match the wired identity.
    #[error("CP_ERR_407: Authority not verified: {reason}")]
    AuthorityNotVerified { reason: String },

    /// A call for this class is already in flight in the same store.
    #[error("CP_ERR_408: Reentrant call rejected for {0}")]
    ReentrantCall(ClassId),

    // =================================================================
    // Capacity Errors (5xx)
    // =================================================================
    /// The registry's class counter reached its ceiling.
    #[error("CP_ERR_500: Max classes exceeded: {max}")]
    MaxClassesExceeded { max: u64 },

    /// The escrow counter reached its ceiling.
    #[error("CP_ERR_501: Max escrows exceeded: {max}")]
    MaxEscrowsExceeded { max: u64 },

    /// The payout counter reached its ceiling.
    #[error("CP_ERR_502: Max payouts exceeded: {max}")]
    MaxPayoutsExceeded { max: u64 },

    // =================================================================
    // Transfer Errors (6xx)
    // =================================================================
    /// The sender does not hold enough of the currency.
    #[error("CP_ERR_600: Insufficient {currency} balance for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        holder: Identity,
        currency: Currency,
        needed: Amount,
        available: Amount,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Supply conservation invariant violated.
    #[error("CP_ERR_900: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    /// Arithmetic left the representable range.
    #[error("CP_ERR_901: Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("CP_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("CP_ERR_903: Serialization error: {0}")]
    Serialization(String),
}

impl ClasspayError {
    /// The category this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAuthorized { .. } => ErrorCategory::Authorization,
            Self::InvalidName
            | Self::InvalidAmount(_)
            | Self::InvalidCapacity(_)
            | Self::InvalidSplit(_)
            | Self::InvalidInstructor(_)
            | Self::InvalidVenue(_)
            | Self::InvalidCurrency(_)
            | Self::InvalidClassId(_)
            | Self::InvalidPlatformFee(_)
            | Self::InvalidUpdateParam { .. }
            | Self::InvalidRecipient(_) => ErrorCategory::Validation,
            Self::ClassNotFound(_) | Self::EscrowNotFound(_) | Self::PayoutNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::ClassNotOpen(_)
            | Self::ClassNotCompleted(_)
            | Self::AlreadyRegistered { .. }
            | Self::AlreadyEscrowed { .. }
            | Self::EscrowAlreadyReleased(_)
            | Self::PayoutAlreadyProcessed(_)
            | Self::UpdateNotAllowed { .. }
            | Self::AuthorityNotVerified { .. }
            | Self::ReentrantCall(_) => ErrorCategory::StateConflict,
            Self::MaxClassesExceeded { .. }
            | Self::MaxEscrowsExceeded { .. }
            | Self::MaxPayoutsExceeded { .. } => ErrorCategory::CapacityExceeded,
            Self::InsufficientBalance { .. } => ErrorCategory::Transfer,
            Self::SupplyInvariantViolation { .. }
            | Self::ArithmeticOverflow(_)
            | Self::Configuration(_)
            | Self::Serialization(_) => ErrorCategory::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ClasspayError>;

impl From<serde_json::Error> for ClasspayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
