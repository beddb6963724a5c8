//! The implicit call context supplied by the execution environment.

use serde::{Deserialize, Serialize};

use crate::{ClasspayError, Identity, Result, Sequence};

/// Who is calling, and at which point of the environment's sequence.
///
/// Stores never read the caller from anywhere else: authorization is always
/// decided against `caller`, and every `created_at` / audit timestamp is
/// `sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// The principal invoking the operation.
    pub caller: Identity,
    /// The environment's sequence counter at call time.
    pub sequence: Sequence,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: impl Into<Identity>, sequence: Sequence) -> Self {
        Self {
            caller: caller.into(),
            sequence,
        }
    }

    /// The same call point, re-issued on behalf of another principal.
    ///
    /// Used when a store calls into a collaborator: the collaborator sees the
    /// calling store as its caller.
    #[must_use]
    pub fn on_behalf_of(&self, caller: &Identity) -> Self {
        Self {
            caller: caller.clone(),
            sequence: self.sequence,
        }
    }

    /// Whether the caller is `principal`.
    #[must_use]
    pub fn is(&self, principal: &Identity) -> bool {
        &self.caller == principal
    }

    /// Require the caller to be `principal`.
    ///
    /// # Errors
    /// Returns [`ClasspayError::NotAuthorized`] otherwise.
    pub fn require(&self, principal: &Identity) -> Result<()> {
        if self.is(principal) {
            Ok(())
        } else {
            Err(ClasspayError::NotAuthorized {
                caller: self.caller.clone(),
            })
        }
    }
}
