//! Set-once collaborator references between stores.
//!
//! ```text
//!   ┌───────┐  set (owner, non-burn)  ┌──────────────┐
//!   │ UNSET ├────────────────────────▶│ SET(identity)│
//!   └───────┘                         └──────────────┘
//! ```
//!
//! A slot is written exactly once at deployment time and never reassigned.

use serde::{Deserialize, Serialize};

use crate::{CallContext, ClasspayError, Identity, Result};

/// A set-once reference to a collaborating store's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wiring {
    #[default]
    Unset,
    Set(Identity),
}

impl Wiring {
    /// Write the slot.
    ///
    /// Checks, in order: the slot is still unset (for any caller), the caller
    /// is `owner`, and `target` is not the burn identity.
    ///
    /// # Errors
    /// - `AuthorityNotVerified` if the slot is already set
    /// - `NotAuthorized` if the caller is not the owner
    /// - `InvalidRecipient` if `target` is the burn identity
    pub fn set(&mut self, owner: &Identity, ctx: &CallContext, target: Identity) -> Result<()> {
        if let Self::Set(current) = self {
            return Err(ClasspayError::AuthorityNotVerified {
                reason: format!("wiring already set to {current}"),
            });
        }
        ctx.require(owner)?;
        if target.is_burn() {
            return Err(ClasspayError::InvalidRecipient(target));
        }
        *self = Self::Set(target);
        Ok(())
    }

    /// The wired identity, if any.
    #[must_use]
    pub fn get(&self) -> Option<&Identity> {
        match self {
            Self::Unset => None,
            Self::Set(identity) => Some(identity),
        }
    }

    /// The wired identity, or `AuthorityNotVerified` naming the missing slot.
    ///
    /// # Errors
    /// Returns `AuthorityNotVerified` if the slot is unset.
    pub fn require(&self, slot: &str) -> Result<&Identity> {
        self.get()
            .ok_or_else(|| ClasspayError::AuthorityNotVerified {
                reason: format!("{slot} not wired"),
            })
    }

    /// Require the slot to be set to exactly `collaborator`.
    ///
    /// # Errors
    /// Returns `AuthorityNotVerified` if the slot is unset or names a
    /// different identity.
    pub fn verify(&self, slot: &str, collaborator: &Identity) -> Result<()> {
        let wired = self.require(slot)?;
        if wired == collaborator {
            Ok(())
        } else {
            Err(ClasspayError::AuthorityNotVerified {
                reason: format!("{slot} is wired to {wired}, not {collaborator}"),
            })
        }
    }

    /// Whether the slot is set to `identity`.
    #[must_use]
    pub fn is(&self, identity: &Identity) -> bool {
        self.get() == Some(identity)
    }
}
