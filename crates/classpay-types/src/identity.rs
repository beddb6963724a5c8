//! Opaque principal identities.
//!
//! Every participant, instructor, venue, store owner, and store itself is an
//! [`Identity`]. Identities compare by their full string value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants;

/// An opaque, globally unique principal reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The reserved null/burn identity.
    #[must_use]
    pub fn burn() -> Self {
        Self(constants::BURN_IDENTITY.to_string())
    }

    /// Whether this is the reserved null/burn identity.
    #[must_use]
    pub fn is_burn(&self) -> bool {
        self.0 == constants::BURN_IDENTITY
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burn_identity_detected() {
        assert!(Identity::burn().is_burn());
        assert!(Identity::new(constants::BURN_IDENTITY).is_burn());
        assert!(!Identity::new("ST1OWNER").is_burn());
    }

    #[test]
    fn identities_compare_by_value() {
        assert_eq!(Identity::new("ST1OWNER"), Identity::from("ST1OWNER"));
        assert_ne!(Identity::new("ST1OWNER"), Identity::new("ST2OWNER"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Identity::new("ST4INSTRUCTOR")).unwrap();
        assert_eq!(json, "\"ST4INSTRUCTOR\"");
    }
}
