//! Deployment configuration for the three stores.

use serde::{Deserialize, Serialize};

use crate::{ClasspayError, Result, constants};

/// Capacity ceilings and fee settings applied when the stores are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Ceiling on classes the registry will create.
    pub max_classes: u64,
    /// Ceiling on escrows the payment escrow will hold.
    pub max_escrows: u64,
    /// Ceiling on payouts the settlement engine will record.
    pub max_payouts: u64,
    /// Platform fee in whole percent of each settled total.
    pub platform_fee: u8,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            max_classes: constants::DEFAULT_MAX_CLASSES,
            max_escrows: constants::DEFAULT_MAX_ESCROWS,
            max_payouts: constants::DEFAULT_MAX_PAYOUTS,
            platform_fee: constants::DEFAULT_PLATFORM_FEE,
        }
    }
}

impl MarketplaceConfig {
    /// Parse a JSON document; absent fields take their defaults.
    ///
    /// # Errors
    /// `Serialization` on malformed JSON, `Configuration` on invalid values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `Configuration` for a zero ceiling or a fee above
    /// [`constants::MAX_PLATFORM_FEE`].
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_classes", self.max_classes),
            ("max_escrows", self.max_escrows),
            ("max_payouts", self.max_payouts),
        ] {
            if value == 0 {
                return Err(ClasspayError::Configuration(format!(
                    "{name} must be > 0"
                )));
            }
        }
        if self.platform_fee > constants::MAX_PLATFORM_FEE {
            return Err(ClasspayError::Configuration(format!(
                "platform_fee {} exceeds {}",
                self.platform_fee,
                constants::MAX_PLATFORM_FEE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = MarketplaceConfig::default();
        assert_eq!(cfg.max_classes, 1000);
        assert_eq!(cfg.max_escrows, 10_000);
        assert_eq!(cfg.max_payouts, 10_000);
        assert_eq!(cfg.platform_fee, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = MarketplaceConfig::from_json_str(r#"{"max_classes": 3}"#).unwrap();
        assert_eq!(cfg.max_classes, 3);
        assert_eq!(cfg.platform_fee, constants::DEFAULT_PLATFORM_FEE);
    }

    #[test]
    fn rejects_zero_ceiling() {
        let err = MarketplaceConfig::from_json_str(r#"{"max_payouts": 0}"#).unwrap_err();
        assert!(matches!(err, ClasspayError::Configuration(msg) if msg.contains("max_payouts")));
    }

    #[test]
    fn rejects_excessive_fee() {
        let err = MarketplaceConfig::from_json_str(r#"{"platform_fee": 11}"#).unwrap_err();
        assert!(matches!(err, ClasspayError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = MarketplaceConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ClasspayError::Serialization(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = MarketplaceConfig {
            max_classes: 7,
            max_escrows: 8,
            max_payouts: 9,
            platform_fee: 2,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: MarketplaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
