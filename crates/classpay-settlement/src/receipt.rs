//! Settlement receipts for the payout audit trail.
//!
//! Every processed payout yields a [`SettlementReceipt`] listing the legs
//! it paid out and a SHA-256 digest over a canonical encoding of them. The
//! digest is deterministic: the same payout always produces the same hex
//! string.

use classpay_types::{Amount, ClassId, Currency, Identity, Payout, PayoutId, Sequence};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const DIGEST_DOMAIN: &[u8] = b"classpay:settlement:v1:";

/// One transfer out of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLeg {
    pub recipient: Identity,
    pub amount: Amount,
}

/// Proof of one settled payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub payout_id: PayoutId,
    pub class_id: ClassId,
    pub currency: Currency,
    /// Amount released from escrow.
    pub total_amount: Amount,
    /// Instructor, venue, then platform.
    pub legs: Vec<SettlementLeg>,
    pub settled_at: Sequence,
    /// Hex-encoded SHA-256 over the fields above.
    pub digest: String,
}

impl SettlementReceipt {
    /// Build the receipt for `payout`, paid in `currency`, with the platform
    /// share sent to `platform`.
    #[must_use]
    pub fn new(payout: &Payout, currency: Currency, platform: &Identity) -> Self {
        let mut receipt = Self {
            payout_id: payout.id,
            class_id: payout.class_id,
            currency,
            total_amount: payout.total_amount,
            legs: vec![
                SettlementLeg {
                    recipient: payout.instructor.clone(),
                    amount: payout.instructor_amount,
                },
                SettlementLeg {
                    recipient: payout.venue.clone(),
                    amount: payout.venue_amount,
                },
                SettlementLeg {
                    recipient: platform.clone(),
                    amount: payout.platform_amount,
                },
            ],
            settled_at: payout.created_at,
            digest: String::new(),
        };
        receipt.digest = receipt.compute_digest();
        receipt
    }

    /// Recompute the digest from the receipt's fields.
    #[must_use]
    pub fn compute_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_DOMAIN);
        hasher.update(self.payout_id.0.to_le_bytes());
        hasher.update(self.class_id.0.to_le_bytes());
        hasher.update(self.currency.symbol().as_bytes());
        hasher.update(self.total_amount.to_le_bytes());
        for leg in &self.legs {
            let recipient = leg.recipient.as_str().as_bytes();
            // Length prefix keeps adjacent identities unambiguous.
            hasher.update((recipient.len() as u64).to_le_bytes());
            hasher.update(recipient);
            hasher.update(leg.amount.to_le_bytes());
        }
        hasher.update(self.settled_at.0.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    /// Whether the stored digest matches the fields.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.digest == self.compute_digest()
    }

    /// Sum of all legs.
    #[must_use]
    pub fn distributed(&self) -> Amount {
        self.legs.iter().map(|leg| leg.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classpay_types::PayoutStatus;

    fn payout() -> Payout {
        Payout {
            id: PayoutId(0),
            class_id: ClassId(1),
            total_amount: 1000,
            instructor_split: 70,
            instructor_amount: 665,
            venue_amount: 285,
            platform_amount: 50,
            instructor: Identity::new("ST4INSTRUCTOR"),
            venue: Identity::new("ST5VENUE"),
            created_at: Sequence(9),
            status: PayoutStatus::Active,
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let a = SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        let b = SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.digest.len(), 64);
        assert!(a.verify());
    }

    #[test]
    fn digest_covers_every_field() {
        let base = SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        let usd = SettlementReceipt::new(&payout(), Currency::Usd, &Identity::new("ST1OWNER"));
        assert_ne!(base.digest, usd.digest);

        let mut other = payout();
        other.venue_amount = 284;
        other.platform_amount = 51;
        let shifted = SettlementReceipt::new(&other, Currency::Stx, &Identity::new("ST1OWNER"));
        assert_ne!(base.digest, shifted.digest);
    }

    #[test]
    fn tampering_fails_verification() {
        let mut receipt =
            SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        receipt.legs[0].amount += 1;
        assert!(!receipt.verify());
    }

    #[test]
    fn legs_sum_to_total() {
        let receipt = SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        assert_eq!(receipt.distributed(), receipt.total_amount);
    }

    #[test]
    fn serde_roundtrip() {
        let receipt = SettlementReceipt::new(&payout(), Currency::Stx, &Identity::new("ST1OWNER"));
        let json = serde_json::to_string(&receipt).unwrap();
        let back: SettlementReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt, back);
        assert!(back.verify());
    }
}
