//! Three-way split arithmetic.
//!
//! ```text
//! platform   = floor(total * fee / 100)
//! adjusted   = total - platform
//! instructor = floor(adjusted * split / 100)
//! venue      = adjusted - instructor
//! ```
//!
//! The venue leg absorbs every rounding remainder, so the three legs always
//! sum to `total`.

use classpay_types::{Amount, constants};
use serde::{Deserialize, Serialize};

/// The three legs of a settled total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitBreakdown {
    pub platform_amount: Amount,
    pub instructor_amount: Amount,
    pub venue_amount: Amount,
}

impl SplitBreakdown {
    /// `total - platform_amount`.
    #[must_use]
    pub fn adjusted_total(&self) -> Amount {
        self.instructor_amount + self.venue_amount
    }

    #[must_use]
    pub fn total(&self) -> Amount {
        self.platform_amount + self.instructor_amount + self.venue_amount
    }
}

/// Split `total` by `platform_fee` and `instructor_split` percentages.
///
/// Percentages above 100 are treated as 100, so no leg ever exceeds the
/// amount it is taken from.
#[must_use]
pub fn compute_split(total: Amount, platform_fee: u8, instructor_split: u8) -> SplitBreakdown {
    let platform_amount = percent_of(total, platform_fee);
    let adjusted = total.saturating_sub(platform_amount);
    let instructor_amount = percent_of(adjusted, instructor_split);
    SplitBreakdown {
        platform_amount,
        instructor_amount,
        venue_amount: adjusted.saturating_sub(instructor_amount),
    }
}

/// `floor(amount * min(percent, 100) / 100)` without intermediate overflow.
fn percent_of(amount: Amount, percent: u8) -> Amount {
    let percent = u64::from(percent).min(constants::PERCENT_DENOMINATOR);
    let scaled = u128::from(amount) * u128::from(percent) / u128::from(constants::PERCENT_DENOMINATOR);
    Amount::try_from(scaled).unwrap_or(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn documented_example() {
        let split = compute_split(1000, 5, 70);
        assert_eq!(split.platform_amount, 50);
        assert_eq!(split.adjusted_total(), 950);
        assert_eq!(split.instructor_amount, 665);
        assert_eq!(split.venue_amount, 285);
    }

    #[test]
    fn venue_absorbs_remainder() {
        // 999 * 5% = 49.95 -> 49; 950 * 33% = 313.5 -> 313
        let split = compute_split(999, 5, 33);
        assert_eq!(split.platform_amount, 49);
        assert_eq!(split.instructor_amount, 313);
        assert_eq!(split.venue_amount, 637);
        assert_eq!(split.total(), 999);
    }

    #[test]
    fn zero_fee_leaves_full_total() {
        let split = compute_split(1000, 0, 50);
        assert_eq!(split.platform_amount, 0);
        assert_eq!(split.instructor_amount, 500);
        assert_eq!(split.venue_amount, 500);
    }

    #[test]
    fn tiny_totals_round_down() {
        let split = compute_split(1, 10, 99);
        assert_eq!(split.platform_amount, 0);
        assert_eq!(split.instructor_amount, 0);
        assert_eq!(split.venue_amount, 1);
    }

    #[test]
    fn large_totals_do_not_overflow() {
        let split = compute_split(Amount::MAX, 10, 99);
        assert_eq!(split.total(), Amount::MAX);
        assert!(split.platform_amount > 0);
    }

    #[test]
    fn out_of_range_percentages_clamp() {
        let split = compute_split(100, 200, 50);
        assert_eq!(split.platform_amount, 100);
        assert_eq!(split.instructor_amount, 0);
        assert_eq!(split.venue_amount, 0);
        assert_eq!(split.total(), 100);

        let split = compute_split(1000, 5, u8::MAX);
        assert_eq!(split.instructor_amount, 950);
        assert_eq!(split.venue_amount, 0);
        assert_eq!(split.total(), 1000);
    }

    #[test]
    fn randomized_legs_always_sum_to_total() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let total: Amount = rng.gen_range(1..=u64::from(u32::MAX));
            let fee: u8 = rng.gen_range(0..=constants::MAX_PLATFORM_FEE);
            let split: u8 = rng.gen_range(1..constants::MAX_SPLIT_EXCLUSIVE);
            let legs = compute_split(total, fee, split);
            assert_eq!(legs.total(), total, "total={total} fee={fee} split={split}");
            assert!(legs.venue_amount <= total);
        }
    }
}
