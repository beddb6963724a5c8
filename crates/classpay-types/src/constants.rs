//! System-wide constants for the ClassPay ledgers.

/// The reserved null/burn identity. Rejected by every wiring setter.
pub const BURN_IDENTITY: &str = "SP000000000000000000002Q6VF78";

/// Symbol of the primary settlement currency.
pub const PRIMARY_CURRENCY_SYMBOL: &str = "STX";

/// Symbol of the secondary settlement currency.
pub const SECONDARY_CURRENCY_SYMBOL: &str = "USD";

/// Default ceiling on the number of classes a registry will create.
pub const DEFAULT_MAX_CLASSES: u64 = 1_000;

/// Default ceiling on the number of escrows a payment escrow will hold.
pub const DEFAULT_MAX_ESCROWS: u64 = 10_000;

/// Default ceiling on the number of payouts a settlement engine will record.
pub const DEFAULT_MAX_PAYOUTS: u64 = 10_000;

/// Default platform fee, in whole percent of the settled total.
pub const DEFAULT_PLATFORM_FEE: u8 = 5;

/// Upper bound accepted by `set_platform_fee`, in whole percent.
pub const MAX_PLATFORM_FEE: u8 = 10;

/// Exclusive lower bound for an instructor split percentage.
pub const MIN_SPLIT_EXCLUSIVE: u8 = 0;

/// Exclusive upper bound for an instructor split percentage.
pub const MAX_SPLIT_EXCLUSIVE: u8 = 100;

/// Denominator for every percentage computation.
pub const PERCENT_DENOMINATOR: u64 = 100;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name.
pub const ENGINE_NAME: &str = "ClassPay";
