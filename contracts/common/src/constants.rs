//! Protocol Constants
//!
//! All magic numbers and default policy values for the staking pool.
//! Runtime overrides go through [`crate::config::PoolConfig`]; the values
//! here are the defaults it falls back to.

/// Native value unit held by the pool
pub mod native {
    /// Display symbol
    pub const SYMBOL: &str = "ETH";
    /// Fractional digits of the native unit
    pub const DECIMALS: u8 = 18;
    /// One native unit in base units (1 ETH = 10^18 wei)
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Reward token metadata
pub mod reward {
    /// Token name
    pub const NAME: &str = "BFY Token";
    /// Token symbol
    pub const SYMBOL: &str = "BFY";
    /// Decimal places (same representation as the native unit)
    pub const DECIMALS: u8 = 18;
    /// One whole reward token in base units
    pub const ONE: u128 = 1_000_000_000_000_000_000;
}

/// Pool policy
pub mod policy {
    use super::native;

    /// Minimum total stake required to complete the pool (1 native unit)
    pub const STAKING_THRESHOLD: u128 = native::ONE;

    /// Reward tokens issued per native unit staked.
    ///
    /// Both units carry 18 fractional digits, so the conversion is a plain
    /// integer multiply on base units.
    pub const REWARD_RATE: u128 = 1_000;
}

/// Lifecycle status discriminants (stable, shown to clients)
pub mod status_codes {
    /// Pool accepts stakes
    pub const OPEN: u8 = 0;
    /// Intake closed, participants may withdraw
    pub const CLOSED: u8 = 1;
    /// Threshold met, rewards issued
    pub const COMPLETED: u8 = 2;
    /// Completed pool whose funds were awarded out
    pub const AWARDED: u8 = 3;
}

/// Snapshot envelope
pub mod snapshot {
    /// Magic prefix of a persisted pool snapshot
    pub const MAGIC: [u8; 4] = *b"STKR";
    /// Current snapshot layout version
    pub const VERSION: u8 = 1;
}

/// Service limits
pub mod limits {
    /// Events the pool service buffers before the oldest are discarded.
    /// Callers drain the buffer with `drain_events`.
    pub const MAX_BUFFERED_EVENTS: usize = 4_096;
}
