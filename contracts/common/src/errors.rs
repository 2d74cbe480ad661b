//! Error Types for the Staking Pool
//!
//! Every failure aborts the operation with zero side effects and surfaces
//! synchronously to the caller. Messages for the pool lifecycle errors match
//! the revert reasons clients already know.

use thiserror::Error;

use crate::types::{Address, Amount, StakingStatus};

/// Result type alias for staking pool operations
pub type StakerResult<T> = Result<T, StakerError>;

/// Main error enum for all staking pool errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakerError {
    // ============ Lifecycle Errors ============
    /// Stake (or close/complete) attempted outside OPEN
    #[error("staking is currently not open")]
    StakingNotOpen,

    /// Withdraw attempted outside CLOSED
    #[error("staking is currently not closed. cannot withdraw")]
    StakingNotClosed,

    /// Redeem attempted outside COMPLETED
    #[error("staking is currently not complete")]
    OnlyWhenComplete,

    /// Complete attempted below the minimum pool size
    #[error("staked amount has not reached threshold ({total} < {threshold})")]
    StakingThresholdNotReached { total: Amount, threshold: Amount },

    /// Lifecycle transition not permitted from the current status
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: StakingStatus, to: StakingStatus },

    /// Reward token ownership has already been handed off
    #[error("contract has been terminated")]
    ContractTerminated,

    // ============ Ledger Errors ============
    /// Withdraw attempted with no recorded stake
    #[error("cannot withdraw, you have not staked any amount")]
    NoStake,

    /// Zero amount not allowed
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Vault cannot cover the request without touching staked funds
    #[error("insufficient free vault balance: available {available}, requested {requested}")]
    InsufficientVaultBalance { available: Amount, requested: Amount },

    /// Custody transfer log is empty
    #[error("no custody transfers recorded")]
    NoReceipts,

    // ============ Authorization Errors ============
    /// Administrator-only operation invoked by someone else
    #[error("Ownable: caller is not the owner")]
    NonOwnerCall { caller: Address },

    /// Invalid address (e.g., zero address)
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: &'static str },

    /// Mint attempted by an identity that does not own the reward token
    #[error("mint not authorized")]
    MintUnauthorized { caller: Address },

    // ============ Collaborator Errors ============
    /// Outbound native value transfer was rejected
    #[error("native transfer of {amount} failed")]
    TransferFailed { to: Address, amount: Amount },

    /// Mutating call issued from inside an outbound transfer
    #[error("reentrant call rejected")]
    Reentrancy,

    /// Pool lock poisoned by a panicking writer
    #[error("pool lock poisoned")]
    LockPoisoned,

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic underflow occurred
    #[error("arithmetic underflow")]
    Underflow,

    // ============ Configuration / State Errors ============
    /// Invalid configuration parameter
    #[error("invalid config `{param}`: {reason}")]
    InvalidConfig { param: &'static str, reason: &'static str },

    /// Ledger invariant broken
    #[error("ledger invariant violated: {0}")]
    InvariantViolated(&'static str),

    /// Persisted snapshot failed verification
    #[error("snapshot corrupted: {reason}")]
    SnapshotCorrupted { reason: &'static str },

    /// Call envelope could not be decoded
    #[error("invalid call encoding")]
    InvalidEncoding,
}

impl StakerError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::StakingNotOpen => "E001_STAKING_NOT_OPEN",
            Self::StakingNotClosed => "E002_STAKING_NOT_CLOSED",
            Self::OnlyWhenComplete => "E003_ONLY_WHEN_COMPLETE",
            Self::StakingThresholdNotReached { .. } => "E004_THRESHOLD_NOT_REACHED",
            Self::InvalidTransition { .. } => "E005_INVALID_TRANSITION",
            Self::ContractTerminated => "E006_TERMINATED",
            Self::NoStake => "E010_NO_STAKE",
            Self::ZeroAmount => "E011_ZERO_AMOUNT",
            Self::InsufficientVaultBalance { .. } => "E012_VAULT_INSUFFICIENT",
            Self::NoReceipts => "E013_NO_RECEIPTS",
            Self::NonOwnerCall { .. } => "E020_NON_OWNER",
            Self::InvalidAddress { .. } => "E021_INVALID_ADDRESS",
            Self::MintUnauthorized { .. } => "E022_MINT_UNAUTH",
            Self::TransferFailed { .. } => "E030_TRANSFER_FAILED",
            Self::Reentrancy => "E031_REENTRANCY",
            Self::LockPoisoned => "E032_LOCK_POISONED",
            Self::Overflow => "E040_OVERFLOW",
            Self::Underflow => "E041_UNDERFLOW",
            Self::InvalidConfig { .. } => "E050_INVALID_CONFIG",
            Self::InvariantViolated(_) => "E051_INVARIANT",
            Self::SnapshotCorrupted { .. } => "E052_SNAPSHOT_CORRUPTED",
            Self::InvalidEncoding => "E053_INVALID_ENCODING",
        }
    }

    /// Returns true if the caller can fix the precondition and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StakingThresholdNotReached { .. } // Stake more first
                | Self::InsufficientVaultBalance { .. } // Award less
                | Self::ZeroAmount
                | Self::TransferFailed { .. } // Recipient may accept later
        )
    }
}
