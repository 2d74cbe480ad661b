//! Core Types for the Staking Pool
//!
//! This module defines the fundamental data structures shared by the pool,
//! the reward token and the call envelope handed over by clients.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::status_codes;

/// Type alias for identities (32-byte public key hash)
pub type Address = [u8; 32];

/// Type alias for value amounts in base units (18 fractional digits)
pub type Amount = u128;

/// The all-zero identity, never a valid administrator or recipient
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Short hex rendering of an identity for logs
pub fn short_address(address: &Address) -> String {
    hex::encode(&address[..6])
}

// ============ Lifecycle ============

/// Lifecycle status of the pool
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
    Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum StakingStatus {
    /// Accepting stakes
    #[default]
    Open = 0,
    /// Intake closed; participants may withdraw
    Closed = 1,
    /// Threshold met and rewards issued
    Completed = 2,
    /// Completed pool whose funds were awarded out
    Awarded = 3,
}

impl StakingStatus {
    /// Stable numeric code shown to clients
    pub fn code(&self) -> u8 {
        match self {
            Self::Open => status_codes::OPEN,
            Self::Closed => status_codes::CLOSED,
            Self::Completed => status_codes::COMPLETED,
            Self::Awarded => status_codes::AWARDED,
        }
    }

    /// Parse a client-supplied status code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            status_codes::OPEN => Some(Self::Open),
            status_codes::CLOSED => Some(Self::Closed),
            status_codes::COMPLETED => Some(Self::Completed),
            status_codes::AWARDED => Some(Self::Awarded),
            _ => None,
        }
    }

    /// Upper-case label used by dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Completed => "COMPLETED",
            Self::Awarded => "AWARDED",
        }
    }

    /// Whether the administrator may restart (or terminate) from here
    pub fn is_restartable(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

// ============ Custody Transfers ============

/// One custody transfer out of the vault. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ReceiptEntry {
    /// Who received the funds
    pub recipient: Address,
    /// How much was transferred
    pub amount: Amount,
}

impl ReceiptEntry {
    pub fn new(recipient: Address, amount: Amount) -> Self {
        Self { recipient, amount }
    }
}

// ============ Rewards ============

/// Reward credit for one participant at completion time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardCredit {
    /// Participant being credited
    pub participant: Address,
    /// Native amount the participant had staked
    pub staked: Amount,
    /// Reward token base units to mint
    pub tokens: Amount,
}

// ============ Calls ============

/// Mutating calls a client can submit against the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolCall {
    /// Lock `amount` of attached native value
    Stake { amount: Amount },
    /// Reclaim the caller's whole stake after close
    Withdraw,
    /// Plain value receipt into the vault
    Fund { amount: Amount },
    /// End intake without rewards
    Close,
    /// End intake and issue rewards
    Complete,
    /// Reopen a closed, completed or awarded pool
    Restart,
    /// Hand reward token ownership to the administrator
    Terminate,
    /// Divert free vault funds (all of them when `amount` is None)
    Award { recipient: Address, amount: Option<Amount> },
    /// Pay the residual vault balance to the administrator
    Redeem,
    /// Replace the administrator
    TransferAdministrator { new_admin: Address },
}

impl PoolCall {
    /// Short operation name for logs and events
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stake { .. } => "stake",
            Self::Withdraw => "withdraw",
            Self::Fund { .. } => "fund",
            Self::Close => "close_staking",
            Self::Complete => "complete_staking",
            Self::Restart => "restart_staking",
            Self::Terminate => "terminate_contract",
            Self::Award { .. } => "award_staked_balance",
            Self::Redeem => "redeem_staked_amount",
            Self::TransferAdministrator { .. } => "transfer_administrator",
        }
    }

    /// Whether only the administrator may submit this call
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Self::Stake { .. } | Self::Withdraw | Self::Fund { .. })
    }
}

// ============ Read Model ============

/// Read-only summary for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolView {
    pub status: StakingStatus,
    pub administrator: Address,
    pub total_staked: Amount,
    pub number_of_stakers: u64,
    pub vault_balance: Amount,
    pub threshold: Amount,
    pub threshold_reached: bool,
    pub receipts: u64,
    pub terminated: bool,
}
