//! Pool Events
//!
//! Events are recorded for every committed operation and can be indexed
//! off-chain for dashboards (past recipients, reward history, status chips).

use std::collections::VecDeque;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, StakingStatus};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Ledger Events (0x01 - 0x1F)
    Staked = 0x01,
    Withdrawn = 0x02,
    FundsReceived = 0x03,

    // Lifecycle Events (0x20 - 0x3F)
    StatusChanged = 0x20,
    RewardIssued = 0x21,

    // Vault Events (0x40 - 0x5F)
    StakedBalanceAwarded = 0x40,
    StakedAmountRedeemed = 0x41,

    // Administrative Events (0x80 - 0x9F)
    AdminChanged = 0x80,
    ContractTerminated = 0x81,
}

/// Main event enum containing all pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum StakerEvent {
    /// A participant locked value into the pool
    Staked {
        participant: Address,
        amount: Amount,
        new_stake: Amount,
        pool_total: Amount,
    },

    /// A participant was refunded after close
    Withdrawn {
        participant: Address,
        amount: Amount,
        pool_total: Amount,
    },

    /// Plain value arrived in the vault
    FundsReceived {
        from: Address,
        amount: Amount,
        vault_balance: Amount,
    },

    /// Lifecycle moved between statuses
    StatusChanged {
        from: StakingStatus,
        to: StakingStatus,
    },

    /// Reward tokens credited to a participant at completion
    RewardIssued {
        participant: Address,
        staked: Amount,
        tokens: Amount,
    },

    /// Free vault funds were diverted to a recipient
    StakedBalanceAwarded {
        recipient: Address,
        amount: Amount,
        receipt_index: u64,
    },

    /// Residual vault balance paid to the administrator
    StakedAmountRedeemed {
        admin: Address,
        amount: Amount,
    },

    /// Administrator replaced
    AdminChanged {
        old_admin: Address,
        new_admin: Address,
    },

    /// Reward token ownership handed off
    ContractTerminated {
        new_token_owner: Address,
    },
}

impl StakerEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Staked { .. } => EventType::Staked,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::FundsReceived { .. } => EventType::FundsReceived,
            Self::StatusChanged { .. } => EventType::StatusChanged,
            Self::RewardIssued { .. } => EventType::RewardIssued,
            Self::StakedBalanceAwarded { .. } => EventType::StakedBalanceAwarded,
            Self::StakedAmountRedeemed { .. } => EventType::StakedAmountRedeemed,
            Self::AdminChanged { .. } => EventType::AdminChanged,
            Self::ContractTerminated { .. } => EventType::ContractTerminated,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution.
///
/// An unbounded log keeps everything. A bounded log discards its oldest
/// events once full and counts them in [`EventLog::dropped`].
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: VecDeque<StakerEvent>,
    capacity: Option<usize>,
    dropped: u64,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log holding at most `capacity` events
    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: Some(capacity),
            dropped: 0,
        }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: StakerEvent) {
        self.events.push_back(event);
        if let Some(capacity) = self.capacity {
            while self.events.len() > capacity {
                self.events.pop_front();
                self.dropped += 1;
            }
        }
    }

    /// Append every event of another log, keeping order
    pub fn extend(&mut self, other: EventLog) {
        for event in other.events {
            self.emit(event);
        }
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&StakerEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded so far because the log was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Move all events out, oldest first, leaving the log empty
    pub fn drain(&mut self) -> Vec<StakerEvent> {
        self.events.drain(..).collect()
    }
}
