//! Pool configuration
//!
//! Deployment-time parameters. Defaults come from [`crate::constants::policy`].

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::policy;
use crate::errors::{StakerError, StakerResult};
use crate::types::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Minimum total stake needed to complete
    pub threshold: Amount,
    /// Reward token base units minted per staked base unit
    pub reward_rate: u128,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threshold: policy::STAKING_THRESHOLD,
            reward_rate: policy::REWARD_RATE,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> StakerResult<()> {
        if self.threshold == 0 {
            return Err(StakerError::InvalidConfig {
                param: "threshold",
                reason: "must be greater than zero",
            });
        }
        if self.reward_rate == 0 {
            return Err(StakerError::InvalidConfig {
                param: "reward_rate",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}
