//! Collaborator interfaces
//!
//! The pool never touches balances outside its own vault directly. Reward
//! issuance goes through a [`RewardToken`] and native value leaves through a
//! [`PayoutSink`].

use crate::errors::StakerResult;
use crate::types::{Address, Amount, RewardCredit};

/// Mintable reward token owned by the pool
pub trait RewardToken {
    /// Mint every credit or none of them. Only the current owner may mint.
    fn mint_batch(&mut self, minter: &Address, credits: &[RewardCredit]) -> StakerResult<()>;

    /// Reward balance of `holder` in base units
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Current token owner (the minting authority)
    fn owner(&self) -> Address;

    /// Hand ownership to `new_owner`. `caller` must be the current owner.
    fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> StakerResult<()>;
}

/// Destination for native value leaving the vault
pub trait PayoutSink {
    /// Deliver `amount` to `to`. An error means nothing was delivered.
    fn pay(&mut self, to: &Address, amount: Amount) -> StakerResult<()>;
}
