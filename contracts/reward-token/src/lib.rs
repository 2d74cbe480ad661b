//! Reward Token Contract
//!
//! Fungible reward token credited to pool participants at completion.
//! Only the current owner (the staking pool, until it is terminated) can
//! mint. Ownership can be handed off exactly like an Ownable contract.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use staker_common::{
    constants::reward,
    errors::{StakerError, StakerResult},
    interfaces::RewardToken,
    math::{checked_sum, safe_add},
    types::{short_address, Address, Amount, RewardCredit, ZERO_ADDRESS},
};

// ============ Token State ============

/// Reward token ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardTokenState {
    /// Minting authority
    owner: Address,
    /// Holder -> balance (absent = 0)
    balances: BTreeMap<Address, Amount>,
    /// Total supply tracking
    total_supply: Amount,
}

// NOTE: no Default; a token always starts with an explicit non-zero owner.

impl RewardTokenState {
    /// Create an empty token owned by `owner`
    pub fn new(owner: Address) -> StakerResult<Self> {
        if owner == ZERO_ADDRESS {
            return Err(StakerError::InvalidAddress {
                reason: "token owner cannot be the zero address",
            });
        }
        Ok(Self {
            owner,
            balances: BTreeMap::new(),
            total_supply: 0,
        })
    }

    /// Get token name
    pub fn name() -> &'static str {
        reward::NAME
    }

    /// Get token symbol
    pub fn symbol() -> &'static str {
        reward::SYMBOL
    }

    /// Get token decimals
    pub fn decimals() -> u8 {
        reward::DECIMALS
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of identities holding a nonzero balance
    pub fn holders(&self) -> usize {
        self.balances.len()
    }

    /// Mint `amount` to `to`. Only the owner may mint.
    pub fn mint(&mut self, minter: &Address, to: &Address, amount: Amount) -> StakerResult<()> {
        self.mint_batch_inner(minter, &[(*to, amount)])
    }

    fn ensure_owner(&self, caller: &Address) -> StakerResult<()> {
        if *caller != self.owner {
            return Err(StakerError::MintUnauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Validate the whole batch against a scratch copy of the touched
    /// balances, then apply. Nothing is written if any credit fails.
    fn mint_batch_inner(&mut self, minter: &Address, credits: &[(Address, Amount)]) -> StakerResult<()> {
        self.ensure_owner(minter)?;

        let minted = checked_sum(credits.iter().map(|(_, amount)| *amount))?;
        let new_supply = safe_add(self.total_supply, minted)?;

        let mut updated: BTreeMap<Address, Amount> = BTreeMap::new();
        for (holder, amount) in credits {
            if *holder == ZERO_ADDRESS {
                return Err(StakerError::InvalidAddress {
                    reason: "cannot mint to the zero address",
                });
            }
            if *amount == 0 {
                continue;
            }
            let current = match updated.get(holder) {
                Some(balance) => *balance,
                None => self.balance_of(holder),
            };
            updated.insert(*holder, safe_add(current, *amount)?);
        }

        self.balances.extend(updated);
        self.total_supply = new_supply;

        debug!(
            minter = %short_address(minter),
            credits = credits.len(),
            minted = %minted,
            total_supply = %new_supply,
            "reward tokens minted"
        );
        Ok(())
    }
}

impl RewardToken for RewardTokenState {
    fn mint_batch(&mut self, minter: &Address, credits: &[RewardCredit]) -> StakerResult<()> {
        let pairs: Vec<(Address, Amount)> = credits
            .iter()
            .map(|credit| (credit.participant, credit.tokens))
            .collect();
        self.mint_batch_inner(minter, &pairs)
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> StakerResult<()> {
        if *caller != self.owner {
            return Err(StakerError::NonOwnerCall { caller: *caller });
        }
        if *new_owner == ZERO_ADDRESS {
            return Err(StakerError::InvalidAddress {
                reason: "new owner cannot be the zero address",
            });
        }
        info!(
            old_owner = %short_address(&self.owner),
            new_owner = %short_address(new_owner),
            "reward token ownership transferred"
        );
        self.owner = *new_owner;
        Ok(())
    }
}

// ============ Helper Functions ============

/// Split a base-unit amount into whole tokens and the fractional remainder
pub fn format_amount(amount: Amount) -> (Amount, Amount) {
    (amount / reward::ONE, amount % reward::ONE)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Address {
        [9u8; 32]
    }

    fn alice() -> Address {
        [1u8; 32]
    }

    fn bob() -> Address {
        [2u8; 32]
    }

    fn credit(participant: Address, tokens: Amount) -> RewardCredit {
        RewardCredit { participant, staked: tokens / 1_000, tokens }
    }

    #[test]
    fn test_metadata() {
        assert_eq!(RewardTokenState::name(), "BFY Token");
        assert_eq!(RewardTokenState::symbol(), "BFY");
        assert_eq!(RewardTokenState::decimals(), 18);
    }

    #[test]
    fn test_new_rejects_zero_owner() {
        assert!(matches!(
            RewardTokenState::new(ZERO_ADDRESS),
            Err(StakerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_mint_by_owner() {
        let mut token = RewardTokenState::new(pool()).unwrap();
        token.mint(&pool(), &alice(), 500 * reward::ONE).unwrap();
        token.mint(&pool(), &alice(), 25 * reward::ONE).unwrap();

        assert_eq!(token.balance_of(&alice()), 525 * reward::ONE);
        assert_eq!(token.total_supply(), 525 * reward::ONE);
        assert_eq!(token.balance_of(&bob()), 0);
    }

    #[test]
    fn test_mint_unauthorized() {
        let mut token = RewardTokenState::new(pool()).unwrap();
        let result = token.mint(&alice(), &alice(), 1);
        assert_eq!(result, Err(StakerError::MintUnauthorized { caller: alice() }));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn test_mint_batch_all_or_nothing() {
        let mut token = RewardTokenState::new(pool()).unwrap();
        token.mint(&pool(), &bob(), u128::MAX - 10).unwrap();
        let before = token.clone();

        // Second credit overflows bob's balance; alice must not be credited either
        let result = token.mint_batch(&pool(), &[credit(alice(), 1_000), credit(bob(), 1_000)]);
        assert_eq!(result, Err(StakerError::Overflow));
        assert_eq!(token, before);
    }

    #[test]
    fn test_mint_batch_credits_everyone() {
        let mut token = RewardTokenState::new(pool()).unwrap();
        token
            .mint_batch(&pool(), &[credit(alice(), 500), credit(bob(), 1_000)])
            .unwrap();
        assert_eq!(token.balance_of(&alice()), 500);
        assert_eq!(token.balance_of(&bob()), 1_000);
        assert_eq!(token.total_supply(), 1_500);
        assert_eq!(token.holders(), 2);
    }

    #[test]
    fn test_transfer_ownership() {
        let mut token = RewardTokenState::new(pool()).unwrap();

        assert!(matches!(
            token.transfer_ownership(&alice(), &alice()),
            Err(StakerError::NonOwnerCall { .. })
        ));

        token.transfer_ownership(&pool(), &alice()).unwrap();
        assert_eq!(token.owner(), alice());

        // The old owner can no longer mint
        assert!(matches!(
            token.mint(&pool(), &bob(), 1),
            Err(StakerError::MintUnauthorized { .. })
        ));
        token.mint(&alice(), &bob(), 1).unwrap();
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(500 * reward::ONE + 7), (500, 7));
    }
}
