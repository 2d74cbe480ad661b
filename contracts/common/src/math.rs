//! Mathematical Utilities for the Staking Pool
//!
//! Checked arithmetic on base units. Nothing here ever wraps.

use crate::errors::{StakerError, StakerResult};
use crate::types::Amount;

/// Reward tokens owed for a staked amount
///
/// tokens = amount * rate
///
/// Native and reward units share 18 fractional digits, so the rate applies
/// directly to base units: 0.5 native (5e17) at rate 1000 gives 5e20, i.e.
/// 500 whole reward tokens.
pub fn tokens_to_award(amount: Amount, rate: u128) -> StakerResult<Amount> {
    amount.checked_mul(rate).ok_or(StakerError::Overflow)
}

/// Free vault balance, the part not backing any stake
pub fn free_balance(vault_balance: Amount, total_staked: Amount) -> StakerResult<Amount> {
    safe_sub(vault_balance, total_staked)
}

// ============ Safe Math ============

pub fn safe_add(a: Amount, b: Amount) -> StakerResult<Amount> {
    a.checked_add(b).ok_or(StakerError::Overflow)
}

pub fn safe_sub(a: Amount, b: Amount) -> StakerResult<Amount> {
    a.checked_sub(b).ok_or(StakerError::Underflow)
}

/// Sum of an iterator of amounts, failing on overflow
pub fn checked_sum<I>(amounts: I) -> StakerResult<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    amounts.into_iter().try_fold(0, safe_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{native, policy, reward};

    #[test]
    fn test_tokens_to_award() {
        // 0.5 native -> 500 tokens
        assert_eq!(
            tokens_to_award(native::ONE / 2, policy::REWARD_RATE).unwrap(),
            500 * reward::ONE
        );
        // 1 native -> 1000 tokens
        assert_eq!(
            tokens_to_award(native::ONE, policy::REWARD_RATE).unwrap(),
            1_000 * reward::ONE
        );
        // 0.025 native -> 25 tokens
        assert_eq!(
            tokens_to_award(25 * native::ONE / 1_000, policy::REWARD_RATE).unwrap(),
            25 * reward::ONE
        );
        assert_eq!(tokens_to_award(0, policy::REWARD_RATE).unwrap(), 0);
    }

    #[test]
    fn test_tokens_to_award_overflow() {
        assert_eq!(
            tokens_to_award(u128::MAX / 2, policy::REWARD_RATE),
            Err(StakerError::Overflow)
        );
    }

    #[test]
    fn test_free_balance() {
        assert_eq!(free_balance(10, 7).unwrap(), 3);
        assert_eq!(free_balance(7, 7).unwrap(), 0);
        assert_eq!(free_balance(6, 7), Err(StakerError::Underflow));
    }

    #[test]
    fn test_safe_math() {
        assert_eq!(safe_add(1, 2).unwrap(), 3);
        assert!(safe_add(u128::MAX, 1).is_err());
        assert!(safe_sub(1, 2).is_err());
        assert_eq!(checked_sum([1, 2, 3]).unwrap(), 6);
        assert_eq!(checked_sum([u128::MAX, 1]), Err(StakerError::Overflow));
    }
}
