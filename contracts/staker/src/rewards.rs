//! Reward Issuer
//!
//! Fixed-ratio conversion from staked native value to reward tokens. Each
//! participant's credit depends only on their own stake.

use std::collections::BTreeMap;

use staker_common::{
    errors::StakerResult,
    math::tokens_to_award,
    types::{Address, Amount, RewardCredit},
};

/// Build the credit batch for every nonzero stake, in identity order
pub fn compute_credits(stakes: &BTreeMap<Address, Amount>, rate: u128) -> StakerResult<Vec<RewardCredit>> {
    stakes
        .iter()
        .filter(|(_, staked)| **staked > 0)
        .map(|(participant, staked)| -> StakerResult<RewardCredit> {
            Ok(RewardCredit {
                participant: *participant,
                staked: *staked,
                tokens: tokens_to_award(*staked, rate)?,
            })
        })
        .collect()
}

/// Total tokens a batch will mint
pub fn batch_total(credits: &[RewardCredit]) -> StakerResult<Amount> {
    staker_common::math::checked_sum(credits.iter().map(|credit| credit.tokens))
}
