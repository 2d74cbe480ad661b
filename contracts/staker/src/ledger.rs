//! Accounting Ledger
//!
//! The single pool aggregate: who staked how much, the running totals, the
//! vault balance backing them and the custody transfer history. Every field
//! is private to the crate; mutation happens only through the engine on a
//! staged copy.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use staker_common::{
    errors::{StakerError, StakerResult},
    math::{safe_add, safe_sub},
    types::{Address, Amount, PoolView, StakingStatus},
    AccessGuard, PoolConfig,
};

use crate::receipts::CustodyLog;

/// Pool aggregate
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PoolLedger {
    pub(crate) status: StakingStatus,
    pub(crate) guard: AccessGuard,
    /// Participant -> staked amount. Entries are never zero; absent = 0.
    pub(crate) stakes: BTreeMap<Address, Amount>,
    pub(crate) total_staked: Amount,
    pub(crate) participant_count: u64,
    pub(crate) vault_balance: Amount,
    pub(crate) receipts: CustodyLog,
    /// Reward token ownership has been handed off
    pub(crate) terminated: bool,
    pub(crate) config: PoolConfig,
}

impl PoolLedger {
    /// Fresh OPEN pool with an empty vault
    pub fn new(administrator: Address, config: PoolConfig) -> StakerResult<Self> {
        config.validate()?;
        Ok(Self {
            status: StakingStatus::Open,
            guard: AccessGuard::new(administrator)?,
            stakes: BTreeMap::new(),
            total_staked: 0,
            participant_count: 0,
            vault_balance: 0,
            receipts: CustodyLog::new(),
            terminated: false,
            config,
        })
    }

    // ============ Reads ============

    pub fn status(&self) -> StakingStatus {
        self.status
    }

    pub fn administrator(&self) -> Address {
        self.guard.administrator()
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    /// Staked amount of `participant`, zero when absent
    pub fn stake_of(&self, participant: &Address) -> Amount {
        self.stakes.get(participant).copied().unwrap_or(0)
    }

    pub fn participant_count(&self) -> u64 {
        self.participant_count
    }

    pub fn vault_balance(&self) -> Amount {
        self.vault_balance
    }

    pub fn receipts(&self) -> &CustodyLog {
        &self.receipts
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Participants in ascending identity order
    pub fn stakes(&self) -> impl Iterator<Item = (&Address, &Amount)> + '_ {
        self.stakes.iter()
    }

    pub fn threshold_reached(&self) -> bool {
        self.total_staked >= self.config.threshold
    }

    pub fn view(&self) -> PoolView {
        PoolView {
            status: self.status,
            administrator: self.administrator(),
            total_staked: self.total_staked,
            number_of_stakers: self.participant_count,
            vault_balance: self.vault_balance,
            threshold: self.config.threshold,
            threshold_reached: self.threshold_reached(),
            receipts: self.receipts.len() as u64,
            terminated: self.terminated,
        }
    }

    // ============ Stake Bookkeeping ============

    /// Add `amount` to the participant's stake and the pool total.
    /// Returns the participant's new stake.
    pub(crate) fn credit_stake(&mut self, participant: &Address, amount: Amount) -> StakerResult<Amount> {
        let current = self.stake_of(participant);
        let new_stake = safe_add(current, amount)?;
        let new_total = safe_add(self.total_staked, amount)?;

        if current == 0 {
            self.participant_count = self
                .participant_count
                .checked_add(1)
                .ok_or(StakerError::Overflow)?;
        }
        self.stakes.insert(*participant, new_stake);
        self.total_staked = new_total;
        Ok(new_stake)
    }

    /// Remove the participant's whole stake. Returns the removed amount.
    pub(crate) fn remove_stake(&mut self, participant: &Address) -> StakerResult<Amount> {
        let amount = self.stakes.remove(participant).ok_or(StakerError::NoStake)?;
        self.total_staked = safe_sub(self.total_staked, amount)?;
        self.participant_count = self
            .participant_count
            .checked_sub(1)
            .ok_or(StakerError::Underflow)?;
        Ok(amount)
    }

    /// Drop every stake entry after rewards were computed
    pub(crate) fn clear_stakes(&mut self) {
        self.stakes.clear();
        self.total_staked = 0;
        self.participant_count = 0;
    }

    // ============ Invariants ============

    /// Check all invariants. Returns Err if any violated.
    pub fn check_invariants(&self) -> StakerResult<()> {
        // TotalMatchesStakes + NoZeroEntries, one pass over the stakes
        let mut sum: Amount = 0;
        for amount in self.stakes.values() {
            if *amount == 0 {
                return Err(StakerError::InvariantViolated("zero stake entry"));
            }
            sum = safe_add(sum, *amount)
                .map_err(|_| StakerError::InvariantViolated("stake sum overflows"))?;
        }
        if sum != self.total_staked {
            return Err(StakerError::InvariantViolated("total staked differs from sum of stakes"));
        }

        // CountMatchesEntries
        if self.participant_count != self.stakes.len() as u64 {
            return Err(StakerError::InvariantViolated("participant count differs from entries"));
        }

        // VaultBacksStakes
        if self.vault_balance < self.total_staked {
            return Err(StakerError::InvariantViolated("vault balance below total staked"));
        }

        // SettledPoolHoldsNoStakes
        if matches!(self.status, StakingStatus::Completed | StakingStatus::Awarded)
            && !self.stakes.is_empty()
        {
            return Err(StakerError::InvariantViolated("settled pool still holds stakes"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        [1u8; 32]
    }

    fn alice() -> Address {
        [2u8; 32]
    }

    fn bob() -> Address {
        [3u8; 32]
    }

    fn ledger() -> PoolLedger {
        PoolLedger::new(admin(), PoolConfig::default()).unwrap()
    }

    #[test]
    fn test_new_ledger() {
        let ledger = ledger();
        assert_eq!(ledger.status(), StakingStatus::Open);
        assert_eq!(ledger.administrator(), admin());
        assert_eq!(ledger.total_staked(), 0);
        assert_eq!(ledger.participant_count(), 0);
        assert!(ledger.receipts().is_empty());
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = PoolConfig { reward_rate: 0, ..PoolConfig::default() };
        assert!(matches!(
            PoolLedger::new(admin(), config),
            Err(StakerError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_credit_and_remove_stake() {
        let mut ledger = ledger();
        assert_eq!(ledger.credit_stake(&alice(), 5).unwrap(), 5);
        assert_eq!(ledger.credit_stake(&alice(), 3).unwrap(), 8);
        assert_eq!(ledger.credit_stake(&bob(), 2).unwrap(), 2);
        ledger.vault_balance = 10;

        assert_eq!(ledger.participant_count(), 2);
        assert_eq!(ledger.total_staked(), 10);
        assert!(ledger.check_invariants().is_ok());

        assert_eq!(ledger.remove_stake(&alice()).unwrap(), 8);
        assert_eq!(ledger.stake_of(&alice()), 0);
        assert_eq!(ledger.participant_count(), 1);
        assert_eq!(ledger.total_staked(), 2);
        assert_eq!(ledger.remove_stake(&alice()), Err(StakerError::NoStake));
    }

    #[test]
    fn test_invariants_detect_drift() {
        let mut ledger = ledger();
        ledger.credit_stake(&alice(), 5).unwrap();
        // Vault not funded for the stake
        assert!(matches!(
            ledger.check_invariants(),
            Err(StakerError::InvariantViolated(_))
        ));

        ledger.vault_balance = 5;
        ledger.total_staked = 4;
        assert!(matches!(
            ledger.check_invariants(),
            Err(StakerError::InvariantViolated(_))
        ));

        ledger.total_staked = 5;
        ledger.participant_count = 2;
        assert!(matches!(
            ledger.check_invariants(),
            Err(StakerError::InvariantViolated(_))
        ));

        ledger.participant_count = 1;
        ledger.stakes.insert(bob(), 0);
        ledger.participant_count = 2;
        assert_eq!(
            ledger.check_invariants(),
            Err(StakerError::InvariantViolated("zero stake entry"))
        );

        ledger.stakes.remove(&bob());
        ledger.participant_count = 1;
        ledger.status = StakingStatus::Completed;
        assert!(matches!(
            ledger.check_invariants(),
            Err(StakerError::InvariantViolated(_))
        ));
    }

    #[test]
    fn test_view() {
        let mut ledger = ledger();
        ledger.credit_stake(&alice(), PoolConfig::default().threshold).unwrap();
        ledger.vault_balance = PoolConfig::default().threshold;

        let view = ledger.view();
        assert_eq!(view.number_of_stakers, 1);
        assert!(view.threshold_reached);
        assert_eq!(view.receipts, 0);
        assert!(!view.terminated);
    }
}
