//! Fund Vault
//!
//! Native value held by the pool. Value only leaves on behalf of withdraw,
//! award and redeem; each of those debits the ledger here and hands the
//! actual transfer to a [`PayoutSink`] after commit.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use staker_common::{
    errors::{StakerError, StakerResult},
    interfaces::PayoutSink,
    math::{free_balance, safe_add, safe_sub},
    types::{short_address, Address, Amount, ReceiptEntry, StakingStatus, ZERO_ADDRESS},
};

use crate::ledger::PoolLedger;
use crate::lifecycle::{self, StatusChange};

/// Outcome of a successful award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub amount: Amount,
    pub receipt_index: u64,
    pub status_change: Option<StatusChange>,
}

impl PoolLedger {
    /// Portion of the vault not backing any stake
    pub fn free_balance(&self) -> StakerResult<Amount> {
        free_balance(self.vault_balance, self.total_staked)
    }

    /// Credit incoming native value. Returns the new vault balance.
    pub(crate) fn deposit(&mut self, amount: Amount) -> StakerResult<Amount> {
        self.vault_balance = safe_add(self.vault_balance, amount)?;
        Ok(self.vault_balance)
    }

    /// Debit outgoing native value
    pub(crate) fn release(&mut self, amount: Amount) -> StakerResult<()> {
        self.vault_balance = safe_sub(self.vault_balance, amount)?;
        Ok(())
    }
}

/// Lock `amount` for `participant`. Returns the participant's new stake.
pub fn stake(ledger: &mut PoolLedger, participant: &Address, amount: Amount) -> StakerResult<Amount> {
    lifecycle::ensure_status(ledger, StakingStatus::Open)?;
    if amount == 0 {
        return Err(StakerError::ZeroAmount);
    }
    let new_stake = ledger.credit_stake(participant, amount)?;
    ledger.deposit(amount)?;
    Ok(new_stake)
}

/// Refund the participant's whole stake. Returns the refunded amount.
pub fn withdraw(ledger: &mut PoolLedger, participant: &Address) -> StakerResult<Amount> {
    lifecycle::ensure_status(ledger, StakingStatus::Closed)?;
    let amount = ledger.remove_stake(participant)?;
    ledger.release(amount)?;
    Ok(amount)
}

/// Plain value receipt. Any status, any sender.
pub fn fund(ledger: &mut PoolLedger, amount: Amount) -> StakerResult<Amount> {
    if amount == 0 {
        return Err(StakerError::ZeroAmount);
    }
    ledger.deposit(amount)
}

/// Divert free vault funds to `recipient` and record the transfer.
///
/// `None` awards the whole free balance. Staked funds are never touched.
pub fn award(ledger: &mut PoolLedger, recipient: &Address, amount: Option<Amount>) -> StakerResult<Award> {
    if *recipient == ZERO_ADDRESS {
        return Err(StakerError::InvalidAddress {
            reason: "award recipient cannot be the zero address",
        });
    }
    let available = ledger.free_balance()?;
    let amount = amount.unwrap_or(available);
    if amount == 0 {
        return Err(StakerError::ZeroAmount);
    }
    if amount > available {
        return Err(StakerError::InsufficientVaultBalance { available, requested: amount });
    }

    ledger.release(amount)?;
    let receipt_index = ledger.receipts.append(ReceiptEntry::new(*recipient, amount));
    let status_change = lifecycle::mark_awarded(ledger);
    Ok(Award { amount, receipt_index, status_change })
}

/// Zero the vault in favour of the administrator. Returns the amount paid.
pub fn redeem(ledger: &mut PoolLedger) -> StakerResult<Amount> {
    lifecycle::ensure_status(ledger, StakingStatus::Completed)?;
    let amount = ledger.vault_balance;
    ledger.release(amount)?;
    Ok(amount)
}

// ============ In-Memory Payouts ============

/// Payout sink crediting plain in-memory wallets.
///
/// Individual wallets can be set to refuse incoming value, which is how a
/// failing recipient is modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryWallets {
    balances: BTreeMap<Address, Amount>,
    refusing: BTreeSet<Address>,
}

impl InMemoryWallets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `wallet` reject every payout until [`Self::accept`] is called
    pub fn refuse(&mut self, wallet: Address) {
        self.refusing.insert(wallet);
    }

    pub fn accept(&mut self, wallet: &Address) {
        self.refusing.remove(wallet);
    }

    pub fn balance_of(&self, wallet: &Address) -> Amount {
        self.balances.get(wallet).copied().unwrap_or(0)
    }

    /// Sum of everything paid out so far
    pub fn total_paid(&self) -> Amount {
        self.balances.values().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

impl PayoutSink for InMemoryWallets {
    fn pay(&mut self, to: &Address, amount: Amount) -> StakerResult<()> {
        if self.refusing.contains(to) {
            return Err(StakerError::TransferFailed { to: *to, amount });
        }
        let balance = safe_add(self.balance_of(to), amount)?;
        self.balances.insert(*to, balance);
        debug!(to = %short_address(to), amount = %amount, "payout delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staker_common::{constants::native, PoolConfig};

    fn admin() -> Address {
        [1u8; 32]
    }

    fn alice() -> Address {
        [2u8; 32]
    }

    fn carol() -> Address {
        [4u8; 32]
    }

    fn ledger() -> PoolLedger {
        PoolLedger::new(admin(), PoolConfig::default()).unwrap()
    }

    #[test]
    fn test_stake_requires_open_and_amount() {
        let mut ledger = ledger();
        assert_eq!(stake(&mut ledger, &alice(), 0), Err(StakerError::ZeroAmount));
        assert_eq!(stake(&mut ledger, &alice(), 7).unwrap(), 7);
        assert_eq!(ledger.vault_balance(), 7);

        lifecycle::close(&mut ledger).unwrap();
        assert_eq!(stake(&mut ledger, &alice(), 1), Err(StakerError::StakingNotOpen));
    }

    #[test]
    fn test_withdraw_requires_closed() {
        let mut ledger = ledger();
        stake(&mut ledger, &alice(), 7).unwrap();
        assert_eq!(withdraw(&mut ledger, &alice()), Err(StakerError::StakingNotClosed));

        lifecycle::close(&mut ledger).unwrap();
        assert_eq!(withdraw(&mut ledger, &carol()), Err(StakerError::NoStake));
        assert_eq!(withdraw(&mut ledger, &alice()).unwrap(), 7);
        assert_eq!(ledger.vault_balance(), 0);
        assert_eq!(withdraw(&mut ledger, &alice()), Err(StakerError::NoStake));
    }

    #[test]
    fn test_award_limited_to_free_balance() {
        let mut ledger = ledger();
        stake(&mut ledger, &alice(), 10).unwrap();
        assert_eq!(award(&mut ledger, &carol(), None), Err(StakerError::ZeroAmount));

        fund(&mut ledger, 4).unwrap();
        assert_eq!(
            award(&mut ledger, &carol(), Some(5)),
            Err(StakerError::InsufficientVaultBalance { available: 4, requested: 5 })
        );

        let outcome = award(&mut ledger, &carol(), Some(3)).unwrap();
        assert_eq!(outcome.amount, 3);
        assert_eq!(outcome.receipt_index, 0);
        assert_eq!(outcome.status_change, None);

        let outcome = award(&mut ledger, &carol(), None).unwrap();
        assert_eq!(outcome.amount, 1);
        assert_eq!(ledger.vault_balance(), 10);
        assert_eq!(ledger.receipts().len(), 2);
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_award_after_complete_marks_awarded() {
        let mut ledger = ledger();
        stake(&mut ledger, &alice(), native::ONE).unwrap();
        lifecycle::complete(&mut ledger).unwrap();

        let outcome = award(&mut ledger, &carol(), None).unwrap();
        assert_eq!(outcome.amount, native::ONE);
        assert_eq!(ledger.status(), StakingStatus::Awarded);
        assert_eq!(ledger.vault_balance(), 0);
    }

    #[test]
    fn test_redeem_only_when_complete() {
        let mut ledger = ledger();
        stake(&mut ledger, &alice(), native::ONE).unwrap();
        assert_eq!(redeem(&mut ledger), Err(StakerError::OnlyWhenComplete));

        lifecycle::complete(&mut ledger).unwrap();
        fund(&mut ledger, 5).unwrap();
        assert_eq!(redeem(&mut ledger).unwrap(), native::ONE + 5);
        assert_eq!(ledger.vault_balance(), 0);
        // Empty vault redeems as zero
        assert_eq!(redeem(&mut ledger).unwrap(), 0);
    }

    #[test]
    fn test_in_memory_wallets() {
        let mut wallets = InMemoryWallets::new();
        wallets.pay(&alice(), 5).unwrap();
        wallets.refuse(carol());
        assert_eq!(
            wallets.pay(&carol(), 3),
            Err(StakerError::TransferFailed { to: carol(), amount: 3 })
        );
        wallets.accept(&carol());
        wallets.pay(&carol(), 3).unwrap();
        assert_eq!(wallets.balance_of(&alice()), 5);
        assert_eq!(wallets.total_paid(), 8);
    }
}
