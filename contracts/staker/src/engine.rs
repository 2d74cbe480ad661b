//! Transition engine
//!
//! The single chokepoint for every mutating call:
//! `(ledger, caller, call) -> (ledger', effect, events)`.
//!
//! The engine never talks to collaborators. It mutates the ledger it is
//! handed (the service passes a staged copy) and describes the one outbound
//! interaction the call needs as an [`Effect`]. Invariants are checked pre
//! and post; any error leaves the staged copy to be discarded.

use staker_common::{
    errors::StakerResult,
    events::{EventLog, StakerEvent},
    types::{Address, Amount, PoolCall, RewardCredit},
};

use crate::ledger::PoolLedger;
use crate::lifecycle::{self, StatusChange};
use crate::vault;

/// Outbound interaction produced by a transition (data, not side effects)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send native value out of the vault
    Payout { to: Address, amount: Amount },
    /// Mint the completion batch on the reward token
    MintRewards(Vec<RewardCredit>),
    /// Hand reward token ownership to `new_owner`
    HandOff { new_owner: Address },
}

/// Result of applying one call
#[derive(Debug, Clone, Default)]
pub struct Transition {
    pub effect: Option<Effect>,
    pub events: EventLog,
}

impl Transition {
    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    fn emit(mut self, event: StakerEvent) -> Self {
        self.events.emit(event);
        self
    }

    fn status_changed(self, change: StatusChange) -> Self {
        self.emit(StakerEvent::StatusChanged { from: change.from, to: change.to })
    }
}

/// Apply `call` from `caller` to `ledger`.
///
/// Administrator-only calls are rejected before any lifecycle guard runs.
pub fn apply(ledger: &mut PoolLedger, caller: &Address, call: &PoolCall) -> StakerResult<Transition> {
    // Every committed ledger already passed the post-check below
    #[cfg(debug_assertions)]
    ledger.check_invariants()?;

    if call.requires_admin() {
        ledger.guard.ensure_admin(caller)?;
    }

    let transition = match call {
        PoolCall::Stake { amount } => {
            let new_stake = vault::stake(ledger, caller, *amount)?;
            Transition::default().emit(StakerEvent::Staked {
                participant: *caller,
                amount: *amount,
                new_stake,
                pool_total: ledger.total_staked(),
            })
        }
        PoolCall::Withdraw => {
            let amount = vault::withdraw(ledger, caller)?;
            Transition::default()
                .emit(StakerEvent::Withdrawn {
                    participant: *caller,
                    amount,
                    pool_total: ledger.total_staked(),
                })
                .with_effect(Effect::Payout { to: *caller, amount })
        }
        PoolCall::Fund { amount } => {
            let vault_balance = vault::fund(ledger, *amount)?;
            Transition::default().emit(StakerEvent::FundsReceived {
                from: *caller,
                amount: *amount,
                vault_balance,
            })
        }
        PoolCall::Close => {
            let change = lifecycle::close(ledger)?;
            Transition::default().status_changed(change)
        }
        PoolCall::Complete => {
            let (change, credits) = lifecycle::complete(ledger)?;
            let mut transition = Transition::default();
            for credit in &credits {
                transition = transition.emit(StakerEvent::RewardIssued {
                    participant: credit.participant,
                    staked: credit.staked,
                    tokens: credit.tokens,
                });
            }
            transition
                .status_changed(change)
                .with_effect(Effect::MintRewards(credits))
        }
        PoolCall::Restart => {
            let change = lifecycle::restart(ledger)?;
            Transition::default().status_changed(change)
        }
        PoolCall::Terminate => {
            lifecycle::terminate(ledger)?;
            let new_owner = ledger.administrator();
            Transition::default()
                .emit(StakerEvent::ContractTerminated { new_token_owner: new_owner })
                .with_effect(Effect::HandOff { new_owner })
        }
        PoolCall::Award { recipient, amount } => {
            let award = vault::award(ledger, recipient, *amount)?;
            let mut transition = Transition::default()
                .emit(StakerEvent::StakedBalanceAwarded {
                    recipient: *recipient,
                    amount: award.amount,
                    receipt_index: award.receipt_index,
                })
                .with_effect(Effect::Payout { to: *recipient, amount: award.amount });
            if let Some(change) = award.status_change {
                transition = transition.status_changed(change);
            }
            transition
        }
        PoolCall::Redeem => {
            let amount = vault::redeem(ledger)?;
            let admin = ledger.administrator();
            let transition = Transition::default().emit(StakerEvent::StakedAmountRedeemed { admin, amount });
            if amount == 0 {
                transition
            } else {
                transition.with_effect(Effect::Payout { to: admin, amount })
            }
        }
        PoolCall::TransferAdministrator { new_admin } => {
            let old_admin = ledger.guard.transfer(caller, *new_admin)?;
            Transition::default().emit(StakerEvent::AdminChanged {
                old_admin,
                new_admin: *new_admin,
            })
        }
    };

    // Post-check invariants
    ledger.check_invariants()?;
    Ok(transition)
}
