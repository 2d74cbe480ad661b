//! Lifecycle State Machine
//!
//! ```text
//! OPEN --close--> CLOSED --restart--> OPEN
//! OPEN --complete--> COMPLETED --award--> AWARDED
//! COMPLETED / AWARDED --restart--> OPEN
//! ```
//!
//! Administrator checks happen in the engine before any of these guards run.

use staker_common::{
    errors::{StakerError, StakerResult},
    types::{RewardCredit, StakingStatus},
};

use crate::ledger::PoolLedger;
use crate::rewards;

/// Status change applied by a lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: StakingStatus,
    pub to: StakingStatus,
}

fn move_to(ledger: &mut PoolLedger, to: StakingStatus) -> StatusChange {
    let from = ledger.status;
    ledger.status = to;
    StatusChange { from, to }
}

pub(crate) fn ensure_status(ledger: &PoolLedger, expected: StakingStatus) -> StakerResult<()> {
    if ledger.status == expected {
        return Ok(());
    }
    Err(match expected {
        StakingStatus::Open => StakerError::StakingNotOpen,
        StakingStatus::Closed => StakerError::StakingNotClosed,
        StakingStatus::Completed => StakerError::OnlyWhenComplete,
        StakingStatus::Awarded => StakerError::InvalidTransition {
            from: ledger.status,
            to: expected,
        },
    })
}

/// End intake without rewards. Stakes stay withdrawable.
pub fn close(ledger: &mut PoolLedger) -> StakerResult<StatusChange> {
    ensure_status(ledger, StakingStatus::Open)?;
    Ok(move_to(ledger, StakingStatus::Closed))
}

/// End intake and settle rewards.
///
/// Returns the credit batch to mint; the stake ledger is emptied. The caller
/// is responsible for minting the batch and undoing the ledger change if
/// minting fails.
pub fn complete(ledger: &mut PoolLedger) -> StakerResult<(StatusChange, Vec<RewardCredit>)> {
    ensure_status(ledger, StakingStatus::Open)?;
    if ledger.terminated {
        return Err(StakerError::ContractTerminated);
    }
    if !ledger.threshold_reached() {
        return Err(StakerError::StakingThresholdNotReached {
            total: ledger.total_staked,
            threshold: ledger.config.threshold,
        });
    }

    let credits = rewards::compute_credits(&ledger.stakes, ledger.config.reward_rate)?;
    ledger.clear_stakes();
    Ok((move_to(ledger, StakingStatus::Completed), credits))
}

/// Reopen intake. Leftover stakes from a close are kept.
pub fn restart(ledger: &mut PoolLedger) -> StakerResult<StatusChange> {
    if !ledger.status.is_restartable() {
        return Err(StakerError::InvalidTransition {
            from: ledger.status,
            to: StakingStatus::Open,
        });
    }
    Ok(move_to(ledger, StakingStatus::Open))
}

/// Mark reward token ownership as handed off. Status is unchanged.
pub fn terminate(ledger: &mut PoolLedger) -> StakerResult<()> {
    if ledger.terminated {
        return Err(StakerError::ContractTerminated);
    }
    if !ledger.status.is_restartable() {
        return Err(StakerError::InvalidTransition {
            from: ledger.status,
            to: ledger.status,
        });
    }
    ledger.terminated = true;
    Ok(())
}

/// A completed pool becomes AWARDED once funds are diverted out of it
pub(crate) fn mark_awarded(ledger: &mut PoolLedger) -> Option<StatusChange> {
    (ledger.status == StakingStatus::Completed).then(|| move_to(ledger, StakingStatus::Awarded))
}
