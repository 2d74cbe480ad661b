//! Transactional pool service
//!
//! Every mutating call takes the writer lock, runs the engine on a staged
//! copy of the ledger, commits it, then dispatches the call's one outbound
//! effect. Readers keep seeing the previous ledger until that effect has
//! landed. If the effect fails the pre-call ledger is restored and nothing
//! is ever published, so readers only observe whole operations.
//!
//! Lock order: `core`, then `sink` or `token`, then `view`. Ledger reads
//! only touch `view` and never wait on a writer. Token reads only wait
//! while a mint or hand-off is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

use tracing::{debug, info, warn};

use staker_common::{
    constants::limits::MAX_BUFFERED_EVENTS,
    errors::{StakerError, StakerResult},
    events::{EventLog, StakerEvent},
    interfaces::{PayoutSink, RewardToken},
    math::tokens_to_award,
    types::{short_address, Address, Amount, PoolCall, PoolView, ReceiptEntry, StakingStatus},
    PoolConfig,
};

use crate::engine::{self, Effect};
use crate::ledger::PoolLedger;
use crate::persistence;
use crate::wire;

/// State owned by the writer lock
struct Core {
    ledger: Arc<PoolLedger>,
    events: EventLog,
}

/// Collaborator lock held by an in-flight effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    Sink,
    Token,
}

/// An effect in flight on `thread`, which already committed `ledger`
struct Dispatch {
    thread: ThreadId,
    held: Held,
    ledger: Arc<PoolLedger>,
}

/// Marks the current thread as dispatching an effect until dropped
struct DispatchGuard<'a> {
    slot: &'a RwLock<Option<Dispatch>>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(slot: &'a RwLock<Option<Dispatch>>, held: Held, ledger: &Arc<PoolLedger>) -> Self {
        *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Dispatch {
            thread: thread::current().id(),
            held,
            ledger: Arc::clone(ledger),
        });
        Self { slot }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// The staking pool
pub struct StakingPool<T, P> {
    /// Identity the pool acts as toward the reward token
    pool_address: Address,
    core: Mutex<Core>,
    /// Last ledger whose effect landed
    view: RwLock<Arc<PoolLedger>>,
    token: RwLock<T>,
    sink: Mutex<P>,
    dispatching: RwLock<Option<Dispatch>>,
}

impl<T: RewardToken, P: PayoutSink> StakingPool<T, P> {
    /// Open a fresh pool administered by `administrator`.
    ///
    /// `token` must already be owned by `pool_address`, otherwise completion
    /// could never mint.
    pub fn new(
        pool_address: Address,
        administrator: Address,
        config: PoolConfig,
        token: T,
        sink: P,
    ) -> StakerResult<Self> {
        let ledger = PoolLedger::new(administrator, config)?;
        if token.owner() != pool_address {
            return Err(StakerError::InvalidConfig {
                param: "token",
                reason: "reward token must be owned by the pool",
            });
        }
        info!(
            pool = %short_address(&pool_address),
            admin = %short_address(&administrator),
            threshold = %config.threshold,
            reward_rate = %config.reward_rate,
            "staking pool opened"
        );
        Ok(Self::from_ledger(pool_address, ledger, token, sink))
    }

    /// Rebuild a pool from a persisted snapshot
    pub fn restore(pool_address: Address, snapshot: &[u8], token: T, sink: P) -> StakerResult<Self> {
        let ledger = persistence::decode(snapshot)?;
        if !ledger.is_terminated() && token.owner() != pool_address {
            return Err(StakerError::InvalidConfig {
                param: "token",
                reason: "reward token must be owned by the pool",
            });
        }
        info!(
            pool = %short_address(&pool_address),
            status = ledger.status().label(),
            participants = ledger.participant_count(),
            "staking pool restored"
        );
        Ok(Self::from_ledger(pool_address, ledger, token, sink))
    }

    fn from_ledger(pool_address: Address, ledger: PoolLedger, token: T, sink: P) -> Self {
        let ledger = Arc::new(ledger);
        Self {
            pool_address,
            view: RwLock::new(Arc::clone(&ledger)),
            core: Mutex::new(Core { ledger, events: EventLog::bounded(MAX_BUFFERED_EVENTS) }),
            token: RwLock::new(token),
            sink: Mutex::new(sink),
            dispatching: RwLock::new(None),
        }
    }

    // ============ Locking ============

    /// The effect the current thread is dispatching, if any
    fn own_dispatch(&self) -> Option<(Held, Arc<PoolLedger>)> {
        let slot = self.dispatching.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|dispatch| dispatch.thread == thread::current().id())
            .map(|dispatch| (dispatch.held, Arc::clone(&dispatch.ledger)))
    }

    fn ensure_not_dispatching(&self) -> StakerResult<()> {
        match self.own_dispatch() {
            Some(_) => Err(StakerError::Reentrancy),
            None => Ok(()),
        }
    }

    /// Fails when the current thread's in-flight effect already holds `held`
    fn ensure_not_holding(&self, held: Held) -> StakerResult<()> {
        match self.own_dispatch() {
            Some((current, _)) if current == held => Err(StakerError::Reentrancy),
            _ => Ok(()),
        }
    }

    fn lock_core(&self) -> StakerResult<MutexGuard<'_, Core>> {
        self.ensure_not_dispatching()?;
        self.core.lock().map_err(|_| StakerError::LockPoisoned)
    }

    fn lock_sink(&self) -> StakerResult<MutexGuard<'_, P>> {
        self.sink.lock().map_err(|_| StakerError::LockPoisoned)
    }

    fn read_token(&self) -> StakerResult<RwLockReadGuard<'_, T>> {
        self.ensure_not_holding(Held::Token)?;
        self.token.read().map_err(|_| StakerError::LockPoisoned)
    }

    fn write_token(&self) -> StakerResult<RwLockWriteGuard<'_, T>> {
        self.token.write().map_err(|_| StakerError::LockPoisoned)
    }

    fn publish(&self, ledger: &Arc<PoolLedger>) {
        // The view only ever holds whole ledgers, so a poisoned lock is still consistent
        let mut view = self.view.write().unwrap_or_else(PoisonError::into_inner);
        *view = Arc::clone(ledger);
    }

    /// Ledger visible to the calling thread. A thread inside its own effect
    /// sees the ledger it committed; everyone else sees the published view.
    fn committed(&self) -> Arc<PoolLedger> {
        if let Some((_, ledger)) = self.own_dispatch() {
            return ledger;
        }
        let view = self.view.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&view)
    }

    /// Run `effect` against its collaborator and publish `committed` once it
    /// lands, before the collaborator lock is released.
    fn dispatch(&self, effect: &Effect, committed: &Arc<PoolLedger>) -> StakerResult<()> {
        match effect {
            Effect::Payout { to, amount } => {
                debug!(to = %short_address(to), amount = %amount, "dispatching payout");
                let mut sink = self.lock_sink()?;
                let _dispatch = DispatchGuard::enter(&self.dispatching, Held::Sink, committed);
                sink.pay(to, *amount)?;
                self.publish(committed);
            }
            Effect::MintRewards(credits) => {
                debug!(credits = credits.len(), "dispatching reward mint");
                let mut token = self.write_token()?;
                let _dispatch = DispatchGuard::enter(&self.dispatching, Held::Token, committed);
                token.mint_batch(&self.pool_address, credits)?;
                self.publish(committed);
            }
            Effect::HandOff { new_owner } => {
                debug!(new_owner = %short_address(new_owner), "dispatching token hand-off");
                let mut token = self.write_token()?;
                let _dispatch = DispatchGuard::enter(&self.dispatching, Held::Token, committed);
                token.transfer_ownership(&self.pool_address, new_owner)?;
                self.publish(committed);
            }
        }
        Ok(())
    }

    // ============ Execution ============

    /// Run one call to completion or not at all
    pub fn execute(&self, caller: &Address, call: PoolCall) -> StakerResult<()> {
        let mut core = self.lock_core()?;

        let mut staged = PoolLedger::clone(&core.ledger);
        let transition = match engine::apply(&mut staged, caller, &call) {
            Ok(transition) => transition,
            Err(err) => {
                warn!(
                    op = call.name(),
                    caller = %short_address(caller),
                    code = err.code(),
                    error = %err,
                    "pool call rejected"
                );
                return Err(err);
            }
        };

        // Commit before any outbound interaction
        let committed = Arc::new(staged);
        let previous = std::mem::replace(&mut core.ledger, Arc::clone(&committed));

        match &transition.effect {
            Some(effect) => {
                if let Err(err) = self.dispatch(effect, &committed) {
                    core.ledger = previous;
                    warn!(
                        op = call.name(),
                        caller = %short_address(caller),
                        code = err.code(),
                        error = %err,
                        "effect failed, pool call rolled back"
                    );
                    return Err(err);
                }
            }
            None => self.publish(&committed),
        }

        info!(
            op = call.name(),
            caller = %short_address(caller),
            status = committed.status().label(),
            total_staked = %committed.total_staked(),
            vault_balance = %committed.vault_balance(),
            "pool call committed"
        );

        let dropped = core.events.dropped();
        core.events.extend(transition.events);
        let discarded = core.events.dropped() - dropped;
        if discarded > 0 {
            warn!(
                discarded,
                buffered = core.events.len(),
                "event buffer full, oldest events discarded"
            );
        }
        Ok(())
    }

    /// Decode a CBOR call envelope and execute it
    pub fn submit(&self, envelope: &[u8]) -> StakerResult<()> {
        let envelope = wire::decode(envelope)?;
        self.execute(&envelope.caller, envelope.call)
    }

    // ============ Entry Points ============

    pub fn stake(&self, caller: &Address, amount: Amount) -> StakerResult<()> {
        self.execute(caller, PoolCall::Stake { amount })
    }

    pub fn withdraw(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Withdraw)
    }

    pub fn fund(&self, caller: &Address, amount: Amount) -> StakerResult<()> {
        self.execute(caller, PoolCall::Fund { amount })
    }

    pub fn close_staking(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Close)
    }

    pub fn complete_staking(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Complete)
    }

    pub fn restart_staking(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Restart)
    }

    pub fn terminate_contract(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Terminate)
    }

    /// Award `amount` (or the whole free balance when `None`) to `recipient`
    pub fn award_staked_balance(
        &self,
        caller: &Address,
        recipient: &Address,
        amount: Option<Amount>,
    ) -> StakerResult<()> {
        self.execute(caller, PoolCall::Award { recipient: *recipient, amount })
    }

    pub fn redeem_staked_amount(&self, caller: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::Redeem)
    }

    pub fn transfer_administrator(&self, caller: &Address, new_admin: &Address) -> StakerResult<()> {
        self.execute(caller, PoolCall::TransferAdministrator { new_admin: *new_admin })
    }

    // ============ Reads ============

    pub fn pool_address(&self) -> Address {
        self.pool_address
    }

    pub fn status(&self) -> StakingStatus {
        self.committed().status()
    }

    pub fn administrator(&self) -> Address {
        self.committed().administrator()
    }

    pub fn total_staked_amount(&self) -> Amount {
        self.committed().total_staked()
    }

    pub fn user_staked_amount(&self, participant: &Address) -> Amount {
        self.committed().stake_of(participant)
    }

    pub fn number_of_stakers(&self) -> u64 {
        self.committed().participant_count()
    }

    pub fn vault_balance(&self) -> Amount {
        self.committed().vault_balance()
    }

    pub fn free_balance(&self) -> StakerResult<Amount> {
        self.committed().free_balance()
    }

    pub fn past_receivers(&self) -> Vec<ReceiptEntry> {
        self.committed().receipts().entries().to_vec()
    }

    pub fn last_receiver(&self) -> StakerResult<ReceiptEntry> {
        self.committed().receipts().last().copied()
    }

    /// Reward tokens `amount` would earn at the configured rate
    pub fn token_num_to_award(&self, amount: Amount) -> StakerResult<Amount> {
        tokens_to_award(amount, self.committed().config().reward_rate)
    }

    pub fn view(&self) -> PoolView {
        self.committed().view()
    }

    /// Reward balance of `holder` on the reward token
    pub fn token_balance_of(&self, holder: &Address) -> StakerResult<Amount> {
        Ok(self.read_token()?.balance_of(holder))
    }

    /// Read access to the reward token
    pub fn with_token<R>(&self, f: impl FnOnce(&T) -> R) -> StakerResult<R> {
        Ok(f(&*self.read_token()?))
    }

    /// Read access to the payout sink. Fails with `Reentrancy` from inside
    /// the sink's own payout.
    pub fn with_sink<R>(&self, f: impl FnOnce(&P) -> R) -> StakerResult<R> {
        self.ensure_not_holding(Held::Sink)?;
        Ok(f(&*self.lock_sink()?))
    }

    /// Hand every buffered event to the caller, oldest first.
    ///
    /// The buffer keeps the latest `MAX_BUFFERED_EVENTS`; callers that care
    /// about every event drain it regularly.
    pub fn drain_events(&self) -> StakerResult<Vec<StakerEvent>> {
        let mut core = self.lock_core()?;
        Ok(core.events.drain())
    }

    /// Persist the committed ledger
    pub fn snapshot(&self) -> StakerResult<Vec<u8>> {
        persistence::encode(&self.committed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staker_common::constants::{native, reward};
    use staker_reward_token::RewardTokenState;

    use crate::vault::InMemoryWallets;

    fn pool_id() -> Address {
        [0xAAu8; 32]
    }

    fn admin() -> Address {
        [1u8; 32]
    }

    fn alice() -> Address {
        [2u8; 32]
    }

    fn new_pool() -> StakingPool<RewardTokenState, InMemoryWallets> {
        StakingPool::new(
            pool_id(),
            admin(),
            PoolConfig::default(),
            RewardTokenState::new(pool_id()).unwrap(),
            InMemoryWallets::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_token_ownership() {
        let result = StakingPool::new(
            pool_id(),
            admin(),
            PoolConfig::default(),
            RewardTokenState::new(admin()).unwrap(),
            InMemoryWallets::new(),
        );
        assert!(matches!(result, Err(StakerError::InvalidConfig { param: "token", .. })));
    }

    #[test]
    fn test_complete_mints_rewards() {
        let pool = new_pool();
        pool.stake(&alice(), native::ONE).unwrap();
        pool.complete_staking(&admin()).unwrap();

        assert_eq!(pool.status(), StakingStatus::Completed);
        assert_eq!(pool.token_balance_of(&alice()).unwrap(), 1_000 * reward::ONE);
        assert_eq!(pool.user_staked_amount(&alice()), 0);
    }

    #[test]
    fn test_rejected_call_records_nothing() {
        let pool = new_pool();
        assert_eq!(pool.withdraw(&alice()), Err(StakerError::StakingNotClosed));
        assert!(pool.drain_events().unwrap().is_empty());
    }

    #[test]
    fn test_withdraw_pays_out() {
        let pool = new_pool();
        pool.stake(&alice(), 42).unwrap();
        pool.close_staking(&admin()).unwrap();
        pool.withdraw(&alice()).unwrap();

        assert_eq!(pool.with_sink(|s| s.balance_of(&alice())).unwrap(), 42);
        assert_eq!(pool.vault_balance(), 0);
        assert_eq!(pool.drain_events().unwrap().len(), 3);
    }
}
