//! Staking Pool
//!
//! Participants lock native value into a shared pool. The administrator
//! either closes the pool (participants withdraw their stake) or completes
//! it once the threshold is met (participants receive reward tokens at a
//! fixed rate and the stake ledger is emptied). Free vault funds can be
//! awarded to arbitrary recipients and every such transfer is recorded.
//!
//! ## Layout
//!
//! - [`ledger`]: the pool aggregate and its invariants
//! - [`lifecycle`]: OPEN / CLOSED / COMPLETED / AWARDED transitions
//! - [`rewards`]: completion credit batch
//! - [`receipts`]: custody transfer log
//! - [`vault`]: stake, withdraw, fund, award and redeem bookkeeping
//! - [`engine`]: pure transition chokepoint
//! - [`service`]: locked, transactional front door
//! - [`persistence`], [`wire`]: snapshot and call envelope codecs

pub mod engine;
pub mod ledger;
pub mod lifecycle;
pub mod persistence;
pub mod receipts;
pub mod rewards;
pub mod service;
pub mod vault;
pub mod wire;


pub use engine::{Effect, Transition};
pub use ledger::PoolLedger;
pub use receipts::CustodyLog;
pub use service::StakingPool;
pub use vault::InMemoryWallets;
pub use wire::CallEnvelope;
