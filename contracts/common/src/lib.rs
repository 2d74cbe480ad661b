//! Staker Common Library
//!
//! Shared types, constants, and utilities for the staking pool and its
//! reward token.
//!
//! ## Contents
//!
//! - **Types**: identities, amounts, lifecycle status, calls and read views
//! - **Errors**: the single error taxonomy surfaced to callers
//! - **Events**: indexable records of committed operations
//! - **Access Control**: single-administrator ownership
//! - **Interfaces**: reward token and payout collaborators

pub mod access_control;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod math;
pub mod types;

// Re-exports for convenience
pub use access_control::AccessGuard;
pub use config::PoolConfig;
pub use constants::*;
pub use errors::*;
pub use events::*;
pub use interfaces::*;
pub use math::*;
pub use types::*;
