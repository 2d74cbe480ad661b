//! Access Control Module
//!
//! Single-administrator ownership for the pool. The administrator is the
//! only identity allowed to drive lifecycle transitions and move vault
//! funds; the role can be handed to another non-zero identity.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::errors::{StakerError, StakerResult};
use crate::types::{Address, ZERO_ADDRESS};

/// Holder of the administrator role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccessGuard {
    administrator: Address,
}

impl AccessGuard {
    /// Create a guard owned by `administrator`
    pub fn new(administrator: Address) -> StakerResult<Self> {
        if administrator == ZERO_ADDRESS {
            return Err(StakerError::InvalidAddress {
                reason: "administrator cannot be the zero address",
            });
        }
        Ok(Self { administrator })
    }

    pub fn administrator(&self) -> Address {
        self.administrator
    }

    pub fn is_admin(&self, caller: &Address) -> bool {
        self.administrator == *caller
    }

    /// Fail with `NonOwnerCall` unless `caller` is the administrator
    pub fn ensure_admin(&self, caller: &Address) -> StakerResult<()> {
        if !self.is_admin(caller) {
            return Err(StakerError::NonOwnerCall { caller: *caller });
        }
        Ok(())
    }

    /// Hand the role to `new_admin`. Returns the previous administrator.
    pub fn transfer(&mut self, caller: &Address, new_admin: Address) -> StakerResult<Address> {
        self.ensure_admin(caller)?;
        if new_admin == ZERO_ADDRESS {
            return Err(StakerError::InvalidAddress {
                reason: "new administrator cannot be the zero address",
            });
        }
        let previous = self.administrator;
        self.administrator = new_admin;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        [1u8; 32]
    }

    fn stranger() -> Address {
        [2u8; 32]
    }

    #[test]
    fn test_new_rejects_zero() {
        assert!(matches!(
            AccessGuard::new(ZERO_ADDRESS),
            Err(StakerError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_ensure_admin() {
        let guard = AccessGuard::new(admin()).unwrap();
        assert!(guard.ensure_admin(&admin()).is_ok());
        assert_eq!(
            guard.ensure_admin(&stranger()),
            Err(StakerError::NonOwnerCall { caller: stranger() })
        );
    }

    #[test]
    fn test_transfer() {
        let mut guard = AccessGuard::new(admin()).unwrap();

        assert!(matches!(
            guard.transfer(&stranger(), stranger()),
            Err(StakerError::NonOwnerCall { .. })
        ));
        assert!(matches!(
            guard.transfer(&admin(), ZERO_ADDRESS),
            Err(StakerError::InvalidAddress { .. })
        ));
        assert_eq!(guard.administrator(), admin());

        let previous = guard.transfer(&admin(), stranger()).unwrap();
        assert_eq!(previous, admin());
        assert!(guard.is_admin(&stranger()));
        assert!(!guard.is_admin(&admin()));
    }
}
