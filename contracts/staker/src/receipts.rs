//! Custody Transfer Log
//!
//! Append-only record of every award paid out of the vault. Entries are
//! never mutated or removed and the log survives restarts.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use staker_common::{
    errors::{StakerError, StakerResult},
    types::ReceiptEntry,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CustodyLog {
    entries: Vec<ReceiptEntry>,
}

impl CustodyLog {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an entry. Returns its position in the log.
    pub(crate) fn append(&mut self, entry: ReceiptEntry) -> u64 {
        self.entries.push(entry);
        (self.entries.len() - 1) as u64
    }

    /// Full history, oldest first
    pub fn entries(&self) -> &[ReceiptEntry] {
        &self.entries
    }

    /// Most recent entry
    pub fn last(&self) -> StakerResult<&ReceiptEntry> {
        self.entries.last().ok_or(StakerError::NoReceipts)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
