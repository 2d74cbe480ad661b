//! Call envelopes
//!
//! Clients submit calls as CBOR-encoded [`CallEnvelope`]s. The caller
//! identity travels with the call; authenticating it is the transport's job.

use serde::{Deserialize, Serialize};

use staker_common::{
    errors::{StakerError, StakerResult},
    types::{Address, PoolCall},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub caller: Address,
    pub call: PoolCall,
}

impl CallEnvelope {
    pub fn new(caller: Address, call: PoolCall) -> Self {
        Self { caller, call }
    }
}

pub fn encode(envelope: &CallEnvelope) -> StakerResult<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::into_writer(envelope, &mut out).map_err(|_| StakerError::InvalidEncoding)?;
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> StakerResult<CallEnvelope> {
    ciborium::from_reader(bytes).map_err(|_| StakerError::InvalidEncoding)
}
