//! Ledger snapshots
//!
//! Layout: `MAGIC (4) | VERSION (1) | borsh(PoolLedger) | sha256 (32)`.
//! The digest covers everything before it. Decoding verifies the digest,
//! then the ledger's own invariants.

use sha2::{Digest, Sha256};

use staker_common::{
    constants::snapshot::{MAGIC, VERSION},
    errors::{StakerError, StakerResult},
};

use crate::ledger::PoolLedger;

const HEADER_LEN: usize = MAGIC.len() + 1;
const DIGEST_LEN: usize = 32;

fn digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

/// Seal a ledger into snapshot bytes
pub fn encode(ledger: &PoolLedger) -> StakerResult<Vec<u8>> {
    let body = borsh::to_vec(ledger).map_err(|_| StakerError::SnapshotCorrupted {
        reason: "ledger failed to serialize",
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len() + DIGEST_LEN);
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&body);
    let seal = digest(&out);
    out.extend_from_slice(&seal);
    Ok(out)
}

/// Open snapshot bytes, rejecting anything tampered or inconsistent
pub fn decode(bytes: &[u8]) -> StakerResult<PoolLedger> {
    if bytes.len() < HEADER_LEN + DIGEST_LEN {
        return Err(StakerError::SnapshotCorrupted { reason: "truncated" });
    }
    if bytes[..MAGIC.len()] != MAGIC {
        return Err(StakerError::SnapshotCorrupted { reason: "bad magic" });
    }
    if bytes[MAGIC.len()] != VERSION {
        return Err(StakerError::SnapshotCorrupted { reason: "unsupported version" });
    }

    let (sealed, seal) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if digest(sealed)[..] != *seal {
        return Err(StakerError::SnapshotCorrupted { reason: "digest mismatch" });
    }

    let ledger: PoolLedger = borsh::from_slice(&sealed[HEADER_LEN..])
        .map_err(|_| StakerError::SnapshotCorrupted { reason: "malformed ledger" })?;
    ledger.config().validate()?;
    ledger.check_invariants()?;
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use staker_common::{types::StakingStatus, PoolConfig};

    use crate::vault;

    fn sample() -> PoolLedger {
        let mut ledger = PoolLedger::new([1u8; 32], PoolConfig::default()).unwrap();
        vault::stake(&mut ledger, &[2u8; 32], 7).unwrap();
        vault::fund(&mut ledger, 3).unwrap();
        vault::award(&mut ledger, &[3u8; 32], Some(2)).unwrap();
        ledger
    }

    #[test]
    fn test_snapshot_restores_ledger() {
        let ledger = sample();
        let bytes = encode(&ledger).unwrap();
        assert_eq!(&bytes[..4], b"STKR");

        let restored = decode(&bytes).unwrap();
        assert_eq!(restored, ledger);
        assert_eq!(restored.status(), StakingStatus::Open);
        assert_eq!(restored.receipts().len(), 1);
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let mut bytes = encode(&sample()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        assert_eq!(
            decode(&bytes),
            Err(StakerError::SnapshotCorrupted { reason: "digest mismatch" })
        );
    }

    #[test]
    fn test_bad_header_rejected() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[4] = VERSION + 1;
        assert!(matches!(decode(&bytes), Err(StakerError::SnapshotCorrupted { .. })));

        assert_eq!(
            decode(b"STKR"),
            Err(StakerError::SnapshotCorrupted { reason: "truncated" })
        );
        assert_eq!(
            decode(&[0u8; 64]),
            Err(StakerError::SnapshotCorrupted { reason: "bad magic" })
        );
    }

    #[test]
    fn test_inconsistent_ledger_rejected() {
        let mut ledger = sample();
        ledger.total_staked += 1;
        let bytes = encode(&ledger).unwrap();
        assert!(matches!(decode(&bytes), Err(StakerError::InvariantViolated(_))));
    }
}
