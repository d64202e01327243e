// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::ensure;
use cid::{Cid, multihash::Multihash};

use super::multihash::SHA2_256_TRUNC254_PADDED;

/// Multicodec of an unsealed (piece or data) commitment.
pub const FIL_COMMITMENT_UNSEALED: u64 = 0xf101;

/// Raw 32-byte Merkle root.
pub type Commitment = [u8; 32];

/// Wraps a piece commitment into a CID with codec `fil-commitment-unsealed`
/// and hash `sha2-256-trunc254-padded`.
pub fn piece_commitment_v1_to_cid(comm_p: &Commitment) -> anyhow::Result<Cid> {
    let mh = Multihash::wrap(SHA2_256_TRUNC254_PADDED, comm_p)?;
    Ok(Cid::new_v1(FIL_COMMITMENT_UNSEALED, mh))
}

/// Extracts the raw piece commitment from a CID after checking that the codec
/// and hash function are the ones used for unsealed commitments.
pub fn cid_to_piece_commitment_v1(c: &Cid) -> anyhow::Result<Commitment> {
    ensure!(
        c.codec() == FIL_COMMITMENT_UNSEALED,
        "piece commitment codec must be fil-commitment-unsealed, got {:#x}",
        c.codec()
    );
    ensure!(
        c.hash().code() == SHA2_256_TRUNC254_PADDED,
        "incorrect hash function for unsealed commitment: {:#x}",
        c.hash().code()
    );
    let digest = c.hash().digest();
    ensure!(digest.len() == 32, "commitments must be 32 bytes long");
    let mut comm = Commitment::default();
    comm.copy_from_slice(digest);
    Ok(comm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::multihash::prelude::*;

    #[test]
    fn commitment_roundtrip() {
        let comm: Commitment = std::array::from_fn(|i| i as u8);
        let cid = piece_commitment_v1_to_cid(&comm).unwrap();
        assert_eq!(cid.codec(), FIL_COMMITMENT_UNSEALED);
        assert_eq!(cid_to_piece_commitment_v1(&cid).unwrap(), comm);
    }

    #[test]
    fn rejects_other_codecs() {
        let raw = Cid::new_v1(
            fvm_ipld_encoding::IPLD_RAW,
            MultihashCode::Sha2_256.digest(b"not a commitment"),
        );
        assert!(cid_to_piece_commitment_v1(&raw).is_err());

        let wrong_hash = Cid::new_v1(
            FIL_COMMITMENT_UNSEALED,
            MultihashCode::Sha2_256.digest(b"not a commitment"),
        );
        assert!(cid_to_piece_commitment_v1(&wrong_hash).is_err());
    }
}
