// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Piece commitment (CommP) of an arbitrary byte payload.
//!
//! The payload is Fr32 padded, split into 32-byte leaves and reduced with a
//! `sha2-256-trunc254` binary Merkle tree sized to the smallest power-of-two
//! piece that holds it. The 32-byte root is published as a
//! `fil-commitment-unsealed` CID.

pub mod fr32;
mod piece;
pub mod tree;

pub use piece::{PaddedPieceSize, UnpaddedPieceSize};

use cid::Cid;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::utils::commcid::{self, Commitment};

/// Smallest piece, a single Fr32 group.
pub const MIN_PIECE_SIZE: u64 = fr32::PADDED_CHUNK as u64;
/// Largest piece, matching the largest sector size.
pub const MAX_PIECE_SIZE: u64 = 64 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceCommitment {
    pub piece_cid: Cid,
    pub piece_size: PaddedPieceSize,
    /// Length of the committed payload before padding.
    pub payload_size: u64,
}

impl PieceCommitment {
    /// The raw Merkle root.
    pub fn commitment(&self) -> anyhow::Result<Commitment> {
        commcid::cid_to_piece_commitment_v1(&self.piece_cid)
    }
}

/// Size of the piece holding `payload_len` bytes.
pub fn piece_size_for(payload_len: u64) -> Result<PaddedPieceSize, Error> {
    if payload_len > PaddedPieceSize(MAX_PIECE_SIZE).unpadded().0 {
        return Err(Error::Commitment(format!(
            "payload of {payload_len} bytes exceeds the maximum piece size of {MAX_PIECE_SIZE} bytes"
        )));
    }
    let padded = fr32::padded_len(payload_len).max(MIN_PIECE_SIZE);
    Ok(PaddedPieceSize(padded.next_power_of_two()))
}

/// Computes the piece commitment of `payload`.
///
/// CPU bound; call from a blocking context.
#[tracing::instrument(skip_all, fields(len = payload.len()))]
pub fn compute_piece_commitment(payload: &[u8]) -> Result<PieceCommitment, Error> {
    let payload_size = payload.len() as u64;
    // checked before padding allocates anything
    let piece_size = piece_size_for(payload_size)?;
    let depth = (piece_size.0 / tree::NODE_SIZE as u64).trailing_zeros() as usize;

    let padded = fr32::pad(payload);
    let comm_p = tree::root(&padded, depth).map_err(|e| Error::Commitment(e.to_string()))?;
    let piece_cid =
        commcid::piece_commitment_v1_to_cid(&comm_p).map_err(|e| Error::Commitment(e.to_string()))?;

    tracing::debug!(%piece_cid, piece_size = piece_size.0, "computed piece commitment");
    Ok(PieceCommitment {
        piece_cid,
        piece_size,
        payload_size,
    })
}
