// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! UnixFS DAG construction.
//!
//! Files are cut into fixed-size raw leaves (CIDv1, `raw`, sha2-256) which
//! are linked into balanced trees of dag-pb file nodes. A synthetic directory
//! node wraps the file roots and becomes the archive root.
//! See <https://github.com/ipfs/specs/blob/main/UNIXFS.md>.

mod builder;
mod chunker;
pub mod pb;

pub use builder::{DagBuilder, DagLink};
pub use chunker::Chunker;

use crate::utils::multihash::prelude::*;
use cid::Cid;
use fvm_ipld_encoding::IPLD_RAW;

/// Multicodec of dag-pb (protobuf) nodes.
pub const DAG_PB: u64 = 0x70;

/// CID of a raw leaf holding `chunk`.
pub fn raw_leaf_cid(chunk: &[u8]) -> Cid {
    Cid::new_v1(IPLD_RAW, MultihashCode::Sha2_256.digest(chunk))
}
