// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! CARv1 serialization.
//!
//! An archive is a varint-framed DAG-CBOR header `{roots, version}` followed
//! by one varint-framed record per block, each record being the CID bytes
//! immediately followed by the block payload.
//! See <https://ipld.io/specs/transport/car/carv1/>.

mod writer;

pub use writer::CarWriter;

use crate::blockstore::OrderedBlockstore;
use crate::utils::multihash::prelude::*;
use cid::Cid;
use futures::StreamExt as _;
use integer_encoding::VarInt as _;
use nunny::Vec as NonEmpty;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::AsyncWrite;

/// DAG-CBOR map opening every archive.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarV1Header {
    /// Never empty. This crate always writes exactly one root.
    pub roots: NonEmpty<Cid>,
    pub version: u64,
}

/// A block as stored in an archive record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CarBlock {
    pub cid: Cid,
    pub data: Vec<u8>,
}

impl CarBlock {
    /// Appends the record `varint(len) | cid | data` to `writer`.
    pub fn write(&self, writer: &mut impl io::Write) -> io::Result<()> {
        let cid = self.cid.to_bytes();
        writer.write_all(&(cid.len() + self.data.len()).encode_var_vec())?;
        writer.write_all(&cid)?;
        writer.write_all(&self.data)
    }

    /// Splits a record body, its length prefix already stripped, into CID and
    /// payload.
    pub fn from_bytes(record: &[u8]) -> io::Result<CarBlock> {
        let mut payload = record;
        let cid = Cid::read_bytes(&mut payload)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(CarBlock {
            cid,
            data: payload.to_vec(),
        })
    }

    /// Fails unless hashing the payload with the CID's hash function yields
    /// the CID's digest.
    pub fn validate(&self) -> anyhow::Result<()> {
        let code = MultihashCode::try_from(self.cid.hash().code())?;
        anyhow::ensure!(
            *self.cid.hash() == code.digest(&self.data),
            "payload of block {} does not match its hash",
            self.cid
        );
        Ok(())
    }
}

/// Streams every block of `store` into `writer` as a CARv1 archive rooted at
/// `root`. Blocks are written in store insertion order.
///
/// Fails without writing anything if `root` is not in the store.
#[tracing::instrument(skip_all, fields(%root))]
pub async fn encode_car<W: AsyncWrite + Unpin>(
    root: Cid,
    store: &impl OrderedBlockstore,
    writer: W,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        store.has(&root)?,
        "archive root {root} is missing from the block store"
    );
    futures::stream::iter(store.iter_blocks())
        .map(io::Result::Ok)
        .forward(CarWriter::new_carv1(nunny::vec![root], writer)?)
        .await?;
    tracing::debug!(blocks = store.len(), "encoded archive");
    Ok(())
}

/// Same as [`encode_car`], collecting the archive into memory.
pub async fn encode_car_to_vec(root: Cid, store: &impl OrderedBlockstore) -> anyhow::Result<Vec<u8>> {
    let mut car = Vec::new();
    encode_car(root, store, &mut car).await?;
    Ok(car)
}
