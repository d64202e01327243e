// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::chunker::Chunker;
use super::pb::{self, Data, PBLink, PBNode};
use super::{DAG_PB, raw_leaf_cid};
use crate::blockstore::OrderedBlockstore;
use crate::utils::multihash::prelude::*;
use crate::{BuildOptions, Error};
use cid::Cid;
use itertools::Itertools as _;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use tokio::io::AsyncRead;
use tracing::debug;

/// A node already written to the block store, as seen from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DagLink {
    pub cid: Cid,
    /// Serialized size of the node plus the sizes of everything below it.
    pub tsize: u64,
    /// Number of file content bytes under the node.
    pub file_size: u64,
}

/// Builds balanced UnixFS DAGs into a block store.
///
/// Nodes are created bottom-up, so a node is only ever written after all of
/// its children.
pub struct DagBuilder<'a, BS> {
    store: &'a BS,
    options: &'a BuildOptions,
    chunk_size: NonZeroUsize,
}

impl<'a, BS: OrderedBlockstore> DagBuilder<'a, BS> {
    /// Fails with [`Error::Input`] when `options` do not pass
    /// [`BuildOptions::validate`].
    pub fn new(store: &'a BS, options: &'a BuildOptions) -> Result<Self, Error> {
        options.validate()?;
        let chunk_size = NonZeroUsize::new(options.chunk_size)
            .ok_or_else(|| Error::Input("chunk size must not be zero".into()))?;
        Ok(Self {
            store,
            options,
            chunk_size,
        })
    }

    /// Chunks `reader` into raw leaves and links them into a balanced tree of
    /// file nodes. Returns the file root.
    #[tracing::instrument(skip(self, reader))]
    pub async fn add_file<R: AsyncRead + Unpin>(&self, name: &str, reader: R) -> Result<DagLink, Error> {
        let fan_out = self.options.max_children_per_node;
        let batch_size = self.options.hash_concurrency();
        let mut chunker = Chunker::new(reader, self.chunk_size);

        let mut leaf_count = 0usize;
        let mut pending: Vec<DagLink> = Vec::with_capacity(fan_out);
        let mut parents: Vec<DagLink> = Vec::new();
        loop {
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                match chunker
                    .next_chunk()
                    .await
                    .map_err(|e| Error::stream(name, e))?
                {
                    Some(chunk) => batch.push(chunk),
                    None => break,
                }
            }
            if batch.is_empty() {
                break;
            }
            for (cid, chunk) in hash_leaves(batch).await? {
                self.store.put_keyed(&cid, &chunk)?;
                let len = chunk.len() as u64;
                pending.push(DagLink {
                    cid,
                    tsize: len,
                    file_size: len,
                });
                leaf_count += 1;
                if pending.len() == fan_out {
                    parents.push(self.put_file_node(&pending)?);
                    pending.clear();
                }
            }
        }

        if leaf_count == 1
            && self.options.raw_leaves
            && let [leaf] = pending.as_slice()
        {
            debug!(cid = %leaf.cid, "single chunk file");
            return Ok(*leaf);
        }
        if !pending.is_empty() {
            parents.push(self.put_file_node(&pending)?);
        }
        while parents.len() > 1 {
            parents = parents
                .chunks(fan_out)
                .map(|children| self.put_file_node(children))
                .collect::<anyhow::Result<_>>()?;
        }
        let root = parents
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no leaves were produced for {name}"))?;
        debug!(cid = %root.cid, leaves = leaf_count, size = root.file_size, "built file");
        Ok(root)
    }

    /// Writes a directory node linking `entries` under their names and returns
    /// it. The directory CID is the archive root.
    pub fn wrap_directory<'n>(
        &self,
        entries: impl IntoIterator<Item = (&'n str, DagLink)>,
    ) -> anyhow::Result<DagLink> {
        let mut entries = entries.into_iter().collect_vec();
        if self.options.sort_directory_entries {
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
        }
        let node = PBNode {
            links: entries
                .iter()
                .map(|(name, link)| PBLink::new(&link.cid, *name, link.tsize))
                .collect(),
            data: Some(pb::encode(&Data::directory())?),
        };
        let file_size = entries.iter().map(|(_, link)| link.file_size).sum();
        let dir = self.put_node(&node, entries.iter().map(|(_, link)| link), file_size)?;
        debug!(cid = %dir.cid, entries = entries.len(), "wrapped directory");
        Ok(dir)
    }

    fn put_file_node(&self, children: &[DagLink]) -> anyhow::Result<DagLink> {
        let data = Data::file(children.iter().map(|c| c.file_size).collect());
        let file_size = data.filesize.unwrap_or_default();
        let node = PBNode {
            links: children
                .iter()
                .map(|c| PBLink::new(&c.cid, "", c.tsize))
                .collect(),
            data: Some(pb::encode(&data)?),
        };
        self.put_node(&node, children, file_size)
    }

    fn put_node<'l>(
        &self,
        node: &PBNode,
        children: impl IntoIterator<Item = &'l DagLink>,
        file_size: u64,
    ) -> anyhow::Result<DagLink> {
        let bytes = pb::encode(node)?;
        let cid = Cid::new_v1(DAG_PB, MultihashCode::Sha2_256.digest(&bytes));
        self.store.put_keyed(&cid, &bytes)?;
        Ok(DagLink {
            cid,
            tsize: bytes.len() as u64 + children.into_iter().map(|c| c.tsize).sum::<u64>(),
            file_size,
        })
    }
}

/// Hashes a batch of leaves on the blocking pool. Output order matches input
/// order.
async fn hash_leaves(chunks: Vec<Vec<u8>>) -> anyhow::Result<Vec<(Cid, Vec<u8>)>> {
    if chunks.len() == 1 {
        return Ok(chunks
            .into_iter()
            .map(|chunk| (raw_leaf_cid(&chunk), chunk))
            .collect());
    }
    Ok(tokio::task::spawn_blocking(move || {
        chunks
            .into_par_iter()
            .map(|chunk| (raw_leaf_cid(&chunk), chunk))
            .collect()
    })
    .await?)
}
