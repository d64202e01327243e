// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::OrderedBlockstore;
use crate::car::CarBlock;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// In-memory store living for a single build.
#[derive(Debug, Default)]
pub struct MemoryBlockstore {
    blocks: RwLock<IndexMap<Cid, Vec<u8>, ahash::RandomState>>,
}

impl MemoryBlockstore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Blockstore for MemoryBlockstore {
    fn get(&self, k: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.blocks.read().get(k).cloned())
    }

    fn put_keyed(&self, k: &Cid, block: &[u8]) -> anyhow::Result<()> {
        // Same CID means same bytes, the first writer wins.
        self.blocks
            .write()
            .entry(*k)
            .or_insert_with(|| block.to_vec());
        Ok(())
    }

    fn has(&self, k: &Cid) -> anyhow::Result<bool> {
        Ok(self.blocks.read().contains_key(k))
    }
}

impl OrderedBlockstore for MemoryBlockstore {
    fn len(&self) -> usize {
        self.blocks.read().len()
    }

    fn block_at(&self, index: usize) -> Option<CarBlock> {
        self.blocks
            .read()
            .get_index(index)
            .map(|(cid, data)| CarBlock {
                cid: *cid,
                data: data.clone(),
            })
    }
}
