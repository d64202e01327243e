// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Block storage handed from DAG construction to archive encoding.
//!
//! A store is addressed by [`Cid`](cid::Cid) only and remembers the order in
//! which blocks were first inserted. That order is the order in which the CAR
//! encoder emits them.

mod memory;

pub use fvm_ipld_blockstore::Blockstore;
pub use memory::MemoryBlockstore;

use crate::car::CarBlock;

/// A [`Blockstore`] that can replay its contents in insertion order.
///
/// Implementations must treat [`Blockstore::put_keyed`] as write-once: putting
/// a CID that is already present keeps the first payload.
pub trait OrderedBlockstore: Blockstore {
    /// Number of distinct blocks held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block inserted at position `index`, if any.
    fn block_at(&self, index: usize) -> Option<CarBlock>;

    /// Iterates over all blocks in insertion order. Every call starts from the
    /// first block again.
    fn iter_blocks(&self) -> Blocks<'_, Self>
    where
        Self: Sized,
    {
        Blocks {
            store: self,
            index: 0,
        }
    }
}

/// Iterator returned by [`OrderedBlockstore::iter_blocks`].
pub struct Blocks<'a, BS> {
    store: &'a BS,
    index: usize,
}

impl<BS: OrderedBlockstore> Iterator for Blocks<'_, BS> {
    type Item = CarBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.store.block_at(self.index)?;
        self.index += 1;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}
