// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Readers used to check archives from the outside.

use std::collections::HashMap;

use anyhow::Context as _;
use cid::Cid;
use futures::StreamExt as _;
use fvm_ipld_encoding::IPLD_RAW;
use tokio_util::codec::FramedRead;
use unsigned_varint::codec::UviBytes;

use crate::blockstore::OrderedBlockstore;
use crate::car::{CarBlock, CarV1Header};
use crate::unixfs::DAG_PB;
use crate::unixfs::pb::{self, Data, DataType, PBNode};

/// Splits a CARv1 archive into its header and validated blocks.
pub async fn read_car(car: &[u8]) -> anyhow::Result<(CarV1Header, Vec<CarBlock>)> {
    let mut reader = FramedRead::new(car, UviBytes::<bytes::Bytes>::default());
    let frame = reader.next().await.context("missing header frame")??;
    let header: CarV1Header = fvm_ipld_encoding::from_slice(&frame)?;
    anyhow::ensure!(header.version == 1, "unexpected CAR version {}", header.version);

    let mut blocks = vec![];
    while let Some(frame) = reader.next().await.transpose()? {
        let block = CarBlock::from_bytes(&frame)?;
        block.validate()?;
        blocks.push(block);
    }
    Ok((header, blocks))
}

pub fn store_map(store: &impl OrderedBlockstore) -> HashMap<Cid, Vec<u8>> {
    store.iter_blocks().map(|b| (b.cid, b.data)).collect()
}

pub fn block_map(blocks: &[CarBlock]) -> HashMap<Cid, Vec<u8>> {
    blocks.iter().map(|b| (b.cid, b.data.clone())).collect()
}

/// Reassembles the content of the file rooted at `root`.
pub fn read_unixfs_file(blocks: &HashMap<Cid, Vec<u8>>, root: &Cid) -> anyhow::Result<Vec<u8>> {
    let bytes = blocks
        .get(root)
        .with_context(|| format!("block {root} not found"))?;
    match root.codec() {
        IPLD_RAW => Ok(bytes.clone()),
        DAG_PB => {
            let node: PBNode = pb::decode(bytes)?;
            let data: Data = pb::decode(node.data.as_deref().context("file node without data")?)?;
            anyhow::ensure!(data.r#type == DataType::File, "{root} is not a file");
            if node.links.is_empty() {
                return Ok(data.data.unwrap_or_default());
            }
            anyhow::ensure!(data.blocksizes.len() == node.links.len());
            let mut content = vec![];
            for (link, size) in node.links.iter().zip(&data.blocksizes) {
                let child = read_unixfs_file(blocks, &link.cid()?)?;
                anyhow::ensure!(child.len() as u64 == *size, "blocksize mismatch under {root}");
                content.extend(child);
            }
            Ok(content)
        }
        codec => anyhow::bail!("unexpected codec {codec:#x}"),
    }
}

/// Named links of the directory node `dir`, in serialized order.
pub fn directory_entries(blocks: &HashMap<Cid, Vec<u8>>, dir: &Cid) -> anyhow::Result<Vec<(String, Cid)>> {
    let bytes = blocks
        .get(dir)
        .with_context(|| format!("block {dir} not found"))?;
    let node: PBNode = pb::decode(bytes)?;
    let data: Data = pb::decode(node.data.as_deref().context("directory without data")?)?;
    anyhow::ensure!(data.r#type == DataType::Directory, "{dir} is not a directory");
    node.links
        .iter()
        .map(|link| Ok((link.name.clone().unwrap_or_default(), link.cid()?)))
        .collect()
}
