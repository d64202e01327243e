// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Protobuf messages of the dag-pb codec and of the UnixFS `Data` payload.
//!
//! ```protobuf
//! message PBLink { optional bytes Hash = 1; optional string Name = 2; optional uint64 Tsize = 3; }
//! message PBNode { repeated PBLink Links = 2; optional bytes Data = 1; }
//! message Data {
//!   required DataType Type = 1; optional bytes Data = 2; optional uint64 filesize = 3;
//!   repeated uint64 blocksizes = 4; ...
//! }
//! ```
//!
//! dag-pb fixes the byte layout of a node: links come first, then data, even
//! though `Data` has the lower field number. See
//! <https://ipld.io/specs/codecs/dag-pb/spec/#serialization>.

use cid::Cid;
use quick_protobuf::sizeofs::{sizeof_len, sizeof_varint};
use quick_protobuf::{MessageWrite, Writer, WriterBackend};

// (field number << 3) | wire type
const TAG_NODE_DATA: u32 = 10;
const TAG_NODE_LINKS: u32 = 18;
const TAG_LINK_HASH: u32 = 10;
const TAG_LINK_NAME: u32 = 18;
const TAG_LINK_TSIZE: u32 = 24;
const TAG_DATA_TYPE: u32 = 8;
const TAG_DATA_DATA: u32 = 18;
const TAG_DATA_FILESIZE: u32 = 24;
const TAG_DATA_BLOCKSIZES: u32 = 32;

/// UnixFS node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    Raw = 0,
    Directory = 1,
    #[default]
    File = 2,
    Metadata = 3,
    Symlink = 4,
    HamtShard = 5,
}

impl TryFrom<u64> for DataType {
    type Error = quick_protobuf::Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Raw,
            1 => Self::Directory,
            2 => Self::File,
            3 => Self::Metadata,
            4 => Self::Symlink,
            5 => Self::HamtShard,
            _ => return Err(quick_protobuf::Error::Message(format!("unknown UnixFS type {value}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PBLink {
    pub hash: Option<Vec<u8>>,
    pub name: Option<String>,
    pub tsize: Option<u64>,
}

impl PBLink {
    pub fn new(cid: &Cid, name: impl Into<String>, tsize: u64) -> Self {
        Self {
            hash: Some(cid.to_bytes()),
            name: Some(name.into()),
            tsize: Some(tsize),
        }
    }

    /// Target of the link.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        let hash = self
            .hash
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("dag-pb link without hash"))?;
        Ok(Cid::try_from(hash)?)
    }
}

impl MessageWrite for PBLink {
    fn get_size(&self) -> usize {
        self.hash.as_ref().map_or(0, |h| 1 + sizeof_len(h.len()))
            + self.name.as_ref().map_or(0, |n| 1 + sizeof_len(n.len()))
            + self.tsize.map_or(0, |t| 1 + sizeof_varint(t))
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> quick_protobuf::Result<()> {
        if let Some(hash) = &self.hash {
            w.write_with_tag(TAG_LINK_HASH, |w| w.write_bytes(hash))?;
        }
        if let Some(name) = &self.name {
            w.write_with_tag(TAG_LINK_NAME, |w| w.write_string(name))?;
        }
        if let Some(tsize) = self.tsize {
            w.write_with_tag(TAG_LINK_TSIZE, |w| w.write_uint64(tsize))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PBNode {
    pub links: Vec<PBLink>,
    pub data: Option<Vec<u8>>,
}

impl MessageWrite for PBNode {
    fn get_size(&self) -> usize {
        self.links
            .iter()
            .map(|l| 1 + sizeof_len(l.get_size()))
            .sum::<usize>()
            + self.data.as_ref().map_or(0, |d| 1 + sizeof_len(d.len()))
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> quick_protobuf::Result<()> {
        for link in &self.links {
            w.write_with_tag(TAG_NODE_LINKS, |w| w.write_message(link))?;
        }
        if let Some(data) = &self.data {
            w.write_with_tag(TAG_NODE_DATA, |w| w.write_bytes(data))?;
        }
        Ok(())
    }
}

/// The UnixFS payload carried in [`PBNode::data`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Data {
    pub r#type: DataType,
    pub data: Option<Vec<u8>>,
    pub filesize: Option<u64>,
    pub blocksizes: Vec<u64>,
}

impl Data {
    pub fn directory() -> Self {
        Self {
            r#type: DataType::Directory,
            ..Default::default()
        }
    }

    /// An intermediate file node over children holding `blocksizes` bytes each.
    pub fn file(blocksizes: Vec<u64>) -> Self {
        Self {
            r#type: DataType::File,
            data: None,
            filesize: Some(blocksizes.iter().sum()),
            blocksizes,
        }
    }
}

impl MessageWrite for Data {
    fn get_size(&self) -> usize {
        1 + sizeof_varint(self.r#type as u64)
            + self.data.as_ref().map_or(0, |d| 1 + sizeof_len(d.len()))
            + self.filesize.map_or(0, |s| 1 + sizeof_varint(s))
            + self
                .blocksizes
                .iter()
                .map(|s| 1 + sizeof_varint(*s))
                .sum::<usize>()
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> quick_protobuf::Result<()> {
        w.write_with_tag(TAG_DATA_TYPE, |w| w.write_uint64(self.r#type as u64))?;
        if let Some(data) = &self.data {
            w.write_with_tag(TAG_DATA_DATA, |w| w.write_bytes(data))?;
        }
        if let Some(filesize) = self.filesize {
            w.write_with_tag(TAG_DATA_FILESIZE, |w| w.write_uint64(filesize))?;
        }
        // proto2 repeated scalars are not packed
        for size in &self.blocksizes {
            w.write_with_tag(TAG_DATA_BLOCKSIZES, |w| w.write_uint64(*size))?;
        }
        Ok(())
    }
}

/// Serializes a message body, without a length prefix.
pub fn encode<M: MessageWrite>(message: &M) -> quick_protobuf::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(message.get_size());
    let mut writer = Writer::new(&mut buf);
    message.write_message(&mut writer)?;
    Ok(buf)
}


/// Parses a message body produced by [`encode`].
#[cfg(test)]
pub fn decode<'a, M: quick_protobuf::MessageRead<'a>>(bytes: &'a [u8]) -> quick_protobuf::Result<M> {
    let mut reader = quick_protobuf::BytesReader::from_bytes(bytes);
    M::from_reader(&mut reader, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::multihash::prelude::*;
    use fvm_ipld_encoding::IPLD_RAW;
    use pretty_assertions::assert_eq;

    #[test]
    fn directory_data_bytes() {
        assert_eq!(encode(&Data::directory()).unwrap(), [0x08, 0x01]);
    }

    #[test]
    fn file_data_bytes() {
        let data = Data::file(vec![262_144, 10]);
        let bytes = encode(&data).unwrap();
        // Type=File, filesize=262154, blocksizes=[262144, 10]
        assert_eq!(
            hex::encode(&bytes),
            "0802188a801020808010200a"
        );
        assert_eq!(bytes.len(), data.get_size());
        assert_eq!(decode::<Data>(&bytes).unwrap(), data);
    }

    #[test]
    fn links_precede_data() {
        let cid = Cid::new_v1(IPLD_RAW, MultihashCode::Sha2_256.digest(b"leaf"));
        let node = PBNode {
            links: vec![PBLink::new(&cid, "", 4)],
            data: Some(encode(&Data::file(vec![4])).unwrap()),
        };
        let bytes = encode(&node).unwrap();
        assert_eq!(bytes[0], 0x12);
        assert_eq!(bytes.len(), node.get_size());

        let decoded: PBNode = decode(&bytes).unwrap();
        assert_eq!(decoded, node);
        assert_eq!(decoded.links[0].cid().unwrap(), cid);
        assert_eq!(decoded.links[0].name.as_deref(), Some(""));
    }
}
