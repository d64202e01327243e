// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Data preparation for Filecoin storage deals.
//!
//! A list of named files is chunked into a UnixFS DAG, wrapped in a directory
//! and serialized into a CARv1 archive. The archive bytes are then committed to
//! with a piece commitment (CommP), the identifier a storage provider seals.
//!
//! ```no_run
//! # async fn run() -> Result<(), filbuilder::Error> {
//! use filbuilder::{BuildOptions, CancellationToken, FileEntry, prepare_deal};
//!
//! let files = [FileEntry::from_bytes("hello.txt", "hello")];
//! let deal = prepare_deal(files, &BuildOptions::default(), &CancellationToken::new()).await?;
//! println!("{} {} {}", deal.root(), deal.piece_cid(), deal.piece_size().0);
//! # Ok(())
//! # }
//! ```

mod archive;
pub mod blockstore;
pub mod car;
pub mod commp;
mod error;
mod options;
#[cfg(test)]
mod test_utils;
pub mod unixfs;
pub mod utils;

pub use archive::{
    Archive, DealArtifacts, FileEntry, FileSummary, build_archive, prepare_deal,
};
pub use commp::{PieceCommitment, compute_piece_commitment};
pub use error::Error;
pub use options::{BuildOptions, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHILDREN_PER_NODE, MAX_CHUNK_SIZE};
pub use tokio_util::sync::CancellationToken;
