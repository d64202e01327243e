// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Cursor;
use std::path::Path;

use cid::Cid;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::blockstore::{MemoryBlockstore, OrderedBlockstore as _};
use crate::car::encode_car_to_vec;
use crate::commp::{PaddedPieceSize, PieceCommitment, compute_piece_commitment};
use crate::unixfs::DagBuilder;
use crate::{BuildOptions, Error};

/// A named byte source to be packed into the archive.
#[derive(Debug)]
pub struct FileEntry<R> {
    pub name: String,
    pub reader: R,
}

impl<R> FileEntry<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }
}

impl FileEntry<Cursor<Vec<u8>>> {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(name, Cursor::new(bytes.into()))
    }
}

impl FileEntry<tokio::fs::File> {
    /// Opens the file at `path`, named after its last path component.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Input(format!("{} does not name a file", path.display())))?;
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::stream(&name, e))?;
        Ok(Self::new(name, file))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    /// Root of the file's DAG.
    pub cid: Cid,
    /// Content length in bytes.
    pub size: u64,
}

/// A finished CARv1 archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub root: Cid,
    pub car: Vec<u8>,
    /// Per-file roots, in directory order.
    pub files: Vec<FileSummary>,
}

impl Archive {
    pub fn car_size(&self) -> u64 {
        self.car.len() as u64
    }
}

/// An archive together with the commitment of its bytes, ready to be offered
/// in a storage deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealArtifacts {
    pub archive: Archive,
    pub piece: PieceCommitment,
}

impl DealArtifacts {
    pub fn root(&self) -> Cid {
        self.archive.root
    }

    pub fn car_size(&self) -> u64 {
        self.archive.car_size()
    }

    pub fn piece_cid(&self) -> Cid {
        self.piece.piece_cid
    }

    pub fn piece_size(&self) -> PaddedPieceSize {
        self.piece.piece_size
    }
}

/// Chunks every file into a UnixFS DAG, wraps the file roots in a directory
/// (unless disabled) and serializes all blocks into a CARv1 archive.
///
/// The block store lives for the duration of the call only. When `cancel`
/// fires, the build is abandoned and [`Error::Cancelled`] is returned.
#[tracing::instrument(skip_all, fields(files = tracing::field::Empty))]
pub async fn build_archive<R: AsyncRead + Unpin>(
    files: impl IntoIterator<Item = FileEntry<R>>,
    options: &BuildOptions,
    cancel: &CancellationToken,
) -> Result<Archive, Error> {
    let files: Vec<_> = files.into_iter().collect();
    tracing::Span::current().record("files", files.len());
    validate_files(&files, options)?;

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::warn!("archive build was cancelled");
            Err(Error::Cancelled)
        }
        result = build(files, options) => result,
    }
}

/// Builds the archive and commits to its full byte stream.
pub async fn prepare_deal<R: AsyncRead + Unpin>(
    files: impl IntoIterator<Item = FileEntry<R>>,
    options: &BuildOptions,
    cancel: &CancellationToken,
) -> Result<DealArtifacts, Error> {
    let archive = build_archive(files, options, cancel).await?;
    let commitment = tokio::task::spawn_blocking(move || {
        let piece = compute_piece_commitment(&archive.car);
        (archive, piece)
    });
    let (archive, piece) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        joined = commitment => joined.map_err(|e| Error::Commitment(e.to_string()))?,
    };
    let piece = piece?;
    tracing::info!(
        root = %archive.root,
        car_size = archive.car_size(),
        piece_cid = %piece.piece_cid,
        piece_size = piece.piece_size.0,
        "prepared deal"
    );
    Ok(DealArtifacts { archive, piece })
}

fn validate_files<R>(files: &[FileEntry<R>], options: &BuildOptions) -> Result<(), Error> {
    options.validate()?;
    if files.is_empty() {
        return Err(Error::Input("no files to archive".into()));
    }
    if !options.wrap_with_directory && files.len() > 1 {
        return Err(Error::Input(format!(
            "{} files cannot share a root without a wrapping directory",
            files.len()
        )));
    }
    let mut seen = ahash::HashSet::default();
    for FileEntry { name, .. } in files {
        if name.is_empty() {
            return Err(Error::Input("file names must not be empty".into()));
        }
        if name.contains('/') {
            return Err(Error::Input(format!("file name `{name}` contains a path separator")));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::Input(format!("duplicate file name `{name}`")));
        }
    }
    Ok(())
}

async fn build<R: AsyncRead + Unpin>(
    mut files: Vec<FileEntry<R>>,
    options: &BuildOptions,
) -> Result<Archive, Error> {
    if options.sort_directory_entries {
        files.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    }
    let store = MemoryBlockstore::new();
    let builder = DagBuilder::new(&store, options)?;

    let mut roots = Vec::with_capacity(files.len());
    for FileEntry { name, reader } in files {
        let link = builder.add_file(&name, reader).await?;
        roots.push((name, link));
    }

    let root = if options.wrap_with_directory {
        builder
            .wrap_directory(roots.iter().map(|(name, link)| (name.as_str(), *link)))?
            .cid
    } else {
        match roots.as_slice() {
            [(_, link)] => link.cid,
            _ => return Err(Error::Input("expected exactly one file".into())),
        }
    };

    let car = encode_car_to_vec(root, &store).await?;
    tracing::info!(%root, blocks = store.len(), car_size = car.len(), "built archive");
    Ok(Archive {
        root,
        car,
        files: roots
            .into_iter()
            .map(|(name, link)| FileSummary {
                name,
                cid: link.cid,
                size: link.file_size,
            })
            .collect(),
    })
}
