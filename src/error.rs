// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;

use thiserror::Error;

/// Failure of a build or commitment call.
///
/// Every variant aborts the whole invocation. No partial archive or
/// commitment is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty file list, bad file names or malformed [`crate::BuildOptions`].
    #[error("invalid input: {0}")]
    Input(String),

    /// A file's byte source could not be read to the end.
    #[error("failed to read `{name}`: {source}")]
    Stream {
        name: String,
        #[source]
        source: io::Error,
    },

    /// The archive could not be assembled or serialized.
    #[error("failed to encode archive: {0:#}")]
    Encode(#[from] anyhow::Error),

    /// The piece commitment could not be computed.
    #[error("failed to compute piece commitment: {0}")]
    Commitment(String),

    #[error("build cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn stream(name: impl Into<String>, source: io::Error) -> Self {
        Self::Stream {
            name: name.into(),
            source,
        }
    }
}
