// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;
use std::num::NonZeroUsize;

use tokio::io::{AsyncRead, AsyncReadExt as _};

/// Splits a byte source into fixed-size chunks. The last chunk may be shorter.
///
/// An empty source yields exactly one empty chunk so that empty files still
/// get a leaf.
pub struct Chunker<R> {
    reader: R,
    chunk_size: usize,
    emitted: bool,
    exhausted: bool,
}

impl<R: AsyncRead + Unpin> Chunker<R> {
    pub fn new(reader: R, chunk_size: NonZeroUsize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.get(),
            emitted: false,
            exhausted: false,
        }
    }

    /// Reads the next chunk, or `None` once the source is consumed.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut chunk = vec![0; self.chunk_size];
        let mut filled = 0;
        // readers may return short reads well before EOF
        while filled < self.chunk_size {
            let n = self.reader.read(&mut chunk[filled..]).await?;
            if n == 0 {
                self.exhausted = true;
                break;
            }
            filled += n;
        }
        if filled == 0 && self.emitted {
            return Ok(None);
        }
        chunk.truncate(filled);
        self.emitted = true;
        Ok(Some(chunk))
    }
}
