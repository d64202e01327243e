// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{CarBlock, CarV1Header};
use bytes::{Buf as _, BufMut as _, Bytes, BytesMut};
use cid::Cid;
use futures::{Sink, ready};
use fvm_ipld_encoding::to_vec;
use nunny::Vec as NonEmpty;
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio_util::codec::Encoder as _;
use unsigned_varint::codec::UviBytes;

pin_project! {
    /// [`Sink`] of [`CarBlock`]s producing a CARv1 byte stream.
    ///
    /// Records are staged in memory and drained into `inner` before the next
    /// block is accepted. The header is staged on construction, so a writer
    /// closed without blocks still leaves a header-only archive.
    pub struct CarWriter<W> {
        #[pin]
        inner: W,
        pending: BytesMut,
    }
}

impl<W: AsyncWrite> CarWriter<W> {
    pub fn new_carv1(roots: NonEmpty<Cid>, inner: W) -> io::Result<Self> {
        let header = to_vec(&CarV1Header { roots, version: 1 })?;
        let mut pending = BytesMut::new();
        UviBytes::default().encode(Bytes::from(header), &mut pending)?;
        Ok(Self { inner, pending })
    }

    fn poll_drain(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();
        while !this.pending.is_empty() {
            let written = ready!(this.inner.as_mut().poll_write(cx, this.pending))?;
            if written == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            this.pending.advance(written);
        }
        Poll::Ready(Ok(()))
    }
}

impl<W: AsyncWrite> Sink<CarBlock> for CarWriter<W> {
    type Error = io::Error;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_drain(cx)
    }

    fn start_send(self: Pin<&mut Self>, block: CarBlock) -> io::Result<()> {
        block.write(&mut self.project().pending.writer())
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        ready!(self.as_mut().poll_drain(cx))?;
        self.project().inner.poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        ready!(self.as_mut().poll_drain(cx))?;
        self.project().inner.poll_shutdown(cx)
    }
}
