// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fr32 padding.
//!
//! Every 254 bits of input are stored in a 32-byte little-endian field
//! element whose two most significant bits are zero, so 127 input bytes
//! (4 × 254 bits) expand to 128 output bytes.

use rayon::prelude::*;

/// Input bytes consumed per padding group.
pub const UNPADDED_CHUNK: usize = 127;
/// Output bytes produced per padding group.
pub const PADDED_CHUNK: usize = 128;

/// Length of `unpadded_len` bytes after Fr32 padding.
pub const fn padded_len(unpadded_len: u64) -> u64 {
    unpadded_len.div_ceil(UNPADDED_CHUNK as u64) * PADDED_CHUNK as u64
}

/// Pads `input`, zero-filling the last group.
pub fn pad(input: &[u8]) -> Vec<u8> {
    let groups = input.len().div_ceil(UNPADDED_CHUNK);
    let mut out = vec![0u8; groups * PADDED_CHUNK];
    out.par_chunks_mut(PADDED_CHUNK)
        .zip(input.par_chunks(UNPADDED_CHUNK))
        .for_each(|(out, chunk)| {
            let mut group = [0u8; UNPADDED_CHUNK];
            group[..chunk.len()].copy_from_slice(chunk);
            pad_group(&group, out);
        });
    out
}

fn pad_group(input: &[u8; UNPADDED_CHUNK], out: &mut [u8]) {
    // first field element: bits 0..254
    out[..31].copy_from_slice(&input[..31]);
    out[31] = input[31] & 0x3f;

    // second: input shifted left by 2 bits
    let mut t = input[31] >> 6;
    let mut v = 0;
    for i in 32..64 {
        v = input[i];
        out[i] = (v << 2) | t;
        t = v >> 6;
    }
    out[63] &= 0x3f;

    // third: shifted by 4 bits
    t = v >> 4;
    for i in 64..96 {
        v = input[i];
        out[i] = (v << 4) | t;
        t = v >> 4;
    }
    out[95] &= 0x3f;

    // fourth: shifted by 6 bits
    t = v >> 2;
    for i in 96..127 {
        v = input[i];
        out[i] = (v << 6) | t;
        t = v >> 2;
    }
    out[127] = t & 0x3f;
}
