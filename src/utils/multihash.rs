// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//!
//! Multihash codes used by the archive and commitment pipelines. Extends the
//! codetable with the Filecoin `sha2-256-trunc254-padded` hash, which is not
//! part of [`multihash_codetable::Code`].
//!

pub mod prelude {
    pub use super::MultihashCode;
    pub use multihash_codetable::MultihashDigest as _;
}

use multihash_derive::MultihashDigest;
use sha2::Digest as _;

/// Multihash code of `sha2-256-trunc254-padded`.
pub const SHA2_256_TRUNC254_PADDED: u64 = 0x1012;

#[derive(Clone, Copy, Debug, Eq, MultihashDigest, PartialEq)]
#[mh(alloc_size = 64)]
pub enum MultihashCode {
    /// SHA-256 (32-byte hash size)
    #[mh(code = 0x12, hasher = multihash_codetable::Sha2_256)]
    Sha2_256,
    /// SHA-256 with the two most significant bits of the last byte cleared,
    /// so that the digest is a valid BLS12-381 scalar.
    #[mh(code = 0x1012, hasher = Sha2_256Trunc254Padded)]
    Sha2_256Trunc254Padded,
}

/// SHA-256 truncated to 254 bits.
#[derive(Default)]
pub struct Sha2_256Trunc254Padded {
    state: sha2::Sha256,
    digest: [u8; 32],
}

impl multihash_derive::Hasher for Sha2_256Trunc254Padded {
    fn update(&mut self, input: &[u8]) {
        self.state.update(input);
    }

    fn finalize(&mut self) -> &[u8] {
        let digest = self.state.clone().finalize();
        self.digest.copy_from_slice(digest.as_slice());
        self.digest[31] &= 0b0011_1111;
        &self.digest
    }

    fn reset(&mut self) {
        self.state = sha2::Sha256::default();
    }
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;

    #[test]
    fn trunc254_clears_top_bits() {
        // sha256 of 64 zero bytes ends in 0x4b
        let mh = MultihashCode::Sha2_256Trunc254Padded.digest(&[0u8; 64]);
        assert_eq!(mh.code(), SHA2_256_TRUNC254_PADDED);
        assert_eq!(
            hex::encode(mh.digest()),
            "f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb0b"
        );
    }

    #[test]
    fn sha2_256_matches_codetable() {
        let data = b"filbuilder";
        assert_eq!(
            MultihashCode::Sha2_256.digest(data),
            multihash_codetable::Code::Sha2_256.digest(data)
        );
    }

    #[test]
    fn hasher_reset() {
        use multihash_derive::Hasher as _;
        let mut hasher = Sha2_256Trunc254Padded::default();
        hasher.update(b"garbage");
        hasher.reset();
        hasher.update(&[0u8; 64]);
        let digest = hasher.finalize().to_vec();
        assert_eq!(
            digest,
            MultihashCode::Sha2_256Trunc254Padded
                .digest(&[0u8; 64])
                .digest()
        );
    }
}
