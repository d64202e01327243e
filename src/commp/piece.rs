// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

use super::fr32::{PADDED_CHUNK, UNPADDED_CHUNK};

/// Size of a piece in bytes with Fr32 padding.
#[derive(
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct PaddedPieceSize(pub u64);

/// Size of a piece in bytes before Fr32 padding.
#[derive(
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Into,
)]
#[serde(transparent)]
pub struct UnpaddedPieceSize(pub u64);

impl PaddedPieceSize {
    /// Number of payload bytes a piece of this size holds.
    pub fn unpadded(self) -> UnpaddedPieceSize {
        UnpaddedPieceSize(self.0 - self.0 / PADDED_CHUNK as u64)
    }

    /// A padded piece size is a power of two no smaller than one Fr32 group.
    pub fn validate(self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.0 >= PADDED_CHUNK as u64,
            "minimum piece size is {PADDED_CHUNK} bytes, got {}",
            self.0
        );
        anyhow::ensure!(
            self.0.is_power_of_two(),
            "padded piece size must be a power of 2, got {}",
            self.0
        );
        Ok(())
    }
}

impl UnpaddedPieceSize {
    pub fn padded(self) -> PaddedPieceSize {
        PaddedPieceSize(self.0 + self.0 / UNPADDED_CHUNK as u64)
    }

    /// An unpadded piece size is a multiple of 127 whose padded size is a
    /// valid [`PaddedPieceSize`].
    pub fn validate(self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.0 % UNPADDED_CHUNK as u64 == 0,
            "unpadded piece size must be a multiple of {UNPADDED_CHUNK}, got {}",
            self.0
        );
        self.padded().validate()
    }
}
