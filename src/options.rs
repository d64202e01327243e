// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default size of a leaf chunk, 256 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 256 << 10;
/// Largest accepted leaf chunk. Bigger blocks are not exchangeable over bitswap.
pub const MAX_CHUNK_SIZE: usize = 1 << 20;
/// Default fan-out of intermediate file nodes, as used by the IPFS UnixFS
/// importer's balanced layout.
pub const DEFAULT_MAX_CHILDREN_PER_NODE: usize = 174;

/// Knobs of a single archive build.
///
/// Missing fields take their default value, so an empty TOML document is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, smart_default::SmartDefault)]
#[serde(default)]
pub struct BuildOptions {
    /// Maximum size of a leaf chunk in bytes.
    #[default(DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Maximum number of links in an intermediate file node.
    #[default(DEFAULT_MAX_CHILDREN_PER_NODE)]
    pub max_children_per_node: usize,
    /// Use the raw leaf as the root of single-chunk files instead of wrapping
    /// it in a file node.
    #[default(true)]
    pub raw_leaves: bool,
    /// Wrap all files in a synthetic directory whose CID becomes the archive
    /// root. When disabled, exactly one file must be supplied.
    #[default(true)]
    pub wrap_with_directory: bool,
    /// Process files and order directory links by name bytes instead of input
    /// order, so the whole archive no longer depends on how files were listed.
    pub sort_directory_entries: bool,
    /// Number of leaves hashed in parallel. Defaults to the number of CPUs.
    pub hash_concurrency: Option<NonZeroUsize>,
}

impl BuildOptions {
    /// Parses and validates options from a TOML document.
    pub fn from_toml(toml_string: &str) -> Result<Self, Error> {
        let options: Self = toml::from_str(toml_string)
            .map_err(|e| Error::Input(format!("malformed build options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Input(format!(
                "chunk size must be between 1 and {MAX_CHUNK_SIZE} bytes, got {}",
                self.chunk_size
            )));
        }
        if self.max_children_per_node < 2 {
            return Err(Error::Input(format!(
                "a file node needs room for at least 2 children, got {}",
                self.max_children_per_node
            )));
        }
        Ok(())
    }

    pub fn hash_concurrency(&self) -> usize {
        self.hash_concurrency
            .map(NonZeroUsize::get)
            .unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(BuildOptions::from_toml("").unwrap(), BuildOptions::default());
    }

    #[test]
    fn defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.chunk_size, 262_144);
        assert_eq!(options.max_children_per_node, 174);
        assert!(options.raw_leaves);
        assert!(options.wrap_with_directory);
        assert!(!options.sort_directory_entries);
        assert!(options.hash_concurrency() >= 1);
    }

    #[test]
    fn partial_toml() {
        let options = BuildOptions::from_toml(
            r#"
            chunk_size = 1024
            raw_leaves = false
            hash_concurrency = 3
            "#,
        )
        .unwrap();
        assert_eq!(options.chunk_size, 1024);
        assert!(!options.raw_leaves);
        assert_eq!(options.hash_concurrency(), 3);
        assert_eq!(
            options.max_children_per_node,
            DEFAULT_MAX_CHILDREN_PER_NODE
        );
    }

    #[test]
    fn malformed_toml_is_input_error() {
        let err = BuildOptions::from_toml("chunk_size = \"big\"").unwrap_err();
        assert!(matches!(err, Error::Input(_)), "{err}");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for toml in [
            "chunk_size = 0",
            "chunk_size = 1048577",
            "max_children_per_node = 1",
        ] {
            let err = BuildOptions::from_toml(toml).unwrap_err();
            assert!(matches!(err, Error::Input(_)), "{toml}: {err}");
        }
    }
}
