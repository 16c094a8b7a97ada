#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bucket_array;
mod error;
mod phase;
mod seed;

/// A HashMap implementation using linear hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a key-value map interface with pluggable, per-map seeded key hashers.
pub mod hash_map;

/// The raw linear-hashing table that the map is built on.
pub mod hash_table;

/// Key hashing strategies.
///
/// A map hashes keys through a [`KeyHasher`](hasher::KeyHasher), which
/// receives the map's seed alongside every key.
pub mod hasher;

pub use error::Error;
pub use error::Result;
#[cfg(any(feature = "foldhash", feature = "std"))]
pub use hash_map::DefaultHashMap;
pub use hash_map::Entry;
pub use hash_map::HashMap;
#[cfg(feature = "stats")]
pub use hash_table::DebugStats;
pub use hash_table::HashTable;
#[cfg(any(feature = "foldhash", feature = "std"))]
pub use hasher::DefaultKeyHasher;
pub use hasher::KeyHasher;
pub use phase::GrowthPhase;
pub use phase::MAX_LOAD_FACTOR;
pub use seed::random_seed;
