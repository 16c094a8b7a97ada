use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;

/// Maps a key and a per-table seed to a 64-bit hash.
///
/// Implementations must be deterministic for a fixed `(key, seed)` pair and
/// should spread keys well across the low bits, since bucket indices are
/// taken from the low end of the hash.
///
/// When a map is queried with a borrowed form `Q` of its key type `K`, the
/// hasher must produce the same value for `k` and `k.borrow()`.
pub trait KeyHasher<K: ?Sized> {
    /// Hashes `key` salted with `seed`.
    fn hash_key(&self, key: &K, seed: u64) -> u64;
}

/// Hashes any [`Hash`] key with foldhash, seeded per table.
#[cfg(feature = "foldhash")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldHash;

#[cfg(feature = "foldhash")]
impl<K: Hash + ?Sized> KeyHasher<K> for FoldHash {
    #[inline]
    fn hash_key(&self, key: &K, seed: u64) -> u64 {
        foldhash::fast::FixedState::with_seed(seed).hash_one(key)
    }
}

/// Hashes the raw bytes of text and byte-string keys with foldhash.
///
/// Unlike [`FoldHash`], no length prefix is mixed in, so `String`, `str`,
/// `Vec<u8>` and `[u8]` holding the same bytes hash identically.
///
/// # Examples
///
/// ```rust
/// use linear_hash::HashMap;
/// use linear_hash::hasher::FoldBytes;
///
/// let mut map: HashMap<String, u32, FoldBytes> = HashMap::with_hasher(FoldBytes);
/// map.insert("apple".to_string(), 3);
///
/// assert_eq!(map.search("apple"), Some(&3));
/// ```
#[cfg(feature = "foldhash")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldBytes;

#[cfg(feature = "foldhash")]
impl<K: AsRef<[u8]> + ?Sized> KeyHasher<K> for FoldBytes {
    #[inline]
    fn hash_key(&self, key: &K, seed: u64) -> u64 {
        let mut hasher = foldhash::fast::FixedState::with_seed(seed).build_hasher();
        hasher.write(key.as_ref());
        hasher.finish()
    }
}

/// Adapts any [`BuildHasher`] by feeding the seed ahead of the key.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "std")]
/// # {
/// use std::collections::hash_map::DefaultHasher;
/// use std::hash::BuildHasherDefault;
///
/// use linear_hash::HashMap;
/// use linear_hash::hasher::Seeded;
///
/// let hasher = Seeded(BuildHasherDefault::<DefaultHasher>::default());
/// let mut map = HashMap::with_hasher(hasher);
/// map.insert(1u32, "one");
/// assert_eq!(map.search(&1), Some(&"one"));
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Seeded<S>(pub S);

impl<S: BuildHasher, K: Hash + ?Sized> KeyHasher<K> for Seeded<S> {
    #[inline]
    fn hash_key(&self, key: &K, seed: u64) -> u64 {
        let mut hasher = self.0.build_hasher();
        hasher.write_u64(seed);
        key.hash(&mut hasher);
        hasher.finish()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Key hasher used when none is specified.
        pub type DefaultKeyHasher = FoldHash;
    } else if #[cfg(feature = "std")] {
        /// Key hasher used when none is specified.
        pub type DefaultKeyHasher =
            Seeded<std::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>>;
    }
}
