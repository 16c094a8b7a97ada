use core::borrow::Borrow;
use core::fmt::Debug;

use crate::error::Result;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::hasher::KeyHasher;
use crate::phase::GrowthPhase;
use crate::seed::random_seed;

/// Logical bucket count used when no capacity is given.
const DEFAULT_CAPACITY: usize = 2;

/// A [`HashMap`] using the crate's [`DefaultKeyHasher`].
///
/// [`DefaultKeyHasher`]: crate::hasher::DefaultKeyHasher
#[cfg(any(feature = "foldhash", feature = "std"))]
pub type DefaultHashMap<K, V> = HashMap<K, V, crate::hasher::DefaultKeyHasher>;

/// A hash map implemented using the linear-hashing [`HashTable`] as the
/// underlying storage.
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement `Eq` and
/// are hashed by the [`KeyHasher`] `S`, salted with a seed drawn once per map.
/// Storage grows one bucket split at a time, so no single insertion pays for
/// rehashing the whole map.
///
/// A clone keeps the seed of the map it was cloned from, since every entry
/// carries its cached hash. Clones therefore share collision behavior; build
/// a fresh map with [`try_with_seed`] or [`Extend`] to get a new seed.
///
/// [`try_with_seed`]: HashMap::try_with_seed
///
/// # Performance Characteristics
///
/// - **Memory**: one boxed node per entry holding the cached hash, `(K, V)`
///   and a link, plus one pointer-sized head per physical bucket.
#[derive(Clone)]
pub struct HashMap<K, V, S> {
    table: HashTable<(K, V)>,
    hasher: S,
    seed: u64,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates a map with at least `capacity` logical buckets, the given key
    /// hasher and an explicit seed.
    ///
    /// The seed must stay private to the map's owner for the map to resist
    /// crafted collisions; [`random_seed`] is what the other constructors use.
    ///
    /// # Errors
    ///
    /// Fails if the bucket array cannot be allocated.
    ///
    /// [`random_seed`]: crate::random_seed
    pub fn try_with_seed(capacity: usize, hasher: S, seed: u64) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
            hasher,
            seed,
        })
    }

    /// Creates a map with at least `capacity` logical buckets and a seed from
    /// the operating system's random number generator.
    ///
    /// # Errors
    ///
    /// Fails if the bucket array cannot be allocated or no seed can be drawn.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::Error;
    /// use linear_hash::HashMap;
    /// use linear_hash::hasher::FoldHash;
    ///
    /// let map: HashMap<u32, u32, _> = HashMap::try_with_capacity_and_hasher(2, FoldHash).unwrap();
    /// assert_eq!(map.capacity(), 4);
    ///
    /// let err = HashMap::<u32, u32, _>::try_with_capacity_and_hasher(usize::MAX, FoldHash);
    /// assert_eq!(err.unwrap_err(), Error::CapacityOverflow);
    /// ```
    pub fn try_with_capacity_and_hasher(capacity: usize, hasher: S) -> Result<Self> {
        let table = HashTable::try_with_capacity(capacity)?;
        Ok(Self {
            table,
            hasher,
            seed: random_seed()?,
        })
    }

    /// Creates a map with at least `capacity` logical buckets and the given
    /// key hasher.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or no seed can be drawn; aborts if
    /// the allocation fails.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self::try_with_capacity_and_hasher(capacity, hasher).unwrap_or_else(|err| err.raise())
    }

    /// Creates an empty map with the given key hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the length of the physical bucket array.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the map's position in its growth cycle.
    pub fn phase(&self) -> GrowthPhase {
        self.table.phase()
    }

    /// Returns the seed this map salts its hashes with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns a reference to the map's key hasher.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns a reference to the underlying table, mostly useful for its
    /// statistics.
    pub fn table(&self) -> &HashTable<(K, V)> {
        &self.table
    }

    /// Removes all elements from the map.
    ///
    /// The map returns to the bucket layout it was created with and keeps its
    /// allocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_capacity_and_hasher(2, FoldHash);
    /// for i in 0..100 {
    ///     map.insert(i, i);
    /// }
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 4);
    /// assert_eq!(map.search(&1), None);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// An iterator visiting all key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// An iterator visiting all keys in arbitrary order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in arbitrary order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Clears the map, returning all key-value pairs as an iterator.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K>,
{
    /// Inserts a key-value pair if the key is not present yet.
    ///
    /// Returns `true` if the pair was inserted and `false` if the key already
    /// existed, in which case the stored value is left untouched and `value`
    /// is dropped. May run one split step.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// assert!(map.insert(5, 10));
    /// assert!(!map.insert(5, 20));
    /// assert_eq!(map.search(&5), Some(&10));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.try_insert(key, value).unwrap_or_else(|err| err.raise())
    }

    /// Fallible version of [`insert`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket array had to double and could not. The
    /// map is unchanged in that case.
    ///
    /// [`insert`]: HashMap::insert
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool> {
        let hash = self.hasher.hash_key(&key, self.seed);
        match self.table.try_entry(hash, |(k, _)| k == &key)? {
            TableEntry::Occupied(_) => Ok(false),
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(true)
            }
        }
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// An existing value is replaced in place; an absent key is inserted
    /// exactly like [`insert`]. Always returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// assert!(map.modify(5, 10));
    /// assert!(map.modify(5, 20));
    /// assert_eq!(map.search(&5), Some(&20));
    /// ```
    ///
    /// [`insert`]: HashMap::insert
    pub fn modify(&mut self, key: K, value: V) -> bool {
        self.try_modify(key, value).unwrap_or_else(|err| err.raise())
    }

    /// Fallible version of [`modify`].
    ///
    /// # Errors
    ///
    /// Returns an error if inserting an absent key required the bucket array
    /// to double and it could not.
    ///
    /// [`modify`]: HashMap::modify
    pub fn try_modify(&mut self, key: K, value: V) -> Result<bool> {
        let hash = self.hasher.hash_key(&key, self.seed);
        if let Some((_, v)) = self.table.find_mut(hash, |(k, _)| k == &key) {
            *v = value;
            return Ok(true);
        }
        self.try_insert(key, value)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// *map.get_or_insert("hits") += 1;
    /// *map.get_or_insert("hits") += 1;
    /// assert_eq!(map.search("hits"), Some(&2));
    /// ```
    pub fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        match self.try_get_or_insert(key) {
            Ok(value) => value,
            Err(err) => err.raise(),
        }
    }

    /// Fallible version of [`get_or_insert`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket array had to double and could not.
    ///
    /// [`get_or_insert`]: HashMap::get_or_insert
    pub fn try_get_or_insert(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        Ok(self.try_entry(key)?.or_default())
    }

    /// Gets the given key's entry for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// map.entry("a").or_insert(1);
    /// map.entry("a").and_modify(|v| *v += 10).or_insert(0);
    /// assert_eq!(map.search("a"), Some(&11));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        match self.try_entry(key) {
            Ok(entry) => entry,
            Err(err) => err.raise(),
        }
    }

    /// Fallible version of [`entry`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket array had to double and could not.
    ///
    /// [`entry`]: HashMap::entry
    pub fn try_entry(&mut self, key: K) -> Result<Entry<'_, K, V>> {
        let hash = self.hasher.hash_key(&key, self.seed);
        Ok(match self.table.try_entry(hash, |(k, _)| k == &key)? {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        })
    }

    /// Returns a reference to the value for `key`, or `None` if the key is
    /// absent. Never changes the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// map.insert("five".to_string(), 5);
    ///
    /// assert_eq!(map.search("five"), Some(&5));
    /// assert_eq!(map.search("six"), None);
    /// ```
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key, self.seed);
        self.table
            .find(hash, equivalent_key(key))
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key, self.seed);
        self.table
            .find_mut(hash, equivalent_key(key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        self.search(key).is_some()
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op. The map never shrinks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let mut map = HashMap::with_hasher(FoldHash);
    /// map.insert(5, 10);
    ///
    /// assert_eq!(map.remove(&5), Some(10));
    /// assert_eq!(map.remove(&5), None);
    /// assert_eq!(map.search(&5), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key` from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        S: KeyHasher<Q>,
    {
        let hash = self.hasher.hash_key(key, self.seed);
        self.table.remove(hash, equivalent_key(key))
    }
}

/// Equality predicate matching a stored pair against a borrowed key.
fn equivalent_key<Q, K, V>(key: &Q) -> impl Fn(&(K, V)) -> bool + '_
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    move |pair| key == pair.0.borrow()
}

impl<K, V, S> HashMap<K, V, S>
where
    S: Default,
{
    /// Creates an empty map with the default key hasher.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::HashMap;
    /// # use linear_hash::hasher::FoldHash;
    /// #
    /// let map: HashMap<i32, String, FoldHash> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty map with at least `capacity` logical buckets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Eq,
    V: PartialEq,
    S: KeyHasher<K>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter()
            .all(|(k, v)| other.search(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Eq,
    V: Eq,
    S: KeyHasher<K>,
{
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.modify(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Eq,
    S: KeyHasher<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// A view into a single entry in a map, which may be vacant or occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Ensures a value is in the entry by inserting `default` if empty.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Ensures a value is in the entry by inserting the result of `default`
    /// if empty.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Ensures a value is in the entry by inserting `V::default()` if empty.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in a [`HashMap`].
pub struct VacantEntry<'a, K, V> {
    entry: crate::hash_table::VacantEntry<'a, (K, V)>,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in a [`HashMap`].
pub struct OccupiedEntry<'a, K, V> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V)>,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Sets the value of the entry, returning the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Takes the value out of the map.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Takes the key and value out of the map.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the entries of a [`HashMap`].
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A draining iterator over the entries of a [`HashMap`].
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Drain<'a, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
