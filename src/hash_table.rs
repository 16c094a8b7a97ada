use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::bucket_array::BucketArray;
use crate::bucket_array::Link;
use crate::bucket_array::Node;
use crate::bucket_array::find_link;
use crate::bucket_array::find_node;
use crate::error::Result;
use crate::phase::GrowthPhase;

/// Debug statistics for hash table analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// log2 of the logical bucket count of the current phase
    pub exponent: u32,
    /// Split pointer of the current phase
    pub split: usize,
    /// Buckets currently addressable (logical count plus split high halves)
    pub active_buckets: usize,
    /// Length of the physical bucket array
    pub physical_buckets: usize,
    /// Heads the bucket allocation can hold without reallocating
    pub allocated_buckets: usize,
    /// Active buckets with an empty chain
    pub empty_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Average entries per active bucket
    pub load_factor: f64,
    /// Bytes held by the bucket array and the chain nodes
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {} over {} active buckets ({:.2} per bucket)",
            self.populated, self.active_buckets, self.load_factor
        );
        println!(
            "Phase: exponent {}, split {}/{}",
            self.exponent,
            self.split,
            1usize << self.exponent
        );
        println!(
            "Buckets: {} physical, {} allocated, {} empty",
            self.physical_buckets, self.allocated_buckets, self.empty_buckets
        );
        println!("Longest chain: {}", self.longest_chain);
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// A hash table that grows by linear hashing.
///
/// `HashTable<V>` stores values of type `V` in separately chained buckets.
/// Instead of rehashing everything when it gets full, the table divides one
/// bucket per qualifying insertion, walking a split pointer across the
/// buckets of the current growth phase. Once every bucket of a phase has been
/// divided the bucket array doubles and a new phase begins.
///
/// Like a raw table, it requires you to provide both the hash value and an
/// equality predicate for each operation.
///
/// ## Example
///
/// ```rust
/// use linear_hash::hash_table::Entry;
/// use linear_hash::hash_table::HashTable;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     id: u64,
///     name: String,
/// }
///
/// let mut table = HashTable::with_capacity(16);
/// let hash = 123u64.wrapping_mul(0x9E37_79B9_7F4A_7C15);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    buckets: BucketArray<V>,
    phase: GrowthPhase,
    initial: GrowthPhase,
    len: usize,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("phase", &self.phase)
            .field("len", &self.len)
            .field("physical_buckets", &self.buckets.len())
            .field(
                "chains",
                &self
                    .buckets
                    .heads()
                    .take(self.phase.active_buckets())
                    .map(chain_len)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V> HashTable<V> {
    /// Creates a new hash table with at least `capacity` logical buckets.
    ///
    /// The bucket count is rounded up to a power of two, with a minimum of
    /// two, and the physical array is allocated at twice that size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the bucket array cannot be
    /// sized and [`Error::Alloc`] if the allocator refuses it. No table is
    /// produced in either case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// # use linear_hash::Error;
    /// #
    /// let table: HashTable<u64> = HashTable::try_with_capacity(5).unwrap();
    /// assert_eq!(table.phase().logical_buckets(), 8);
    /// assert_eq!(table.capacity(), 16);
    ///
    /// let err = HashTable::<u64>::try_with_capacity(usize::MAX).unwrap_err();
    /// assert_eq!(err, Error::CapacityOverflow);
    /// ```
    ///
    /// [`Error::CapacityOverflow`]: crate::Error::CapacityOverflow
    /// [`Error::Alloc`]: crate::Error::Alloc
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        let phase = GrowthPhase::for_capacity(capacity)?;
        let buckets = BucketArray::allocate(phase.physical_buckets())?;
        Ok(Self {
            buckets,
            phase,
            initial: phase,
            len: 0,
        })
    }

    /// Creates a new hash table with at least `capacity` logical buckets.
    ///
    /// # Panics
    ///
    /// Panics if the bucket count overflows, and aborts through
    /// [`handle_alloc_error`] if the allocation fails.
    ///
    /// [`handle_alloc_error`]: alloc::alloc::handle_alloc_error
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|err| err.raise())
    }

    /// Returns an iterator over all values in the table.
    ///
    /// The iterator yields `&V` references in an arbitrary order, which
    /// changes as buckets are split.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(1, |&v: &u64| v == 10).or_insert(10);
    /// table.entry(2, |&v: &u64| v == 20).or_insert(20);
    ///
    /// let mut values: Vec<u64> = table.iter().copied().collect();
    /// values.sort();
    /// assert_eq!(values, [10, 20]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            heads: self.buckets.heads(),
            current: None,
            remaining: self.len,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The table keeps its current bucket array and growth phase.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(7, |s: &String| s == "key1").or_insert("key1".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, ["key1"]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            bucket_index: 0,
            current: None,
        }
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the length of the physical bucket array.
    ///
    /// This is always twice the logical bucket count of the current growth
    /// phase. It only ever grows, except through [`clear`].
    ///
    /// [`clear`]: HashTable::clear
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the table's position in its growth cycle.
    pub fn phase(&self) -> GrowthPhase {
        self.phase
    }

    /// Removes all elements from the table.
    ///
    /// The growth phase returns to the shape the table was created with. The
    /// bucket allocation itself is kept, so regrowing to the previous size
    /// does not allocate again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(2);
    /// for n in 0..100u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    /// assert!(table.capacity() > 4);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 4);
    /// ```
    pub fn clear(&mut self) {
        log::trace!(
            "clearing {} entries, resetting exponent {} -> {}",
            self.len,
            self.phase.exponent(),
            self.initial.exponent()
        );
        self.buckets.reset(self.initial.physical_buckets());
        self.phase = self.initial;
        self.len = 0;
    }

    /// Removes and returns a value from the table.
    ///
    /// The value is identified by its hash and an equality predicate. Removing
    /// a value that is not present does nothing and returns `None`. Removal
    /// never shrinks the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(42, |&n| n == 42), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.phase.bucket_index(hash);
        let link = find_link(self.buckets.head_mut(index), hash, eq);
        let node = link.take()?;
        let Node { value, next, .. } = *node;
        *link = next;
        self.len -= 1;
        Some(value)
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// If the table has reached its load threshold, one bucket is split
    /// before the lookup.
    ///
    /// # Panics
    ///
    /// Panics or aborts if the bucket array needs to double and cannot. Use
    /// [`try_entry`] to handle that case.
    ///
    /// [`try_entry`]: HashTable::try_entry
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::Entry;
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    ///
    /// match table.entry(99, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    ///
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        if let Err(err) = self.maybe_split() {
            err.raise();
        }
        self.entry_impl(hash, eq)
    }

    /// Fallible version of [`entry`].
    ///
    /// # Errors
    ///
    /// Returns an error if a split step needed to double the bucket array and
    /// the allocation failed. The table is left unchanged in that case.
    ///
    /// [`entry`]: HashTable::entry
    pub fn try_entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V>> {
        self.maybe_split()?;
        Ok(self.entry_impl(hash, eq))
    }

    fn entry_impl(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let index = self.phase.bucket_index(hash);
        let link = find_link(self.buckets.head_mut(index), hash, eq);
        if link.is_some() {
            Entry::Occupied(OccupiedEntry {
                link,
                len: &mut self.len,
            })
        } else {
            Entry::Vacant(VacantEntry {
                link,
                len: &mut self.len,
                hash,
            })
        }
    }

    /// Finds a value in the table by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(99, |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.phase.bucket_index(hash);
        find_node(self.buckets.head(index), hash, eq).map(|node| &node.value)
    }

    /// Finds a value in the table by hash and equality predicate, returning a
    /// mutable reference.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use linear_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(10);
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// if let Some(value) = table.find_mut(42, |&n| n == 42) {
    ///     *value = 100;
    /// }
    /// assert_eq!(table.find(42, |&n| n == 100), Some(&100));
    /// ```
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.phase.bucket_index(hash);
        find_link(self.buckets.head_mut(index), hash, eq)
            .as_mut()
            .map(|node| &mut node.value)
    }

    /// Runs one split step if the table is at its load threshold.
    fn maybe_split(&mut self) -> Result<()> {
        if self.phase.needs_split(self.len) {
            self.split_step()?;
        }
        Ok(())
    }

    /// Divides the bucket under the split pointer into a low and a high half
    /// and advances the pointer.
    ///
    /// A completed phase is turned into the next one first, which doubles the
    /// bucket array. If that allocation fails nothing has been touched yet.
    fn split_step(&mut self) -> Result<()> {
        if self.phase.is_complete() {
            self.grow()?;
        }

        let low = self.phase.split();
        let high = low + self.phase.logical_buckets();
        debug_assert!(self.buckets.head(high).is_none());

        let mut chain = self.buckets.head_mut(low).take();
        let mut low_chain: Link<V> = None;
        let mut high_chain: Link<V> = None;
        while let Some(mut node) = chain {
            chain = node.next.take();
            let target = self.phase.split_target(node.hash);
            debug_assert!(target == low || target == high);
            let dest = if target == low {
                &mut low_chain
            } else {
                &mut high_chain
            };
            node.next = dest.take();
            *dest = Some(node);
        }

        *self.buckets.head_mut(low) = low_chain;
        *self.buckets.head_mut(high) = high_chain;
        self.phase.advance();
        Ok(())
    }

    /// Starts the next growth phase by doubling the bucket array.
    ///
    /// Chains stay where they are; they are redistributed one split step at a
    /// time afterwards.
    fn grow(&mut self) -> Result<()> {
        let next = self.phase.next()?;
        self.buckets.grow()?;
        debug_assert_eq!(self.buckets.len(), next.physical_buckets());
        log::trace!(
            "bucket array doubled to {} heads, exponent {} -> {}, {} entries",
            self.buckets.len(),
            self.phase.exponent(),
            next.exponent(),
            self.len
        );
        self.phase = next;
        Ok(())
    }

    /// Computes a histogram of chain lengths over the active buckets.
    ///
    /// Index `n` of the returned vector counts the buckets whose chain holds
    /// exactly `n` entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for head in self.buckets.heads().take(self.phase.active_buckets()) {
            let len = chain_len(head);
            if len >= hist.len() {
                hist.resize(len + 1, 0);
            }
            hist[len] += 1;
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.chain_histogram();
        let active_buckets = self.phase.active_buckets();

        DebugStats {
            populated: self.len,
            exponent: self.phase.exponent(),
            split: self.phase.split(),
            active_buckets,
            physical_buckets: self.buckets.len(),
            allocated_buckets: self.buckets.allocated(),
            empty_buckets: hist[0],
            longest_chain: hist.len() - 1,
            load_factor: self.len as f64 / active_buckets as f64,
            total_bytes: self.buckets.allocated() * core::mem::size_of::<Link<V>>()
                + self.len * core::mem::size_of::<Node<V>>(),
        }
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = *hist.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!(
            "chain histogram ({} entries, {} buckets):",
            self.len,
            self.phase.active_buckets()
        );

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    7 => '▉',
                    _ => unreachable!(),
                };
                bar.push(ch);
            }
            bar
        };

        for (len, &count) in hist.iter().enumerate() {
            println!("{:>3} | {} ({})", len, make_bar(count), count);
        }
    }

    /// Checks every structural invariant of the table.
    #[cfg(test)]
    fn assert_consistent(&self) {
        let phase = self.phase;
        assert!(phase.split() <= phase.logical_buckets());
        assert_eq!(self.buckets.len(), phase.physical_buckets());

        let mut seen = 0;
        for (index, head) in self.buckets.heads().enumerate() {
            let mut link = head;
            while let Some(node) = link {
                assert!(index < phase.active_buckets());
                assert_eq!(phase.bucket_index(node.hash), index);
                seen += 1;
                link = &node.next;
            }
        }
        assert_eq!(seen, self.len);
    }
}

fn chain_len<V>(mut link: &Link<V>) -> usize {
    let mut len = 0;
    while let Some(node) = link {
        len += 1;
        link = &node.next;
    }
    len
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Modifies an occupied entry in place. Returns `None` for a vacant one.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// Holds the empty tail of the chain the value belongs to.
pub struct VacantEntry<'a, V> {
    link: &'a mut Link<V>,
    len: &'a mut usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts the value at the end of its bucket's chain and returns a
    /// mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        debug_assert!(self.link.is_none());
        *self.len += 1;
        &mut self
            .link
            .insert(Box::new(Node {
                hash: self.hash,
                value,
                next: None,
            }))
            .value
    }
}

/// A view into an occupied entry in the hash table.
pub struct OccupiedEntry<'a, V> {
    link: &'a mut Link<V>,
    len: &'a mut usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match self.link.as_deref() {
            Some(node) => &node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match self.link.as_deref_mut() {
            Some(node) => &mut node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        match self.link {
            Some(node) => &mut node.value,
            None => unreachable!("occupied entry without a node"),
        }
    }

    /// Unlinks the entry from its chain and returns the value.
    pub fn remove(self) -> V {
        let Some(node) = self.link.take() else {
            unreachable!("occupied entry without a node");
        };
        let Node { value, next, .. } = *node;
        *self.link = next;
        *self.len -= 1;
        value
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    heads: core::slice::Iter<'a, Link<V>>,
    current: Option<&'a Node<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.current {
                self.current = node.next.as_deref();
                self.remaining -= 1;
                return Some(&node.value);
            }
            if self.remaining == 0 {
                return None;
            }
            self.current = self.heads.next()?.as_deref();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`]. Values
/// that are not consumed are dropped along with the iterator.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    bucket_index: usize,
    current: Link<V>,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.current.take() {
                let Node { value, next, .. } = *node;
                self.current = next;
                self.table.len -= 1;
                return Some(value);
            }
            if self.table.len == 0 || self.bucket_index >= self.table.buckets.len() {
                return None;
            }
            self.current = self.table.buckets.head_mut(self.bucket_index).take();
            self.bucket_index += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
