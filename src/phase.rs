use crate::error::Error;
use crate::error::Result;

cfg_if::cfg_if! {
    if #[cfg(feature = "load-factor-one")] {
        /// Average number of entries per active bucket that triggers a split.
        pub const MAX_LOAD_FACTOR: usize = 1;
    } else if #[cfg(feature = "load-factor-four")] {
        /// Average number of entries per active bucket that triggers a split.
        pub const MAX_LOAD_FACTOR: usize = 4;
    } else {
        /// Average number of entries per active bucket that triggers a split.
        pub const MAX_LOAD_FACTOR: usize = 2;
    }
}

/// Smallest exponent a table is created with: two logical buckets.
const MIN_EXPONENT: u32 = 1;

/// Position of a table within its growth cycle.
///
/// The logical bucket count is `2^exponent`. Buckets below `split` have
/// already been divided into a low half (same index) and a high half (index +
/// `2^exponent`) during the current phase, so they are addressed with one
/// extra hash bit. The physical array always holds `2^(exponent + 1)` heads so
/// every high half has a slot waiting for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPhase {
    exponent: u32,
    split: usize,
}

impl GrowthPhase {
    /// Phase for a table created with room for `capacity` logical buckets.
    ///
    /// The count is rounded up to the next power of two with a minimum of
    /// two.
    pub(crate) fn for_capacity(capacity: usize) -> Result<Self> {
        let logical = capacity
            .max(1 << MIN_EXPONENT)
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow)?;
        let phase = GrowthPhase {
            exponent: logical.trailing_zeros(),
            split: 0,
        };
        // The physical array needs one more bit than the logical count.
        phase.physical_buckets_checked()?;
        Ok(phase)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(exponent: u32, split: usize) -> Self {
        GrowthPhase { exponent, split }
    }

    /// log2 of the logical bucket count.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Index of the next bucket to be split in this phase.
    pub fn split(&self) -> usize {
        self.split
    }

    /// Number of buckets the phase started with.
    pub fn logical_buckets(&self) -> usize {
        1 << self.exponent
    }

    /// Number of buckets currently addressable: the phase's base count plus
    /// one high half for every bucket split so far.
    pub fn active_buckets(&self) -> usize {
        self.logical_buckets() + self.split
    }

    /// Length of the physical bucket array backing this phase.
    pub fn physical_buckets(&self) -> usize {
        1 << (self.exponent + 1)
    }

    fn physical_buckets_checked(&self) -> Result<usize> {
        1usize
            .checked_shl(self.exponent + 1)
            .ok_or(Error::CapacityOverflow)
    }

    /// Whether every bucket of the phase has been split.
    pub fn is_complete(&self) -> bool {
        self.split >= self.logical_buckets()
    }

    /// Maps a hash to the bucket its entry currently lives in.
    ///
    /// Low-order buckets below the split pointer were already divided this
    /// phase and need the extra bit to tell their halves apart.
    #[inline(always)]
    pub fn bucket_index(&self, hash: u64) -> usize {
        let idx = low_bits(hash, self.exponent);
        if idx < self.split {
            low_bits(hash, self.exponent + 1)
        } else {
            idx
        }
    }

    /// Bucket an entry of the bucket under the split pointer moves to when
    /// that bucket is divided: its own index or the matching high half.
    #[inline(always)]
    pub(crate) fn split_target(&self, hash: u64) -> usize {
        low_bits(hash, self.exponent + 1)
    }

    /// Whether a table holding `len` entries should run a split step before
    /// accepting another one.
    #[inline(always)]
    pub(crate) fn needs_split(&self, len: usize) -> bool {
        len >= self.active_buckets().saturating_mul(MAX_LOAD_FACTOR)
    }

    /// Moves the split pointer past the bucket that was just divided.
    pub(crate) fn advance(&mut self) {
        debug_assert!(!self.is_complete());
        self.split += 1;
    }

    /// The phase that follows a completed one: twice the buckets, nothing
    /// split yet.
    pub(crate) fn next(&self) -> Result<Self> {
        debug_assert!(self.is_complete());
        let next = GrowthPhase {
            exponent: self.exponent + 1,
            split: 0,
        };
        next.physical_buckets_checked()?;
        Ok(next)
    }
}

#[inline(always)]
fn low_bits(hash: u64, bits: u32) -> usize {
    (hash & ((1u64 << bits) - 1)) as usize
}
