use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;

use crate::error::Error;
use crate::error::Result;

/// A node in a bucket's collision chain.
///
/// The hash is cached so splits and growth never need to rehash a key.
pub(crate) struct Node<V> {
    pub(crate) hash: u64,
    pub(crate) value: V,
    pub(crate) next: Link<V>,
}

/// An owned chain of nodes. Each node exclusively owns its successor.
pub(crate) type Link<V> = Option<Box<Node<V>>>;

/// Returns the link that either holds the first node matching `hash` and `eq`
/// or is the empty tail of the chain.
#[inline]
pub(crate) fn find_link<V>(
    mut link: &mut Link<V>,
    hash: u64,
    eq: impl Fn(&V) -> bool,
) -> &mut Link<V> {
    while link
        .as_ref()
        .is_some_and(|node| !(node.hash == hash && eq(&node.value)))
    {
        if let Some(node) = link {
            link = &mut node.next;
        }
    }
    link
}

/// Shared counterpart of [`find_link`].
#[inline]
pub(crate) fn find_node<V>(
    mut link: &Link<V>,
    hash: u64,
    eq: impl Fn(&V) -> bool,
) -> Option<&Node<V>> {
    while let Some(node) = link {
        if node.hash == hash && eq(&node.value) {
            return Some(node);
        }
        link = &node.next;
    }
    None
}

/// Drops a chain node by node so long chains cannot exhaust the stack through
/// recursive `Box` drops.
pub(crate) fn drop_chain<V>(mut link: Link<V>) {
    while let Some(mut node) = link {
        link = node.next.take();
    }
}

/// Deep-copies a chain, preserving its order.
pub(crate) fn clone_chain<V: Clone>(mut src: &Link<V>) -> Link<V> {
    let mut head = None;
    let mut tail = &mut head;
    while let Some(node) = src {
        tail = &mut tail
            .insert(Box::new(Node {
                hash: node.hash,
                value: node.value.clone(),
                next: None,
            }))
            .next;
        src = &node.next;
    }
    head
}

/// The physical array of chain heads.
///
/// The array only ever changes length by doubling (during growth) or by being
/// cut back to the initial shape (during clear). Neither touches the chains
/// themselves; moving entries between buckets is the table's job.
pub(crate) struct BucketArray<V> {
    heads: Vec<Link<V>>,
}

impl<V> BucketArray<V> {
    /// Allocates `physical` empty chain heads.
    pub(crate) fn allocate(physical: usize) -> Result<Self> {
        let mut heads = Vec::new();
        reserve_heads(&mut heads, physical)?;
        heads.resize_with(physical, || None);
        Ok(Self { heads })
    }

    /// Doubles the array. Existing heads keep their positions in the low half
    /// and the high half starts out empty.
    ///
    /// On failure the array is left exactly as it was.
    pub(crate) fn grow(&mut self) -> Result<()> {
        let physical = self
            .heads
            .len()
            .checked_mul(2)
            .ok_or(Error::CapacityOverflow)?;
        reserve_heads(&mut self.heads, physical)?;
        self.heads.resize_with(physical, || None);
        Ok(())
    }

    /// Empties every chain and cuts the array back to `physical` heads while
    /// keeping the allocation for later growth.
    pub(crate) fn reset(&mut self, physical: usize) {
        for head in self.heads.iter_mut() {
            drop_chain(head.take());
        }
        self.heads.truncate(physical);
        debug_assert_eq!(self.heads.len(), physical);
    }

    pub(crate) fn len(&self) -> usize {
        self.heads.len()
    }

    /// Number of heads the current allocation can hold without reallocating.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn allocated(&self) -> usize {
        self.heads.capacity()
    }

    pub(crate) fn head(&self, index: usize) -> &Link<V> {
        &self.heads[index]
    }

    pub(crate) fn head_mut(&mut self, index: usize) -> &mut Link<V> {
        &mut self.heads[index]
    }

    pub(crate) fn heads(&self) -> core::slice::Iter<'_, Link<V>> {
        self.heads.iter()
    }
}

impl<V> Clone for BucketArray<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut heads = Vec::with_capacity(self.heads.len());
        heads.extend(self.heads.iter().map(|head| clone_chain(head)));
        Self { heads }
    }
}

impl<V> Drop for BucketArray<V> {
    fn drop(&mut self) {
        for head in self.heads.iter_mut() {
            drop_chain(head.take());
        }
    }
}

/// Makes room for `physical` heads in total, translating allocator failures
/// into [`Error`] without touching the existing contents.
fn reserve_heads<V>(heads: &mut Vec<Link<V>>, physical: usize) -> Result<()> {
    let layout = Layout::array::<Link<V>>(physical).map_err(|_| Error::CapacityOverflow)?;
    let additional = physical.saturating_sub(heads.len());
    heads.try_reserve_exact(additional).map_err(|_| {
        log::debug!("bucket array allocation of {physical} heads failed");
        Error::Alloc { layout }
    })
}
