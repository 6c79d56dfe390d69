use allocator_api2::alloc::Allocator;
use allocator_api2::boxed::Box;
use allocator_api2::vec::Vec;

use crate::ListError;

/// An owning link to the following node, or `None` at the end of the chain.
pub(crate) type Chain<A> = Option<Box<Node<A>, A>>;

/// Describes a linked list node.
///
/// Each node exclusively owns its payload and the rest of the chain behind it,
/// so the chain is a strict ownership tree: no sharing, no cycles.
///
/// Nodes are only ever rewired through [`Node::link_at`] and [`Node::unlink`],
/// which keep a detached node's `next` empty.
pub(crate) struct Node<A: Allocator> {
    pub payload: Vec<u8, A>,
    pub next: Chain<A>,
}

impl<A: Allocator + Clone> Node<A> {
    /// Allocate a detached node holding a private copy of `bytes`.
    ///
    /// Nothing is leaked if either allocation fails.
    pub fn try_new_in(bytes: &[u8], alloc: &A) -> Result<Box<Self, A>, ListError> {
        let mut payload = Vec::new_in(alloc.clone());
        payload
            .try_reserve_exact(bytes.len())
            .map_err(|_| ListError::AllocationError { bytes: bytes.len() })?;
        payload.extend_from_slice(bytes);

        // on failure the node, and so the payload, is dropped by `try_new_in`
        Box::try_new_in(Self { payload, next: None }, alloc.clone())
            .map_err(|_| ListError::AllocationError { bytes: core::mem::size_of::<Self>() })
    }
}

impl<A: Allocator> Node<A> {
    /// Link a detached `node` in at `slot`, in front of whatever `slot` held.
    ///
    /// Returns the slot behind the newly linked node.
    #[inline]
    pub fn link_at(slot: &mut Chain<A>, mut node: Box<Self, A>) -> &mut Chain<A> {
        debug_assert!(node.next.is_none());

        node.next = slot.take();
        &mut slot.insert(node).next
    }

    /// Detach the node held by `slot`, closing the chain behind it.
    ///
    /// The returned node is detached: its `next` is `None`.
    #[inline]
    pub fn unlink(slot: &mut Chain<A>) -> Option<Box<Self, A>> {
        let mut node = slot.take()?;
        *slot = node.next.take();
        Some(node)
    }

    /// Follow `steps` links from `slot`, returning the slot that many nodes on.
    ///
    /// `Err(CorruptedHandle)` if the chain ends first.
    pub fn seek_mut(mut slot: &mut Chain<A>, steps: usize) -> Result<&mut Chain<A>, ListError> {
        for _ in 0..steps {
            slot = match slot {
                Some(node) => &mut node.next,
                None => return Err(ListError::CorruptedHandle),
            };
        }

        Ok(slot)
    }

    /// Returns the node `steps` links on from `slot`.
    pub fn seek(slot: &Chain<A>, steps: usize) -> Result<&Self, ListError> {
        Self::iter(slot).nth(steps).ok_or(ListError::CorruptedHandle)
    }

    /// Drop every node from `slot` onwards, front to back, leaving `slot` empty.
    ///
    /// Returns the number of nodes released.
    pub fn release_chain(slot: &mut Chain<A>) -> usize {
        let mut released = 0;
        let mut next = slot.take();

        // iterative so long chains don't recurse through `Box`'s drop glue
        while let Some(mut node) = next {
            next = node.next.take();
            released += 1;
        }

        released
    }

    /// Creates an iterator over the chain starting at `slot`.
    #[inline]
    pub fn iter(slot: &Chain<A>) -> Iter<'_, A> {
        Iter(slot.as_deref())
    }
}

/// An iterator over the nodes of a chain.
///
/// This `struct` is created by `Node::iter`. See its documentation for more.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub(crate) struct Iter<'a, A: Allocator>(Option<&'a Node<A>>);

impl<'a, A: Allocator> Clone for Iter<'a, A> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<'a, A: Allocator> Iterator for Iter<'a, A> {
    type Item = &'a Node<A>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.0?;
        self.0 = current.next.as_deref();
        Some(current)
    }
}
