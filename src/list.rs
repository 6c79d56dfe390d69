use core::fmt;

use allocator_api2::alloc::{Allocator, Global};

use crate::link::{Iter, Link};
use crate::node::{Chain, Node};
use crate::ListError;

#[cfg(feature = "counters")]
use crate::Counters;

/// An index-addressable, singly-linked list of owned byte payloads.
///
/// Every element is a private copy of the bytes it was pushed with.
/// Elements are addressed by their 0-based position; positional access
/// walks the chain from the front, so it is O(index).
///
/// All memory, for nodes and payloads alike, comes from `A`.
/// Allocation failure is reported as [`ListError::AllocationError`]
/// and leaves the list as it was.
///
/// # Example
/// ```rust
/// use knitlist::{List, ListError};
///
/// let mut list = List::new();
/// list.push(b"Hello").unwrap();
/// list.push(b"world").unwrap();
/// list.push(b"!").unwrap();
///
/// list.reposition(2, 0).unwrap();
/// assert_eq!(list.get(0).unwrap().as_bytes(), b"!");
///
/// list.remove(1).unwrap();
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(2), Err(ListError::IndexError { index: 2, len: 2 }));
/// ```
pub struct List<A: Allocator = Global> {
    head: Chain<A>,
    len: usize,
    alloc: A,

    #[cfg(feature = "counters")]
    pub(crate) counters: Counters,
}

impl List {
    /// Create an empty [`List`] backed by the global allocator.
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<A: Allocator> List<A> {
    /// Create an empty [`List`] that allocates from `alloc`.
    ///
    /// An empty list owns no memory, so this cannot fail.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            head: None,
            len: 0,
            alloc,

            #[cfg(feature = "counters")]
            counters: Counters::new(),
        }
    }

    /// Returns the number of elements. Does not walk the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), ListError> {
        if index < self.len {
            Ok(())
        } else {
            Err(ListError::IndexError { index, len: self.len })
        }
    }

    /// Returns a view of the payload at `index`.
    ///
    /// Fails with [`ListError::IndexError`] unless `index < len`.
    pub fn get(&self, index: usize) -> Result<Link<'_>, ListError> {
        const OP: &str = "List::get";

        self.check_index(index).map_err(|e| reject!(OP, e))?;
        let node = Node::seek(&self.head, index).map_err(|e| reject!(OP, e))?;

        Ok(Link::new(node.payload.as_slice()))
    }

    /// Moves the element at `from` so that it ends up at `to`,
    /// keeping the relative order of every other element.
    ///
    /// Nothing is allocated or freed; only links are rewired.
    /// `from == to` leaves the list untouched.
    ///
    /// Fails with [`ListError::IndexError`] unless both indices are `< len`,
    /// in which case nothing is moved.
    ///
    /// # Example
    /// ```rust
    /// # use knitlist::List;
    /// let mut list = List::new();
    /// for item in [b"a", b"b", b"c", b"d"] {
    ///     list.push(item).unwrap();
    /// }
    ///
    /// list.reposition(3, 1).unwrap();
    /// let order: Vec<&[u8]> = list.iter().map(|link| link.as_bytes()).collect();
    /// assert_eq!(order, [b"a", b"d", b"b", b"c"]);
    /// ```
    pub fn reposition(&mut self, from: usize, to: usize) -> Result<(), ListError> {
        const OP: &str = "List::reposition";

        self.check_index(from)
            .and_then(|()| self.check_index(to))
            .map_err(|e| reject!(OP, e))?;

        if from != to {
            let slot = Node::seek_mut(&mut self.head, from).map_err(|e| reject!(OP, e))?;
            let node = Node::unlink(slot).ok_or_else(|| reject!(OP, ListError::CorruptedHandle))?;

            // the chain is one short now, so `to` is at most its length
            if let Ok(slot) = Node::seek_mut(&mut self.head, to) {
                Node::link_at(slot, node);
            } else {
                if let Ok(slot) = Node::seek_mut(&mut self.head, from) {
                    Node::link_at(slot, node);
                }
                return Err(reject!(OP, ListError::CorruptedHandle));
            }

            #[cfg(feature = "counters")]
            self.counters.account_traverse(from + to);

            log::trace!("{}: {} -> {}", OP, from, to);
        }

        #[cfg(feature = "counters")]
        self.counters.account_reposition();

        Ok(())
    }

    /// Unlinks the element at `index` and frees it.
    ///
    /// Fails with [`ListError::IndexError`] unless `index < len`,
    /// which makes removing from an empty list an error.
    pub fn remove(&mut self, index: usize) -> Result<(), ListError> {
        const OP: &str = "List::remove";

        self.check_index(index).map_err(|e| reject!(OP, e))?;

        let slot = Node::seek_mut(&mut self.head, index).map_err(|e| reject!(OP, e))?;
        let node = Node::unlink(slot).ok_or_else(|| reject!(OP, ListError::CorruptedHandle))?;
        self.len -= 1;

        #[cfg(feature = "counters")]
        {
            self.counters.account_traverse(index);
            self.counters.account_dealloc(node.payload.len());
        }

        log::trace!("{}: {} bytes at {}, {} left", OP, node.payload.len(), index, self.len);

        drop(node);
        Ok(())
    }

    /// Frees every element, front to back. The list stays usable.
    pub fn clear(&mut self) {
        let released = Node::release_chain(&mut self.head);
        debug_assert_eq!(released, self.len);

        self.len = 0;

        #[cfg(feature = "counters")]
        self.counters.account_clear();
    }

    /// Returns an iterator over views of the elements, front to back.
    #[inline]
    pub fn iter(&self) -> Iter<'_, A> {
        Iter::new(Node::iter(&self.head), self.len)
    }
}

impl<A: Allocator + Clone> List<A> {
    /// Appends a private copy of `bytes` as the new last element.
    ///
    /// Seeks the tail from the front, so this is O(len).
    /// On [`ListError::AllocationError`] the list is unchanged.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ListError> {
        const OP: &str = "List::push";

        let tail = Node::seek_mut(&mut self.head, self.len).map_err(|e| reject!(OP, e))?;
        if tail.is_some() {
            return Err(reject!(OP, ListError::CorruptedHandle));
        }

        let node = Node::try_new_in(bytes, &self.alloc).map_err(|e| reject!(OP, e))?;
        Node::link_at(tail, node);

        #[cfg(feature = "counters")]
        {
            self.counters.account_traverse(self.len);
            self.counters.account_alloc(bytes.len());
        }

        self.len += 1;

        log::trace!("{}: {} bytes at {}", OP, bytes.len(), self.len - 1);
        Ok(())
    }

    /// Creates an independent deep copy: the same payloads, in the same order,
    /// in freshly allocated nodes from a clone of the allocator.
    ///
    /// On [`ListError::AllocationError`] the partial copy is freed
    /// and `self` is untouched.
    ///
    /// # Example
    /// ```rust
    /// # use knitlist::List;
    /// let mut list = List::new();
    /// list.push(b"shared?").unwrap();
    ///
    /// let mut copy = list.try_clone().unwrap();
    /// copy.remove(0).unwrap();
    ///
    /// assert_eq!(list.len(), 1);
    /// assert!(copy.is_empty());
    /// ```
    pub fn try_clone(&self) -> Result<Self, ListError> {
        const OP: &str = "List::try_clone";

        let mut copy = Self::new_in(self.alloc.clone());
        let mut tail = &mut copy.head;

        for node in Node::iter(&self.head) {
            let duplicate = Node::try_new_in(&node.payload, &self.alloc).map_err(|e| reject!(OP, e))?;
            tail = Node::link_at(tail, duplicate);
            copy.len += 1;

            #[cfg(feature = "counters")]
            copy.counters.account_alloc(node.payload.len());
        }

        debug_assert_eq!(copy.len, self.len);

        log::trace!("{}: copied {} elements", OP, copy.len);
        Ok(copy)
    }
}

impl<A: Allocator> Drop for List<A> {
    fn drop(&mut self) {
        Node::release_chain(&mut self.head);
    }
}

impl<A: Allocator + Default> Default for List<A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<A: Allocator> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<A: Allocator, B: Allocator> PartialEq<List<B>> for List<A> {
    fn eq(&self, other: &List<B>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<A: Allocator> Eq for List<A> {}

impl<'a, A: Allocator> IntoIterator for &'a List<A> {
    type Item = Link<'a>;
    type IntoIter = Iter<'a, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
