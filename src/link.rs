//! Borrowed views onto the payloads held by a [`List`](crate::List).

use core::fmt;
use core::iter::FusedIterator;
use core::ops::Deref;

use allocator_api2::alloc::Allocator;

use crate::node;

/// A read-only view of one element's payload.
///
/// Returned by [`List::get`](crate::List::get) and [`List::iter`](crate::List::iter).
/// The view borrows the list, so it cannot outlive the element
/// or survive a structural change to the list.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link<'a> {
    bytes: &'a [u8],
}

impl<'a> Link<'a> {
    #[inline]
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The payload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The payload's size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is zero bytes long.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Deref for Link<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for Link<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl PartialEq<[u8]> for Link<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for Link<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for Link<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.bytes == &other[..]
    }
}

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // payloads are opaque, but text is common enough to be worth showing as such
        match core::str::from_utf8(self.bytes) {
            Ok(text) => write!(f, "{:?} ({} bytes)", text, self.bytes.len()),
            Err(_) => write!(f, "{:x?}", self.bytes),
        }
    }
}

/// An iterator over the elements of a [`List`](crate::List), front to back.
///
/// This `struct` is created by [`List::iter`](crate::List::iter). See its documentation for more.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, A: Allocator> {
    nodes: node::Iter<'a, A>,
    remaining: usize,
}

impl<'a, A: Allocator> Iter<'a, A> {
    #[inline]
    pub(crate) fn new(nodes: node::Iter<'a, A>, len: usize) -> Self {
        Self { nodes, remaining: len }
    }
}

impl<'a, A: Allocator> Clone for Iter<'a, A> {
    fn clone(&self) -> Self {
        Self { nodes: self.nodes.clone(), remaining: self.remaining }
    }
}

impl<A: Allocator> fmt::Debug for Iter<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a, A: Allocator> Iterator for Iter<'a, A> {
    type Item = Link<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(Link::new(node.payload.as_slice()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<A: Allocator> ExactSizeIterator for Iter<'_, A> {}

impl<A: Allocator> FusedIterator for Iter<'_, A> {}
