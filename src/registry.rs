//! Handle-addressed lists.
//!
//! A [`Registry`] owns any number of [`List`]s and hands out copyable
//! [`ListHandle`]s to them. Unlike references, handles can be null or outlive
//! the list they named; both are detected and rejected, as
//! [`ListError::NullArgument`] and [`ListError::CorruptedHandle`] respectively.

use allocator_api2::alloc::{Allocator, Global};
use allocator_api2::vec::Vec;

use crate::{Link, List, ListError};

/// Names a list owned by a [`Registry`].
///
/// Each slot carries a generation that is bumped when its list is destroyed,
/// so a handle to a destroyed list never resolves to a list created later in the same slot.
/// A slot whose generation would wrap is retired instead of reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListHandle {
    index: u32,
    generation: u32,
}

impl ListHandle {
    /// The null handle. It never names a list.
    pub const NULL: Self = Self { index: u32::MAX, generation: 0 };

    /// Returns `true` if this is [`ListHandle::NULL`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for ListHandle {
    fn default() -> Self {
        Self::NULL
    }
}

enum Slot<A: Allocator> {
    Occupied { generation: u32, list: List<A> },
    Vacant { generation: u32, next_vacant: Option<u32> },
}

/// Owns lists and resolves [`ListHandle`]s to them.
///
/// The slot table and every list share the allocator `A`.
///
/// # Example
/// ```rust
/// use knitlist::{ListError, ListHandle, Registry};
///
/// let mut lists = Registry::new();
/// let handle = lists.create().unwrap();
///
/// lists.push(handle, b"Hello").unwrap();
/// let copy = lists.duplicate(handle).unwrap();
/// lists.destroy(handle).unwrap();
///
/// assert_eq!(lists.len(copy), Ok(1));
/// assert_eq!(lists.len(handle), Err(ListError::CorruptedHandle));
/// assert_eq!(lists.len(ListHandle::NULL), Err(ListError::NullArgument));
/// ```
pub struct Registry<A: Allocator + Clone = Global> {
    slots: Vec<Slot<A>, A>,
    vacant_head: Option<u32>,
    live: usize,
    alloc: A,
}

impl<A: Allocator + Clone> core::fmt::Debug for Registry<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("live", &self.live)
            .field("slots", &self.slots.len())
            .field("vacant_head", &self.vacant_head)
            .finish()
    }
}

impl Registry {
    /// Create an empty [`Registry`] backed by the global allocator.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator + Clone> Registry<A> {
    /// Create an empty [`Registry`] that allocates from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self { slots: Vec::new_in(alloc.clone()), vacant_head: None, live: 0, alloc }
    }

    /// Returns the number of live lists.
    #[inline]
    pub fn list_count(&self) -> usize {
        self.live
    }

    /// Returns `true` if `handle` names a live list.
    pub fn contains(&self, handle: ListHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    fn resolve(&self, handle: ListHandle) -> Result<&List<A>, ListError> {
        if handle.is_null() {
            return Err(ListError::NullArgument);
        }

        match self.slots.get(handle.index as usize) {
            Some(Slot::Occupied { generation, list }) if *generation == handle.generation => Ok(list),
            _ => Err(ListError::CorruptedHandle),
        }
    }

    fn resolve_mut(&mut self, handle: ListHandle) -> Result<&mut List<A>, ListError> {
        if handle.is_null() {
            return Err(ListError::NullArgument);
        }

        match self.slots.get_mut(handle.index as usize) {
            Some(Slot::Occupied { generation, list }) if *generation == handle.generation => Ok(list),
            _ => Err(ListError::CorruptedHandle),
        }
    }

    /// Take ownership of `list`, returning its new handle.
    ///
    /// On failure `list` is dropped.
    fn insert(&mut self, list: List<A>) -> Result<ListHandle, ListError> {
        if let Some(index) = self.vacant_head {
            let slot = self.slots.get_mut(index as usize).ok_or(ListError::CorruptedHandle)?;
            let Slot::Vacant { generation, next_vacant } = *slot else {
                return Err(ListError::CorruptedHandle);
            };

            *slot = Slot::Occupied { generation, list };
            self.vacant_head = next_vacant;
            self.live += 1;
            return Ok(ListHandle { index, generation });
        }

        let slot_size = core::mem::size_of::<Slot<A>>();
        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&index| index != ListHandle::NULL.index)
            .ok_or(ListError::AllocationError { bytes: slot_size })?;

        self.slots
            .try_reserve(1)
            .map_err(|_| ListError::AllocationError { bytes: slot_size })?;
        self.slots.push(Slot::Occupied { generation: 0, list });
        self.live += 1;

        Ok(ListHandle { index, generation: 0 })
    }

    /// Create an empty list.
    ///
    /// Fails with [`ListError::AllocationError`] if the slot table can't grow.
    pub fn create(&mut self) -> Result<ListHandle, ListError> {
        let list = List::new_in(self.alloc.clone());
        let handle = self.insert(list).map_err(|e| reject!("Registry::create", e))?;

        log::trace!("Registry::create: {:?}", handle);
        Ok(handle)
    }

    /// Create a deep copy of the list named by `handle`. See [`List::try_clone`].
    pub fn duplicate(&mut self, handle: ListHandle) -> Result<ListHandle, ListError> {
        const OP: &str = "Registry::duplicate";

        let copy = self.resolve(handle).map_err(|e| reject!(OP, e))?.try_clone()?;
        let copy_handle = self.insert(copy).map_err(|e| reject!(OP, e))?;

        log::trace!("{}: {:?} -> {:?}", OP, handle, copy_handle);
        Ok(copy_handle)
    }

    /// Destroy the list named by `handle`, freeing every element front to back.
    ///
    /// `handle` is invalid afterwards: using it again yields [`ListError::CorruptedHandle`].
    pub fn destroy(&mut self, handle: ListHandle) -> Result<(), ListError> {
        const OP: &str = "Registry::destroy";

        self.resolve(handle).map_err(|e| reject!(OP, e))?;

        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .ok_or_else(|| reject!(OP, ListError::CorruptedHandle))?;

        let destroyed = match handle.generation.checked_add(1) {
            Some(generation) => {
                let vacant = Slot::Vacant { generation, next_vacant: self.vacant_head };
                self.vacant_head = Some(handle.index);
                core::mem::replace(slot, vacant)
            }
            // every generation has been handed out, so the slot is retired
            None => {
                log::debug!("{}: retiring slot {}", OP, handle.index);
                core::mem::replace(slot, Slot::Vacant { generation: u32::MAX, next_vacant: None })
            }
        };

        self.live -= 1;

        drop(destroyed);

        log::trace!("{}: {:?}", OP, handle);
        Ok(())
    }

    /// Returns the list named by `handle`.
    pub fn list(&self, handle: ListHandle) -> Result<&List<A>, ListError> {
        self.resolve(handle).map_err(|e| reject!("Registry::list", e))
    }

    /// Returns the list named by `handle`, mutably.
    pub fn list_mut(&mut self, handle: ListHandle) -> Result<&mut List<A>, ListError> {
        self.resolve_mut(handle).map_err(|e| reject!("Registry::list_mut", e))
    }

    /// See [`List::push`].
    pub fn push(&mut self, handle: ListHandle, bytes: &[u8]) -> Result<(), ListError> {
        self.resolve_mut(handle).map_err(|e| reject!("Registry::push", e))?.push(bytes)
    }

    /// See [`List::get`].
    pub fn get(&self, handle: ListHandle, index: usize) -> Result<Link<'_>, ListError> {
        self.resolve(handle).map_err(|e| reject!("Registry::get", e))?.get(index)
    }

    /// See [`List::reposition`].
    pub fn reposition(&mut self, handle: ListHandle, from: usize, to: usize) -> Result<(), ListError> {
        self.resolve_mut(handle)
            .map_err(|e| reject!("Registry::reposition", e))?
            .reposition(from, to)
    }

    /// See [`List::remove`].
    pub fn remove(&mut self, handle: ListHandle, index: usize) -> Result<(), ListError> {
        self.resolve_mut(handle).map_err(|e| reject!("Registry::remove", e))?.remove(index)
    }

    /// Returns the length of the list named by `handle`.
    pub fn len(&self, handle: ListHandle) -> Result<usize, ListError> {
        self.resolve(handle).map(List::len).map_err(|e| reject!("Registry::len", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{capture_logs, Budgeted};

    #[test]
    fn test_create_destroy_reuse() {
        let mut lists = Registry::new();

        let a = lists.create().unwrap();
        let b = lists.create().unwrap();
        assert_ne!(a, b);
        assert_eq!(lists.list_count(), 2);

        lists.push(a, b"in a").unwrap();
        lists.push(b, b"in b").unwrap();

        lists.destroy(a).unwrap();
        assert_eq!(lists.list_count(), 1);
        assert!(!lists.contains(a));

        // the vacated slot is reused under a new generation
        let c = lists.create().unwrap();
        assert_eq!(c.index, a.index);
        assert_ne!(c, a);

        assert!(lists.list(c).unwrap().is_empty());
        assert_eq!(lists.len(a), Err(ListError::CorruptedHandle));
        assert_eq!(lists.push(a, b"stale"), Err(ListError::CorruptedHandle));
        assert!(lists.list(c).unwrap().is_empty());

        assert_eq!(lists.get(b, 0).unwrap().as_bytes(), b"in b");
    }

    #[test]
    fn test_invalid_handles() {
        let mut lists = Registry::new();
        let null = ListHandle::default();
        assert!(null.is_null());

        assert_eq!(lists.len(null), Err(ListError::NullArgument));
        assert_eq!(lists.push(null, b"x"), Err(ListError::NullArgument));
        assert_eq!(lists.get(null, 0).err(), Some(ListError::NullArgument));
        assert_eq!(lists.reposition(null, 0, 0), Err(ListError::NullArgument));
        assert_eq!(lists.remove(null, 0), Err(ListError::NullArgument));
        assert_eq!(lists.duplicate(null), Err(ListError::NullArgument));
        assert_eq!(lists.destroy(null), Err(ListError::NullArgument));

        let handle = lists.create().unwrap();
        lists.destroy(handle).unwrap();

        assert_eq!(lists.destroy(handle), Err(ListError::CorruptedHandle));
        assert_eq!(lists.len(handle), Err(ListError::CorruptedHandle));
        assert_eq!(lists.duplicate(handle), Err(ListError::CorruptedHandle));
        assert_eq!(lists.list_mut(handle).err(), Some(ListError::CorruptedHandle));

        // never issued by this registry
        let foreign = ListHandle { index: 7, generation: 0 };
        assert_eq!(lists.len(foreign), Err(ListError::CorruptedHandle));
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut lists = Registry::new();
        let first = lists.create().unwrap();
        lists.destroy(first).unwrap();

        // stand in for 2^32 - 1 destroy/create cycles on slot 0
        let last = ListHandle { index: first.index, generation: u32::MAX };
        lists.slots[0] = Slot::Occupied { generation: u32::MAX, list: List::new() };
        lists.vacant_head = None;
        lists.live += 1;

        lists.destroy(last).unwrap();
        assert_eq!(lists.list_count(), 0);
        assert_eq!(lists.vacant_head, None);

        let next = lists.create().unwrap();
        assert_ne!(next.index, first.index);

        for stale in [first, last, ListHandle { index: first.index, generation: 0 }] {
            assert_eq!(lists.len(stale), Err(ListError::CorruptedHandle));
        }
        assert_eq!(lists.len(next), Ok(0));
    }

    #[test]
    fn test_rejection_logged_at_registry() {
        let mut lists = Registry::new();
        let handle = lists.create().unwrap();
        lists.destroy(handle).unwrap();

        let (result, records) = capture_logs(|| lists.push(handle, b"late"));
        assert_eq!(result, Err(ListError::CorruptedHandle));

        assert_eq!(records.len(), 1);
        assert!(records[0].file.ends_with("registry.rs"), "{:?}", records[0]);
        assert_eq!(records[0].message, "Registry::push: corrupted or destroyed list handle");
    }

    #[test]
    fn test_operations_through_handles() {
        let mut lists = Registry::new();
        let handle = lists.create().unwrap();

        for item in [b"a", b"b", b"c", b"d"] {
            lists.push(handle, item).unwrap();
        }

        lists.reposition(handle, 3, 1).unwrap();
        assert_contents!(lists.list(handle).unwrap(), [b"a", b"d", b"b", b"c"]);

        lists.remove(handle, 0).unwrap();
        assert_eq!(lists.len(handle), Ok(3));
        assert_eq!(lists.remove(handle, 3), Err(ListError::IndexError { index: 3, len: 3 }));

        lists.list_mut(handle).unwrap().clear();
        assert_eq!(lists.len(handle), Ok(0));
        assert_eq!(lists.get(handle, 0).err(), Some(ListError::IndexError { index: 0, len: 0 }));
    }

    #[test]
    fn test_duplicate_independence() {
        let mut lists = Registry::new();
        let original = lists.create().unwrap();
        lists.push(original, b"one").unwrap();
        lists.push(original, b"two").unwrap();

        let copy = lists.duplicate(original).unwrap();
        assert_eq!(lists.list(original).unwrap(), lists.list(copy).unwrap());

        lists.remove(copy, 0).unwrap();
        lists.push(original, b"three").unwrap();

        assert_contents!(lists.list(original).unwrap(), [b"one", b"two", b"three"]);
        assert_contents!(lists.list(copy).unwrap(), [b"two"]);

        lists.destroy(original).unwrap();
        assert_contents!(lists.list(copy).unwrap(), [b"two"]);
    }

    #[test]
    fn test_alloc_failure() {
        let budget = Budgeted::new(0);
        let mut lists = Registry::new_in(&budget);

        assert!(matches!(lists.create(), Err(ListError::AllocationError { .. })));
        assert_eq!(lists.list_count(), 0);
        assert_eq!(budget.live(), 0);

        budget.refill(16);
        let handle = lists.create().unwrap();
        let empty = lists.create().unwrap();
        lists.push(handle, b"abc").unwrap();
        let baseline = budget.live();

        // payload copied, node refused
        budget.refill(1);
        assert!(matches!(lists.duplicate(handle), Err(ListError::AllocationError { .. })));
        assert_eq!(budget.live(), baseline);
        assert_eq!(lists.list_count(), 2);

        // fill the slot table's spare capacity without allocating
        budget.refill(0);
        while lists.slots.len() < lists.slots.capacity() {
            lists.create().unwrap();
        }

        // an empty copy needs no allocation, but the full slot table must grow to hold it
        assert!(matches!(lists.duplicate(empty), Err(ListError::AllocationError { .. })));
        assert!(matches!(lists.create(), Err(ListError::AllocationError { .. })));
        assert_eq!(lists.list_count(), lists.slots.len());
        assert_eq!(budget.live(), baseline);

        // payload and node
        lists.destroy(handle).unwrap();
        assert_eq!(budget.live(), baseline - 2);

        // a vacated slot needs no allocation
        let reused = lists.create().unwrap();
        assert!(lists.contains(reused));

        drop(lists);
        assert_eq!(budget.live(), 0);
    }
}
