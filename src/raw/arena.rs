use alloc::vec::Vec;

use super::handle::{Handle, MAX_DISTINCT};
use crate::Error;

/// Slot table with a free-list of reclaimed handles.
///
/// Records never move once allocated, so a `Handle` stays valid until the slot
/// is taken back.
///
/// The free-list always has room for every slot, so `take` never allocates.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut arena = Self::new();
        arena.try_reserve(capacity)?;
        Ok(arena)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserves room for `additional` more live elements.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let needed = additional.saturating_sub(self.free.len());
        if self.slots.len().saturating_add(needed) > MAX_DISTINCT {
            return Err(Error::CapacityExceeded { max: MAX_DISTINCT });
        }
        self.slots.try_reserve(needed)?;
        let free_target = self.slots.capacity();
        self.free.try_reserve(free_target.saturating_sub(self.free.len()))?;
        Ok(())
    }

    /// Stores `element`, reusing a reclaimed slot when one is available.
    ///
    /// On failure `element` is dropped and the arena is unchanged.
    pub(crate) fn try_alloc(&mut self, element: T) -> Result<Handle, Error> {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.index()] = Some(element);
            return Ok(handle);
        }

        let handle = Handle::new(self.slots.len()).ok_or(Error::CapacityExceeded { max: MAX_DISTINCT })?;
        self.slots.try_reserve(1)?;
        self.free.try_reserve((self.slots.len() + 1).saturating_sub(self.free.len()))?;

        self.slots.push(Some(element));
        Ok(handle)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    /// Forgets every slot while keeping the allocations for reuse.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<T: Clone> Clone for Arena<T> {
    fn clone(&self) -> Self {
        let slots = self.slots.clone();
        let mut free = Vec::with_capacity(slots.capacity());
        free.extend_from_slice(&self.free);
        Self { slots, free }
    }
}
