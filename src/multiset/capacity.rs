use super::Multiset;
use crate::comparator::{Comparator, NaturalOrder};
use crate::raw::{self, RawTree};
use crate::Error;

impl<K: Ord> Multiset<K> {
    /// Creates an empty multiset with room for at least `capacity` distinct keys.
    ///
    /// This is an extension for callers that want allocation failure reported
    /// up front instead of on a later [`put`](Multiset::put).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the storage cannot be reserved and
    /// [`Error::CapacityExceeded`] if `capacity` is larger than
    /// [`MAX_DISTINCT_KEYS`](Multiset::MAX_DISTINCT_KEYS).
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let set: Multiset<i32> = Multiset::try_with_capacity(16)?;
    /// assert!(set.capacity() >= 16);
    /// assert!(set.is_empty());
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<K, C: Comparator<K>> Multiset<K, C> {
    /// Creates an empty multiset ordered by `comparator` with room for at least
    /// `capacity` distinct keys.
    ///
    /// # Errors
    ///
    /// As for [`try_with_capacity`](Multiset::try_with_capacity).
    pub fn try_with_capacity_and_comparator(capacity: usize, comparator: C) -> Result<Self, Error> {
        let mut set = Self::with_comparator(comparator);
        set.tree = RawTree::try_with_capacity(capacity)?;
        debug!("reserved room for {} distinct keys", capacity);
        Ok(set)
    }
}

impl<K, C> Multiset<K, C> {
    /// Most distinct keys a single multiset can hold.
    pub const MAX_DISTINCT_KEYS: usize = raw::MAX_DISTINCT;

    /// Returns how many distinct keys fit without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves room for at least `additional` more distinct keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the storage cannot be grown and
    /// [`Error::CapacityExceeded`] if the result would exceed
    /// [`MAX_DISTINCT_KEYS`](Multiset::MAX_DISTINCT_KEYS). The multiset is
    /// unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set: Multiset<u8> = Multiset::new();
    /// set.try_reserve(10)?;
    /// assert!(set.capacity() >= 10);
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.tree.try_reserve(additional)
    }
}
