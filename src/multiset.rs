use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::mem::size_of;

use crate::comparator::{Comparator, NaturalOrder};
use crate::raw::{self, Insertion, RawTree, RemoveMode, Removed};
use crate::Error;

mod capacity;
mod order_statistic;

/// An ordered multiset that stores one record per distinct key.
///
/// Keys are ordered by a [`Comparator`] chosen at construction ([`NaturalOrder`]
/// by default). Putting a key that is already present only bumps its
/// multiplicity, so memory grows with the number of *distinct* keys while
/// [`len`](Multiset::len) counts every copy.
///
/// The records live in an AVL tree, so lookups, insertions and removals take
/// O(log d) time where d is the number of distinct keys.
///
/// It is a logic error for a key to be modified in such a way that its ordering
/// relative to any other key, as determined by the comparator, changes while it
/// is in the multiset. The behavior resulting from such a logic error is not
/// specified, but will be encapsulated to the `Multiset` that observed it and
/// not result in undefined behavior.
///
/// Zero-sized key types are rejected at compile time:
///
/// ```compile_fail
/// use tally_tree::Multiset;
///
/// let units: Multiset<()> = Multiset::new();
/// ```
///
/// # Examples
///
/// ```
/// use tally_tree::Multiset;
///
/// let mut rolls = Multiset::new();
/// for roll in [3, 1, 3, 2] {
///     rolls.put(roll)?;
/// }
///
/// assert_eq!(rolls.len(), 4);
/// assert_eq!(rolls.count(&3), 2);
/// assert!(!rolls.contains(&5));
///
/// assert!(rolls.remove_one(&3));
/// assert_eq!(rolls.count(&3), 1);
///
/// assert!(rolls.remove_all(&3));
/// assert_eq!(rolls.len(), 2);
///
/// rolls.clear();
/// assert!(rolls.is_empty());
/// # Ok::<(), tally_tree::Error>(())
/// ```
pub struct Multiset<K, C = NaturalOrder> {
    tree: RawTree<K>,
    comparator: C,
    // Sum of all multiplicities.
    len: usize,
}

/// An iterator over the distinct keys of a `Multiset` and their multiplicities.
///
/// This `struct` is created by the [`iter`] method on [`Multiset`].
///
/// # Examples
///
/// ```
/// use tally_tree::Multiset;
///
/// let mut set = Multiset::new();
/// set.try_extend(["b", "a", "b"])?;
///
/// let mut iter = set.iter();
/// assert_eq!(iter.next(), Some((&"a", 1)));
/// assert_eq!(iter.next(), Some((&"b", 2)));
/// assert_eq!(iter.next(), None);
/// # Ok::<(), tally_tree::Error>(())
/// ```
///
/// [`iter`]: Multiset::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K: 'a> {
    inner: raw::Iter<'a, K>,
}

impl<K: Ord> Multiset<K> {
    /// Makes a new, empty `Multiset` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set: Multiset<u64> = Multiset::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, C: Comparator<K>> Multiset<K, C> {
    /// Makes a new, empty `Multiset` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut descending = Multiset::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// descending.put(1)?;
    /// descending.put(9)?;
    /// assert_eq!(descending.first(), Some((&9, 1)));
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        const { assert!(size_of::<K>() > 0, "`Multiset` keys must not be zero-sized") };
        Self {
            tree: RawTree::new(),
            comparator,
            len: 0,
        }
    }

    /// Adds one copy of `key`.
    ///
    /// If an equal key is already present its multiplicity is incremented and
    /// `key` is dropped. Otherwise `key` is stored in a new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] or [`Error::CapacityExceeded`] if a
    /// new record cannot be allocated, and [`Error::CountOverflow`] if the total
    /// count would overflow. The multiset is unchanged on error.
    ///
    /// # Complexity
    ///
    /// O(log d)
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.put('x')?;
    /// set.put('x')?;
    /// assert_eq!(set.count(&'x'), 2);
    /// assert_eq!(set.distinct_len(), 1);
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    pub fn put(&mut self, key: K) -> Result<(), Error> {
        let len = self.len.checked_add(1).ok_or(Error::CountOverflow)?;
        let comparator = &self.comparator;
        if self.tree.insert(key, |a, b| comparator.compare(a, b))? == Insertion::Linked {
            trace!("linked new record, {} distinct keys", self.tree.distinct_len());
        }
        self.len = len;
        debug_assert_eq!(self.len, self.tree.weight());
        Ok(())
    }

    /// Returns how many copies of `key` the multiset holds; zero if none.
    ///
    /// # Complexity
    ///
    /// O(log d)
    #[must_use]
    pub fn count(&self, key: &K) -> usize {
        self.tree.search(|stored| self.comparator.compare(key, stored)).map_or(0, |(_, count)| count)
    }

    /// Returns `true` if at least one copy of `key` is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.put(1)?;
    /// assert!(set.contains(&1));
    /// assert!(!set.contains(&2));
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.count(key) > 0
    }

    /// Returns the stored key equal to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&K> {
        self.tree.search(|stored| self.comparator.compare(key, stored)).map(|(stored, _)| stored)
    }

    /// Removes one copy of `key`. Returns whether a copy was present.
    ///
    /// The key's record is dropped once its last copy is removed.
    ///
    /// # Complexity
    ///
    /// O(log d)
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.try_extend([4, 4])?;
    /// assert!(set.remove_one(&4));
    /// assert!(set.remove_one(&4));
    /// assert!(!set.remove_one(&4));
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    pub fn remove_one(&mut self, key: &K) -> bool {
        self.remove(key, RemoveMode::One)
    }

    /// Removes every copy of `key`. Returns whether any copy was present.
    ///
    /// # Complexity
    ///
    /// O(log d)
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.try_extend([4, 4, 4, 2])?;
    /// assert!(set.remove_all(&4));
    /// assert_eq!(set.len(), 1);
    /// assert!(!set.remove_all(&4));
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    pub fn remove_all(&mut self, key: &K) -> bool {
        self.remove(key, RemoveMode::All)
    }

    fn remove(&mut self, key: &K, mode: RemoveMode) -> bool {
        let comparator = &self.comparator;
        let removed = match self.tree.remove(|stored| comparator.compare(key, stored), mode) {
            None => return false,
            Some(Removed::Decremented) => 1,
            Some(Removed::Unlinked { multiplicity, .. }) => multiplicity,
        };
        self.len -= removed;
        debug_assert_eq!(self.len, self.tree.weight());
        true
    }

    /// Puts every key yielded by `iter`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`put`](Multiset::put). Keys put
    /// before the failure stay in the multiset.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = K>,
    {
        iter.into_iter().try_for_each(|key| self.put(key))
    }
}

impl<K, C> Multiset<K, C> {
    /// Returns the size in bytes of one key.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        size_of::<K>()
    }

    /// Returns the number of elements, counting every copy of every key.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the multiset holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of distinct keys.
    ///
    /// This is an extension; [`len`](Multiset::len) counts duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.try_extend([1, 1, 2])?;
    /// assert_eq!(set.len(), 3);
    /// assert_eq!(set.distinct_len(), 2);
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    #[must_use]
    pub const fn distinct_len(&self) -> usize {
        self.tree.distinct_len()
    }

    /// Returns the comparator ordering this multiset.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the smallest key and its multiplicity.
    #[must_use]
    pub fn first(&self) -> Option<(&K, usize)> {
        self.tree.first()
    }

    /// Returns the largest key and its multiplicity.
    #[must_use]
    pub fn last(&self) -> Option<(&K, usize)> {
        self.tree.last()
    }

    /// Gets an iterator over the distinct keys in ascending order, each paired
    /// with its multiplicity.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    /// Removes every element. The record storage is kept for reuse.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_tree::Multiset;
    ///
    /// let mut set = Multiset::new();
    /// set.try_extend([1, 2, 2])?;
    /// set.clear();
    /// assert!(set.is_empty());
    /// set.put(3)?;
    /// assert_eq!(set.len(), 1);
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }

    /// Frees every record and consumes the multiset.
    ///
    /// Dropping the multiset has the same effect. Taking `self` by value means
    /// no binding can reach the freed storage afterwards.
    pub fn destroy(mut self) {
        self.clear();
        debug!("destroyed multiset");
    }
}

impl<K: Clone, C: Clone> Clone for Multiset<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            comparator: self.comparator.clone(),
            len: self.len,
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for Multiset<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord> Default for Multiset<K> {
    /// Creates an empty `Multiset`.
    fn default() -> Self {
        Self::new()
    }
}

/// Two multisets are equal when they hold equivalent keys with the same
/// multiplicities. Keys are matched with `self`'s comparator, so stored keys
/// that the comparator treats as equal need not be identical.
impl<K, C: Comparator<K>> PartialEq for Multiset<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.distinct_len() == other.distinct_len()
            && self.iter().zip(other.iter()).all(|((a, a_count), (b, b_count))| {
                a_count == b_count && self.comparator.compare(a, b) == Ordering::Equal
            })
    }
}

impl<K, C: Comparator<K>> Eq for Multiset<K, C> {}

impl<'a, K, C> IntoIterator for &'a Multiset<K, C> {
    type Item = (&'a K, usize);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, usize);

    fn next(&mut self) -> Option<(&'a K, usize)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
