use core::ops::Index;

use super::Multiset;
use crate::Rank;
use crate::comparator::Comparator;

impl<K, C> Multiset<K, C> {
    /// Returns the element at position `rank` in sorted order.
    ///
    /// Every copy of a key occupies its own position, so a key with
    /// multiplicity three fills three consecutive ranks. The rank is
    /// zero-based; returns `None` if `rank >= self.len()`.
    ///
    /// This is an order-statistic extension.
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
    /// set.try_extend([10, 30, 20, 20])?;
    /// assert_eq!(set.get_by_rank(1), Some(&20));
    /// assert_eq!(set.get_by_rank(2), Some(&20));
    /// assert_eq!(set.get_by_rank(3), Some(&30));
    /// assert!(set.get_by_rank(4).is_none());
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<&K> {
        self.tree.get_by_rank(rank)
    }
}

impl<K, C: Comparator<K>> Multiset<K, C> {
    /// Returns the position of the first copy of `key` in sorted order, or
    /// `None` if the key is not present.
    ///
    /// This is an order-statistic extension.
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
    /// set.try_extend([10, 10, 20])?;
    /// assert_eq!(set.rank_of(&10), Some(0));
    /// assert_eq!(set.rank_of(&20), Some(2));
    /// assert_eq!(set.rank_of(&15), None);
    /// # Ok::<(), tally_tree::Error>(())
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.tree.rank_of(|stored| self.comparator.compare(key, stored))
    }
}

/// Indexes into the multiset by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use tally_tree::{Multiset, Rank};
///
/// let mut set = Multiset::new();
/// set.try_extend([3, 1, 2])?;
/// assert_eq!(set[Rank(1)], 2);
/// # Ok::<(), tally_tree::Error>(())
/// ```
impl<K, C> Index<Rank> for Multiset<K, C> {
    type Output = K;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).expect("index out of bounds")
    }
}
