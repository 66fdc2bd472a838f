/// A zero-based position in the sorted order of a multiset, counting duplicates.
///
/// This is an order-statistic extension.
///
/// # Examples
///
/// ```
/// use tally_tree::{Multiset, Rank};
///
/// let mut set = Multiset::new();
/// set.try_extend(["a", "a", "b"])?;
///
/// assert_eq!(set[Rank(1)], "a");
/// assert_eq!(set[Rank(2)], "b");
/// # Ok::<(), tally_tree::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
