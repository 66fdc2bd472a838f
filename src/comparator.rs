use core::cmp::Ordering;

/// A total order over keys, fixed for the lifetime of a [`Multiset`](crate::Multiset).
///
/// `compare` must be a strict total order and must answer the same way every
/// time it is asked about the same pair. A comparator that changes its mind
/// breaks every ordering guarantee of the container that holds it. This is a
/// logic error: results become unspecified but memory safety is not affected.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```
/// use tally_tree::Multiset;
///
/// let mut longest_first = Multiset::with_comparator(|a: &&str, b: &&str| b.len().cmp(&a.len()).then(a.cmp(b)));
/// longest_first.put("fig").unwrap();
/// longest_first.put("banana").unwrap();
/// assert_eq!(longest_first.first(), Some((&"banana", 1)));
/// ```
pub trait Comparator<K: ?Sized> {
    /// Orders `a` relative to `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
