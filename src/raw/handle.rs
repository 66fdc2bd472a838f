use core::num::NonZero;

// Narrow handles under test so the distinct-key budget can be spent in a unit test.
#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Most distinct keys one tree can hold.
///
/// Every distinct key owns exactly one record slot, and slot `i` is stored as
/// `i + 1`. The largest raw value is left unused, so the budget is two below
/// the number of raw values.
#[allow(clippy::cast_lossless)]
pub(crate) const MAX_DISTINCT: usize = RawHandle::MAX as usize - 1;

/// Link from one record to another: the record's slot in the arena.
///
/// `Option<Handle>` child links are the same size as a bare handle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Encodes slot `index`, or `None` once the distinct-key budget is spent.
    #[inline]
    pub(crate) fn new(index: usize) -> Option<Self> {
        if index >= MAX_DISTINCT {
            return None;
        }
        let raw = RawHandle::try_from(index + 1).ok()?;
        NonZero::new(raw).map(Self)
    }

    /// Slot this handle refers to.
    #[inline]
    #[allow(clippy::cast_lossless)]
    pub(crate) const fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}
