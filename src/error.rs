//! Error type for fallible multiset operations.
//!
//! Only resource exhaustion is reported as an error. A key that is not present
//! is a normal outcome (`false` or a zero count), never an `Error`.

use alloc::collections::TryReserveError;
use core::fmt::{self, Display, Formatter};

/// Failure of a mutating [`Multiset`](crate::Multiset) operation.
///
/// Every operation returning this error leaves the multiset exactly as it was
/// before the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The global allocator could not provide memory for a new record.
    AllocationFailed,

    /// The record arena has handed out every handle it can address.
    CapacityExceeded {
        /// Maximum number of distinct keys the arena can hold.
        max: usize,
    },

    /// The total element count would no longer fit in a `usize`.
    CountOverflow,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed => write!(f, "memory allocation failed"),
            Self::CapacityExceeded { max } => {
                write!(f, "record arena is full ({max} distinct keys)")
            }
            Self::CountOverflow => write!(f, "element count overflows usize"),
        }
    }
}

impl core::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::AllocationFailed
    }
}
