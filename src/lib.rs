//! Counting multiset for Rust.
//!
//! This crate provides [`Multiset`], an ordered collection that remembers how
//! many times each distinct key was put. Duplicates share one record, so memory
//! grows with the number of distinct keys while [`Multiset::len`] counts every
//! copy.
//!
//! - [`put`](Multiset::put) / [`remove_one`](Multiset::remove_one) /
//!   [`remove_all`](Multiset::remove_all) - O(log d) updates
//! - [`count`](Multiset::count) / [`contains`](Multiset::contains) - O(log d) lookups
//! - [`get_by_rank`](Multiset::get_by_rank) / [`rank_of`](Multiset::rank_of) -
//!   O(log d) order statistics that count duplicates
//!
//! # Example
//!
//! ```
//! use tally_tree::{Multiset, Rank};
//!
//! let mut words = Multiset::new();
//! for word in "the cat saw the other cat".split(' ') {
//!     words.put(word)?;
//! }
//!
//! assert_eq!(words.len(), 6);
//! assert_eq!(words.distinct_len(), 4);
//! assert_eq!(words.count(&"cat"), 2);
//!
//! // Sorted position, counting duplicates.
//! assert_eq!(words[Rank(0)], "cat");
//! assert_eq!(words[Rank(1)], "cat");
//! assert_eq!(words.rank_of(&"the"), Some(4));
//!
//! assert!(words.remove_all(&"the"));
//! assert_eq!(words.len(), 4);
//! # Ok::<(), tally_tree::Error>(())
//! ```
//!
//! Keys can be ordered by any [`Comparator`], including plain closures:
//!
//! ```
//! use tally_tree::Multiset;
//!
//! let mut by_len = Multiset::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
//! by_len.put("four")?;
//! by_len.put("five")?; // same length, so the same key
//! assert_eq!(by_len.count(&"nine"), 2);
//! # Ok::<(), tally_tree::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Fallible allocation** - `put` reports allocation failure instead of aborting
//! - **`logging`** - Emits `log` records for structural changes
//!
//! # Implementation
//!
//! Records live in an arena and link to each other by index. The tree is kept
//! height-balanced (AVL), and each record caches the total multiplicity of its
//! subtree, which is what makes rank queries logarithmic.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[macro_use]
mod macros;

mod comparator;
mod error;
mod order_statistic;
mod raw;

pub mod multiset;

pub use comparator::{Comparator, NaturalOrder};
pub use error::Error;
pub use multiset::Multiset;
pub use order_statistic::Rank;
