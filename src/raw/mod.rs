mod arena;
mod handle;
mod node;
mod raw_tree;

pub(crate) use handle::MAX_DISTINCT;
pub(crate) use raw_tree::{Insertion, Iter, RawTree, RemoveMode, Removed};
