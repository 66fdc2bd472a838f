use core::cmp::Ordering;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::Error;

/// AVL tree of distinct keys backing `Multiset`.
///
/// The tree never sees the comparator type. Searches are driven by a probe
/// closure that orders the searched key against a stored key, so that
/// `Ordering::Less` means "descend left".
#[derive(Clone)]
pub(crate) struct RawTree<K> {
    /// Arena storing all records.
    nodes: Arena<Node<K>>,
    /// Handle to the root record, if the tree is non-empty.
    root: Option<Handle>,
}

/// Outcome of a successful insertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Insertion {
    /// The key was already present; its multiplicity went up by one.
    Incremented,
    /// A new record was linked in.
    Linked,
}

/// How much of a key a removal takes out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RemoveMode {
    One,
    All,
}

/// Structural shape of the record that was unlinked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Unlink {
    /// No children: the parent link is cleared.
    Leaf,
    /// One child: the child takes the record's place.
    OneChild,
    /// Two children: the in-order successor's payload moved into the record and
    /// the successor was spliced out instead.
    TwoChildren,
}

/// Outcome of a removal that found its key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Removed {
    /// Multiplicity dropped by one; the shape is unchanged.
    Decremented,
    /// The record left the tree along with all of its copies.
    Unlinked {
        multiplicity: usize,
        // Read by tests and by `logging` builds.
        #[cfg_attr(not(feature = "logging"), allow(dead_code))]
        case: Unlink,
    },
}

/// Path element for tracking traversal during mutations.
struct PathElement {
    /// Handle to the record at this level.
    node: Handle,
    /// Child link we descended through.
    side: Side,
}

// AVL height stays below 1.45 * log2(n + 2), so a u32 handle space never
// needs more than 47 levels.
type Path = SmallVec<[PathElement; 64]>;
type Stack = SmallVec<[Handle; 64]>;

impl<K> RawTree<K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a tree with room for `capacity` distinct keys.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            nodes: Arena::try_with_capacity(capacity)?,
            root: None,
        })
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        self.nodes.try_reserve(additional)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of records, one per distinct key.
    pub(crate) const fn distinct_len(&self) -> usize {
        self.nodes.len()
    }

    /// Sum of multiplicities over the whole tree.
    pub(crate) fn weight(&self) -> usize {
        self.summary(self.root).1
    }

    /// Height of the tree; zero when empty.
    #[cfg(test)]
    pub(crate) fn height(&self) -> u8 {
        self.summary(self.root).0
    }

    pub(crate) fn first(&self) -> Option<(&K, usize)> {
        self.extreme(Side::Left)
    }

    pub(crate) fn last(&self) -> Option<(&K, usize)> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<(&K, usize)> {
        let mut current = self.root?;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        let node = self.nodes.get(current);
        Some((node.key(), node.count()))
    }

    /// Returns the record matching `probe`, if any.
    pub(crate) fn search<F>(&self, mut probe: F) -> Option<(&K, usize)>
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match probe(node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some((node.key(), node.count())),
            };
        }
        None
    }

    /// Returns the key at zero-based position `rank`, counting every copy.
    pub(crate) fn get_by_rank(&self, mut rank: usize) -> Option<&K> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left = self.summary(node.left()).1;
            if rank < left {
                current = node.left();
                continue;
            }
            rank -= left;
            if rank < node.count() {
                return Some(node.key());
            }
            rank -= node.count();
            current = node.right();
        }
        None
    }

    /// Returns the position of the first copy of the key matching `probe`.
    pub(crate) fn rank_of<F>(&self, mut probe: F) -> Option<usize>
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut rank = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match probe(node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += self.summary(node.left()).1 + node.count();
                    current = node.right();
                }
                Ordering::Equal => return Some(rank + self.summary(node.left()).1),
            }
        }
        None
    }

    /// Inserts one copy of `key`.
    ///
    /// The record is allocated before any link changes, so on error the tree is
    /// exactly as it was. The caller guarantees the total weight cannot overflow.
    pub(crate) fn insert<F>(&mut self, key: K, mut compare: F) -> Result<Insertion, Error>
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let (found, path) = self.descend(|stored| compare(&key, stored));

        if let Some(handle) = found {
            self.nodes.get_mut(handle).increment();
            self.update(handle);
            self.retrace(&path);
            return Ok(Insertion::Incremented);
        }

        let handle = self.nodes.try_alloc(Node::new(key))?;
        self.relink(&path, path.len(), Some(handle));
        self.retrace(&path);
        Ok(Insertion::Linked)
    }

    /// Removes one copy, or every copy, of the key matching `probe`.
    pub(crate) fn remove<F>(&mut self, probe: F, mode: RemoveMode) -> Option<Removed>
    where
        F: FnMut(&K) -> Ordering,
    {
        let (found, mut path) = self.descend(probe);
        let target = found?;
        let multiplicity = self.nodes.get(target).count();

        if mode == RemoveMode::One && multiplicity > 1 {
            self.nodes.get_mut(target).decrement();
            self.update(target);
            self.retrace(&path);
            return Some(Removed::Decremented);
        }

        let case = self.unlink(target, &mut path);
        trace!("unlinked record holding {} copies ({:?})", multiplicity, case);
        Some(Removed::Unlinked { multiplicity, case })
    }

    /// Frees every record with an explicit stack and returns how many were freed.
    pub(crate) fn clear(&mut self) -> usize {
        let mut released = 0;
        let mut stack = Stack::new();
        stack.extend(self.root.take());

        while let Some(handle) = stack.pop() {
            let node = self.nodes.take(handle);
            stack.extend(node.left());
            stack.extend(node.right());
            drop(node);
            released += 1;
        }

        debug_assert!(self.nodes.is_empty(), "`RawTree::clear()` - unreachable records remain!");
        self.nodes.clear();
        debug!("released {} records", released);
        released
    }

    pub(crate) fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Walks from the root following `probe`.
    ///
    /// Returns the matching record, if any, and the path of records above the
    /// point where the search stopped.
    fn descend<F>(&self, mut probe: F) -> (Option<Handle>, Path)
    where
        F: FnMut(&K) -> Ordering,
    {
        let mut path = Path::new();
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match probe(node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return (Some(handle), path),
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }

        (None, path)
    }

    /// Takes `target` out of the tree and rebalances every ancestor.
    fn unlink(&mut self, target: Handle, path: &mut Path) -> Unlink {
        let node = self.nodes.get(target);
        let (left, right) = (node.left(), node.right());

        let case = match (left, right) {
            (Some(_), Some(right)) => {
                // Walk to the in-order successor, which has no left child.
                path.push(PathElement {
                    node: target,
                    side: Side::Right,
                });
                let mut successor = right;
                while let Some(next) = self.nodes.get(successor).left() {
                    path.push(PathElement {
                        node: successor,
                        side: Side::Left,
                    });
                    successor = next;
                }

                let successor = self.nodes.take(successor);
                let orphan = successor.right();
                let (key, count) = successor.into_payload();
                drop(self.nodes.get_mut(target).replace_payload(key, count));
                self.relink(path, path.len(), orphan);
                Unlink::TwoChildren
            }
            (None, None) => {
                self.nodes.free(target);
                self.relink(path, path.len(), None);
                Unlink::Leaf
            }
            (child @ Some(_), None) | (None, child @ Some(_)) => {
                self.nodes.free(target);
                self.relink(path, path.len(), child);
                Unlink::OneChild
            }
        };

        self.retrace(path);
        case
    }

    /// Rebalances each record on `path`, deepest first, and relinks the
    /// resulting subtree roots.
    fn retrace(&mut self, path: &Path) {
        for (depth, element) in path.iter().enumerate().rev() {
            let subtree = self.rebalance(element.node);
            self.relink(path, depth, Some(subtree));
        }
    }

    /// Points the link that led to `path[depth]` at `subtree`.
    ///
    /// With `depth == path.len()` this is the link below the last path element.
    fn relink(&mut self, path: &Path, depth: usize, subtree: Option<Handle>) {
        match depth.checked_sub(1) {
            Some(parent) => {
                let parent = &path[parent];
                self.nodes.get_mut(parent.node).set_child(parent.side, subtree);
            }
            None => self.root = subtree,
        }
    }

    /// Restores the AVL invariant at `handle` and returns the subtree's new root.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.update(handle);
        let balance = self.balance_factor(handle);

        if balance > 1 {
            let left = self.nodes.get(handle).left().expect("`RawTree::rebalance()` - left-heavy without a left child!");
            if self.balance_factor(left) < 0 {
                let left = self.rotate_left(left);
                self.nodes.get_mut(handle).set_left(Some(left));
            }
            self.rotate_right(handle)
        } else if balance < -1 {
            let right =
                self.nodes.get(handle).right().expect("`RawTree::rebalance()` - right-heavy without a right child!");
            if self.balance_factor(right) > 0 {
                let right = self.rotate_right(right);
                self.nodes.get_mut(handle).set_right(Some(right));
            }
            self.rotate_left(handle)
        } else {
            handle
        }
    }

    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).left().expect("`RawTree::rotate_right()` - node has no left child!");
        let inner = self.nodes.get(pivot).right();
        self.nodes.get_mut(handle).set_left(inner);
        self.update(handle);
        self.nodes.get_mut(pivot).set_right(Some(handle));
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).right().expect("`RawTree::rotate_left()` - node has no right child!");
        let inner = self.nodes.get(pivot).left();
        self.nodes.get_mut(handle).set_right(inner);
        self.update(handle);
        self.nodes.get_mut(pivot).set_left(Some(handle));
        self.update(pivot);
        pivot
    }

    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.summary(node.left()).0) - i16::from(self.summary(node.right()).0)
    }

    /// Refreshes the cached height and weight of `handle` from its children.
    fn update(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let left = self.summary(node.left());
        let right = self.summary(node.right());
        self.nodes.get_mut(handle).update(left, right);
    }

    /// Height and weight of the subtree behind `link`.
    fn summary(&self, link: Option<Handle>) -> (u8, usize) {
        link.map_or((0, 0), |handle| {
            let node = self.nodes.get(handle);
            (node.height(), node.weight())
        })
    }
}

/// In-order iterator over distinct keys and their multiplicities.
pub(crate) struct Iter<'a, K> {
    tree: &'a RawTree<K>,
    stack: Stack,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RawTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Stack::new(),
            remaining: tree.distinct_len(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<Handle>) {
        while let Some(handle) = link {
            self.stack.push(handle);
            link = self.tree.nodes.get(handle).left();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.nodes.get(handle);
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((node.key(), node.count()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
