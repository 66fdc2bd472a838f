use super::handle::Handle;

/// One distinct key together with its multiplicity and AVL bookkeeping.
#[derive(Clone)]
pub(crate) struct Node<K> {
    key: K,
    // Number of times `key` is held; never zero while the node is linked.
    count: usize,
    // Sum of `count` over this node and both subtrees.
    weight: usize,
    // Height of the subtree rooted here; a leaf has height 1.
    height: u8,
    left: Option<Handle>,
    right: Option<Handle>,
}

/// Which child link a search descended through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl<K> Node<K> {
    /// Creates a detached leaf holding one copy of `key`.
    pub(crate) const fn new(key: K) -> Self {
        Self {
            key,
            count: 1,
            weight: 1,
            height: 1,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) const fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) const fn weight(&self) -> usize {
        self.weight
    }

    #[inline]
    pub(crate) const fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_left(&mut self, child: Option<Handle>) {
        self.left = child;
    }

    pub(crate) fn set_right(&mut self, child: Option<Handle>) {
        self.right = child;
    }

    /// Adds one copy of the key. The caller refreshes `weight` on retrace.
    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }

    /// Removes one copy of the key; the node must hold at least two.
    pub(crate) fn decrement(&mut self) {
        debug_assert!(self.count > 1, "`Node::decrement()` - would empty a linked node!");
        self.count -= 1;
    }

    /// Replaces the key and multiplicity, keeping links and balance data.
    pub(crate) fn replace_payload(&mut self, key: K, count: usize) -> (K, usize) {
        let old_key = core::mem::replace(&mut self.key, key);
        let old_count = core::mem::replace(&mut self.count, count);
        (old_key, old_count)
    }

    /// Consumes the node, returning its key and multiplicity.
    pub(crate) fn into_payload(self) -> (K, usize) {
        (self.key, self.count)
    }

    /// Recomputes `height` and `weight` from the children's cached values.
    pub(crate) fn update(&mut self, left: (u8, usize), right: (u8, usize)) {
        self.height = 1 + left.0.max(right.0);
        self.weight = self.count + left.1 + right.1;
    }
}
