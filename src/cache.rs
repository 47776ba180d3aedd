use std::cell::Cell;
use std::ptr::NonNull;

/// The most recently resolved `(index, node)` pair of a list.
///
/// Only forward hops are cheap in a singly-linked chain, so the hint answers a
/// query for index `i` only when it sits strictly before `i`. Any other query
/// is a miss and the caller walks from the first node.
///
/// Lookups happen behind `&self` (reading an element is not a mutation of the
/// list), hence the interior mutability. This also keeps lists `!Sync`.
///
/// With the `position-cache` feature disabled every query misses and updates
/// are dropped.
pub(crate) struct PositionCache<N> {
    index: Cell<usize>,
    node: Cell<Option<NonNull<N>>>,
}

impl<N> PositionCache<N> {
    pub(crate) fn new() -> Self {
        Self {
            index: Cell::new(0),
            node: Cell::new(None),
        }
    }

    /// Returns the cached node and its index if it lies strictly before `i`.
    #[cfg(feature = "position-cache")]
    pub(crate) fn closest(&self, i: usize) -> Option<(NonNull<N>, usize)> {
        let index = self.index.get();
        if i > index {
            self.node.get().map(|node| (node, index))
        } else {
            None
        }
    }

    #[cfg(not(feature = "position-cache"))]
    pub(crate) fn closest(&self, _i: usize) -> Option<(NonNull<N>, usize)> {
        None
    }

    #[cfg(feature = "position-cache")]
    pub(crate) fn update(&self, i: usize, node: NonNull<N>) {
        self.index.set(i);
        self.node.set(Some(node));
    }

    #[cfg(not(feature = "position-cache"))]
    pub(crate) fn update(&self, _i: usize, _node: NonNull<N>) {}

    /// Forgets the hint. Must be called whenever the node cached at `index`
    /// may no longer sit at `index`, or may have been released.
    pub(crate) fn clear(&self) {
        self.index.set(0);
        self.node.set(None);
    }

    #[cfg(all(test, feature = "position-cache"))]
    pub(crate) fn get(&self) -> (usize, Option<NonNull<N>>) {
        (self.index.get(), self.node.get())
    }
}
