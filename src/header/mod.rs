use std::convert::TryFrom;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::cache::PositionCache;
use crate::element::Element;
use crate::node::{HeapNode, Node};

pub mod iterator;

use self::iterator::{Iter, IterMut};

/// The engine shared by [`LinearList`] and [`CycList`].
///
/// The header owns the chain topology: every node reachable from `first`
/// within `len` hops belongs to it and is released when the header drops. It
/// does not know whether the chain is finite or closed; the algorithms are
/// written in terms of "the successor of `last`", which is `None` for a finite
/// chain and `first` for a closed one. The wrappers restore their own closure
/// rule where an algorithm cannot.
///
/// # Naming Conventions
///
/// - `front..=back`: a closed run of nodes, both inclusive;
/// - `tail`: the link captured from `last` before a splice, reconnected after.
///
/// [`LinearList`]: crate::LinearList
/// [`CycList`]: crate::CycList
pub(crate) struct Header<T, N: Node<T> = HeapNode<T>> {
    pub(crate) first: Option<NonNull<N>>,
    pub(crate) last: Option<NonNull<N>>,
    pub(crate) cache: PositionCache<N>,
    /// the number of nodes in the chain
    pub(crate) len: usize,
    _marker: PhantomData<(T, Box<N>)>,
}

/// A run of nodes `front..=back` detached from a list, used when cutting,
/// absorbing or flattening.
///
/// When detached, reading `back`'s link is invalid: the run is re-terminated by
/// whichever list adopts it. Dropping the run releases its nodes.
pub struct DetachedNodes<T, N: Node<T>> {
    front: NonNull<N>,
    back: NonNull<N>,
    len: usize,
    _marker: PhantomData<(T, Box<N>)>,
}

// private methods
impl<T, N: Node<T>> Header<T, N> {
    /// Does `last` link back to `first`?
    pub(crate) fn closed(&self) -> bool {
        match (self.first, self.last) {
            // SAFETY: `last` is a live node of the chain.
            (Some(first), Some(last)) => unsafe { last.as_ref().successor() == Some(first) },
            _ => false,
        }
    }

    /// Links `last` to `first`. No-op on an empty chain.
    pub(crate) fn close(&mut self) {
        if let Some(mut last) = self.last {
            // SAFETY: `last` is a live node of the chain.
            unsafe { last.as_mut().link(self.first) };
        }
    }

    /// Resets the header to the empty state without releasing any node.
    ///
    /// The caller must have taken ownership of the nodes beforehand.
    pub(crate) fn erase(&mut self) {
        self.first = None;
        self.last = None;
        self.len = 0;
        self.cache.clear();
    }

    /// Finds the node at index `i`, or returns `None` if `i >= len`.
    ///
    /// The first and last nodes are answered directly. Anything else walks
    /// forward from the cached position if it lies before `i`, from `first`
    /// otherwise, and caches the node found.
    pub(crate) fn resolve(&self, i: usize) -> Option<NonNull<N>> {
        if i >= self.len {
            return None;
        }
        if i == 0 {
            return self.first;
        }
        if i == self.len - 1 {
            return self.last;
        }
        let (start, offset) = match self.cache.closest(i) {
            Some(hint) => {
                trace!(index = i, from = hint.1, "position cache hit");
                hint
            }
            None => {
                trace!(index = i, "position cache miss");
                (self.first?, 0)
            }
        };
        // SAFETY: `start` sits at index `offset < i < len`, so the walk of
        // `i - offset` hops stays within the chain.
        let node = unsafe { N::advance(start, i - offset) };
        if let Some(node) = node {
            self.cache.update(i, node);
        }
        node
    }

    /// Clamps `start..=end` to the chain, or returns `None` if nothing is left.
    pub(crate) fn enforce_bounds(&self, start: isize, end: isize) -> Option<(usize, usize)> {
        let last_index = isize::try_from(self.len).unwrap_or(isize::MAX) - 1;
        let start = start.max(0);
        let end = end.min(last_index);
        if end >= start {
            Some((start as usize, end as usize))
        } else {
            None
        }
    }

    /// Detaches every node, leaving the header empty.
    pub(crate) fn detach_all(&mut self) -> Option<DetachedNodes<T, N>> {
        let front = self.first?;
        let back = self.last?;
        let len = self.len;
        self.erase();
        // SAFETY: `first..=last` is the whole chain of `len` nodes.
        Some(unsafe { DetachedNodes::new(front, back, len) })
    }

    /// Builds a finite chain out of a detached run.
    pub(crate) fn from_detached(detached: DetachedNodes<T, N>) -> Self {
        let (front, mut back, len) = detached.into_parts();
        // SAFETY: `back` is a live node owned by the run.
        unsafe { back.as_mut().link(None) };
        Self {
            first: Some(front),
            last: Some(back),
            cache: PositionCache::new(),
            len,
            _marker: PhantomData,
        }
    }
}

impl<T, N: Node<T>> Header<T, N> {
    pub(crate) fn new() -> Self {
        Self {
            first: None,
            last: None,
            cache: PositionCache::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub(crate) fn front(&self) -> Option<&T> {
        // SAFETY: `first` is a live node borrowed for the lifetime of `&self`.
        self.first.map(|node| unsafe { (*node.as_ptr()).content() })
    }

    pub(crate) fn back(&self) -> Option<&T> {
        // SAFETY: `last` is a live node borrowed for the lifetime of `&self`.
        self.last.map(|node| unsafe { (*node.as_ptr()).content() })
    }

    pub(crate) fn get(&self, i: usize) -> Option<&T> {
        // SAFETY: resolved nodes are live and borrowed for the lifetime of `&self`.
        self.resolve(i)
            .map(|node| unsafe { (*node.as_ptr()).content() })
    }

    pub(crate) fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        // SAFETY: resolved nodes are live, and `&mut self` guarantees the
        // returned reference is unique.
        self.resolve(i)
            .map(|node| unsafe { (*node.as_ptr()).content_mut() })
    }

    /// Replaces the value at `i`, returning the old one, or returns `None`
    /// (dropping `value`) if `i` is out of range.
    pub(crate) fn replace(&mut self, i: usize, value: T) -> Option<T> {
        let mut node = self.resolve(i)?;
        // SAFETY: `node` is a live node of the chain.
        Some(unsafe { node.as_mut().set_content(value) })
    }

    /// Appends one value after `last`.
    ///
    /// The successor of `last` is captured before linking the new node and
    /// reconnected after it, so the same code extends finite and closed chains.
    pub(crate) fn append(&mut self, value: T) {
        let mut node = N::allocate(value);
        match self.last {
            None => {
                self.first = Some(node);
                self.last = Some(node);
            }
            // SAFETY: `last` is a live node, `node` is freshly allocated.
            Some(mut last) => unsafe {
                let tail = last.as_ref().successor();
                last.as_mut().link(Some(node));
                node.as_mut().link(tail);
                self.last = Some(node);
            },
        }
        self.len += 1;
    }

    /// Appends a run of values with a single reconnection to the captured
    /// tail.
    pub(crate) fn concatenate<I: IntoIterator<Item = T>>(&mut self, values: I) {
        let mut values = values.into_iter();
        let value = match values.next() {
            Some(value) => value,
            None => return,
        };
        self.append(value);
        let mut end = match self.last {
            Some(end) => end,
            None => return,
        };
        // SAFETY: `end` is the live last node.
        let tail = unsafe { end.as_ref().successor() };
        for value in values {
            let node = N::allocate(value);
            // SAFETY: `end` is the live last node, `node` is freshly allocated.
            unsafe { end.as_mut().link(Some(node)) };
            end = node;
            self.last = Some(end);
            self.len += 1;
        }
        // SAFETY: `end` is the live last node.
        unsafe { end.as_mut().link(tail) };
    }

    /// Removes the first value, keeping a closed chain closed.
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let front = self.first?;
        if self.len == 1 {
            self.erase();
        } else {
            let closed = self.closed();
            // SAFETY: `front` is a live node of the chain.
            let next = unsafe { front.as_ref().successor() };
            self.first = next;
            if closed {
                self.close();
            }
            self.len -= 1;
            self.cache.clear();
        }
        // SAFETY: `front` has been unlinked from the chain.
        Some(unsafe { N::release(front) })
    }

    pub(crate) fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Reverses the traversal order in a single pass.
    ///
    /// The old `first` ends up linked to the captured tail, so a closed chain
    /// must be re-closed by the caller.
    pub(crate) fn reverse(&mut self) {
        let mut current = match self.first {
            Some(first) => first,
            None => return,
        };
        // SAFETY: every node visited is one of the `len` live nodes; each one
        // is read before it is relinked.
        unsafe {
            let mut built = self.last.and_then(|last| last.as_ref().successor());
            self.last = self.first;
            for _ in 0..self.len {
                let next = current.as_ref().successor();
                current.as_mut().link(built);
                built = Some(current);
                match next {
                    Some(next) => current = next,
                    None => break,
                }
            }
            self.first = built;
        }
        self.cache.clear();
    }

    /// Reduces the nesting of every element, splicing nested chains in place.
    ///
    /// Only the nodes present when the call starts are visited: a spliced-in
    /// chain is not revisited (its elements were flattened by the recursive
    /// call already).
    pub(crate) fn flatten(&mut self)
    where
        T: Element<N>,
    {
        let closed = self.closed();
        let mut prev: Option<NonNull<N>> = None;
        let mut node = self.first;
        for _ in 0..self.len {
            let mut current = match node {
                Some(current) => current,
                None => break,
            };
            // SAFETY: `current` is one of the original nodes, still alive: only
            // nodes already visited are released.
            let next = unsafe { current.as_ref().successor() };
            let value = unsafe { current.as_mut().content_mut() };
            value.flatten();
            prev = match value.linked_len() {
                None => Some(current),
                Some(0) => {
                    *value = T::default();
                    Some(current)
                }
                Some(_) => match value.unlink() {
                    None => Some(current),
                    Some(run) if run.len() == 1 => {
                        *value = run.into_content();
                        Some(current)
                    }
                    Some(run) => Some(self.splice_over(prev, current, next, run)),
                },
            };
            node = next;
        }
        if closed {
            self.close();
        }
        self.cache.clear();
    }

    /// Replaces `current` (preceded by `prev`, followed by `next`) with `run`,
    /// releasing `current`. Returns the back of the run.
    fn splice_over(
        &mut self,
        prev: Option<NonNull<N>>,
        current: NonNull<N>,
        next: Option<NonNull<N>>,
        run: DetachedNodes<T, N>,
    ) -> NonNull<N> {
        let (front, mut back, len) = run.into_parts();
        // SAFETY: `prev` and `back` are live; `current` is unlinked before it
        // is released.
        unsafe {
            back.as_mut().link(next);
            match prev {
                Some(mut prev) => prev.as_mut().link(Some(front)),
                None => self.first = Some(front),
            }
            if self.last == Some(current) {
                self.last = Some(back);
            }
            drop(N::release(current));
        }
        self.len += len - 1;
        debug!(spliced = len, len = self.len, "flatten spliced a nested chain");
        back
    }

    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, T, N> {
        Iter::new(self)
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        IterMut::new(self)
    }
}

impl<T: Clone, N: Node<T>> Clone for Header<T, N> {
    fn clone(&self) -> Self {
        let mut header = Header::new();
        header.concatenate(self.iter().cloned());
        header
    }
}

impl<T: PartialEq, N: Node<T>> PartialEq for Header<T, N> {
    /// Compares element by element from each `first`.
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let (mut a, mut b) = (self.first, other.first);
        for _ in 0..self.len {
            match (a, b) {
                // SAFETY: both walks stay within `len` live nodes.
                (Some(x), Some(y)) => unsafe {
                    if !x.as_ref().equals(y.as_ref().content()) {
                        return false;
                    }
                    a = x.as_ref().successor();
                    b = y.as_ref().successor();
                },
                _ => return false,
            }
        }
        true
    }
}

/// The canonical text form: `(a b c)`, with a trailing `...` for a closed
/// chain.
impl<T: fmt::Display, N: Node<T>> fmt::Display for Header<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        let mut terms = self.iter();
        if let Some(term) = terms.next() {
            write!(f, "{}", term)?;
            for term in terms {
                write!(f, " {}", term)?;
            }
        }
        if self.closed() {
            f.write_str(" ...")?;
        }
        f.write_str(")")
    }
}

impl<T: fmt::Debug, N: Node<T>> fmt::Debug for Header<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, N: Node<T>> Drop for Header<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}

unsafe impl<T: Send, N: Node<T>> Send for Header<T, N> {}

impl<T, N: Node<T>> DetachedNodes<T, N> {
    /// It is unsafe because it must be guaranteed that `front..=back` is a
    /// valid run of `len` live nodes owned by nobody else.
    pub(crate) unsafe fn new(front: NonNull<N>, back: NonNull<N>, len: usize) -> Self {
        debug_assert!(len > 0, "Cannot detach nodes of length 0");
        Self {
            front,
            back,
            len,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Hands the run over without releasing it.
    pub(crate) fn into_parts(self) -> (NonNull<N>, NonNull<N>, usize) {
        let this = ManuallyDrop::new(self);
        (this.front, this.back, this.len)
    }

    /// Releases a single-node run and returns its value.
    pub(crate) fn into_content(self) -> T {
        debug_assert_eq!(self.len, 1);
        let (front, _, _) = self.into_parts();
        // SAFETY: the run owns `front` exclusively.
        unsafe { N::release(front) }
    }
}

impl<T, N: Node<T>> Drop for DetachedNodes<T, N> {
    fn drop(&mut self) {
        let mut node = Some(self.front);
        for _ in 0..self.len {
            let current = match node {
                Some(current) => current,
                None => break,
            };
            // SAFETY: the run owns its `len` nodes; each link is read before
            // its node is released, and `back`'s link is never read.
            unsafe {
                node = if current == self.back {
                    None
                } else {
                    current.as_ref().successor()
                };
                drop(N::release(current));
            }
        }
    }
}

impl<T: fmt::Debug, N: Node<T>> fmt::Debug for DetachedNodes<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetachedNodes")
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Header;
    use crate::node::HeapNode;
    use std::iter::FromIterator;

    fn header<I: IntoIterator<Item = i32>>(values: I) -> Header<i32, HeapNode<i32>> {
        let mut header = Header::new();
        header.concatenate(values);
        header
    }

    #[test]
    fn header_enforce_bounds() {
        let confirm = |len: i32, start, end, expected| {
            assert_eq!(
                header(0..len).enforce_bounds(start, end),
                Some(expected),
                "{}..={} on length {}",
                start,
                end,
                len
            );
        };
        let refute = |len: i32, start, end| {
            assert_eq!(
                header(0..len).enforce_bounds(start, end),
                None,
                "{}..={} on length {}",
                start,
                end,
                len
            );
        };

        for &(start, end) in &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 0), (0, 1), (1, -1), (1, 0), (1, 1)] {
            refute(0, start, end);
        }

        refute(1, -1, -1);
        confirm(1, -1, 0, (0, 0));
        confirm(1, -1, 1, (0, 0));
        refute(1, 0, -1);
        confirm(1, 0, 0, (0, 0));
        confirm(1, 0, 1, (0, 0));
        refute(1, 1, -1);
        refute(1, 1, 0);
        refute(1, 1, 1);

        refute(2, -1, -1);
        confirm(2, -1, 0, (0, 0));
        confirm(2, -1, 1, (0, 1));
        confirm(2, -1, 2, (0, 1));
        refute(2, 0, -1);
        confirm(2, 0, 0, (0, 0));
        confirm(2, 0, 1, (0, 1));
        confirm(2, 0, 2, (0, 1));
        refute(2, 1, -1);
        refute(2, 1, 0);
        confirm(2, 1, 1, (1, 1));
        confirm(2, 1, 2, (1, 1));
        refute(2, 2, -1);
        refute(2, 2, 0);
        refute(2, 2, 1);
        refute(2, 2, 2);
    }

    #[cfg(feature = "position-cache")]
    #[test]
    fn header_resolve_uses_cache() {
        let header = header(10..18);
        assert_eq!(header.get(0), Some(&10));
        assert_eq!(header.get(7), Some(&17));
        // neither end touches the cache
        assert_eq!(header.cache.get().1, None);

        assert_eq!(header.get(3), Some(&13));
        assert_eq!(header.cache.get().0, 3);
        assert_eq!(header.get(5), Some(&15));
        assert_eq!(header.cache.get().0, 5);
        // backwards queries miss and rescan from the start
        assert_eq!(header.get(2), Some(&12));
        assert_eq!(header.cache.get().0, 2);
        assert_eq!(header.get(8), None);
    }

    #[test]
    fn header_append_and_concatenate() {
        let mut header = Header::<i32, HeapNode<i32>>::new();
        assert!(header.is_empty());
        header.append(0);
        header.concatenate(Vec::new());
        header.concatenate(vec![1, 2, 3]);
        assert_eq!(header.len(), 4);
        assert_eq!(Vec::from_iter(header.iter().copied()), vec![0, 1, 2, 3]);
        assert_eq!(header.front(), Some(&0));
        assert_eq!(header.back(), Some(&3));
        assert!(!header.closed());

        header.close();
        header.concatenate(vec![4, 5]);
        assert!(header.closed());
        assert_eq!(header.to_string(), "(0 1 2 3 4 5 ...)");
    }

    #[test]
    fn header_reverse() {
        let mut header = header(1..5);
        header.reverse();
        assert_eq!(header.to_string(), "(4 3 2 1)");
        assert_eq!(header.back(), Some(&1));
        header.reverse();
        assert_eq!(header.to_string(), "(1 2 3 4)");
    }

    #[test]
    fn header_pop_front() {
        let mut header = header(0..3);
        header.close();
        assert_eq!(header.pop_front(), Some(0));
        assert!(header.closed());
        assert_eq!(header.to_string(), "(1 2 ...)");
        assert_eq!(header.pop_front(), Some(1));
        assert_eq!(header.pop_front(), Some(2));
        assert_eq!(header.pop_front(), None);
        assert_eq!(header.to_string(), "()");
    }

    #[test]
    fn header_replace_and_equality() {
        let mut a = header(0..4);
        let b = a.clone();
        assert!(a == b);
        assert_eq!(a.replace(2, 9), Some(2));
        assert_eq!(a.replace(4, 9), None);
        assert!(a != b);
        *a.get_mut(2).unwrap() = 2;
        assert!(a == b);
        assert!(a != header(0..3));
    }
}
