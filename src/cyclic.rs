use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::ptr::NonNull;

use tracing::debug;

use crate::element::{Element, Flattenable, Linkable};
use crate::header::iterator::{IntoIter, Iter, IterMut};
use crate::header::{DetachedNodes, Header};
use crate::node::{HeapNode, Node};

/// A circular singly-linked list.
///
/// The last node links back to the first one, so there is no end to the
/// chain: every index is valid and wraps around (see
/// [`normalize`](CycList::normalize)), and [`rotate`](CycList::rotate) moves
/// the logical start without touching any link.
///
/// [`iter`](CycList::iter) visits each element once; [`cycle_iter`] and
/// [`cycle`] go round forever until the caller stops.
///
/// [`cycle_iter`]: CycList::cycle_iter
/// [`cycle`]: CycList::cycle
///
/// # Examples
///
/// ```
/// use chain_lists::{ring, CycList};
///
/// let mut ring: CycList<i32> = ring![0, 1, 2, 3];
/// assert_eq!(ring.to_string(), "(0 1 2 3 ...)");
/// assert_eq!(ring.at(-1), Some(&3));
/// ring.rotate(1);
/// assert_eq!(ring.to_vec(), vec![1, 2, 3, 0]);
/// ```
pub struct CycList<T, N: Node<T> = HeapNode<T>> {
    header: Header<T, N>,
}

impl<T, N: Node<T>> CycList<T, N> {
    #[inline]
    pub fn new() -> Self {
        Self {
            header: Header::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.header.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Provides a reference to the logical first element.
    #[doc(alias = "head")]
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.header.front()
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.header.back()
    }

    /// Maps any index onto `0..len` with wrap-around; `0` for an empty list.
    ///
    /// Negative indices count backwards from the end, `-1` being the last
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::CycList;
    /// use std::iter::FromIterator;
    ///
    /// let ring = CycList::<i32>::from_iter(10..20);
    /// assert_eq!(ring.normalize(21), 1);
    /// assert_eq!(ring.normalize(-21), 9);
    /// assert_eq!(ring.normalize(-10), 0);
    /// assert_eq!(CycList::<i32>::new().normalize(7), 0);
    /// ```
    pub fn normalize(&self, i: isize) -> usize {
        // no list holds more than `isize::MAX` nodes
        match self.header.len as isize {
            0 => 0,
            len => i.rem_euclid(len) as usize,
        }
    }

    /// Provides a reference to the element at the wrapped index `i`, or
    /// `None` if the list is empty.
    pub fn at(&self, i: isize) -> Option<&T> {
        self.header.get(self.normalize(i))
    }

    pub fn at_mut(&mut self, i: isize) -> Option<&mut T> {
        let i = self.normalize(i);
        self.header.get_mut(i)
    }

    /// Replaces the element at the wrapped index `i` and returns the old one.
    /// On an empty list nothing is stored and `None` is returned.
    pub fn set(&mut self, i: isize, value: T) -> Option<T> {
        let i = self.normalize(i);
        self.header.replace(i, value)
    }

    /// Resets the element at the wrapped index `i` to `T::default()`.
    pub fn clear_at(&mut self, i: isize) -> Option<T>
    where
        T: Default,
    {
        self.set(i, T::default())
    }

    /// Moves the logical start `i` positions forward (backward if negative).
    ///
    /// No link changes: only the references to the first and last nodes move.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`normalize(i)`) time.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{ring, CycList};
    ///
    /// let mut ring: CycList<i32> = ring![0, 1, 2, 3];
    /// ring.rotate(-1);
    /// assert_eq!(ring, ring![3, 0, 1, 2]);
    /// ```
    pub fn rotate(&mut self, i: isize) {
        let hops = self.normalize(i);
        if hops == 0 {
            return;
        }
        let header = &mut self.header;
        if let Some(last) = header.resolve(hops - 1) {
            // SAFETY: `last` is a live node of a closed chain.
            header.first = unsafe { last.as_ref().successor() };
            header.last = Some(last);
            header.cache.clear();
            debug!(by = i, hops, "rotate");
        }
    }

    /// Appends an element after the logical last one.
    #[inline]
    pub fn append(&mut self, value: T) {
        self.header.append(value);
        self.header.close();
    }

    #[inline]
    pub fn concatenate<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.header.concatenate(values);
        self.header.close();
    }

    /// Removes the logical first element and returns it; the loop stays
    /// closed over the remaining elements.
    #[doc(alias = "tail")]
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        self.header.pop_front()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.header.clear();
    }

    /// Iterates over every element once, from the logical first.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        self.header.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        self.header.iter_mut()
    }

    /// Iterates round the loop without end. The iterator is empty only if the
    /// list is.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{ring, CycList};
    ///
    /// let ring: CycList<i32> = ring![0, 1, 2];
    /// let seen: Vec<i32> = ring.cycle_iter().take(7).copied().collect();
    /// assert_eq!(seen, vec![0, 1, 2, 0, 1, 2, 0]);
    /// ```
    pub fn cycle_iter(&self) -> Cycle<'_, T, N> {
        Cycle {
            next: self.header.first,
            _marker: PhantomData,
        }
    }

    /// Visits the elements round the loop until `visit` breaks, and returns
    /// the break value. Returns `None` at once on an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{ring, CycList};
    /// use std::ops::ControlFlow;
    ///
    /// let ring: CycList<i32> = ring![1, 2, 3];
    /// let mut sum = 0;
    /// let total = ring.cycle(|x| {
    ///     sum += x;
    ///     if sum > 10 {
    ///         ControlFlow::Break(sum)
    ///     } else {
    ///         ControlFlow::Continue(())
    ///     }
    /// });
    /// assert_eq!(total, Some(12));
    /// ```
    pub fn cycle<B, F>(&self, mut visit: F) -> Option<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        for value in self.cycle_iter() {
            if let ControlFlow::Break(result) = visit(value) {
                return Some(result);
            }
        }
        None
    }

    /// Reverses the direction of the loop, keeping the logical first element
    /// last.
    pub fn reverse(&mut self) {
        self.header.reverse();
        self.header.close();
    }

    /// Flattens nested sequences into the loop, the same way as
    /// [`LinearList::flatten`](crate::LinearList::flatten).
    #[inline]
    pub fn flatten(&mut self)
    where
        T: Element<N>,
    {
        self.header.flatten();
    }

    /// Copies one lap of elements into a `Vec`.
    #[doc(alias = "compact")]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T, N: Node<T>> Default for CycList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, N: Node<T>> Clone for CycList<T, N> {
    fn clone(&self) -> Self {
        let mut header = self.header.clone();
        header.close();
        Self { header }
    }
}

impl<T: PartialEq, N: Node<T>> PartialEq for CycList<T, N> {
    /// Compares one lap from each logical first element, so a rotated loop
    /// is only equal to the original if the rotation is a whole number of
    /// laps.
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
    }
}

impl<T: Eq, N: Node<T>> Eq for CycList<T, N> {}

impl<T: fmt::Display, N: Node<T>> fmt::Display for CycList<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.header, f)
    }
}

impl<T: fmt::Debug, N: Node<T>> fmt::Debug for CycList<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.header, f)
    }
}

impl<T, N: Node<T>> FromIterator<T> for CycList<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.concatenate(iter);
        list
    }
}

impl<T, N: Node<T>> Extend<T> for CycList<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.concatenate(iter);
    }
}

impl<T, N: Node<T>> IntoIterator for CycList<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    /// Consumes one lap.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.header)
    }
}

impl<'a, T, N: Node<T>> IntoIterator for &'a CycList<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, N: Node<T>> IntoIterator for &'a mut CycList<T, N> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Element<N>, N: Node<T>> Flattenable for CycList<T, N> {
    fn flatten(&mut self) {
        self.header.flatten();
    }
}

impl<T, N: Node<T>> Linkable<T, N> for CycList<T, N> {
    fn len(&self) -> usize {
        self.header.len()
    }

    fn unlink(&mut self) -> Option<DetachedNodes<T, N>> {
        self.header.detach_all()
    }
}

/// An endless iterator round a [`CycList`], created by
/// [`CycList::cycle_iter`].
pub struct Cycle<'a, T: 'a, N: Node<T> = HeapNode<T>> {
    next: Option<NonNull<N>>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: 'a, N: Node<T>> Clone for Cycle<'a, T, N> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, N: Node<T>> fmt::Debug for Cycle<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cycle").finish()
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> Iterator for Cycle<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the loop is borrowed immutably for `'a` and every node of a
        // closed chain links to another live node.
        let current = unsafe { &*self.next?.as_ptr() };
        self.next = current.successor();
        Some(current.content())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (usize::MAX, None),
            None => (0, Some(0)),
        }
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> FusedIterator for Cycle<'a, T, N> {}

unsafe impl<T: Sync, N: Node<T>> Send for Cycle<'_, T, N> {}

unsafe impl<T: Sync, N: Node<T>> Sync for Cycle<'_, T, N> {}

#[cfg(test)]
mod tests {
    use crate::cyclic::CycList;
    use crate::ring;
    use std::iter::FromIterator;
    use std::ops::ControlFlow;

    type Ring = CycList<i32>;

    #[test]
    fn ring_len() {
        assert_eq!(Ring::new().len(), 0);
        assert_eq!(Ring::from_iter(Some(4)).len(), 1);
        assert_eq!(Ring::from_iter(vec![4, 3, 2, 1]).len(), 4);
    }

    #[test]
    fn ring_format() {
        assert_eq!(Ring::new().to_string(), "()");
        assert_eq!(Ring::from_iter(Some(1)).to_string(), "(1 ...)");
        assert_eq!(Ring::from_iter(vec![2, 1]).to_string(), "(2 1 ...)");
        assert_eq!(Ring::from_iter(vec![4, 3, 2, 1]).to_string(), "(4 3 2 1 ...)");
        assert_eq!(format!("{:?}", Ring::from_iter(0..3)), "[0, 1, 2]");

        let nested: CycList<Ring> = ring![ring![0]];
        assert_eq!(nested.to_string(), "((0 ...) ...)");
    }

    #[test]
    fn ring_clone() {
        assert_eq!(Ring::new().clone(), Ring::new());
        for n in 1..4 {
            let ring = Ring::from_iter(0..n);
            let mut cloned = ring.clone();
            assert_eq!(cloned, ring);
            assert_eq!(cloned.to_string(), ring.to_string());
            cloned.append(9);
            assert_eq!(ring.len(), n as usize);
            assert_eq!(cloned.at(-1), Some(&9));
        }
    }

    #[test]
    fn ring_each_visits_one_lap() {
        let ring = Ring::from_iter(0..10);
        let mut count = 0;
        for &x in &ring {
            assert_eq!(x, count);
            count += 1;
        }
        assert_eq!(count, 10);
    }

    #[test]
    fn ring_cycle() {
        let ring = Ring::from_iter(0..10);
        let mut count = 0;
        let stopped = ring.cycle(|&x| {
            assert_eq!(x, count % 10);
            count += 1;
            if count == 25 {
                ControlFlow::Break(x)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(stopped, Some(4));
        assert_eq!(Ring::new().cycle(|_| ControlFlow::Break(())), None);
        assert_eq!(Ring::new().cycle_iter().next(), None);
        assert_eq!(ring.cycle_iter().nth(123), Some(&3));
    }

    #[test]
    fn ring_at() {
        let ring = Ring::from_iter(10..20);
        let confirm = |i: isize, v: i32| assert_eq!(ring.at(i), Some(&v), "at({})", i);
        confirm(-32, 18);
        confirm(-21, 19);
        confirm(-10, 10);
        confirm(-1, 19);
        confirm(0, 10);
        confirm(9, 19);
        confirm(10, 10);
        confirm(21, 11);
        confirm(32, 12);
        assert_eq!(Ring::new().at(0), None);
    }

    #[test]
    fn ring_set() {
        let mut ring = Ring::from_iter(10..20);
        for &(i, v) in &[(-21, 0), (-10, -10), (-1, -1), (0, 10), (9, 10), (11, 11), (22, 12), (33, 13)] {
            ring.set(i, v);
            assert_eq!(ring.at(i), Some(&v), "set({}, {})", i, v);
        }
        assert_eq!(ring.to_vec(), vec![10, 11, 12, 13, 14, 15, 16, 17, 18, 10]);
        assert_eq!(Ring::new().set(3, 1), None);
        if let Some(x) = ring.at_mut(-1) {
            *x = 19;
        }
        assert_eq!(ring.clear_at(1), Some(11));
        assert_eq!(ring.to_string(), "(10 0 12 13 14 15 16 17 18 19 ...)");
    }

    #[test]
    fn ring_rotate() {
        let confirm = |values: Vec<i32>, i: isize, expected: Vec<i32>| {
            let mut ring = Ring::from_iter(values);
            ring.rotate(i);
            assert_eq!(ring.to_vec(), expected, "rotate({})", i);
            assert_eq!(ring.back(), expected.last());
            // still closed over the new start
            assert_eq!(ring.cycle_iter().nth(ring.len()), expected.first());
        };
        for i in 0..3 {
            confirm(vec![], i, vec![]);
            confirm(vec![0], i, vec![0]);
        }
        confirm(vec![0, 1, 2, 3], 0, vec![0, 1, 2, 3]);
        confirm(vec![0, 1, 2, 3], 1, vec![1, 2, 3, 0]);
        confirm(vec![0, 1, 2, 3], -3, vec![1, 2, 3, 0]);
        confirm(vec![0, 1, 2, 3], 2, vec![2, 3, 0, 1]);
        confirm(vec![0, 1, 2, 3], -2, vec![2, 3, 0, 1]);
        confirm(vec![0, 1, 2, 3], 3, vec![3, 0, 1, 2]);
        confirm(vec![0, 1, 2, 3], -1, vec![3, 0, 1, 2]);
        confirm(vec![0, 1, 2, 3], 4, vec![0, 1, 2, 3]);
        confirm(vec![0, 1, 2, 3], -4, vec![0, 1, 2, 3]);
    }

    #[test]
    fn ring_rotate_then_index() {
        let mut ring = Ring::from_iter(0..8);
        assert_eq!(ring.at(5), Some(&5));
        ring.rotate(3);
        assert_eq!(ring.at(0), Some(&3));
        assert_eq!(ring.at(5), Some(&0));
        assert_eq!(ring.at(6), Some(&1));
    }

    #[test]
    fn ring_append_and_concatenate() {
        let mut ring = Ring::new();
        ring.append(1);
        assert_eq!(ring, Ring::from_iter(Some(1)));
        ring.append(2);
        assert_eq!(ring, Ring::from_iter(vec![1, 2]));
        ring.concatenate(Vec::new());
        ring.concatenate(vec![3, 4]);
        assert_eq!(ring.to_string(), "(1 2 3 4 ...)");
        ring.extend(5..7);
        assert_eq!(ring.cycle_iter().nth(6), Some(&1));

        let mut ring = Ring::new();
        ring.concatenate(Some(1));
        assert_eq!(ring.to_string(), "(1 ...)");
    }

    #[test]
    fn ring_reverse() {
        let mut ring = Ring::from_iter(Some(1));
        ring.reverse();
        assert_eq!(ring.to_string(), "(1 ...)");
        for n in 2..5 {
            let mut ring = Ring::from_iter(1..=n);
            ring.reverse();
            assert_eq!(ring, Ring::from_iter((1..=n).rev()));
            assert_eq!(ring.to_string().ends_with(" ...)"), true);
            assert_eq!(ring.cycle_iter().nth(n as usize), Some(&n));
            ring.reverse();
            assert_eq!(ring, Ring::from_iter(1..=n));
        }
    }

    #[test]
    fn ring_pop_front() {
        let mut ring = Ring::from_iter(0..3);
        assert_eq!(ring.pop_front(), Some(0));
        assert_eq!(ring.to_string(), "(1 2 ...)");
        assert_eq!(ring.cycle_iter().nth(2), Some(&1));
        assert_eq!(ring.pop_front(), Some(1));
        assert_eq!(ring.to_string(), "(2 ...)");
        assert_eq!(ring.pop_front(), Some(2));
        assert_eq!(ring.pop_front(), None);
        assert_eq!(ring.to_string(), "()");
    }

    #[test]
    fn ring_into_iter() {
        let mut ring = Ring::from_iter(0..4);
        for x in &mut ring {
            *x += 1;
        }
        assert_eq!(Vec::from_iter(ring), vec![1, 2, 3, 4]);
    }
}
