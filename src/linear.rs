use std::convert::TryFrom;
use std::fmt;
use std::iter::{self, FromIterator};

use tracing::{debug, trace};

use crate::element::{Element, Flattenable, Linkable};
use crate::error::IndexError;
use crate::header::iterator::{IntoIter, Iter, IterMut};
use crate::header::{DetachedNodes, Header};
use crate::node::{HeapNode, Node};

/// A finitely-terminated singly-linked list.
///
/// Every node links to the next one and the last node links to nothing.
/// Positions are signed: range operations clamp out-of-range bounds, and the
/// splicing operations reject positions outside `0..=len`, so probing with
/// negative or overlong indices is always safe.
///
/// Reading by index walks forward from the closest known position (see the
/// crate documentation on the position cache), so reading a list in order
/// through [`at`](LinearList::at) costs *O*(1) per element.
///
/// # Examples
///
/// ```
/// use chain_lists::{list, LinearList};
///
/// let mut list: LinearList<i32> = list![0, 1, 2, 3];
/// list.delete(1, 2);
/// assert_eq!(list, list![0, 3]);
///
/// let mut other = list![9, 8];
/// assert!(list.absorb(1, &mut other).is_ok());
/// assert_eq!(list.to_string(), "(0 9 8 3)");
/// assert!(other.is_empty());
/// ```
pub struct LinearList<T, N: Node<T> = HeapNode<T>> {
    header: Header<T, N>,
}

// private methods
impl<T, N: Node<T>> LinearList<T, N> {
    /// Checks a splice position against `0..=len`.
    fn splice_index(&self, i: isize) -> Result<usize, IndexError> {
        usize::try_from(i)
            .ok()
            .filter(|&at| at <= self.header.len)
            .ok_or_else(|| {
                trace!(index = i, len = self.header.len, "splice position rejected");
                IndexError {
                    index: i,
                    len: self.header.len,
                }
            })
    }

    /// Unlinks the clamped range `start..=end` and returns it as a run.
    ///
    /// Ranges touching the head or the tail are unlinked without looking up
    /// their outer neighbour; an interior range needs the node before it.
    fn detach_range(&mut self, start: isize, end: isize) -> Option<DetachedNodes<T, N>> {
        let (start, end) = match self.header.enforce_bounds(start, end) {
            Some(bounds) => bounds,
            None => {
                trace!(start, end, len = self.header.len, "empty range");
                return None;
            }
        };
        let header = &mut self.header;
        let last_index = header.len - 1;
        // SAFETY: all nodes below are resolved within `0..len` and are alive;
        // each link is read before it is overwritten.
        let (front, back) = unsafe {
            match (start == 0, end == last_index) {
                (true, true) => return header.detach_all(),
                (true, false) => {
                    let front = header.first?;
                    let back = header.resolve(end)?;
                    header.first = back.as_ref().successor();
                    (front, back)
                }
                (false, true) => {
                    let mut before = header.resolve(start - 1)?;
                    let front = before.as_ref().successor()?;
                    let back = header.last?;
                    before.as_mut().link(None);
                    header.last = Some(before);
                    (front, back)
                }
                (false, false) => {
                    let mut before = header.resolve(start - 1)?;
                    let front = before.as_ref().successor()?;
                    let back = if start == end {
                        front
                    } else {
                        header.resolve(end)?
                    };
                    before.as_mut().link(back.as_ref().successor());
                    (front, back)
                }
            }
        };
        let len = end - start + 1;
        header.len -= len;
        header.cache.clear();
        // SAFETY: `front..=back` has just been unlinked and holds `len` nodes.
        Some(unsafe { DetachedNodes::new(front, back, len) })
    }
}

impl<T, N: Node<T>> LinearList<T, N> {
    /// Creates an empty `LinearList`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::LinearList;
    /// let list: LinearList<u32> = LinearList::new();
    /// assert_eq!(list.to_string(), "()");
    /// ```
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

    /// Provides a reference to the first element, or `None` if the list is
    /// empty.
    #[doc(alias = "head")]
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.header.front()
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.header.back()
    }

    /// Provides a reference to the element at `i`, or `None` if `i` is out of
    /// range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList};
    ///
    /// let list: LinearList<i32> = list![10, 11, 12];
    /// assert_eq!(list.at(1), Some(&11));
    /// assert_eq!(list.at(-1), None);
    /// assert_eq!(list.at(3), None);
    /// ```
    pub fn at(&self, i: isize) -> Option<&T> {
        usize::try_from(i).ok().and_then(|i| self.header.get(i))
    }

    pub fn at_mut(&mut self, i: isize) -> Option<&mut T> {
        match usize::try_from(i) {
            Ok(i) => self.header.get_mut(i),
            Err(_) => None,
        }
    }

    /// Replaces the element at `i` and returns the old one. Out of range, the
    /// list is left untouched and `None` is returned.
    pub fn set(&mut self, i: isize, value: T) -> Option<T> {
        let i = usize::try_from(i).ok()?;
        self.header.replace(i, value)
    }

    /// Resets the element at `i` to the absent value `T::default()`.
    pub fn clear_at(&mut self, i: isize) -> Option<T>
    where
        T: Default,
    {
        self.set(i, T::default())
    }

    /// Appends an element to the end of the list.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(1) time.
    #[inline]
    pub fn append(&mut self, value: T) {
        self.header.append(value);
    }

    /// Appends every value of `values`, linking the whole run to the list with
    /// a single reconnection.
    #[inline]
    pub fn concatenate<I: IntoIterator<Item = T>>(&mut self, values: I) {
        self.header.concatenate(values);
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    #[doc(alias = "tail")]
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        self.header.pop_front()
    }

    /// Removes all elements.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time.
    #[inline]
    pub fn clear(&mut self) {
        self.header.clear();
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T, N> {
        self.header.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, N> {
        self.header.iter_mut()
    }

    /// Reverses the order of the elements in place.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(*n*) time and *O*(1) memory.
    #[inline]
    pub fn reverse(&mut self) {
        self.header.reverse();
    }

    /// Flattens nested sequences into this list.
    ///
    /// Every element that is itself a sequence is flattened recursively and
    /// then replaced by its contents: the nested chain is spliced in place
    /// without copying, an empty one becomes `T::default()`, a single element
    /// is inlined. Nested sequences are left empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList, Value};
    ///
    /// let inner: LinearList<Value> = list![Value::from(3)];
    /// let middle: LinearList<Value> = list![Value::from(2), Value::from(inner)];
    /// let mut list: LinearList<Value> = list![Value::from(1), Value::from(middle)];
    /// assert_eq!(list.to_string(), "(1 (2 (3)))");
    /// list.flatten();
    /// assert_eq!(list.to_string(), "(1 2 3)");
    /// ```
    #[inline]
    pub fn flatten(&mut self)
    where
        T: Element<N>,
    {
        self.header.flatten();
    }

    /// Copies the elements, in order, into a `Vec`.
    #[doc(alias = "compact")]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Removes the elements in `from..=to`.
    ///
    /// The range is clamped to the list first; if nothing is left of it the
    /// call does nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList};
    ///
    /// let mut list: LinearList<i32> = list![0, 1, 2, 3];
    /// list.delete(-1, 0);
    /// assert_eq!(list, list![1, 2, 3]);
    /// list.delete(4, 0);
    /// assert_eq!(list, list![1, 2, 3]);
    /// ```
    pub fn delete(&mut self, from: isize, to: isize) {
        if let Some(run) = self.detach_range(from, to) {
            debug!(from, to, removed = run.len(), "delete");
            drop(run);
        }
    }

    /// Removes the elements in `start..=end` and returns them as a new list.
    ///
    /// The range is clamped like [`delete`](LinearList::delete); an empty
    /// range gives an empty list and leaves `self` untouched.
    ///
    /// # Complexity
    ///
    /// This operation should compute in *O*(`end`) time; no element is moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList};
    ///
    /// let mut list: LinearList<i32> = list![0, 1, 2, 3];
    /// let cut = list.cut(1, 2);
    /// assert_eq!(cut, list![1, 2]);
    /// assert_eq!(list, list![0, 3]);
    /// ```
    pub fn cut(&mut self, start: isize, end: isize) -> Self {
        match self.detach_range(start, end) {
            Some(run) => {
                debug!(start, end, len = run.len(), "cut");
                Self {
                    header: Header::from_detached(run),
                }
            }
            None => Self::new(),
        }
    }

    /// Inserts `value` at position `i`, where `i == len` appends.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] and leaves the list untouched if `i` is
    /// outside `0..=len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList};
    ///
    /// let mut list: LinearList<i32> = list![0, 1];
    /// assert!(list.insert(1, 9).is_ok());
    /// assert_eq!(list, list![0, 9, 1]);
    /// assert!(list.insert(4, 9).is_err());
    /// assert_eq!(list, list![0, 9, 1]);
    /// ```
    pub fn insert(&mut self, i: isize, value: T) -> Result<(), IndexError> {
        let at = self.splice_index(i)?;
        if at == self.header.len {
            self.header.append(value);
            return Ok(());
        }
        let before = match at {
            0 => None,
            _ => self.header.resolve(at - 1),
        };
        let header = &mut self.header;
        let mut node = N::allocate(value);
        // SAFETY: `node` is freshly allocated; `before` is a live node that is
        // not the last one, so its successor is the node now at `at`.
        unsafe {
            match before {
                None => {
                    node.as_mut().link(header.first);
                    header.first = Some(node);
                }
                Some(mut before) => {
                    node.as_mut().link(before.as_ref().successor());
                    before.as_mut().link(Some(node));
                }
            }
        }
        header.len += 1;
        header.cache.clear();
        Ok(())
    }

    /// Moves every node of `other` into `self` at position `i`, leaving
    /// `other` empty.
    ///
    /// Only the boundary links are touched, so the cost is the lookup of
    /// position `i` whatever the length of `other`.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] and leaves both lists untouched if `i` is
    /// outside `0..=len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chain_lists::{list, LinearList};
    ///
    /// let mut list: LinearList<i32> = list![0, 1];
    /// let mut other = list![9, 8];
    /// assert!(list.absorb(1, &mut other).is_ok());
    /// assert_eq!(list, list![0, 9, 8, 1]);
    /// assert!(other.is_empty());
    /// ```
    pub fn absorb(&mut self, i: isize, other: &mut Self) -> Result<(), IndexError> {
        let at = self.splice_index(i)?;
        let before = match at {
            0 => None,
            _ => self.header.resolve(at - 1),
        };
        let (front, mut back, len) = match other.header.detach_all() {
            Some(run) => run.into_parts(),
            None => return Ok(()),
        };
        let header = &mut self.header;
        // SAFETY: the run is owned by nobody else now; `before` is a live node
        // of `self` and its successor (if any) is the node at `at`.
        unsafe {
            match before {
                None => {
                    back.as_mut().link(header.first);
                    header.first = Some(front);
                    if header.last.is_none() {
                        header.last = Some(back);
                    }
                }
                Some(mut before) => {
                    back.as_mut().link(before.as_ref().successor());
                    before.as_mut().link(Some(front));
                    if header.last == Some(before) {
                        header.last = Some(back);
                    }
                }
            }
        }
        header.len += len;
        header.cache.clear();
        debug_assert!(
            // SAFETY: `last` is a live node of the chain.
            header.last.map_or(false, |last| unsafe { last.as_ref().successor().is_none() }),
            "a finite chain must end with an unlinked node"
        );
        debug!(index = at, absorbed = len, len = header.len, "absorb");
        Ok(())
    }

    /// Inserts `n` absent values (`T::default()`) at position `i`.
    ///
    /// # Errors
    ///
    /// Returns an [`IndexError`] and leaves the list untouched if `i` is
    /// outside `0..=len`.
    pub fn expand(&mut self, i: isize, n: usize) -> Result<(), IndexError>
    where
        T: Default,
    {
        self.splice_index(i)?;
        let mut run: Self = iter::repeat_with(T::default).take(n).collect();
        self.absorb(i, &mut run)
    }

    #[cfg(test)]
    pub(crate) fn first_node(&self) -> Option<std::ptr::NonNull<N>> {
        self.header.first
    }
}

impl<T, N: Node<T>> Default for LinearList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, N: Node<T>> Clone for LinearList<T, N> {
    /// A shallow copy: every element is cloned into a fresh chain.
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
        }
    }
}

impl<T: PartialEq, N: Node<T>> PartialEq for LinearList<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
    }
}

impl<T: Eq, N: Node<T>> Eq for LinearList<T, N> {}

impl<T: fmt::Display, N: Node<T>> fmt::Display for LinearList<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.header, f)
    }
}

impl<T: fmt::Debug, N: Node<T>> fmt::Debug for LinearList<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.header, f)
    }
}

impl<T, N: Node<T>> FromIterator<T> for LinearList<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.concatenate(iter);
        list
    }
}

impl<T, N: Node<T>> Extend<T> for LinearList<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.concatenate(iter);
    }
}

impl<T, N: Node<T>> IntoIterator for LinearList<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.header)
    }
}

impl<'a, T, N: Node<T>> IntoIterator for &'a LinearList<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, N: Node<T>> IntoIterator for &'a mut LinearList<T, N> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Element<N>, N: Node<T>> Flattenable for LinearList<T, N> {
    fn flatten(&mut self) {
        self.header.flatten();
    }
}

impl<T, N: Node<T>> Linkable<T, N> for LinearList<T, N> {
    fn len(&self) -> usize {
        self.header.len()
    }

    fn unlink(&mut self) -> Option<DetachedNodes<T, N>> {
        self.header.detach_all()
    }
}
