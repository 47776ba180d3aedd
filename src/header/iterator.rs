use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::header::Header;
use crate::node::{HeapNode, Node};

/// An iterator over the elements of a list, from `first`, exactly `len`
/// times.
///
/// It terminates on circular lists too: the walk counts hops instead of
/// looking for the end of the chain.
pub struct Iter<'a, T: 'a, N: Node<T> = HeapNode<T>> {
    next: Option<NonNull<N>>,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: 'a, N: Node<T>> Iter<'a, T, N> {
    pub(crate) fn new(header: &'a Header<T, N>) -> Self {
        Self {
            next: header.first,
            len: header.len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, N: Node<T>> Clone for Iter<'a, T, N> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: fmt::Debug + 'a, N: Node<T>> fmt::Debug for Iter<'a, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.len).finish()
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `next` is one of the remaining `len` nodes of a list
        // borrowed immutably for `'a`.
        let current = unsafe { &*self.next?.as_ptr() };
        self.next = current.successor();
        self.len -= 1;
        Some(current.content())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> ExactSizeIterator for Iter<'a, T, N> {}

impl<'a, T: 'a, N: Node<T> + 'a> FusedIterator for Iter<'a, T, N> {}

unsafe impl<T: Sync, N: Node<T>> Send for Iter<'_, T, N> {}

unsafe impl<T: Sync, N: Node<T>> Sync for Iter<'_, T, N> {}

/// A mutable iterator over the elements of a list.
///
/// It gives access to the elements but not to the links between them.
pub struct IterMut<'a, T: 'a, N: Node<T> = HeapNode<T>> {
    next: Option<NonNull<N>>,
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T: 'a, N: Node<T>> IterMut<'a, T, N> {
    pub(crate) fn new(header: &'a mut Header<T, N>) -> Self {
        Self {
            next: header.first,
            len: header.len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> Iterator for IterMut<'a, T, N> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: `next` is one of the remaining `len` nodes of a list
        // borrowed mutably for `'a`; each node is yielded at most once.
        let current = unsafe { &mut *self.next?.as_ptr() };
        self.next = current.successor();
        self.len -= 1;
        Some(current.content_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T: 'a, N: Node<T> + 'a> ExactSizeIterator for IterMut<'a, T, N> {}

impl<'a, T: 'a, N: Node<T> + 'a> FusedIterator for IterMut<'a, T, N> {}

unsafe impl<T: Send, N: Node<T>> Send for IterMut<'_, T, N> {}

unsafe impl<T: Sync, N: Node<T>> Sync for IterMut<'_, T, N> {}

/// An owning iterator over the elements of a list.
pub struct IntoIter<T, N: Node<T> = HeapNode<T>> {
    header: Header<T, N>,
}

impl<T, N: Node<T>> IntoIter<T, N> {
    pub(crate) fn new(header: Header<T, N>) -> Self {
        Self { header }
    }
}

impl<T: fmt::Debug, N: Node<T>> fmt::Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.header).finish()
    }
}

impl<T, N: Node<T>> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.header.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.header.len(), Some(self.header.len()))
    }
}

impl<T, N: Node<T>> ExactSizeIterator for IntoIter<T, N> {}

impl<T, N: Node<T>> FusedIterator for IntoIter<T, N> {}

#[cfg(test)]
mod tests {
    use crate::cyclic::CycList;
    use crate::linear::LinearList;
    use std::iter::FromIterator;

    #[test]
    fn iter_counts_down_exactly() {
        let list = LinearList::<i32>::from_iter(0..4);
        let mut iter = list.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(iter.by_ref().count(), 3);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);

        let ring = CycList::<i32>::from_iter(0..3);
        let iter = ring.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn iter_mut_counts_down_exactly() {
        let mut ring = CycList::<i32>::from_iter(0..3);
        let mut iter = ring.iter_mut();
        assert_eq!(iter.len(), 3);
        for x in iter.by_ref() {
            *x *= 10;
        }
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(ring.to_vec(), vec![0, 10, 20]);

        let mut list = LinearList::<i32>::from_iter(0..2);
        let into_iter = list.clone().into_iter();
        assert_eq!(into_iter.len(), 2);
        list.iter_mut().for_each(|x| *x += 1);
        assert_eq!(list.to_vec(), vec![1, 2]);
    }
}
