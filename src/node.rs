use std::mem;
use std::ptr::NonNull;

/// The capability every link-holder of a chain provides.
///
/// A node holds exactly one value and one outgoing link. The link is `None`
/// for the terminal node of a finite chain and always `Some` inside a closed
/// chain.
///
/// The node kind doubles as the factory of a list: [`Node::allocate`] creates
/// a detached node, and the list that links it in takes ownership of it until
/// it hands it back through [`Node::release`].
///
/// # Safety
///
/// Implementors must return from `allocate` a pointer that stays valid (and is
/// not aliased mutably elsewhere) until it is passed to `release`, and
/// `release` must free exactly the allocation made by `allocate`.
pub unsafe trait Node<T>: Sized {
    /// Creates a detached node holding `content`, with no successor.
    fn allocate(content: T) -> NonNull<Self>;

    /// Frees a node created by [`Node::allocate`] and returns its content.
    ///
    /// # Safety
    ///
    /// `node` must come from `Self::allocate`, must not have been released yet,
    /// and must not be reachable through any link that will be read again.
    unsafe fn release(node: NonNull<Self>) -> T;

    fn content(&self) -> &T;

    fn content_mut(&mut self) -> &mut T;

    fn successor(&self) -> Option<NonNull<Self>>;

    fn link(&mut self, successor: Option<NonNull<Self>>);

    /// Replaces the held value, returning the old one.
    fn set_content(&mut self, value: T) -> T {
        mem::replace(self.content_mut(), value)
    }

    /// Compares the held value against `other`.
    fn equals(&self, other: &T) -> bool
    where
        T: PartialEq,
    {
        self.content() == other
    }

    /// Hops forward `hops` times along the outgoing links, or returns `None`
    /// if the walk runs off the end of a finite chain.
    ///
    /// # Safety
    ///
    /// Every node visited by the walk must be alive.
    unsafe fn advance(node: NonNull<Self>, hops: usize) -> Option<NonNull<Self>> {
        let mut current = node;
        for _ in 0..hops {
            current = current.as_ref().successor()?;
        }
        Some(current)
    }
}

/// The default node kind: one heap allocation per element.
pub struct HeapNode<T> {
    next: Option<NonNull<HeapNode<T>>>,
    element: T,
}

unsafe impl<T> Node<T> for HeapNode<T> {
    fn allocate(content: T) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(HeapNode {
            next: None,
            element: content,
        })))
    }

    unsafe fn release(node: NonNull<Self>) -> T {
        Box::from_raw(node.as_ptr()).element
    }

    #[inline]
    fn content(&self) -> &T {
        &self.element
    }

    #[inline]
    fn content_mut(&mut self) -> &mut T {
        &mut self.element
    }

    #[inline]
    fn successor(&self) -> Option<NonNull<Self>> {
        self.next
    }

    #[inline]
    fn link(&mut self, successor: Option<NonNull<Self>>) {
        self.next = successor;
    }
}

#[cfg(test)]
mod tests {
    use super::{HeapNode, Node};

    #[test]
    fn node_allocate_and_release() {
        let node = HeapNode::allocate(-1);
        unsafe {
            assert_eq!(node.as_ref().content(), &-1);
            assert!(node.as_ref().successor().is_none());
            assert_eq!(HeapNode::release(node), -1);
        }
    }

    #[test]
    fn node_advance() {
        let a = HeapNode::allocate('a');
        let b = HeapNode::allocate('b');
        let c = HeapNode::allocate('c');
        unsafe {
            (*a.as_ptr()).link(Some(b));
            (*b.as_ptr()).link(Some(c));

            assert_eq!(HeapNode::advance(a, 0), Some(a));
            assert_eq!(HeapNode::advance(a, 2), Some(c));
            assert_eq!(HeapNode::advance(a, 3), None);

            // closing the chain makes every walk succeed
            (*c.as_ptr()).link(Some(a));
            assert_eq!(HeapNode::advance(a, 4), Some(b));

            let mut node = b;
            assert_eq!(node.as_mut().set_content('x'), 'b');
            assert!(node.as_ref().equals(&'x'));

            HeapNode::release(a);
            HeapNode::release(b);
            HeapNode::release(c);
        }
    }
}
