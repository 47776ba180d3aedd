//! Capabilities an element may expose to the list holding it.
//!
//! [`LinearList::flatten`] and [`CycList::flatten`] ask every element two
//! questions: can it reduce its own nesting ([`Flattenable`]), and is it itself
//! a chain of the same node kind that can be spliced in place ([`Linkable`])?
//! An [`Element`] answers through [`Element::as_flattenable`] and
//! [`Element::as_linkable`]; plain values keep the defaults and answer "no" to
//! each.
//!
//! [`LinearList::flatten`]: crate::LinearList::flatten
//! [`CycList::flatten`]: crate::CycList::flatten

use crate::header::DetachedNodes;
use crate::node::Node;

/// A value that can reduce its own nesting in place.
pub trait Flattenable {
    fn flatten(&mut self);
}

/// A sequence exposing its own chain of `N` nodes.
pub trait Linkable<T, N: Node<T>> {
    fn len(&self) -> usize;

    /// Detaches the whole chain, leaving `self` empty, or returns `None` if
    /// there is nothing to detach.
    fn unlink(&mut self) -> Option<DetachedNodes<T, N>>;
}

/// An element of a list built from `N` nodes.
///
/// `Default` stands for the absent value: flattening an empty nested sequence
/// leaves `Self::default()` in its place.
///
/// Only the three `as_*` hooks are meant to be implemented; the remaining
/// methods are what the lists call and route through the hooks.
pub trait Element<N: Node<Self>>: Default {
    /// The nesting this value can reduce, if any.
    fn as_flattenable(&mut self) -> Option<&mut dyn Flattenable> {
        None
    }

    /// The nested sequence this value is, if any and if it can be read now.
    fn as_linkable(&self) -> Option<&dyn Linkable<Self, N>> {
        None
    }

    fn as_linkable_mut(&mut self) -> Option<&mut dyn Linkable<Self, N>> {
        None
    }

    /// Flattens whatever the value nests. Values without nesting do nothing.
    fn flatten(&mut self) {
        if let Some(nested) = self.as_flattenable() {
            nested.flatten();
        }
    }

    /// Length of the nested sequence, or `None` if the value is not one.
    fn linked_len(&self) -> Option<usize> {
        self.as_linkable().map(|nested| nested.len())
    }

    /// Detaches the chain of the nested sequence, emptying it.
    fn unlink(&mut self) -> Option<DetachedNodes<Self, N>> {
        self.as_linkable_mut()?.unlink()
    }
}

macro_rules! plain_elements {
    ($($ty:ty),* $(,)?) => {
        $(impl<N: Node<$ty>> Element<N> for $ty {})*
    };
}

plain_elements!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

impl<N: Node<Option<T>>, T> Element<N> for Option<T> {}
