use thiserror::Error;

/// A splice position outside `0..=len`.
///
/// Returned by the operations that add nodes at an index ([`insert`],
/// [`absorb`], [`expand`]). The list is left untouched.
///
/// [`insert`]: crate::LinearList::insert
/// [`absorb`]: crate::LinearList::absorb
/// [`expand`]: crate::LinearList::expand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot splice at index {index} of a list of length {len}")]
pub struct IndexError {
    pub index: isize,
    pub len: usize,
}
