//! This crate provides singly-linked lists in two shapes, finite and
//! circular, built on one splice-based engine.
//!
//! A [`LinearList`] ends with a node linking to nothing; a [`CycList`] closes
//! the chain by linking its last node back to the first. Both keep references
//! to their first and last nodes, so appending and concatenating take *O*(1)
//! per element, and both move whole runs of nodes between lists by relinking
//! their boundaries instead of copying elements.
//!
//! Here is a quick example showing how the lists work.
//!
//! ```
//! use chain_lists::{list, ring, CycList, LinearList};
//!
//! let mut list: LinearList<i32> = list![0, 1, 2, 3];
//! let middle = list.cut(1, 2); // unlinks `1 2`, no element is moved
//! assert_eq!(middle.to_string(), "(1 2)");
//! assert_eq!(list.to_string(), "(0 3)");
//!
//! let mut ring: CycList<i32> = ring![0, 1, 2, 3];
//! assert_eq!(ring.at(-1), Some(&3)); // every index wraps around
//! ring.rotate(2);
//! assert_eq!(ring.to_string(), "(2 3 0 1 ...)");
//! ```
//!
//! # Memory Layout
//!
//! ```text
//!    ╔═══════════╗         ╔═══════════╗                    ╔═══════════╗
//!    ║   next    ║ ──────→ ║   next    ║ ──────→ ┄┄ ──────→ ║   next    ║ ──→ none (finite)
//!    ╟───────────╢         ╟───────────╢                    ╟───────────╢     or Node 0 (circular)
//!    ║ payload T ║         ║ payload T ║                    ║ payload T ║
//!    ╚═══════════╝         ╚═══════════╝                    ╚═══════════╝
//!       Node 0                Node 1                          Node n - 1
//!         ↑                                                       ↑
//! ╔═══════════╗                                                   │
//! ║   first   ║                                                   │
//! ║   last    ║ ──────────────────────────────────────────────────┘
//! ║   cache   ║ (index, node) of the last position resolved
//! ║    len    ║
//! ╚═══════════╝
//!     List
//! ```
//!
//! Each list owns every node reachable from `first` within `len` hops and
//! releases them when dropped. A node is allocated through its node kind,
//! the `N: Node<T>` parameter of both lists, which defaults to [`HeapNode`]
//! (one boxed node per element).
//!
//! # Position Cache
//!
//! Walking a singly-linked chain is only cheap forwards, so each list
//! remembers the last position it resolved by index. A read at a later
//! index starts from there instead of from the first node, making an
//! in-order scan through [`LinearList::at`] linear rather than quadratic.
//! Any change to the chain forgets the position.
//!
//! The cache can be disabled with the `position-cache` feature:
//! ```text
//! [dependencies]
//! chain_lists = { default-features = false }
//! ```
//!
//! # Nested Lists
//!
//! A list of [`Value`]s can hold other lists. [`LinearList::flatten`] and
//! [`CycList::flatten`] splice the nested chains into the outer one in place.
//!
//! ```
//! use chain_lists::{list, ring, CycList, LinearList, Value};
//!
//! let inner: CycList<Value> = ring![Value::from(2), Value::from(3)];
//! let mut outer: LinearList<Value> = list![Value::from(1), Value::from(inner), Value::Nil];
//! assert_eq!(outer.to_string(), "(1 (2 3 ...) nil)");
//! outer.flatten();
//! assert_eq!(outer.to_string(), "(1 2 3 nil)");
//! ```
//!
//! # Threads
//!
//! A list can be sent to another thread but not shared between threads: the
//! position cache is updated by reads. Callers needing shared access must
//! wrap a list in a lock.
//!
//! [`Value`]: crate::Value

#[doc(inline)]
pub use cyclic::{CycList, Cycle};
#[doc(inline)]
pub use element::{Element, Flattenable, Linkable};
#[doc(inline)]
pub use error::IndexError;
#[doc(inline)]
pub use header::iterator::{IntoIter, Iter, IterMut};
#[doc(inline)]
pub use header::DetachedNodes;
#[doc(inline)]
pub use linear::LinearList;
#[doc(inline)]
pub use node::{HeapNode, Node};
#[doc(inline)]
pub use value::Value;

pub mod cyclic;
pub mod element;
pub mod linear;
pub mod node;
pub mod value;

mod cache;
mod error;
mod header;

/// Creates a [`LinearList`] holding the given elements in order.
///
/// ```
/// use chain_lists::{list, LinearList};
///
/// let list: LinearList<&str> = list!["a", "b"];
/// assert_eq!(list.to_string(), "(a b)");
/// ```
#[macro_export]
macro_rules! list {
    ($($x:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut list: $crate::LinearList<_> = $crate::LinearList::new();
        $(list.append($x);)*
        list
    }};
}

/// Creates a [`CycList`] holding the given elements in order.
///
/// ```
/// use chain_lists::{ring, CycList};
///
/// let ring: CycList<char> = ring!['a', 'b'];
/// assert_eq!(ring.to_string(), "(a b ...)");
/// ```
#[macro_export]
macro_rules! ring {
    ($($x:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut ring: $crate::CycList<_> = $crate::CycList::new();
        $(ring.append($x);)*
        ring
    }};
}
