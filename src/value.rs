//! A heterogeneous element type.
//!
//! [`Value`] lets one list hold scalars and nested lists side by side, the
//! way the canonical text form `(1 (2 nil) (3 ...))` does. Nested lists are
//! shared handles: cloning a value clones the handle, not the nested chain.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::cyclic::CycList;
use crate::element::{Element, Flattenable, Linkable};
use crate::header::DetachedNodes;
use crate::linear::LinearList;
use crate::node::HeapNode;

/// A single element of a heterogeneous list.
///
/// `Nil` is the absent value: it is what [`Default`] gives, what
/// `clear_at` stores and what an empty nested list flattens to. It renders
/// as `nil`.
///
/// A list reachable from itself through `List`/`Loop` handles is never
/// released and cannot be rendered.
///
/// # Examples
///
/// ```
/// use chain_lists::{list, LinearList, Value};
///
/// let inner: LinearList<Value> = list![Value::from(0), Value::Nil];
/// let outer: LinearList<Value> = list![Value::from(1), Value::from(inner)];
/// assert_eq!(outer.to_string(), "(1 (0 nil))");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<RefCell<LinearList<Value>>>),
    Loop(Rc<RefCell<CycList<Value>>>),
}

impl Value {
    /// Returns `true` for the absent value, which is what emptied nested
    /// lists and cleared positions hold.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

/// Scalars compare by value; nested lists compare element by element from
/// their first node. Values of different variants are never equal, and a
/// finite list is never equal to a circular one.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || shared_eq(a, b),
            (Value::Loop(a), Value::Loop(b)) => Rc::ptr_eq(a, b) || shared_eq(a, b),
            _ => false,
        }
    }
}

/// A nested list that is being mutated compares unequal.
fn shared_eq<L: PartialEq>(a: &RefCell<L>, b: &RefCell<L>) -> bool {
    match (a.try_borrow(), b.try_borrow()) {
        (Ok(a), Ok(b)) => *a == *b,
        _ => false,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::List(list) => match list.try_borrow() {
                Ok(list) => write!(f, "{}", list),
                Err(_) => f.write_str("(..)"),
            },
            Value::Loop(list) => match list.try_borrow() {
                Ok(list) => write!(f, "{}", list),
                Err(_) => f.write_str("(.. ...)"),
            },
        }
    }
}

impl Flattenable for Value {
    /// Flattens the nested list, unless it is already being flattened
    /// further up (a list nested in itself).
    fn flatten(&mut self) {
        match self {
            Value::List(list) => {
                if let Ok(mut list) = list.try_borrow_mut() {
                    Flattenable::flatten(&mut *list);
                }
            }
            Value::Loop(list) => {
                if let Ok(mut list) = list.try_borrow_mut() {
                    Flattenable::flatten(&mut *list);
                }
            }
            _ => {}
        }
    }
}

impl Linkable<Value, HeapNode<Value>> for Value {
    /// A nested list that is being mutated reports no elements.
    fn len(&self) -> usize {
        match self {
            Value::List(list) => list.try_borrow().map_or(0, |list| Linkable::len(&*list)),
            Value::Loop(list) => list.try_borrow().map_or(0, |list| Linkable::len(&*list)),
            _ => 0,
        }
    }

    fn unlink(&mut self) -> Option<DetachedNodes<Value, HeapNode<Value>>> {
        match self {
            Value::List(list) => Linkable::unlink(&mut *list.try_borrow_mut().ok()?),
            Value::Loop(list) => Linkable::unlink(&mut *list.try_borrow_mut().ok()?),
            _ => None,
        }
    }
}

impl Element<HeapNode<Value>> for Value {
    fn as_flattenable(&mut self) -> Option<&mut dyn Flattenable> {
        match self {
            Value::List(_) | Value::Loop(_) => Some(self),
            _ => None,
        }
    }

    fn as_linkable(&self) -> Option<&dyn Linkable<Value, HeapNode<Value>>> {
        let readable = match self {
            Value::List(list) => list.try_borrow().is_ok(),
            Value::Loop(list) => list.try_borrow().is_ok(),
            _ => false,
        };
        if readable {
            Some(self)
        } else {
            None
        }
    }

    fn as_linkable_mut(&mut self) -> Option<&mut dyn Linkable<Value, HeapNode<Value>>> {
        match self {
            Value::List(_) | Value::Loop(_) => Some(self),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<LinearList<Value>> for Value {
    fn from(list: LinearList<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(list)))
    }
}

impl From<CycList<Value>> for Value {
    fn from(list: CycList<Value>) -> Self {
        Value::Loop(Rc::new(RefCell::new(list)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::cyclic::CycList;
    use crate::element::Element;
    use crate::linear::LinearList;
    use std::iter::FromIterator;

    fn list<I: IntoIterator<Item = Value>>(values: I) -> LinearList<Value> {
        LinearList::from_iter(values)
    }

    #[test]
    fn value_format() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-3).to_string(), "-3");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::from(None::<i32>).to_string(), "nil");
        assert_eq!(Value::from(list(vec![])).to_string(), "()");
        assert_eq!(Value::from(CycList::<Value>::from_iter(vec![Value::Nil])).to_string(), "(nil ...)");
    }

    #[test]
    fn value_equality() {
        assert_eq!(Value::Nil, Value::default());
        assert_eq!(Value::from(1), Value::from(1_i64));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));

        let a = Value::from(list(vec![1.into(), 2.into()]));
        let b = Value::from(list(vec![1.into(), 2.into()]));
        let c = Value::from(CycList::<Value>::from_iter(vec![Value::from(1), Value::from(2)]));
        assert_eq!(a, a.clone());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn value_element_capabilities() {
        let mut scalar = Value::from(4);
        assert_eq!(scalar.linked_len(), None);
        assert!(scalar.unlink().is_none());

        let mut nested = Value::from(list(vec![1.into(), 2.into(), 3.into()]));
        assert_eq!(nested.linked_len(), Some(3));
        let run = nested.unlink().unwrap();
        assert_eq!(run.len(), 3);
        assert_eq!(nested.linked_len(), Some(0));
        assert_eq!(nested.to_string(), "()");
    }

    #[test]
    fn value_capability_hooks() {
        let mut scalar = Value::from("s");
        assert!(scalar.as_flattenable().is_none());
        assert!(scalar.as_linkable().is_none());
        assert!(scalar.as_linkable_mut().is_none());

        let inner = Value::from(list(vec![1.into(), 2.into()]));
        let mut nested = Value::from(CycList::<Value>::from_iter(vec![inner.clone(), 3.into()]));
        assert_eq!(nested.as_linkable().map(|l| l.len()), Some(2));
        nested.as_flattenable().unwrap().flatten();
        assert_eq!(nested.to_string(), "(1 2 3 ...)");
        assert_eq!(inner.to_string(), "()");

        let run = nested.as_linkable_mut().unwrap().unlink().unwrap();
        assert_eq!(run.len(), 3);
        assert_eq!(nested.to_string(), "()");
    }

    #[test]
    fn value_is_nil() {
        assert!(Value::Nil.is_nil());
        assert!(Value::default().is_nil());
        assert!(Value::from(None::<bool>).is_nil());
        assert!(!Value::from(0).is_nil());
        assert!(!Value::from(list(vec![])).is_nil());

        let mut cleared = list(vec![1.into(), 2.into()]);
        cleared.clear_at(1);
        assert!(cleared.at(1).map_or(false, Value::is_nil));
        cleared.set(0, Value::from(list(vec![])));
        cleared.flatten();
        assert!(cleared.iter().all(Value::is_nil));
    }

    #[test]
    fn value_busy_nested_list_is_opaque() {
        let mut nested = Value::from(list(vec![1.into(), 2.into()]));
        let shared = nested.clone();
        if let Value::List(handle) = &shared {
            let _guard = handle.borrow_mut();
            assert_eq!(nested.linked_len(), None);
            assert!(nested.unlink().is_none());
            nested.flatten();
            assert_eq!(nested.to_string(), "(..)");
        }
        assert_eq!(nested.linked_len(), Some(2));
    }
}
