//! codec::live
//!
//! Shared, mutable value graphs.
//!
//! [`LiveValue`] containers are reference counted, so the same object can be
//! reachable from several places, including from inside itself. The codec
//! flattens such graphs safely: a container already on the current descent
//! path is emitted as a `"[Circular (<path>)]"` sentinel.
//!
//! Graphs that contain cycles leak unless a container is cleared; they are
//! meant for short-lived, request-scoped values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::{FlattenNode, Shape};

/// A node in a shared value graph.
#[derive(Clone)]
pub enum LiveValue {
    /// Scalar (or opaque) value
    Leaf(Value),
    /// Ordered object members
    Object(Rc<RefCell<Vec<(String, LiveValue)>>>),
    /// List items
    Array(Rc<RefCell<Vec<LiveValue>>>),
}

impl LiveValue {
    pub fn leaf(value: impl Into<Value>) -> Self {
        LiveValue::Leaf(value.into())
    }

    /// A new empty object.
    pub fn object() -> Self {
        LiveValue::Object(Rc::new(RefCell::new(Vec::new())))
    }

    /// A new empty list.
    pub fn array() -> Self {
        LiveValue::Array(Rc::new(RefCell::new(Vec::new())))
    }

    /// Set `key` on an object, replacing any previous member.
    ///
    /// Returns `false` if this node is not an object.
    pub fn insert(&self, key: impl Into<String>, value: LiveValue) -> bool {
        let LiveValue::Object(members) = self else {
            return false;
        };
        let key = key.into();
        let mut members = members.borrow_mut();
        match members.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => members.push((key, value)),
        }
        true
    }

    /// Append to a list.
    ///
    /// Returns `false` if this node is not a list.
    pub fn push(&self, value: LiveValue) -> bool {
        let LiveValue::Array(items) = self else {
            return false;
        };
        items.borrow_mut().push(value);
        true
    }

    /// Remove every member or item, breaking any cycle through this node.
    pub fn clear(&self) {
        match self {
            LiveValue::Leaf(_) => {}
            LiveValue::Object(members) => members.borrow_mut().clear(),
            LiveValue::Array(items) => items.borrow_mut().clear(),
        }
    }

    /// Build an unshared graph from a JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let node = LiveValue::object();
                for (key, child) in map {
                    node.insert(key.clone(), LiveValue::from_value(child));
                }
                node
            }
            Value::Array(items) => {
                let node = LiveValue::array();
                for child in items {
                    node.push(LiveValue::from_value(child));
                }
                node
            }
            leaf => LiveValue::Leaf(leaf.clone()),
        }
    }
}

impl FlattenNode for LiveValue {
    fn shape(&self) -> Shape<Self> {
        match self {
            LiveValue::Leaf(value) => Shape::Leaf(value.clone()),
            LiveValue::Object(members) => Shape::Object(members.borrow().clone()),
            LiveValue::Array(items) => Shape::Array(items.borrow().clone()),
        }
    }

    fn identity(&self) -> Option<usize> {
        match self {
            LiveValue::Leaf(_) => None,
            LiveValue::Object(members) => Some(Rc::as_ptr(members) as *const () as usize),
            LiveValue::Array(items) => Some(Rc::as_ptr(items) as *const () as usize),
        }
    }
}

// Shallow: a cyclic graph must not be walked.
impl fmt::Debug for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveValue::Leaf(value) => write!(f, "Leaf({})", value),
            LiveValue::Object(members) => write!(f, "Object({} members)", members.borrow().len()),
            LiveValue::Array(items) => write!(f, "Array({} items)", items.borrow().len()),
        }
    }
}
