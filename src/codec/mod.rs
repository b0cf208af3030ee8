//! codec
//!
//! Flatten/unflatten between nested values and flat path-keyed maps.
//!
//! # Overview
//!
//! Stored content is a list of `{key, value}` pairs whose keys are paths
//! (see [`path`] for the grammar). [`unflatten`] rebuilds the nested value,
//! [`flatten`] produces the flat form again.
//!
//! # Guarantees
//!
//! - For any value without cycles whose object keys are non-empty and contain
//!   none of `.`, `[` and `]`, `unflatten(flatten(x)) == x` (the root `null`
//!   flattens to nothing and comes back as `{}`). An empty key has no path
//!   segment, so its value lands on the parent path.
//! - Empty objects and lists are emitted as `{}` / `[]` leaves so they
//!   survive the round trip.
//! - Flattening a graph with cycles terminates: a container revisited on the
//!   current descent path becomes a `"[Circular (<path>)]"` string, where
//!   `<path>` is where the container was first entered.
//!
//! # Example
//!
//! ```
//! use burdy_content::codec::{flatten, unflatten_value};
//! use serde_json::json;
//!
//! let tree = json!({ "content": { "items": [{ "title": "A" }, { "title": "B" }] } });
//! let flat = flatten(&tree);
//!
//! assert_eq!(flat["content.items[1].title"], json!("B"));
//! assert_eq!(unflatten_value(&serde_json::Value::Object(flat)), tree);
//! ```

pub mod live;
pub mod path;

pub use live::LiveValue;
pub use path::{ContentPath, PathSegment};

use serde_json::{Map, Value};

use crate::core::types::MetaEntry;
use path::{join_index, join_key, parse_path, MAX_LIST_INDEX};

/// What a node looks like one level down.
#[derive(Debug, Clone)]
pub enum Shape<N> {
    /// Terminal value
    Leaf(Value),
    /// Object members in order
    Object(Vec<(String, N)>),
    /// List items in order
    Array(Vec<N>),
}

/// A node the codec can flatten.
///
/// `identity` returns a stable address for containers so revisits can be
/// detected; leaves return `None`.
pub trait FlattenNode: Sized {
    fn shape(&self) -> Shape<Self>;
    fn identity(&self) -> Option<usize>;
}

impl<'a> FlattenNode for &'a Value {
    fn shape(&self) -> Shape<Self> {
        match *self {
            Value::Object(map) => {
                Shape::Object(map.iter().map(|(k, v)| (k.clone(), v)).collect())
            }
            Value::Array(items) => Shape::Array(items.iter().collect()),
            leaf => Shape::Leaf(leaf.clone()),
        }
    }

    fn identity(&self) -> Option<usize> {
        match *self {
            Value::Object(_) | Value::Array(_) => Some(*self as *const Value as usize),
            _ => None,
        }
    }
}

/// Flatten a JSON value into a path-keyed map.
pub fn flatten(tree: &Value) -> Map<String, Value> {
    flatten_node(tree)
}

/// Flatten any [`FlattenNode`] graph.
pub fn flatten_node<N: FlattenNode>(root: N) -> Map<String, Value> {
    let mut out = Map::new();
    let mut ancestors = Vec::new();
    flatten_into(&root, String::new(), &mut ancestors, &mut out);
    out
}

fn flatten_into<N: FlattenNode>(
    node: &N,
    path: String,
    ancestors: &mut Vec<(usize, String)>,
    out: &mut Map<String, Value>,
) {
    let shape = match node.shape() {
        Shape::Leaf(value) => {
            // The root emits nothing for an empty tree
            if !(path.is_empty() && value.is_null()) {
                out.insert(path, value);
            }
            return;
        }
        container => container,
    };

    let identity = node.identity();
    if let Some(id) = identity {
        if let Some((_, first_seen)) = ancestors.iter().find(|(seen, _)| *seen == id) {
            let sentinel = format!("[Circular ({})]", first_seen);
            out.insert(path, Value::String(sentinel));
            return;
        }
        ancestors.push((id, path.clone()));
    }

    match shape {
        Shape::Object(members) => {
            if members.is_empty() && !path.is_empty() {
                out.insert(path.clone(), Value::Object(Map::new()));
            }
            for (key, child) in members {
                flatten_into(&child, join_key(&path, &key), ancestors, out);
            }
        }
        Shape::Array(items) => {
            if items.is_empty() {
                out.insert(path.clone(), Value::Array(Vec::new()));
            }
            for (index, child) in items.into_iter().enumerate() {
                flatten_into(&child, join_index(&path, index), ancestors, out);
            }
        }
        Shape::Leaf(_) => {}
    }

    if identity.is_some() {
        ancestors.pop();
    }
}

/// Rebuild a nested value from flat `(path, value)` pairs.
///
/// Containers are created lazily, lists are padded with `null`. When entries
/// conflict, a `null` in the way is replaced by a container, while an entry
/// that would descend through a non-null scalar is dropped. A numeric segment
/// on an object becomes a string key; a non-numeric key on a list drops the
/// entry. A key with no segments sets the root itself.
pub fn unflatten<I, K>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut root = Value::Null;

    for (key, value) in entries {
        let segments = parse_path(key.as_ref());
        match slot(&mut root, &segments) {
            Some(target) => *target = value,
            None => tracing::trace!(key = key.as_ref(), "dropping conflicting flat entry"),
        }
    }

    if root.is_null() {
        Value::Object(Map::new())
    } else {
        root
    }
}

/// Unflatten a JSON object; any other value is returned unchanged.
pub fn unflatten_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => unflatten(map.iter().map(|(k, v)| (k, v.clone()))),
        other => other.clone(),
    }
}

/// Unflatten stored meta entries. Values stay strings.
pub fn unflatten_meta(meta: &[MetaEntry]) -> Value {
    unflatten(
        meta.iter()
            .map(|entry| (entry.key.as_str(), Value::String(entry.value.clone()))),
    )
}

/// Walk to (creating as needed) the slot addressed by `segments`.
fn slot<'v>(root: &'v mut Value, segments: &[PathSegment]) -> Option<&'v mut Value> {
    let mut cur = root;

    for segment in segments {
        if cur.is_null() {
            *cur = match segment {
                PathSegment::Index(_) => Value::Array(Vec::new()),
                PathSegment::Key(_) => Value::Object(Map::new()),
            };
        }

        cur = match (cur, segment) {
            (Value::Array(items), PathSegment::Index(index)) => list_slot(items, *index),
            (Value::Array(items), PathSegment::Key(key)) => {
                let index = key.parse::<usize>().ok().filter(|i| *i <= MAX_LIST_INDEX)?;
                list_slot(items, index)
            }
            (Value::Object(map), PathSegment::Key(key)) => {
                map.entry(key.clone()).or_insert(Value::Null)
            }
            (Value::Object(map), PathSegment::Index(index)) => {
                map.entry(index.to_string()).or_insert(Value::Null)
            }
            _ => return None,
        };
    }

    Some(cur)
}

fn list_slot(items: &mut Vec<Value>, index: usize) -> &mut Value {
    if items.len() <= index {
        items.resize(index + 1, Value::Null);
    }
    &mut items[index]
}
