//! content::node
//!
//! Parsed content trees.
//!
//! # Design
//!
//! [`Tree<L>`] is shared by both parse modes; only the leaf type `L` used for
//! asset and reference fields differs:
//!
//! - [`RawMarker`] (editor view): the stored marker, untouched.
//! - [`PublicLeaf`] (public view): a placeholder the compiler later fills.
//!
//! Reference locations are not collected by mutation; every walk step
//! returns its own [`RefTables`] and callers merge them.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::codec::ContentPath;

/// Location → referenced key (`npath` for assets, `slugPath` for posts).
pub type PathTable = BTreeMap<ContentPath, String>;

/// Reference locations collected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefTables {
    /// Asset placeholders to merge resolved assets into
    pub assets: PathTable,
    /// Post slots to splice compiled posts into
    pub posts: PathTable,
}

impl RefTables {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.posts.is_empty()
    }

    /// Absorb `other`. Paths are unique per parse, so nothing is overwritten.
    pub fn merge(&mut self, other: RefTables) {
        self.assets.extend(other.assets);
        self.posts.extend(other.posts);
    }

    /// Distinct asset npaths, sorted.
    pub fn distinct_assets(&self) -> Vec<String> {
        distinct(&self.assets)
    }

    /// Distinct post slugPaths, sorted.
    pub fn distinct_posts(&self) -> Vec<String> {
        distinct(&self.posts)
    }
}

fn distinct(table: &PathTable) -> Vec<String> {
    table
        .values()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One parsed field.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<L> {
    /// Untagged, text, or unknown-tag value, kept as stored
    Value(Value),
    /// Coerced checkbox
    Checkbox(bool),
    /// Group / custom subtree
    Group(Tree<L>),
    /// Repeatable / zone items (groups, or verbatim non-object items)
    List(Vec<Node<L>>),
    /// Processed rich document, `null` when malformed
    RichText(Value),
    /// Asset or reference field, interpreted by the parse mode
    Leaf(L),
}

/// Ordered parsed fields of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<L> {
    fields: Vec<(String, Node<L>)>,
}

impl<L> Default for Tree<L> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<L> Tree<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, node: Node<L>) {
        self.fields.push((key.into(), node));
    }

    pub fn get(&self, key: &str) -> Option<&Node<L>> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<L>)> {
        self.fields.iter().map(|(k, n)| (k.as_str(), n))
    }
}

impl<L: Into<Value>> Tree<L> {
    /// Render as a JSON object.
    pub fn into_value(self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .into_iter()
            .map(|(key, node)| (key, node.into()))
            .collect();
        Value::Object(map)
    }
}

impl<L: Into<Value>> From<Node<L>> for Value {
    fn from(node: Node<L>) -> Self {
        match node {
            Node::Value(value) | Node::RichText(value) => value,
            Node::Checkbox(checked) => Value::Bool(checked),
            Node::Group(tree) => tree.into_value(),
            Node::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Node::Leaf(leaf) => leaf.into(),
        }
    }
}

/// A parsed tree plus the references found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<L> {
    pub tree: Tree<L>,
    pub refs: RefTables,
}

/// Editor-view leaf: the stored marker, `null` when malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMarker(pub Value);

impl From<RawMarker> for Value {
    fn from(marker: RawMarker) -> Self {
        marker.0
    }
}

/// Public-view leaf: what sits at a reference location before compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum PublicLeaf {
    /// Asset placeholders; resolved assets are merged into each element
    Assets(Vec<Value>),
    /// One unresolved slot (`null`)
    Unresolved,
    /// A list of unresolved slots (`[null, ...]`)
    UnresolvedList(usize),
}

impl From<PublicLeaf> for Value {
    fn from(leaf: PublicLeaf) -> Self {
        match leaf {
            PublicLeaf::Assets(items) => Value::Array(items),
            PublicLeaf::Unresolved => Value::Null,
            PublicLeaf::UnresolvedList(len) => Value::Array(vec![Value::Null; len]),
        }
    }
}
