//! content::parser
//!
//! Type-tag driven walk over unflattened content.
//!
//! # Algorithm
//!
//! For every key `k` of an object that has a string sibling `k_$type`, the
//! tag is parsed into a [`FieldType`] and the value is interpreted:
//!
//! | Tag | Result |
//! |---|---|
//! | `text` | value as stored |
//! | `checkbox` | `true` for `"true"`/`true`, else `false` |
//! | `images`, `assets` | leaf from [`LeafStrategy::assets`] |
//! | `group`, `custom` | recursive walk under `prefix.k` |
//! | `repeatable`, `zone` | recursive walk of each item under `prefix.k[i]` |
//! | `richtext` | document with IMAGE urls and COMPONENT values resolved |
//! | `relation`, `reference_multiple` | leaf from [`LeafStrategy::references`] |
//! | `reference_single` | leaf from [`LeafStrategy::reference`] |
//!
//! Untagged keys and unknown tags are kept as stored; `_$type` keys never
//! appear in the output. Malformed JSON in a typed field yields `null` for
//! that field and is logged at debug level.
//!
//! # Modes
//!
//! - [`InternalStrategy`] (editor view): markers stay raw, no references are
//!   reported, empty repeatable items are dropped.
//! - [`PublicStrategy`] (public view): placeholders are emitted and every
//!   asset/post location is reported in the [`RefTables`].
//!
//! # Example
//!
//! ```
//! use burdy_content::codec::ContentPath;
//! use burdy_content::content::parse_public;
//! use burdy_content::core::config::UploadUrls;
//! use serde_json::json;
//!
//! let content = json!({
//!     "title_$type": "text",
//!     "title": "Hello",
//!     "hero_$type": "reference_single",
//!     "hero": "{\"slugPath\":\"about\"}"
//! });
//!
//! let parsed = parse_public(&content, &UploadUrls::default());
//! assert_eq!(parsed.refs.posts[&ContentPath::root().key("hero")], "about");
//! assert_eq!(
//!     parsed.tree.into_value(),
//!     json!({ "title": "Hello", "hero": null })
//! );
//! ```

use serde_json::{Map, Value};

use super::field::{self, FieldType};
use super::node::{Node, Parsed, PublicLeaf, RawMarker, RefTables, Tree};
use super::richtext;
use crate::codec::ContentPath;
use crate::core::config::UploadUrls;

/// How a parse mode renders asset and reference fields.
///
/// Each method receives the field's location and its decoded JSON (`None`
/// when the stored value was missing or malformed) and returns the leaf plus
/// the references it wants resolved.
pub trait LeafStrategy {
    type Leaf: Into<Value>;

    /// Whether falsy repeatable/zone items are dropped before recursing.
    fn drops_empty_items(&self) -> bool;

    /// `images` / `assets` fields: a list of `{ npath, ... }`.
    fn assets(&self, path: &ContentPath, items: Option<Vec<Value>>) -> (Self::Leaf, RefTables);

    /// `relation` / `reference_multiple` fields: a list of `{ slugPath, ... }`.
    fn references(&self, path: &ContentPath, items: Option<Vec<Value>>)
        -> (Self::Leaf, RefTables);

    /// `reference_single` fields: one `{ slugPath }`.
    fn reference(&self, path: &ContentPath, marker: Option<Value>) -> (Self::Leaf, RefTables);
}

/// Editor view.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalStrategy;

impl LeafStrategy for InternalStrategy {
    type Leaf = RawMarker;

    fn drops_empty_items(&self) -> bool {
        true
    }

    fn assets(&self, _path: &ContentPath, items: Option<Vec<Value>>) -> (RawMarker, RefTables) {
        (raw_list(items), RefTables::default())
    }

    fn references(&self, _path: &ContentPath, items: Option<Vec<Value>>) -> (RawMarker, RefTables) {
        (raw_list(items), RefTables::default())
    }

    fn reference(&self, _path: &ContentPath, marker: Option<Value>) -> (RawMarker, RefTables) {
        (RawMarker(marker.unwrap_or(Value::Null)), RefTables::default())
    }
}

fn raw_list(items: Option<Vec<Value>>) -> RawMarker {
    RawMarker(items.map(Value::Array).unwrap_or(Value::Null))
}

/// Public view.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicStrategy;

impl LeafStrategy for PublicStrategy {
    type Leaf = PublicLeaf;

    fn drops_empty_items(&self) -> bool {
        false
    }

    fn assets(&self, path: &ContentPath, items: Option<Vec<Value>>) -> (PublicLeaf, RefTables) {
        let Some(items) = items else {
            return (PublicLeaf::Unresolved, RefTables::default());
        };

        let mut refs = RefTables::default();
        for (index, item) in items.iter().enumerate() {
            if let Some(npath) = item.get("npath").and_then(Value::as_str) {
                refs.assets.insert(path.index(index), npath.to_string());
            }
        }
        (PublicLeaf::Assets(items), refs)
    }

    fn references(&self, path: &ContentPath, items: Option<Vec<Value>>) -> (PublicLeaf, RefTables) {
        let Some(items) = items else {
            return (PublicLeaf::Unresolved, RefTables::default());
        };

        let mut refs = RefTables::default();
        for (index, item) in items.iter().enumerate() {
            if let Some(slug_path) = slug_path_of(item) {
                refs.posts.insert(path.index(index), slug_path);
            }
        }
        (PublicLeaf::UnresolvedList(items.len()), refs)
    }

    fn reference(&self, path: &ContentPath, marker: Option<Value>) -> (PublicLeaf, RefTables) {
        let mut refs = RefTables::default();
        if let Some(slug_path) = marker.as_ref().and_then(slug_path_of) {
            refs.posts.insert(path.clone(), slug_path);
        }
        (PublicLeaf::Unresolved, refs)
    }
}

fn slug_path_of(marker: &Value) -> Option<String> {
    marker
        .get("slugPath")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Selects a strategy at runtime (CLI and HTTP callers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Editor view
    #[default]
    Internal,
    /// Public view
    Public,
}

impl ParseMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "internal" => Some(ParseMode::Internal),
            "public" => Some(ParseMode::Public),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Internal => write!(f, "internal"),
            ParseMode::Public => write!(f, "public"),
        }
    }
}

/// Parse `content` with `strategy`, reporting paths under `prefix`.
///
/// Non-object content parses to an empty tree.
pub fn parse<S: LeafStrategy>(
    strategy: &S,
    content: &Value,
    uploads: &UploadUrls,
    prefix: &ContentPath,
) -> Parsed<S::Leaf> {
    let walk = Walk { strategy, uploads };
    match content {
        Value::Object(object) => walk.object(object, prefix),
        _ => Parsed {
            tree: Tree::new(),
            refs: RefTables::default(),
        },
    }
}

/// Parse for public output; references are reported for the compiler.
pub fn parse_public(content: &Value, uploads: &UploadUrls) -> Parsed<PublicLeaf> {
    parse(&PublicStrategy, content, uploads, &ContentPath::root())
}

/// Parse for the editor; the returned tables are always empty.
pub fn parse_internal(content: &Value, uploads: &UploadUrls) -> Parsed<RawMarker> {
    parse(&InternalStrategy, content, uploads, &ContentPath::root())
}

/// Parse in `mode` and render the tree as JSON.
pub fn parse_to_value(content: &Value, mode: ParseMode, uploads: &UploadUrls) -> (Value, RefTables) {
    match mode {
        ParseMode::Internal => {
            let parsed = parse_internal(content, uploads);
            (parsed.tree.into_value(), parsed.refs)
        }
        ParseMode::Public => {
            let parsed = parse_public(content, uploads);
            (parsed.tree.into_value(), parsed.refs)
        }
    }
}

struct Walk<'a, S> {
    strategy: &'a S,
    uploads: &'a UploadUrls,
}

impl<S: LeafStrategy> Walk<'_, S> {
    fn object(&self, object: &Map<String, Value>, prefix: &ContentPath) -> Parsed<S::Leaf> {
        let mut tree = Tree::new();
        let mut refs = RefTables::default();

        for (key, value) in object {
            if field::is_type_key(key) {
                continue;
            }

            let tag = object
                .get(&field::type_key(key))
                .and_then(Value::as_str)
                .and_then(FieldType::parse);

            let node = match tag {
                Some(field) => {
                    let (node, field_refs) = self.field(field, key, value, prefix);
                    refs.merge(field_refs);
                    node
                }
                None => Node::Value(value.clone()),
            };
            tree.insert(key.clone(), node);
        }

        Parsed { tree, refs }
    }

    fn field(
        &self,
        field: FieldType,
        key: &str,
        value: &Value,
        prefix: &ContentPath,
    ) -> (Node<S::Leaf>, RefTables) {
        let path = prefix.key(key);

        match field {
            FieldType::Text => (Node::Value(value.clone()), RefTables::default()),
            FieldType::Checkbox => (Node::Checkbox(is_checked(value)), RefTables::default()),
            FieldType::Images | FieldType::Assets => {
                let (leaf, refs) = self.strategy.assets(&path, decode_list(value, &path));
                (Node::Leaf(leaf), refs)
            }
            FieldType::Group | FieldType::Custom => match decode_json(value, &path) {
                Some(Value::Object(object)) => {
                    let parsed = self.object(&object, &path);
                    (Node::Group(parsed.tree), parsed.refs)
                }
                Some(_) => (Node::Value(value.clone()), RefTables::default()),
                None => (Node::Value(Value::Null), RefTables::default()),
            },
            FieldType::Repeatable | FieldType::Zone => match decode_json(value, &path) {
                Some(Value::Array(items)) => self.list(&items, &path),
                Some(_) => (Node::Value(value.clone()), RefTables::default()),
                None => (Node::Value(Value::Null), RefTables::default()),
            },
            FieldType::RichText => (Node::RichText(self.richtext(value, &path)), RefTables::default()),
            FieldType::Relation | FieldType::ReferenceMultiple => {
                let (leaf, refs) = self.strategy.references(&path, decode_list(value, &path));
                (Node::Leaf(leaf), refs)
            }
            FieldType::ReferenceSingle => {
                let (leaf, refs) = self.strategy.reference(&path, decode_json(value, &path));
                (Node::Leaf(leaf), refs)
            }
        }
    }

    fn list(&self, items: &[Value], path: &ContentPath) -> (Node<S::Leaf>, RefTables) {
        let mut nodes = Vec::with_capacity(items.len());
        let mut refs = RefTables::default();

        let kept = items
            .iter()
            .filter(|item| !(self.strategy.drops_empty_items() && is_empty_item(item)));

        for (index, item) in kept.enumerate() {
            match item {
                Value::Object(object) => {
                    let parsed = self.object(object, &path.index(index));
                    refs.merge(parsed.refs);
                    nodes.push(Node::Group(parsed.tree));
                }
                other => nodes.push(Node::Value(other.clone())),
            }
        }

        (Node::List(nodes), refs)
    }

    fn richtext(&self, value: &Value, path: &ContentPath) -> Value {
        let Some(mut doc) = decode_json(value, path) else {
            return Value::Null;
        };

        richtext::resolve_entities(&mut doc, self.uploads, |component| {
            // Component content is parsed on its own; its references stay local.
            self.object(component, &ContentPath::root()).tree.into_value()
        });
        doc
    }
}

fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(checked) => *checked,
        Value::String(s) => s == "true",
        _ => false,
    }
}

fn is_empty_item(item: &Value) -> bool {
    match item {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Decode a typed field's stored JSON. Already-structured values pass through.
fn decode_json(value: &Value, path: &ContentPath) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => None,
            Ok(decoded) => Some(decoded),
            Err(err) => {
                tracing::debug!(path = %path, error = %err, "malformed JSON in typed field");
                None
            }
        },
        other => Some(other.clone()),
    }
}

fn decode_list(value: &Value, path: &ContentPath) -> Option<Vec<Value>> {
    match decode_json(value, path)? {
        Value::Array(items) => Some(items),
        other => {
            tracing::debug!(path = %path, found = %other, "expected a JSON list");
            None
        }
    }
}
