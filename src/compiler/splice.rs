//! compiler::splice
//!
//! Writes resolved entities back into a rendered tree by [`ContentPath`].

use serde_json::Value;

use crate::codec::{ContentPath, PathSegment};

/// The existing slot at `path`, if every segment matches the tree's shape.
pub fn slot_mut<'t>(tree: &'t mut Value, path: &ContentPath) -> Option<&'t mut Value> {
    let mut current = tree;
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace the slot at `path`. Returns `false` when the slot does not exist.
pub fn set_at(tree: &mut Value, path: &ContentPath, value: Value) -> bool {
    match slot_mut(tree, path) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

/// Merge `value` into the object at `path`; keys of `value` win.
///
/// A non-object slot is replaced. Returns `false` when the slot does not
/// exist.
pub fn merge_at(tree: &mut Value, path: &ContentPath, value: &Value) -> bool {
    let Some(slot) = slot_mut(tree, path) else {
        return false;
    };

    match (slot, value) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, v) in source {
                target.insert(key.clone(), v.clone());
            }
        }
        (slot, value) => *slot = value.clone(),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> ContentPath {
        ContentPath::parse(s)
    }

    #[test]
    fn set_replaces_nested_slot() {
        let mut tree = json!({ "items": [{ "ref": null }, { "ref": null }] });
        assert!(set_at(&mut tree, &path("items[1].ref"), json!({ "id": 2 })));
        assert_eq!(tree, json!({ "items": [{ "ref": null }, { "ref": { "id": 2 } }] }));
    }

    #[test]
    fn set_missing_slot_is_noop() {
        let mut tree = json!({ "a": [null] });
        assert!(!set_at(&mut tree, &path("a[3]"), json!(1)));
        assert!(!set_at(&mut tree, &path("b"), json!(1)));
        assert!(!set_at(&mut tree, &path("a.b"), json!(1)));
        assert_eq!(tree, json!({ "a": [null] }));
    }

    #[test]
    fn merge_keeps_placeholder_fields() {
        let mut tree = json!({ "pics": [{ "npath": "a.png", "caption": "A", "src": "old" }] });
        assert!(merge_at(
            &mut tree,
            &path("pics[0]"),
            &json!({ "npath": "a.png", "src": "new", "id": 1 })
        ));
        assert_eq!(
            tree,
            json!({ "pics": [{ "npath": "a.png", "caption": "A", "src": "new", "id": 1 }] })
        );
    }

    #[test]
    fn merge_into_scalar_replaces() {
        let mut tree = json!({ "pics": ["a.png"] });
        assert!(merge_at(&mut tree, &path("pics[0]"), &json!({ "id": 1 })));
        assert_eq!(tree, json!({ "pics": [{ "id": 1 }] }));
    }

    #[test]
    fn root_path_addresses_whole_tree() {
        let mut tree = json!(null);
        assert!(set_at(&mut tree, &ContentPath::root(), json!({ "x": 1 })));
        assert_eq!(tree, json!({ "x": 1 }));
    }
}
