//! content::richtext
//!
//! Rich document post-processing.
//!
//! A rich document is `{ "blocks": [...], "entityMap": { "<key>": entity } }`
//! where each entity is `{ "type", "mutability", "data" }`. Two entity types
//! are rewritten in place:
//!
//! - `IMAGE` with `data.npath`: `data.src` is set to the upload URL. Images
//!   are resolved here rather than through the reference tables.
//! - `COMPONENT` with an object `data.value`: the value is parsed as a group
//!   with no path prefix. References inside it are not reported to the
//!   caller, so the compiler never resolves them.

use serde_json::{Map, Value};

use crate::core::config::UploadUrls;

/// Entity type of inline images.
pub const IMAGE_ENTITY: &str = "IMAGE";

/// Entity type of embedded components.
pub const COMPONENT_ENTITY: &str = "COMPONENT";

/// Rewrite the entities of `doc` in place.
///
/// `parse_component` receives each component's `data.value` object and
/// returns its replacement.
pub fn resolve_entities<F>(doc: &mut Value, uploads: &UploadUrls, mut parse_component: F)
where
    F: FnMut(&Map<String, Value>) -> Value,
{
    let Some(Value::Object(entities)) = doc.get_mut("entityMap") else {
        return;
    };

    for entity in entities.values_mut() {
        let kind = entity
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default();
        let Some(Value::Object(data)) = entity.get_mut("data") else {
            continue;
        };

        match kind.as_str() {
            IMAGE_ENTITY => {
                if let Some(npath) = data.get("npath").and_then(Value::as_str) {
                    let src = uploads.url(npath);
                    data.insert("src".to_string(), Value::String(src));
                }
            }
            COMPONENT_ENTITY => {
                if let Some(Value::Object(value)) = data.get("value") {
                    let parsed = parse_component(value);
                    data.insert("value".to_string(), parsed);
                }
            }
            _ => {}
        }
    }
}
