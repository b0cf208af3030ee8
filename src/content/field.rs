//! content::field
//!
//! Field type tags.
//!
//! Every typed field `k` is stored next to a sibling key `k_$type` whose
//! value names one of the [`FieldType`] variants. Unknown tags parse to
//! `None` and the field is passed through untouched.

use std::fmt;

/// Suffix of the sibling key carrying a field's type tag.
pub const TYPE_SUFFIX: &str = "_$type";

/// The closed set of field types the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Plain scalar
    Text,
    /// Boolean stored as `"true"` / anything else
    Checkbox,
    /// JSON list of image placeholders `{ npath, ... }`
    Images,
    /// JSON list of asset placeholders `{ npath, ... }`
    Assets,
    /// Nested group of typed fields
    Group,
    /// Custom component, parsed like a group
    Custom,
    /// Ordered list of groups
    Repeatable,
    /// Ordered list of components, parsed like a repeatable
    Zone,
    /// Rich document (`blocks` + `entityMap`)
    RichText,
    /// JSON list of post markers `{ slugPath, ... }`
    Relation,
    /// One post marker `{ slugPath }`
    ReferenceSingle,
    /// JSON list of post markers
    ReferenceMultiple,
}

impl FieldType {
    /// All field types, in declaration order.
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::Text,
            FieldType::Checkbox,
            FieldType::Images,
            FieldType::Assets,
            FieldType::Group,
            FieldType::Custom,
            FieldType::Repeatable,
            FieldType::Zone,
            FieldType::RichText,
            FieldType::Relation,
            FieldType::ReferenceSingle,
            FieldType::ReferenceMultiple,
        ]
    }

    /// Parse a stored tag.
    ///
    /// # Example
    ///
    /// ```
    /// use burdy_content::content::FieldType;
    ///
    /// assert_eq!(FieldType::parse("reference_single"), Some(FieldType::ReferenceSingle));
    /// assert_eq!(FieldType::parse("color"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(FieldType::Text),
            "checkbox" => Some(FieldType::Checkbox),
            "images" => Some(FieldType::Images),
            "assets" => Some(FieldType::Assets),
            "group" => Some(FieldType::Group),
            "custom" => Some(FieldType::Custom),
            "repeatable" => Some(FieldType::Repeatable),
            "zone" => Some(FieldType::Zone),
            "richtext" => Some(FieldType::RichText),
            "relation" => Some(FieldType::Relation),
            "reference_single" => Some(FieldType::ReferenceSingle),
            "reference_multiple" => Some(FieldType::ReferenceMultiple),
            _ => None,
        }
    }

    /// The stored tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Checkbox => "checkbox",
            FieldType::Images => "images",
            FieldType::Assets => "assets",
            FieldType::Group => "group",
            FieldType::Custom => "custom",
            FieldType::Repeatable => "repeatable",
            FieldType::Zone => "zone",
            FieldType::RichText => "richtext",
            FieldType::Relation => "relation",
            FieldType::ReferenceSingle => "reference_single",
            FieldType::ReferenceMultiple => "reference_multiple",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The sibling key holding the type tag of `key`.
pub fn type_key(key: &str) -> String {
    format!("{}{}", key, TYPE_SUFFIX)
}

/// Whether `key` is itself a type tag key.
pub fn is_type_key(key: &str) -> bool {
    key.ends_with(TYPE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_tag() {
        for field in FieldType::all() {
            assert_eq!(FieldType::parse(field.as_str()), Some(*field));
        }
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert_eq!(FieldType::parse("Text"), None);
        assert_eq!(FieldType::parse(""), None);
    }

    #[test]
    fn type_keys() {
        assert_eq!(type_key("title"), "title_$type");
        assert!(is_type_key("title_$type"));
        assert!(!is_type_key("title"));
    }
}
