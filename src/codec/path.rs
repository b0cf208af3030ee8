//! codec::path
//!
//! Path grammar for flat keys.
//!
//! A key is a sequence of segments: `ident`, `.ident` and `[digits]`.
//! `content.items[0].title` parses to `content`, `items`, `0`, `title`.
//! Parsing is lenient: characters that start no segment are skipped, so
//! `a.[1]` and `a[1]` address the same slot.

use std::fmt;

/// List indices above this are kept as object keys instead of allocating.
pub const MAX_LIST_INDEX: usize = 65_535;

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Object member
    Key(String),
    /// List position
    Index(usize),
}

/// Split a flat key into segments.
///
/// # Example
///
/// ```
/// use burdy_content::codec::path::{parse_path, PathSegment};
///
/// assert_eq!(
///     parse_path("content.items[2].title"),
///     vec![
///         PathSegment::Key("content".into()),
///         PathSegment::Key("items".into()),
///         PathSegment::Index(2),
///         PathSegment::Key("title".into()),
///     ]
/// );
/// assert!(parse_path("").is_empty());
/// ```
pub fn parse_path(input: &str) -> Vec<PathSegment> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        // `.ident` or `ident`
        let start = if bytes[i] == b'.' { i + 1 } else { i };
        let end = ident_end(bytes, start);
        if end > start {
            segments.push(PathSegment::Key(input[start..end].to_string()));
            i = end;
            continue;
        }

        // `[digits]`
        if bytes[i] == b'[' {
            let digits_end = bytes[i + 1..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |p| i + 1 + p);
            if digits_end > i + 1 && bytes.get(digits_end) == Some(&b']') {
                let digits = &input[i + 1..digits_end];
                segments.push(match digits.parse::<usize>() {
                    Ok(index) if index <= MAX_LIST_INDEX => PathSegment::Index(index),
                    _ => PathSegment::Key(digits.to_string()),
                });
                i = digits_end + 1;
                continue;
            }
        }

        i += 1;
    }

    segments
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    bytes[start.min(bytes.len())..]
        .iter()
        .position(|b| matches!(b, b'.' | b'[' | b']'))
        .map_or(bytes.len(), |p| start + p)
}

/// Append `key` to a flat path string.
pub(crate) fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Append a list index to a flat path string.
pub(crate) fn join_index(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// A typed location inside a content tree.
///
/// Used as the key of reference tables so the compiler can splice resolved
/// entities back without re-parsing strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentPath(Vec<PathSegment>);

impl ContentPath {
    /// The empty path (tree root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a flat key.
    pub fn parse(input: &str) -> Self {
        Self(parse_path(input))
    }

    /// This path extended by an object member.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// This path extended by a list position.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathSegment>> for ContentPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.into())
    }

    mod parse_path_fn {
        use super::*;

        #[test]
        fn dotted_keys() {
            assert_eq!(parse_path("a.b.c"), vec![key("a"), key("b"), key("c")]);
        }

        #[test]
        fn indices() {
            assert_eq!(
                parse_path("a[0][12]"),
                vec![key("a"), PathSegment::Index(0), PathSegment::Index(12)]
            );
        }

        #[test]
        fn leading_index() {
            assert_eq!(parse_path("[3].x"), vec![PathSegment::Index(3), key("x")]);
        }

        #[test]
        fn dot_before_index_is_skipped() {
            assert_eq!(parse_path("a.[1]"), parse_path("a[1]"));
        }

        #[test]
        fn type_suffix_stays_in_key() {
            assert_eq!(
                parse_path("content.title_$type"),
                vec![key("content"), key("title_$type")]
            );
        }

        #[test]
        fn malformed_brackets_are_skipped() {
            assert_eq!(parse_path("a[x]"), vec![key("a"), key("x")]);
            assert_eq!(parse_path("a[1"), vec![key("a"), key("1")]);
        }

        #[test]
        fn huge_index_becomes_key() {
            assert_eq!(parse_path("a[99999999]"), vec![key("a"), key("99999999")]);
        }

        #[test]
        fn non_ascii_keys() {
            assert_eq!(parse_path("größe.ü"), vec![key("größe"), key("ü")]);
        }
    }

    mod content_path {
        use super::*;

        #[test]
        fn display_matches_grammar() {
            let path = ContentPath::root().key("items").index(0).key("image").index(2);
            assert_eq!(path.to_string(), "items[0].image[2]");
            assert_eq!(ContentPath::parse(&path.to_string()), path);
        }

        #[test]
        fn root_is_empty() {
            assert!(ContentPath::root().is_root());
            assert_eq!(ContentPath::root().to_string(), "");
        }
    }

    #[test]
    fn join_helpers() {
        assert_eq!(join_key("", "a"), "a");
        assert_eq!(join_key("a", "b"), "a.b");
        assert_eq!(join_index("a", 3), "a[3]");
        assert_eq!(join_index("", 0), "[0]");
    }
}
