//! core::types
//!
//! Records handed to the compiler by the persistence layer.
//!
//! # Types
//!
//! - [`MetaEntry`] - One flat `{key, value}` pair of stored content
//! - [`Post`] - A post or page with its meta, author and tags
//! - [`Asset`] - An uploaded file addressed by its `npath`
//! - [`Tag`] - A taxonomy entry attached to posts
//! - [`User`] - A post author (carries secrets that mappers must strip)
//! - [`PostKey`] - How a post is looked up (numeric id or slugPath)
//!
//! # Wire Format
//!
//! All records use camelCase field names, matching the JSON produced by the
//! HTTP layer and the fixture files read by the CLI.
//!
//! # Examples
//!
//! ```
//! use burdy_content::core::types::{MetaEntry, Post, PostStatus};
//!
//! let post: Post = serde_json::from_str(r#"{
//!     "id": 7,
//!     "type": "page",
//!     "name": "About",
//!     "slug": "about",
//!     "slugPath": "about",
//!     "status": "published",
//!     "meta": [{ "key": "content.title", "value": "About us" }]
//! }"#).unwrap();
//!
//! assert_eq!(post.status, PostStatus::Published);
//! assert_eq!(post.meta[0], MetaEntry::new("content.title", "About us"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One flat key/value pair of stored content.
///
/// `key` is a path (`content.items[0].title`), `value` is always a string.
/// Type tags are stored as sibling keys with a `_$type` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

impl MetaEntry {
    /// Create a meta entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Not visible to public readers
    #[default]
    Draft,
    /// Visible once `published_from` has passed
    Published,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
        }
    }
}

/// The content type a post was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub id: u64,
    pub name: String,
}

/// A post author.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Password hash. Never leaves the mappers.
    pub password: Option<String>,
}

/// A taxonomy tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub slug_path: String,
}

/// A post or page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub id: u64,
    /// Post kind (`post`, `page`, `fragment`, ...)
    #[serde(rename = "type")]
    pub post_type: String,
    pub name: String,
    pub slug: String,
    pub slug_path: String,
    pub status: PostStatus,
    pub published_from: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub content_type: Option<ContentType>,
    pub author: Option<User>,
    pub tags: Vec<Tag>,
    pub meta: Vec<MetaEntry>,
}

impl Post {
    /// Whether public readers may see this post at `now`.
    ///
    /// A post is visible when it is published and its `published_from`
    /// is either unset or not in the future.
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published
            && self.published_from.map_or(true, |from| from <= now)
    }
}

/// An uploaded asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    /// Folder-like path that addresses the asset and builds its URL
    pub npath: String,
    pub mime_type: Option<String>,
    pub content_length: Option<u64>,
    pub meta: Vec<MetaEntry>,
}

/// Lookup key for a single post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostKey {
    /// Numeric primary key
    Id(u64),
    /// Normalised slug path (`blog/hello-world`)
    SlugPath(String),
}

impl PostKey {
    /// Build a slug path key.
    pub fn slug_path(path: impl Into<String>) -> Self {
        PostKey::SlugPath(path.into())
    }

    /// Whether this key addresses `post`.
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostKey::Id(id) => post.id == *id,
            PostKey::SlugPath(path) => post.slug_path == *path,
        }
    }
}

impl std::fmt::Display for PostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostKey::Id(id) => write!(f, "#{}", id),
            PostKey::SlugPath(path) => write!(f, "{}", path),
        }
    }
}
