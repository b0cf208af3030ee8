//! store::traits
//!
//! Read-only access to posts and assets.
//!
//! # Design
//!
//! The compiler only ever reads. A store must tolerate concurrent calls:
//! sibling references at one recursion level are fetched in parallel.
//!
//! A post that is missing, or unpublished when `allow_unpublished` is not
//! set, is `Ok(None)`. Errors are reserved for infrastructure failures and
//! are propagated to the caller unchanged.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Asset, Post, PostKey};

/// Errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A required record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected or failed a query.
    #[error("query failed: {message}")]
    Query {
        /// Backend error message
        message: String,
    },
}

/// Lookup of a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub key: PostKey,
    /// Return drafts and scheduled posts too
    pub allow_unpublished: bool,
}

impl PostQuery {
    pub fn new(key: PostKey, allow_unpublished: bool) -> Self {
        Self {
            key,
            allow_unpublished,
        }
    }

    /// Published-only lookup by slug path.
    pub fn published(slug_path: impl Into<String>) -> Self {
        Self::new(PostKey::slug_path(slug_path), false)
    }
}

/// A source of posts and assets.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Find one post.
    async fn find_post(&self, query: &PostQuery) -> Result<Option<Post>, StoreError>;

    /// Find every asset whose npath is in `npaths`. Unknown npaths are
    /// absent from the result; order is unspecified.
    async fn find_assets(&self, npaths: &[String]) -> Result<Vec<Asset>, StoreError>;
}
