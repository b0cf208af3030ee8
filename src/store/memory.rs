//! store::memory
//!
//! In-memory store for tests and fixture files.
//!
//! # Design
//!
//! State lives behind an `Arc<Mutex<..>>` so clones share posts, the
//! operation log and failure configuration. Every call is recorded before
//! failure injection is checked, so tests can count attempted fetches.
//!
//! # Example
//!
//! ```
//! use burdy_content::core::types::{Post, PostStatus};
//! use burdy_content::store::{ContentStore, MemoryStore, PostQuery, StoreOperation};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new().with_post(Post {
//!     id: 1,
//!     slug_path: "about".into(),
//!     status: PostStatus::Published,
//!     ..Post::default()
//! });
//!
//! let post = store.find_post(&PostQuery::published("about")).await.unwrap();
//! assert_eq!(post.map(|p| p.id), Some(1));
//! assert_eq!(store.operations().len(), 1);
//! # });
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::traits::{ContentStore, PostQuery, StoreError};
use crate::core::types::{Asset, Post, PostKey};

/// Errors loading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fixture file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Fixture {
    posts: Vec<Post>,
    assets: Vec<Asset>,
}

/// Which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every `find_post` with the given error.
    FindPost(StoreError),
    /// Fail `find_post` for one slug path only.
    FindPostFor(String, StoreError),
    /// Fail every `find_assets` with the given error.
    FindAssets(StoreError),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    FindPost {
        key: PostKey,
        allow_unpublished: bool,
    },
    FindAssets {
        npaths: Vec<String>,
    },
}

/// In-memory [`ContentStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    posts: Vec<Post>,
    assets: Vec<Asset>,
    /// Pinned "now" for publication checks
    clock: Option<DateTime<Utc>>,
    fail_on: Option<FailOn>,
    operations: Vec<StoreOperation>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `posts` and `assets`.
    pub fn with_records(posts: Vec<Post>, assets: Vec<Asset>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.posts = posts;
            inner.assets = assets;
        }
        store
    }

    /// Parse a `{ "posts": [...], "assets": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Self::parse_fixture(json, "<inline>")
    }

    /// Load a fixture file.
    pub fn from_fixture(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_fixture(&json, &path.display().to_string())
    }

    fn parse_fixture(json: &str, origin: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = serde_json::from_str(json).map_err(|source| FixtureError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        tracing::debug!(
            origin,
            posts = fixture.posts.len(),
            assets = fixture.assets.len(),
            "loaded fixture"
        );
        Ok(Self::with_records(fixture.posts, fixture.assets))
    }

    /// Add a post.
    pub fn with_post(self, post: Post) -> Self {
        self.lock().posts.push(post);
        self
    }

    /// Add an asset.
    pub fn with_asset(self, asset: Asset) -> Self {
        self.lock().assets.push(asset);
        self
    }

    /// Pin the clock used for `published_from` checks.
    pub fn with_clock(self, now: DateTime<Utc>) -> Self {
        self.lock().clock = Some(now);
        self
    }

    /// Configure the store to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// All recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Number of recorded `find_post` calls.
    pub fn post_lookups(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, StoreOperation::FindPost { .. }))
            .count()
    }

    /// Number of recorded `find_assets` calls.
    pub fn asset_lookups(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, StoreOperation::FindAssets { .. }))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        // State stays consistent even if a panicking test poisoned the lock.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: StoreOperation) {
        self.lock().operations.push(op);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_post(&self, query: &PostQuery) -> Result<Option<Post>, StoreError> {
        self.record(StoreOperation::FindPost {
            key: query.key.clone(),
            allow_unpublished: query.allow_unpublished,
        });

        let inner = self.lock();
        match &inner.fail_on {
            Some(FailOn::FindPost(err)) => return Err(err.clone()),
            Some(FailOn::FindPostFor(slug_path, err))
                if query.key == PostKey::SlugPath(slug_path.clone()) =>
            {
                return Err(err.clone())
            }
            _ => {}
        }

        let now = inner.clock.unwrap_or_else(Utc::now);
        let post = inner
            .posts
            .iter()
            .find(|post| query.key.matches(post))
            .filter(|post| query.allow_unpublished || post.is_published_at(now))
            .cloned();

        Ok(post)
    }

    async fn find_assets(&self, npaths: &[String]) -> Result<Vec<Asset>, StoreError> {
        self.record(StoreOperation::FindAssets {
            npaths: npaths.to_vec(),
        });

        let inner = self.lock();
        if let Some(FailOn::FindAssets(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        Ok(inner
            .assets
            .iter()
            .filter(|asset| npaths.contains(&asset.npath))
            .cloned()
            .collect())
    }
}
