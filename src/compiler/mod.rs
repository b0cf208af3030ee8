//! compiler
//!
//! Reference compiler: turns a post into a render-ready document.
//!
//! # Algorithm
//!
//! For one post at recursion debt `d`:
//!
//! 1. Unflatten the post meta and parse `meta.content` in public mode,
//!    yielding a tree of placeholders plus asset and post reference tables.
//! 2. If `d < max_debt`, resolve every distinct referenced slugPath
//!    concurrently: fetch it and compile it at `d + 1`. Missing or
//!    unpublished posts resolve to `null`. Otherwise the placeholders stay.
//! 3. Splice each resolved post into its recorded paths.
//! 4. Fetch all distinct asset npaths in one call and merge each public
//!    asset into its placeholder object.
//! 5. Wrap the spliced tree in the public post envelope.
//!
//! Recursion always terminates after `max_debt + 1` levels, whatever cycles
//! the reference graph contains. Within one top-level call, compilations
//! are memoised by `(slugPath, debt)` as soon as they start, so a post
//! reachable through several paths at the same depth is fetched and
//! compiled once even while the first fetch is still pending. Assets are
//! fetched once per compiled post.
//!
//! Store failures abort the whole call with [`CompileError::Store`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use burdy_content::compiler::{CompileOptions, Compiler};
//! use burdy_content::core::config::CompilerSettings;
//! use burdy_content::core::types::{MetaEntry, Post, PostStatus};
//! use burdy_content::store::MemoryStore;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let about = Post {
//!     id: 2,
//!     slug_path: "about".into(),
//!     status: PostStatus::Published,
//!     ..Post::default()
//! };
//! let home = Post {
//!     id: 1,
//!     slug_path: "home".into(),
//!     meta: vec![
//!         MetaEntry::new("content.hero_$type", "reference_single"),
//!         MetaEntry::new("content.hero", r#"{"slugPath":"about"}"#),
//!     ],
//!     ..Post::default()
//! };
//!
//! let store = Arc::new(MemoryStore::new().with_post(about));
//! let compiler = Compiler::new(store, CompilerSettings::default());
//! let doc = compiler.compile(&home, &CompileOptions::new()).await.unwrap();
//!
//! assert_eq!(doc["meta"]["content"]["hero"]["id"], json!(2));
//! # });
//! ```

pub mod options;
pub mod splice;

pub use options::{CompileOptions, OptionsError};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{try_join_all, BoxFuture, FutureExt, Shared};
use serde_json::Value;
use thiserror::Error;

use crate::codec::unflatten_meta;
use crate::content::parse_public;
use crate::core::config::CompilerSettings;
use crate::core::types::{Post, PostKey};
use crate::hooks::FilterPipeline;
use crate::mapper::public;
use crate::store::{ContentStore, PostQuery, StoreError};

/// Errors from compilation.
///
/// Content problems never surface here; only the store can fail a compile.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Compiles posts against a [`ContentStore`].
///
/// Cheap to share: the store and filters are reference counted and no
/// state is kept between calls.
#[derive(Clone)]
pub struct Compiler {
    store: Arc<dyn ContentStore>,
    settings: CompilerSettings,
    filters: Arc<FilterPipeline>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("store", &self.store.name())
            .field("settings", &self.settings)
            .field("filters", &self.filters)
            .finish()
    }
}

impl Compiler {
    pub fn new(store: Arc<dyn ContentStore>, settings: CompilerSettings) -> Self {
        Self {
            store,
            settings,
            filters: Arc::new(FilterPipeline::new()),
        }
    }

    /// Use `filters` for every envelope this compiler produces.
    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    /// Compile `post` into its public document.
    pub async fn compile(
        &self,
        post: &Post,
        options: &CompileOptions,
    ) -> Result<Value, CompileError> {
        let session = Arc::new(Session::new(self, options));
        let _clear = ClearMemo(&session);
        session.compile_post(post, options.debt).await
    }

    /// Compile several posts concurrently, preserving order.
    pub async fn compile_many(
        &self,
        posts: &[Post],
        options: &CompileOptions,
    ) -> Result<Vec<Value>, CompileError> {
        try_join_all(posts.iter().map(|post| self.compile(post, options))).await
    }

    /// Fetch the post addressed by `key` and compile it.
    ///
    /// `Ok(None)` when the post is missing, or unpublished without
    /// `allow_unpublished`.
    pub async fn compile_by_key(
        &self,
        key: PostKey,
        options: &CompileOptions,
    ) -> Result<Option<Value>, CompileError> {
        let query = PostQuery::new(key, options.allow_unpublished);
        match self.store.find_post(&query).await? {
            Some(post) => self.compile(&post, options).await.map(Some),
            None => {
                tracing::debug!(key = %query.key, "root post not found");
                Ok(None)
            }
        }
    }
}

/// A compilation in progress or done, awaitable by every referrer.
type SharedCompile = Shared<BoxFuture<'static, Result<Value, CompileError>>>;

/// State of one top-level compile call.
struct Session {
    compiler: Compiler,
    allow_unpublished: bool,
    max_debt: u32,
    memo: Mutex<HashMap<(String, u32), SharedCompile>>,
}

impl Session {
    fn new(compiler: &Compiler, options: &CompileOptions) -> Self {
        Self {
            compiler: compiler.clone(),
            allow_unpublished: options.allow_unpublished,
            max_debt: options.effective_max_debt(compiler.settings.max_relations_debt),
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn compile_post<'a>(
        self: &'a Arc<Self>,
        post: &'a Post,
        debt: u32,
    ) -> BoxFuture<'a, Result<Value, CompileError>> {
        async move {
            let uploads = &self.compiler.settings.uploads;
            let (content, mut meta) = public::split_content(unflatten_meta(&post.meta));
            let parsed = parse_public(&content, uploads);
            let refs = parsed.refs;
            let mut tree = parsed.tree.into_value();

            let slugs = refs.distinct_posts();
            let npaths = refs.distinct_assets();
            tracing::debug!(
                slug_path = %post.slug_path,
                debt,
                posts = slugs.len(),
                assets = npaths.len(),
                "compiling post"
            );

            if !slugs.is_empty() && debt < self.max_debt {
                let resolved =
                    try_join_all(slugs.iter().map(|slug| self.resolve(slug, debt + 1))).await?;
                let by_slug: HashMap<&str, Value> =
                    slugs.iter().map(String::as_str).zip(resolved).collect();

                for (path, slug) in &refs.posts {
                    if let Some(value) = by_slug.get(slug.as_str()) {
                        splice::set_at(&mut tree, path, value.clone());
                    }
                }
            }

            if !npaths.is_empty() {
                let assets = self.compiler.store.find_assets(&npaths).await?;
                let by_npath: HashMap<String, Value> = assets
                    .iter()
                    .map(|asset| {
                        let mapped = public::asset(asset, uploads, &self.compiler.filters);
                        (asset.npath.clone(), mapped)
                    })
                    .collect();

                for (path, npath) in &refs.assets {
                    if let Some(asset) = by_npath.get(npath) {
                        splice::merge_at(&mut tree, path, asset);
                    }
                }
            }

            meta.insert("content".to_string(), tree);
            Ok(public::post_with_meta(
                post,
                Value::Object(meta),
                &self.compiler.filters,
            ))
        }
        .boxed()
    }

    /// The compilation of the post at `slug_path` at `debt`, started on
    /// first request.
    ///
    /// An entry at `debt` only awaits entries at `debt + 1`, so no entry
    /// ever waits on itself.
    fn resolve(self: &Arc<Self>, slug_path: &str, debt: u32) -> SharedCompile {
        let key = (slug_path.to_string(), debt);
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = memo.get(&key) {
            tracing::trace!(slug_path, debt, "memo hit");
            return pending.clone();
        }

        let session = Arc::clone(self);
        let slug_path = key.0.clone();
        let compile = async move {
            let query = PostQuery::new(
                PostKey::slug_path(slug_path.as_str()),
                session.allow_unpublished,
            );
            match session.compiler.store.find_post(&query).await? {
                Some(post) => session.compile_post(&post, debt).await,
                None => {
                    tracing::debug!(slug_path = %slug_path, "referenced post not found");
                    Ok(Value::Null)
                }
            }
        }
        .boxed()
        .shared();

        memo.insert(key, compile.clone());
        compile
    }
}

/// Empties the memo when a top-level call ends.
///
/// Pending entries hold the session, so they are dropped here to release
/// it when a call fails or is cancelled midway.
struct ClearMemo<'s>(&'s Session);

impl Drop for ClearMemo<'_> {
    fn drop(&mut self) {
        let mut memo = self.0.memo.lock().unwrap_or_else(PoisonError::into_inner);
        let pending = std::mem::take(&mut *memo);
        drop(memo);
        drop(pending);
    }
}
