//! compile and inspect commands - Render a post from a fixture store

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use super::{print_json, Context};
use crate::codec::unflatten_meta;
use crate::compiler::{CompileOptions, Compiler};
use crate::content::{parse_to_value, ParseMode};
use crate::core::types::PostKey;
use crate::mapper::public::split_content;
use crate::store::{ContentStore, MemoryStore, PostQuery};

/// Compile the post at `slug_path` with references resolved.
pub fn compile(
    ctx: &Context,
    slug_path: &str,
    store_path: &Path,
    draft: bool,
    relations_depth: Option<u32>,
    compact: bool,
) -> Result<()> {
    let settings = ctx.load_config()?.config.compiler_settings();
    let store = MemoryStore::from_fixture(store_path).context("Failed to load store")?;

    let mut options = CompileOptions::new().allow_unpublished(draft);
    options.max_debt = relations_depth;

    let compiler = Compiler::new(Arc::new(store), settings);
    let rt = tokio::runtime::Runtime::new()?;
    let compiled = rt
        .block_on(compiler.compile_by_key(PostKey::slug_path(slug_path), &options))
        .with_context(|| format!("Failed to compile '{}'", slug_path))?;

    match compiled {
        Some(document) => print_json(&document, compact),
        None if draft => bail!("Post '{}' not found", slug_path),
        None => bail!(
            "Post '{}' not found or not published (use --draft to include unpublished posts)",
            slug_path
        ),
    }
}

/// Print the parsed content tree of the post at `slug_path`.
///
/// Drafts are always visible here; nothing is fetched beyond the post.
pub fn inspect(
    ctx: &Context,
    slug_path: &str,
    store_path: &Path,
    mode: ParseMode,
    compact: bool,
) -> Result<()> {
    let settings = ctx.load_config()?.config.compiler_settings();
    let store = MemoryStore::from_fixture(store_path).context("Failed to load store")?;

    let rt = tokio::runtime::Runtime::new()?;
    let query = PostQuery::new(PostKey::slug_path(slug_path), true);
    let Some(post) = rt.block_on(store.find_post(&query))? else {
        bail!("Post '{}' not found", slug_path);
    };

    let (content, _) = split_content(unflatten_meta(&post.meta));
    let (tree, refs) = parse_to_value(&content, mode, &settings.uploads);
    tracing::debug!(
        %mode,
        assets = refs.assets.len(),
        posts = refs.posts.len(),
        "parsed content"
    );

    print_json(&tree, compact)
}
