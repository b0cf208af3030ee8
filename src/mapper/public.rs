//! mapper::public
//!
//! Public (delivery) envelopes.
//!
//! # Post shape
//!
//! ```text
//! { id, type, name, slug, slugPath, publishedFrom, createdAt, updatedAt,
//!   contentType, author: { firstName, lastName }, tags: [PublicTag], meta }
//! ```
//!
//! `meta` is the unflattened meta of the post unless the compiler supplies a
//! replacement with the spliced content tree.

use serde_json::{json, Map, Value};

use crate::codec::unflatten_meta;
use crate::core::config::UploadUrls;
use crate::core::types::{Asset, Post, Tag, User};
use crate::hooks::{FilterPipeline, PUBLIC_ASSET, PUBLIC_POST, PUBLIC_TAG};

/// Public post with its raw unflattened meta.
pub fn post(post: &Post, filters: &FilterPipeline) -> Value {
    post_with_meta(post, unflatten_meta(&post.meta), filters)
}

/// Public post with `meta` supplied by the caller.
pub fn post_with_meta(post: &Post, meta: Value, filters: &FilterPipeline) -> Value {
    let envelope = json!({
        "id": post.id,
        "type": post.post_type,
        "name": post.name,
        "slug": post.slug,
        "slugPath": post.slug_path,
        "publishedFrom": post.published_from,
        "createdAt": post.created_at,
        "updatedAt": post.updated_at,
        "contentType": post.content_type.as_ref().map(|ct| json!({ "id": ct.id, "name": ct.name })),
        "author": post.author.as_ref().map(author),
        "tags": post.tags.iter().map(|t| tag(t, filters)).collect::<Vec<_>>(),
        "meta": meta,
    });
    filters.apply(PUBLIC_POST, envelope)
}

/// Author reduced to display names.
pub fn author(user: &User) -> Value {
    json!({
        "firstName": user.first_name,
        "lastName": user.last_name,
    })
}

pub fn tag(tag: &Tag, filters: &FilterPipeline) -> Value {
    filters.apply(
        PUBLIC_TAG,
        json!({
            "id": tag.id,
            "name": tag.name,
            "slug": tag.slug,
            "slugPath": tag.slug_path,
        }),
    )
}

/// Public asset with its download URL.
pub fn asset(asset: &Asset, uploads: &UploadUrls, filters: &FilterPipeline) -> Value {
    filters.apply(
        PUBLIC_ASSET,
        json!({
            "id": asset.id,
            "name": asset.name,
            "npath": asset.npath,
            "mimeType": asset.mime_type,
            "contentLength": asset.content_length,
            "src": uploads.url(&asset.npath),
            "meta": unflatten_meta(&asset.meta),
        }),
    )
}

/// Split unflattened post meta into its `content` subtree and the rest.
///
/// A missing or non-object `content` yields `Value::Null`.
pub fn split_content(meta: Value) -> (Value, Map<String, Value>) {
    match meta {
        Value::Object(mut rest) => {
            let content = rest.remove("content").unwrap_or(Value::Null);
            (content, rest)
        }
        _ => (Value::Null, Map::new()),
    }
}
