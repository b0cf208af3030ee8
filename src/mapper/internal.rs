//! mapper::internal
//!
//! Editor envelopes.
//!
//! Editor output keeps status and timestamps, and presents `meta.content`
//! through the internal parse: typed fields are decoded but references stay
//! raw `{ slugPath }` markers for the editor to look up on demand.

use serde_json::{json, Value};

use super::public::split_content;
use crate::codec::unflatten_meta;
use crate::content::parse_internal;
use crate::core::config::UploadUrls;
use crate::core::types::{Asset, Post, Tag, User};
use crate::hooks::{FilterPipeline, INTERNAL_ASSET, INTERNAL_POST, INTERNAL_USER};

/// Editor post with its content parsed in internal mode.
pub fn post(post: &Post, uploads: &UploadUrls, filters: &FilterPipeline) -> Value {
    let (content, mut meta) = split_content(unflatten_meta(&post.meta));
    if !content.is_null() {
        let parsed = parse_internal(&content, uploads);
        meta.insert("content".to_string(), parsed.tree.into_value());
    }

    let envelope = json!({
        "id": post.id,
        "type": post.post_type,
        "name": post.name,
        "slug": post.slug,
        "slugPath": post.slug_path,
        "status": post.status,
        "publishedFrom": post.published_from,
        "createdAt": post.created_at,
        "updatedAt": post.updated_at,
        "contentType": post.content_type,
        "author": post.author.as_ref().map(|u| user(u, filters)),
        "tags": post.tags.iter().map(tag).collect::<Vec<_>>(),
        "meta": meta,
    });
    filters.apply(INTERNAL_POST, envelope)
}

/// User without password.
pub fn user(user: &User, filters: &FilterPipeline) -> Value {
    filters.apply(
        INTERNAL_USER,
        json!({
            "id": user.id,
            "email": user.email,
            "firstName": user.first_name,
            "lastName": user.last_name,
        }),
    )
}

pub fn tag(tag: &Tag) -> Value {
    json!({
        "id": tag.id,
        "name": tag.name,
        "slug": tag.slug,
        "slugPath": tag.slug_path,
    })
}

pub fn asset(asset: &Asset, filters: &FilterPipeline) -> Value {
    filters.apply(
        INTERNAL_ASSET,
        json!({
            "id": asset.id,
            "name": asset.name,
            "npath": asset.npath,
            "mimeType": asset.mime_type,
            "contentLength": asset.content_length,
            "meta": unflatten_meta(&asset.meta),
        }),
    )
}
