//! Integration tests for reference compilation.
//!
//! These tests drive the compiler end to end against the in-memory store:
//! flat meta in, public documents out.

use std::sync::Arc;

use serde_json::{json, Value};

use burdy_content::compiler::{CompileError, CompileOptions, Compiler};
use burdy_content::core::config::{CompilerSettings, UploadUrls};
use burdy_content::core::types::{Asset, MetaEntry, Post, PostKey, PostStatus, Tag, User};
use burdy_content::hooks::{FilterPipeline, PUBLIC_ASSET, PUBLIC_POST};
use burdy_content::store::{FailOn, MemoryStore, StoreError, StoreOperation};

// =============================================================================
// Fixtures
// =============================================================================

fn post(id: u64, slug_path: &str, meta: Vec<MetaEntry>) -> Post {
    Post {
        id,
        post_type: "page".into(),
        name: slug_path.to_uppercase(),
        slug: slug_path.rsplit('/').next().unwrap_or(slug_path).into(),
        slug_path: slug_path.into(),
        status: PostStatus::Published,
        meta,
        ..Post::default()
    }
}

fn reference(field: &str, target: &str) -> Vec<MetaEntry> {
    vec![
        MetaEntry::new(format!("content.{}_$type", field), "reference_single"),
        MetaEntry::new(
            format!("content.{}", field),
            json!({ "slugPath": target }).to_string(),
        ),
    ]
}

fn images(field: &str, npaths: &[&str]) -> Vec<MetaEntry> {
    let items: Vec<Value> = npaths.iter().map(|n| json!({ "npath": n })).collect();
    vec![
        MetaEntry::new(format!("content.{}_$type", field), "images"),
        MetaEntry::new(format!("content.{}", field), Value::Array(items).to_string()),
    ]
}

fn compiler(store: &MemoryStore, max_debt: u32) -> Compiler {
    Compiler::new(
        Arc::new(store.clone()),
        CompilerSettings {
            max_relations_debt: max_debt,
            uploads: UploadUrls::new("https://cms.test", "/api/uploads"),
        },
    )
}

fn scenario_meta() -> Vec<MetaEntry> {
    vec![
        MetaEntry::new("content.title_$type", "text"),
        MetaEntry::new("content.title", "Hello"),
        MetaEntry::new("content.hero_$type", "reference_single"),
        MetaEntry::new("content.hero", r#"{"slugPath":"about"}"#),
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn scenario_existing_reference_is_inlined() {
    let about = post(
        2,
        "about",
        vec![
            MetaEntry::new("content.body_$type", "text"),
            MetaEntry::new("content.body", "About us"),
        ],
    );
    let store = MemoryStore::new().with_post(about.clone());
    let compiler = compiler(&store, 3);

    let doc = compiler
        .compile(&post(1, "home", scenario_meta()), &CompileOptions::new())
        .await
        .unwrap();

    let compiled_about = compiler.compile(&about, &CompileOptions::new().debt(1)).await.unwrap();
    assert_eq!(
        doc["meta"]["content"],
        json!({ "title": "Hello", "hero": compiled_about })
    );
    assert_eq!(doc["meta"]["content"]["hero"]["meta"]["content"]["body"], json!("About us"));
}

#[tokio::test]
async fn scenario_missing_reference_is_null() {
    let store = MemoryStore::new();

    let doc = compiler(&store, 3)
        .compile(&post(1, "home", scenario_meta()), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(doc["meta"]["content"], json!({ "title": "Hello", "hero": null }));
}

#[tokio::test]
async fn unpublished_reference_is_null() {
    let mut about = post(2, "about", vec![]);
    about.status = PostStatus::Draft;
    let store = MemoryStore::new().with_post(about);

    let doc = compiler(&store, 3)
        .compile(&post(1, "home", scenario_meta()), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(doc["meta"]["content"]["hero"], Value::Null);
}

// =============================================================================
// Depth and cycles
// =============================================================================

#[tokio::test]
async fn depth_bound_stops_expansion() {
    // P0 -> P1 -> P2 -> P3 -> P4
    let store = MemoryStore::new()
        .with_post(post(1, "p1", reference("ref", "p2")))
        .with_post(post(2, "p2", reference("ref", "p3")))
        .with_post(post(3, "p3", reference("ref", "p4")))
        .with_post(post(4, "p4", vec![]));
    let p0 = post(0, "p0", reference("ref", "p1"));

    let doc = compiler(&store, 2)
        .compile(&p0, &CompileOptions::new())
        .await
        .unwrap();

    let p1 = &doc["meta"]["content"]["ref"];
    let p2 = &p1["meta"]["content"]["ref"];
    assert_eq!(p1["id"], json!(1));
    assert_eq!(p2["id"], json!(2));
    assert_eq!(p2["meta"]["content"]["ref"], Value::Null);

    let fetched: Vec<PostKey> = store
        .operations()
        .into_iter()
        .filter_map(|op| match op {
            StoreOperation::FindPost { key, .. } => Some(key),
            _ => None,
        })
        .collect();
    assert_eq!(fetched, vec![PostKey::slug_path("p1"), PostKey::slug_path("p2")]);
}

#[tokio::test]
async fn cycles_terminate() {
    let p0 = post(0, "p0", reference("next", "p1"));
    let p1 = post(1, "p1", reference("next", "p0"));
    let store = MemoryStore::new().with_post(p0.clone()).with_post(p1);

    let doc = compiler(&store, 3)
        .compile(&p0, &CompileOptions::new())
        .await
        .unwrap();

    // p0 (debt 0) -> p1 (1) -> p0 (2) -> p1 (3) -> placeholder
    let mut node = &doc;
    let mut ids = Vec::new();
    while !node.is_null() {
        ids.push(node["id"].clone());
        node = &node["meta"]["content"]["next"];
    }
    assert_eq!(ids, vec![json!(0), json!(1), json!(0), json!(1)]);
}

#[tokio::test]
async fn self_reference_terminates() {
    let looped = post(5, "loop", reference("me", "loop"));
    let store = MemoryStore::new().with_post(looped.clone());

    let doc = compiler(&store, 1)
        .compile(&looped, &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(doc["meta"]["content"]["me"]["id"], json!(5));
    assert_eq!(doc["meta"]["content"]["me"]["meta"]["content"]["me"], Value::Null);
}

// =============================================================================
// Assets
// =============================================================================

#[tokio::test]
async fn shared_asset_is_fetched_once() {
    let mut meta = images("hero", &["cat.png"]);
    meta.extend(images("gallery", &["dog.png", "cat.png"]));
    meta.push(MetaEntry::new("content.seo_$type", "group"));
    meta.extend(
        images("image", &["cat.png"])
            .into_iter()
            .map(|entry| MetaEntry::new(entry.key.replace("content.", "content.seo."), entry.value)),
    );

    let store = MemoryStore::new().with_asset(Asset {
        id: 42,
        name: "cat.png".into(),
        npath: "cat.png".into(),
        mime_type: Some("image/png".into()),
        content_length: Some(1024),
        meta: vec![MetaEntry::new("width", "640")],
    });

    let doc = compiler(&store, 3)
        .compile(&post(1, "home", meta), &CompileOptions::new())
        .await
        .unwrap();

    let content = &doc["meta"]["content"];
    let hero = &content["hero"][0];
    assert_eq!(hero["id"], json!(42));
    assert_eq!(hero["src"], json!("https://cms.test/api/uploads/cat.png"));
    assert_eq!(hero["meta"], json!({ "width": "640" }));
    assert_eq!(&content["gallery"][1], hero);
    assert_eq!(&content["seo"]["image"][0], hero);
    assert_eq!(content["gallery"][0], json!({ "npath": "dog.png" }));

    assert_eq!(store.asset_lookups(), 1);
    assert_eq!(
        store.operations(),
        vec![StoreOperation::FindAssets {
            npaths: vec!["cat.png".to_string(), "dog.png".to_string()]
        }]
    );
}

#[tokio::test]
async fn referenced_posts_resolve_their_own_assets() {
    let about = post(2, "about", images("logo", &["logo.svg"]));
    let store = MemoryStore::new().with_post(about).with_asset(Asset {
        id: 7,
        npath: "logo.svg".into(),
        ..Asset::default()
    });

    let doc = compiler(&store, 3)
        .compile(&post(1, "home", reference("hero", "about")), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(
        doc["meta"]["content"]["hero"]["meta"]["content"]["logo"][0]["id"],
        json!(7)
    );
}

// =============================================================================
// Content types
// =============================================================================

#[tokio::test]
async fn checkbox_coercion() {
    let meta = vec![
        MetaEntry::new("content.on_$type", "checkbox"),
        MetaEntry::new("content.on", "true"),
        MetaEntry::new("content.off_$type", "checkbox"),
        MetaEntry::new("content.off", "false"),
        MetaEntry::new("content.odd_$type", "checkbox"),
        MetaEntry::new("content.odd", "yes"),
    ];
    let store = MemoryStore::new();

    let doc = compiler(&store, 3)
        .compile(&post(1, "p", meta), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(
        doc["meta"]["content"],
        json!({ "on": true, "off": false, "odd": false })
    );
}

#[tokio::test]
async fn references_inside_repeatables_are_spliced() {
    let meta = vec![
        MetaEntry::new("content.cards_$type", "repeatable"),
        MetaEntry::new("content.cards[0].link_$type", "reference_single"),
        MetaEntry::new("content.cards[0].link", r#"{"slugPath":"a"}"#),
        MetaEntry::new("content.cards[1].link_$type", "reference_single"),
        MetaEntry::new("content.cards[1].link", r#"{"slugPath":"b"}"#),
    ];
    let store = MemoryStore::new()
        .with_post(post(10, "a", vec![]))
        .with_post(post(11, "b", vec![]));

    let doc = compiler(&store, 3)
        .compile(&post(1, "p", meta), &CompileOptions::new())
        .await
        .unwrap();

    let cards = &doc["meta"]["content"]["cards"];
    assert_eq!(cards[0]["link"]["id"], json!(10));
    assert_eq!(cards[1]["link"]["id"], json!(11));
}

#[tokio::test]
async fn richtext_components_keep_references_unresolved() {
    let doc_json = json!({
        "blocks": [],
        "entityMap": {
            "0": { "type": "IMAGE", "data": { "npath": "inline.png" } },
            "1": { "type": "COMPONENT", "data": { "value": {
                "link_$type": "reference_single",
                "link": "{\"slugPath\":\"a\"}"
            } } }
        }
    });
    let meta = vec![
        MetaEntry::new("content.body_$type", "richtext"),
        MetaEntry::new("content.body", doc_json.to_string()),
    ];
    let store = MemoryStore::new().with_post(post(10, "a", vec![]));

    let doc = compiler(&store, 3)
        .compile(&post(1, "p", meta), &CompileOptions::new())
        .await
        .unwrap();

    let entities = &doc["meta"]["content"]["body"]["entityMap"];
    assert_eq!(
        entities["0"]["data"]["src"],
        json!("https://cms.test/api/uploads/inline.png")
    );
    assert_eq!(entities["1"]["data"]["value"], json!({ "link": null }));
    assert!(store.operations().is_empty());
}

#[tokio::test]
async fn malformed_fields_degrade_to_null() {
    let meta = vec![
        MetaEntry::new("content.hero_$type", "reference_single"),
        MetaEntry::new("content.hero", "{broken"),
        MetaEntry::new("content.pics_$type", "images"),
        MetaEntry::new("content.pics", "[oops"),
        MetaEntry::new("content.title", "kept"),
    ];
    let store = MemoryStore::new();

    let doc = compiler(&store, 3)
        .compile(&post(1, "p", meta), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(
        doc["meta"]["content"],
        json!({ "hero": null, "pics": null, "title": "kept" })
    );
}

// =============================================================================
// Envelope and failures
// =============================================================================

#[tokio::test]
async fn envelope_strips_author_and_maps_tags() {
    let mut home = post(1, "home", scenario_meta());
    home.author = Some(User {
        id: 3,
        email: "editor@example.com".into(),
        first_name: Some("Edi".into()),
        last_name: Some("Tor".into()),
        password: Some("secret".into()),
    });
    home.tags = vec![Tag {
        id: 8,
        name: "Company".into(),
        slug: "company".into(),
        slug_path: "company".into(),
    }];
    let store = MemoryStore::new();

    let doc = compiler(&store, 3)
        .compile(&home, &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(doc["author"], json!({ "firstName": "Edi", "lastName": "Tor" }));
    assert_eq!(
        doc["tags"],
        json!([{ "id": 8, "name": "Company", "slug": "company", "slugPath": "company" }])
    );
    assert_eq!(doc["type"], json!("page"));
    assert!(!doc.to_string().contains("secret"));
}

#[tokio::test]
async fn filters_decorate_nested_documents() {
    let mut filters = FilterPipeline::new();
    filters.add(PUBLIC_POST, 0, |mut doc| {
        doc["url"] = json!(format!("/{}", doc["slugPath"].as_str().unwrap_or_default()));
        doc
    });
    filters.add(PUBLIC_ASSET, 0, |mut asset| {
        asset["cdn"] = json!(true);
        asset
    });

    let mut meta = scenario_meta();
    meta.extend(images("pic", &["x.png"]));
    let store = MemoryStore::new()
        .with_post(post(2, "about", vec![]))
        .with_asset(Asset {
            id: 1,
            npath: "x.png".into(),
            ..Asset::default()
        });

    let doc = compiler(&store, 3)
        .with_filters(filters)
        .compile(&post(1, "home", meta), &CompileOptions::new())
        .await
        .unwrap();

    assert_eq!(doc["url"], json!("/home"));
    assert_eq!(doc["meta"]["content"]["hero"]["url"], json!("/about"));
    assert_eq!(doc["meta"]["content"]["pic"][0]["cdn"], json!(true));
}

#[tokio::test]
async fn store_failure_is_propagated() {
    let store = MemoryStore::new()
        .with_post(post(2, "about", vec![]))
        .fail_on(FailOn::FindPostFor(
            "about".into(),
            StoreError::Unavailable("connection reset".into()),
        ));

    let err = compiler(&store, 3)
        .compile(&post(1, "home", scenario_meta()), &CompileOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CompileError::Store(StoreError::Unavailable(_))));
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn asset_store_failure_is_propagated() {
    let store = MemoryStore::new().fail_on(FailOn::FindAssets(StoreError::Query {
        message: "timeout".into(),
    }));

    let result = compiler(&store, 3)
        .compile(&post(1, "p", images("pic", &["a.png"])), &CompileOptions::new())
        .await;

    assert!(matches!(
        result,
        Err(CompileError::Store(StoreError::Query { .. }))
    ));
}

#[tokio::test]
async fn query_options_drive_compilation() {
    let mut about = post(2, "about", vec![]);
    about.status = PostStatus::Draft;
    let store = MemoryStore::new().with_post(about);
    let compiler = compiler(&store, 3);
    let home = post(1, "home", scenario_meta());

    let preview = CompileOptions::from_query([("compile", "true"), ("draft", "")]).unwrap();
    let doc = compiler.compile(&home, &preview).await.unwrap();
    assert_eq!(doc["meta"]["content"]["hero"]["id"], json!(2));

    let shallow =
        CompileOptions::from_query([("draft", "true"), ("relationsDepth", "0")]).unwrap();
    let doc = compiler.compile(&home, &shallow).await.unwrap();
    assert_eq!(doc["meta"]["content"]["hero"], Value::Null);
}

#[tokio::test]
async fn compile_many_keeps_search_order() {
    let store = MemoryStore::new().with_post(post(2, "about", vec![]));
    let results = vec![
        post(9, "z", vec![]),
        post(1, "home", scenario_meta()),
        post(5, "m", vec![]),
    ];

    let docs = compiler(&store, 3)
        .compile_many(&results, &CompileOptions::new())
        .await
        .unwrap();

    let ids: Vec<Value> = docs.iter().map(|d| d["id"].clone()).collect();
    assert_eq!(ids, vec![json!(9), json!(1), json!(5)]);
    assert_eq!(docs[1]["meta"]["content"]["hero"]["id"], json!(2));
}
