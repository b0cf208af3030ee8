//! hooks
//!
//! Named value filters the mappers run their output through.
//!
//! # Design
//!
//! A filter takes a JSON value and returns a (possibly decorated)
//! replacement. Filters are grouped by hook name and run in ascending
//! priority; filters with equal priority run in registration order.
//! Applying a hook with no filters returns the value unchanged.
//!
//! The pipeline is built once and shared read-only, so filters must be
//! `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use burdy_content::hooks::{FilterPipeline, PUBLIC_POST};
//! use serde_json::json;
//!
//! let mut filters = FilterPipeline::new();
//! filters.add(PUBLIC_POST, 10, |mut post| {
//!     post["decorated"] = json!(true);
//!     post
//! });
//!
//! let out = filters.apply(PUBLIC_POST, json!({ "id": 1 }));
//! assert_eq!(out, json!({ "id": 1, "decorated": true }));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

pub const PUBLIC_POST: &str = "public/post";
pub const PUBLIC_ASSET: &str = "public/asset";
pub const PUBLIC_TAG: &str = "public/tag";
pub const INTERNAL_POST: &str = "internal/post";
pub const INTERNAL_ASSET: &str = "internal/asset";
pub const INTERNAL_USER: &str = "internal/user";

type Filter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

#[derive(Clone)]
struct Registered {
    priority: i32,
    filter: Filter,
}

/// Filters keyed by hook name.
#[derive(Clone, Default)]
pub struct FilterPipeline {
    hooks: HashMap<String, Vec<Registered>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `filter` on `hook`.
    pub fn add<F>(&mut self, hook: &str, priority: i32, filter: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let filters = self.hooks.entry(hook.to_string()).or_default();
        filters.push(Registered {
            priority,
            filter: Arc::new(filter),
        });
        // Stable sort keeps registration order for equal priorities
        filters.sort_by_key(|registered| registered.priority);
    }

    /// Run `value` through every filter on `hook`.
    pub fn apply(&self, hook: &str, value: Value) -> Value {
        match self.hooks.get(hook) {
            Some(filters) => filters
                .iter()
                .fold(value, |value, registered| (registered.filter)(value)),
            None => value,
        }
    }

    /// Number of filters on `hook`.
    pub fn count(&self, hook: &str) -> usize {
        self.hooks.get(hook).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .hooks
            .iter()
            .map(|(hook, filters)| (hook.as_str(), filters.len()))
            .collect();
        counts.sort();
        f.debug_struct("FilterPipeline")
            .field("hooks", &counts)
            .finish()
    }
}
