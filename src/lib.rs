//! burdy-content - compile flat post meta into render-ready documents
//!
//! Posts store their fields as flat `{ key, value }` meta pairs. This crate
//! rebuilds the nested, type-tagged content tree from that storage and
//! resolves the assets and posts it references into one inlined document.
//!
//! # Architecture
//!
//! Layers, leaf first:
//!
//! - [`core`] - Collaborator records and configuration
//! - [`codec`] - Flatten/unflatten between nested values and path maps
//! - [`content`] - Type-tag driven parsing in editor or public mode
//! - [`store`] - Read-only post and asset lookups
//! - [`hooks`] - Named filters decorating mapper output
//! - [`mapper`] - Public and editor envelopes
//! - [`compiler`] - Bounded-depth reference resolution
//! - [`cli`] - Command-line front end
//!
//! # Guarantees
//!
//! 1. Malformed stored content degrades to `null`, never to an error
//! 2. Reference expansion stops after a configurable depth, even on cycles
//! 3. Each distinct post is fetched at most once per depth within a call, and
//!    each distinct asset at most once per compiled post
//! 4. Only store failures abort a compile

pub mod cli;
pub mod codec;
pub mod compiler;
pub mod content;
pub mod core;
pub mod hooks;
pub mod mapper;
pub mod store;
