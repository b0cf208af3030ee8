//! store
//!
//! Persistence collaborator boundary.
//!
//! The compiler depends only on [`ContentStore`]. [`memory::MemoryStore`]
//! is the in-process backend used by tests and by the CLI's fixture files.

pub mod memory;
pub mod traits;

pub use memory::{FailOn, FixtureError, MemoryStore, StoreOperation};
pub use traits::{ContentStore, PostQuery, StoreError};
