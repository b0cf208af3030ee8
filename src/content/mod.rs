//! content
//!
//! Content tree parsing.
//!
//! Post content is stored as flat meta entries carrying a sibling type tag
//! per field (`title_$type = "text"`). Once unflattened, the tree is walked
//! by [`parse`] and rendered in one of two modes:
//!
//! - internal, for the editor (markers kept raw)
//! - public, for delivery (placeholders plus the reference tables the
//!   compiler resolves)

pub mod field;
pub mod node;
pub mod parser;
pub mod richtext;

pub use field::{FieldType, TYPE_SUFFIX};
pub use node::{Node, Parsed, PathTable, PublicLeaf, RawMarker, RefTables, Tree};
pub use parser::{
    parse, parse_internal, parse_public, parse_to_value, InternalStrategy, LeafStrategy,
    ParseMode, PublicStrategy,
};
