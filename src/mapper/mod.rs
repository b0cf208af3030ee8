//! mapper
//!
//! Output envelopes for posts, assets, tags and users.
//!
//! Mappers are the last step before a record leaves the crate: they pick
//! the fields a reader may see, normalise author and tag shapes, and run
//! the result through the matching [`crate::hooks`] filter.
//!
//! - [`public`]: delivery shape. Authors are reduced to their names.
//! - [`internal`]: editor shape. Everything except user passwords.

pub mod internal;
pub mod public;
