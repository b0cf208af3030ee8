//! core
//!
//! Domain records and configuration.
//!
//! # Modules
//!
//! - [`types`] - Posts, assets, tags, users and their meta entries
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
