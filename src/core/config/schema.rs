//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order (first hit wins):
//! 1. `--config <path>` on the command line
//! 2. `$BURDY_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/burdy/config.toml`
//! 4. `~/.burdy/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing; unknown fields are rejected.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// [posts]
/// max_relations_debt = 3
///
/// [uploads]
/// host = "https://cms.example.com"
/// path_prefix = "/api/uploads"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Post compilation settings
    pub posts: Option<PostsConfig>,

    /// Upload URL settings
    pub uploads: Option<UploadsConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(uploads) = &self.uploads {
            uploads.validate()?;
        }
        Ok(())
    }
}

/// Post compilation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// How many levels of post references a compile call expands
    pub max_relations_debt: Option<u32>,
}

/// Upload URL settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Scheme and authority prepended to upload URLs (empty for relative URLs)
    pub host: Option<String>,

    /// Route under which uploads are served
    pub path_prefix: Option<String>,
}

impl UploadsConfig {
    /// Validate the upload settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `path_prefix` is not absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.path_prefix {
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "uploads.path_prefix must start with '/', got '{}'",
                    prefix
                )));
            }
        }
        Ok(())
    }
}
