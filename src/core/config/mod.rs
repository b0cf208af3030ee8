//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`POSTS_MAX_RELATIONS_DEBT`, `BURDY_HOST`)
//! 4. Per-request options (not handled here, see [`crate::compiler::CompileOptions`])
//!
//! # Config File Locations
//!
//! Searched in order:
//! 1. Explicit path passed to [`Config::load`]
//! 2. `$BURDY_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/burdy/config.toml`
//! 4. `~/.burdy/config.toml`
//!
//! # Example
//!
//! ```
//! use burdy_content::core::config::Config;
//!
//! let result = Config::load_with_env(None, |name| match name {
//!     "POSTS_MAX_RELATIONS_DEBT" => Some("2".to_string()),
//!     "BURDY_HOST" => Some("https://cms.example.com".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! let settings = result.config.compiler_settings();
//! assert_eq!(settings.max_relations_debt, 2);
//! assert_eq!(
//!     settings.uploads.url("photos/cat.png"),
//!     "https://cms.example.com/api/uploads/photos/cat.png"
//! );
//! ```

pub mod schema;

pub use schema::{FileConfig, PostsConfig, UploadsConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of post-reference levels a compile call expands.
pub const DEFAULT_MAX_RELATIONS_DEBT: u32 = 3;

/// Default route under which uploads are served.
pub const DEFAULT_UPLOADS_PREFIX: &str = "/api/uploads";

/// Environment variable naming an explicit config file.
pub const ENV_CONFIG: &str = "BURDY_CONFIG";

/// Environment variable overriding the upload host.
pub const ENV_HOST: &str = "BURDY_HOST";

/// Environment variable overriding the reference recursion bound.
pub const ENV_MAX_RELATIONS_DEBT: &str = "POSTS_MAX_RELATIONS_DEBT";

/// Depth above which loading warns about reference fan-out.
const DEEP_RELATIONS_WARNING: u32 = 8;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// Where the offending value came from (file path or variable name).
    pub origin: String,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Values read from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub max_relations_debt: Option<u32>,
    pub host: Option<String>,
}

impl EnvOverrides {
    /// Read overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` if the debt variable is not a number.
    pub fn read<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_relations_debt = match lookup(ENV_MAX_RELATIONS_DEBT) {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
                ConfigError::InvalidEnv {
                    name: ENV_MAX_RELATIONS_DEBT,
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            max_relations_debt,
            host: lookup(ENV_HOST),
        })
    }
}

/// Builds public URLs for uploaded assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUrls {
    host: String,
    prefix: String,
}

impl UploadUrls {
    /// Create a URL builder. A trailing `/` on either part is dropped.
    pub fn new(host: impl Into<String>, prefix: impl Into<String>) -> Self {
        let host = host.into().trim_end_matches('/').to_string();
        let prefix = prefix.into().trim_end_matches('/').to_string();
        Self { host, prefix }
    }

    /// The display URL for the asset at `npath`.
    ///
    /// ```
    /// use burdy_content::core::config::UploadUrls;
    ///
    /// let urls = UploadUrls::default();
    /// assert_eq!(urls.url("/a/b.png"), "/api/uploads/a/b.png");
    /// ```
    pub fn url(&self, npath: &str) -> String {
        format!(
            "{}{}/{}",
            self.host,
            self.prefix,
            npath.trim_start_matches('/')
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for UploadUrls {
    fn default() -> Self {
        Self::new("", DEFAULT_UPLOADS_PREFIX)
    }
}

/// Resolved settings consumed by the content pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Reference recursion bound
    pub max_relations_debt: u32,
    /// Upload URL builder
    pub uploads: UploadUrls,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            max_relations_debt: DEFAULT_MAX_RELATIONS_DEBT,
            uploads: UploadUrls::default(),
        }
    }
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Config file contents
    pub file: FileConfig,
    /// Environment overrides
    pub env: EnvOverrides,
    /// Path to the config file (if loaded)
    file_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or an
    /// environment override is malformed. Missing files are not an error.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with_env(explicit, |name| std::env::var(name).ok())
    }

    /// Load configuration with an injected environment lookup.
    pub fn load_with_env<F>(
        explicit: Option<&Path>,
        lookup: F,
    ) -> Result<ConfigLoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (file, file_path) = Self::load_file(explicit, &lookup)?;
        file.validate()?;

        let env = EnvOverrides::read(&lookup)?;

        let config = Config {
            file,
            env,
            file_path,
        };
        let warnings = config.collect_warnings();

        Ok(ConfigLoadResult { config, warnings })
    }

    /// Locate and read the config file.
    fn load_file<F>(
        explicit: Option<&Path>,
        lookup: &F,
    ) -> Result<(FileConfig, Option<PathBuf>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 1. Explicit path must exist
        if let Some(path) = explicit {
            let config = Self::read_file(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        // 2. Check $BURDY_CONFIG
        if let Some(path) = lookup(ENV_CONFIG) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check $XDG_CONFIG_HOME/burdy/config.toml
        if let Some(xdg_home) = lookup("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("burdy/config.toml");
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 4. Check ~/.burdy/config.toml
        if let Some(path) = Self::home_config_path() {
            if path.exists() {
                let config = Self::read_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((FileConfig::default(), None))
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The per-user config path, `~/.burdy/config.toml`.
    pub fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".burdy/config.toml"))
    }

    fn collect_warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.raw_host().ends_with('/') {
            warnings.push(ConfigWarning {
                message: format!(
                    "upload host '{}' has a trailing '/', it will be trimmed",
                    self.raw_host()
                ),
                origin: self.host_origin(),
            });
        }

        let debt = self.max_relations_debt();
        if debt > DEEP_RELATIONS_WARNING {
            warnings.push(ConfigWarning {
                message: format!(
                    "max_relations_debt = {} expands references very deeply; wide reference graphs will fan out",
                    debt
                ),
                origin: if self.env.max_relations_debt.is_some() {
                    ENV_MAX_RELATIONS_DEBT.to_string()
                } else {
                    self.file_origin()
                },
            });
        }

        warnings
    }

    fn file_origin(&self) -> String {
        self.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    }

    fn host_origin(&self) -> String {
        if self.env.host.is_some() {
            ENV_HOST.to_string()
        } else {
            self.file_origin()
        }
    }

    fn raw_host(&self) -> &str {
        self.env
            .host
            .as_deref()
            .or_else(|| self.file.uploads.as_ref().and_then(|u| u.host.as_deref()))
            .unwrap_or("")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the reference recursion bound.
    ///
    /// Defaults to 3 if not configured.
    pub fn max_relations_debt(&self) -> u32 {
        self.env
            .max_relations_debt
            .or_else(|| self.file.posts.as_ref().and_then(|p| p.max_relations_debt))
            .unwrap_or(DEFAULT_MAX_RELATIONS_DEBT)
    }

    /// Get the upload host, without trailing `/`.
    ///
    /// Defaults to the empty string (relative URLs).
    pub fn host(&self) -> &str {
        self.raw_host().trim_end_matches('/')
    }

    /// Get the upload route prefix.
    pub fn uploads_prefix(&self) -> &str {
        self.file
            .uploads
            .as_ref()
            .and_then(|u| u.path_prefix.as_deref())
            .unwrap_or(DEFAULT_UPLOADS_PREFIX)
    }

    /// Build the settings consumed by the parser and compiler.
    pub fn compiler_settings(&self) -> CompilerSettings {
        CompilerSettings {
            max_relations_debt: self.max_relations_debt(),
            uploads: UploadUrls::new(self.host(), self.uploads_prefix()),
        }
    }

    /// The effective configuration, with every value resolved.
    pub fn effective(&self) -> FileConfig {
        FileConfig {
            posts: Some(PostsConfig {
                max_relations_debt: Some(self.max_relations_debt()),
            }),
            uploads: Some(UploadsConfig {
                host: Some(self.host().to_string()),
                path_prefix: Some(self.uploads_prefix().to_string()),
            }),
        }
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::default();
        assert_eq!(config.max_relations_debt(), 3);
        assert_eq!(config.host(), "");
        assert_eq!(config.uploads_prefix(), "/api/uploads");
        assert_eq!(config.compiler_settings(), CompilerSettings::default());
    }

    #[test]
    fn load_explicit_file() {
        let (_temp, path) = write_config(
            r#"
            [posts]
            max_relations_debt = 1

            [uploads]
            host = "https://files.example.com"
            "#,
        );

        let result = Config::load_with_env(Some(&path), env_of(&[])).unwrap();
        let config = result.config;

        assert_eq!(config.max_relations_debt(), 1);
        assert_eq!(config.host(), "https://files.example.com");
        assert_eq!(config.loaded_from(), Some(path.as_path()));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_file_from_env_variable() {
        let (_temp, path) = write_config("[posts]\nmax_relations_debt = 4\n");
        let path_str = path.to_str().unwrap();

        let result = Config::load_with_env(None, env_of(&[(ENV_CONFIG, path_str)])).unwrap();
        assert_eq!(result.config.max_relations_debt(), 4);
    }

    #[test]
    fn env_overrides_file() {
        let (_temp, path) = write_config(
            r#"
            [posts]
            max_relations_debt = 1

            [uploads]
            host = "https://file.example.com"
            "#,
        );

        let result = Config::load_with_env(
            Some(&path),
            env_of(&[
                (ENV_MAX_RELATIONS_DEBT, "5"),
                (ENV_HOST, "https://env.example.com"),
            ]),
        )
        .unwrap();

        assert_eq!(result.config.max_relations_debt(), 5);
        assert_eq!(result.config.host(), "https://env.example.com");
    }

    #[test]
    fn invalid_env_debt_rejected() {
        let result = Config::load_with_env(None, env_of(&[(ENV_MAX_RELATIONS_DEBT, "three")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                name: ENV_MAX_RELATIONS_DEBT,
                ..
            })
        ));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        let result = Config::load_with_env(Some(&path), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn unparsable_file_is_error() {
        let (_temp, path) = write_config("[posts\n");
        let result = Config::load_with_env(Some(&path), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn trailing_slash_host_warns_and_trims() {
        let result =
            Config::load_with_env(None, env_of(&[(ENV_HOST, "https://cms.example.com/")])).unwrap();

        assert_eq!(result.config.host(), "https://cms.example.com");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].origin, ENV_HOST);
    }

    #[test]
    fn deep_debt_warns() {
        let result =
            Config::load_with_env(None, env_of(&[(ENV_MAX_RELATIONS_DEBT, "20")])).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("fan out"));
    }

    #[test]
    fn effective_resolves_everything() {
        let config = Config {
            env: EnvOverrides {
                max_relations_debt: Some(2),
                host: None,
            },
            ..Default::default()
        };

        let effective = config.effective();
        assert_eq!(effective.posts.unwrap().max_relations_debt, Some(2));
        assert_eq!(
            effective.uploads.unwrap().path_prefix.as_deref(),
            Some("/api/uploads")
        );
    }

    mod upload_urls {
        use super::*;

        #[test]
        fn relative_by_default() {
            assert_eq!(UploadUrls::default().url("img/a.png"), "/api/uploads/img/a.png");
        }

        #[test]
        fn host_and_prefix_are_joined() {
            let urls = UploadUrls::new("https://cms.example.com/", "/files/");
            assert_eq!(urls.url("/a.png"), "https://cms.example.com/files/a.png");
            assert_eq!(urls.host(), "https://cms.example.com");
            assert_eq!(urls.prefix(), "/files");
        }
    }
}
