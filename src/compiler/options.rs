//! compiler::options
//!
//! Per-call compile options and their query-string form.
//!
//! | Query parameter | Field | Values |
//! |---|---|---|
//! | `draft` | `allow_unpublished` | `true`, `1` or empty (present) enable; `false`, `0` disable |
//! | `relationsDepth` | `max_debt` | non-negative integer |
//!
//! Unrelated parameters (`compile`, paging, search terms) are ignored.

use thiserror::Error;

/// Errors decoding options from a query string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("invalid value for '{name}': {value}")]
    InvalidValue { name: String, value: String },
}

/// Options for one compile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Starting recursion debt of the root post
    pub debt: u32,
    /// Resolve drafts and scheduled posts too
    pub allow_unpublished: bool,
    /// Per-call depth limit; clamped to the configured maximum
    pub max_debt: Option<u32>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_unpublished(mut self, allow: bool) -> Self {
        self.allow_unpublished = allow;
        self
    }

    pub fn max_debt(mut self, max_debt: u32) -> Self {
        self.max_debt = Some(max_debt);
        self
    }

    pub fn debt(mut self, debt: u32) -> Self {
        self.debt = debt;
        self
    }

    /// Depth limit for this call given the configured maximum.
    pub fn effective_max_debt(&self, configured: u32) -> u32 {
        self.max_debt.map_or(configured, |max| max.min(configured))
    }

    /// Decode `draft` and `relationsDepth` from query pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use burdy_content::compiler::CompileOptions;
    ///
    /// let options = CompileOptions::from_query([("compile", "true"), ("draft", ""), ("relationsDepth", "1")]).unwrap();
    /// assert!(options.allow_unpublished);
    /// assert_eq!(options.max_debt, Some(1));
    /// ```
    pub fn from_query<I, K, V>(pairs: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();

        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "draft" => options.allow_unpublished = parse_flag(name, value)?,
                "relationsDepth" => {
                    let depth = value.trim().parse::<u32>().map_err(|_| invalid(name, value))?;
                    options.max_debt = Some(depth);
                }
                _ => {}
            }
        }

        Ok(options)
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, OptionsError> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn invalid(name: &str, value: &str) -> OptionsError {
    OptionsError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}
