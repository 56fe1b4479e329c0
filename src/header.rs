//! HTTP headers with templated values
//!
//! A header value may contain a placeholder (default `{}`) that is filled
//! from an environment variable at construction and from injected values
//! later on. Substitution always starts again from the original template,
//! so `Bearer {}` stays `Bearer <token>` no matter how often it is updated.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::common::config::HeaderConfig;

/// Placeholder used when a header definition does not name one
pub const DEFAULT_PLACEHOLDER: &str = "{}";

/// A request header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    key: String,
    original_value: String,
    placeholder: String,
    value: String,
    hidden: bool,
}

impl Header {
    /// Create a visible header whose template is `value` itself
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            key: key.into(),
            original_value: value.clone(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            value,
            hidden: false,
        }
    }

    /// Build a header from its configuration, reading the process environment
    pub fn from_config(key: &str, config: &HeaderConfig) -> Self {
        Self::from_config_with(key, config, |name| std::env::var(name).ok())
    }

    /// Build a header from its configuration using `env` to look up variables
    ///
    /// A missing variable leaves the template untouched.
    pub fn from_config_with<F>(key: &str, config: &HeaderConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut header = Self {
            key: key.to_string(),
            original_value: config.value.clone(),
            placeholder: config.placeholder.clone(),
            value: config.value.clone(),
            hidden: config.hide,
        };

        if let Some(env_name) = config.env_name.as_deref() {
            if header.has_placeholder() {
                match env(env_name) {
                    Some(env_value) => {
                        debug!(
                            "Filling \"{}\" header value with environment variable {}",
                            key, env_name
                        );
                        header.value = header.substitute(&env_value);
                    }
                    None => warn!(
                        "\"{}\" header value cannot be filled with environment variable {}: not set",
                        key, env_name
                    ),
                }
            }
        }

        header
    }

    /// Header name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value sent on the wire
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Template the header was defined with
    pub fn original_value(&self) -> &str {
        &self.original_value
    }

    /// Hidden headers are never sent but can still receive injected values
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Update the value
    ///
    /// When the template contains the placeholder only that part is replaced,
    /// otherwise the whole value becomes `new_value`.
    pub fn set_value(&mut self, new_value: &str) {
        self.value = if self.has_placeholder() {
            self.substitute(new_value)
        } else {
            new_value.to_string()
        };
    }

    fn has_placeholder(&self) -> bool {
        !self.placeholder.is_empty() && self.original_value.contains(&self.placeholder)
    }

    fn substitute(&self, replacement: &str) -> String {
        self.original_value.replace(&self.placeholder, replacement)
    }
}

/// Build the header list described by a `headers` configuration block,
/// keeping declaration order
pub fn headers_from_config(headers: &IndexMap<String, HeaderConfig>) -> Vec<Header> {
    headers
        .iter()
        .map(|(key, config)| Header::from_config(key, config))
        .collect()
}

/// Merge two header lists, `overrides` winning on key collisions
///
/// Headers unique to `base` come first, then those unique to `overrides`,
/// then the overriding entries for shared keys in `overrides` order.
pub fn merge_headers_lists(base: &[Header], overrides: &[Header]) -> Vec<Header> {
    let shared = |key: &str, other: &[Header]| other.iter().any(|h| h.key == key);

    let unique_base = base.iter().filter(|h| !shared(&h.key, overrides));
    let unique_overrides = overrides.iter().filter(|h| !shared(&h.key, base));
    let replaced = overrides.iter().filter(|h| shared(&h.key, base));

    unique_base
        .chain(unique_overrides)
        .chain(replaced)
        .cloned()
        .collect()
}
