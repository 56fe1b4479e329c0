//! Test run configuration
//!
//! Mirrors the JSON document that describes suites, tests and the rules
//! that chain them together. YAML files with the same shape are accepted.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use super::logging::DEFAULT_LOG_LEVEL;
use super::{Error, Result};

/// Root of a configuration file
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Numeric log level (10 debug, 20 info, 30 warning, 40 error)
    #[serde(default = "default_log_level")]
    pub log_level: u32,

    /// Headers shared by every suite of the run
    #[serde(default)]
    pub headers: IndexMap<String, HeaderConfig>,

    /// Suites, executed in order
    #[serde(default)]
    pub suites: Vec<SuiteConfig>,
}

fn default_log_level() -> u32 {
    DEFAULT_LOG_LEVEL
}

/// A suite of tests sharing base URL, TLS policy and headers
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SuiteConfig {
    pub name: Option<String>,

    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Stop the suite at the first failed test
    #[serde(default = "default_true")]
    pub exit_on_failure: bool,

    #[serde(default)]
    pub headers: IndexMap<String, HeaderConfig>,

    /// Suite fields replaced by environment variables before tests are built
    #[serde(default)]
    pub env_override: Vec<EnvOverride>,

    #[serde(default)]
    pub tests: Vec<TestConfig>,
}

/// Header definition as found in a `headers` block
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    /// Value template
    #[serde(default)]
    pub value: String,

    /// Keep the header out of the request
    #[serde(default)]
    pub hide: bool,

    /// Marker inside `value` to substitute
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Environment variable used to fill the placeholder
    pub env_name: Option<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            value: String::new(),
            hide: false,
            placeholder: default_placeholder(),
            env_name: None,
        }
    }
}

fn default_placeholder() -> String {
    crate::header::DEFAULT_PLACEHOLDER.to_string()
}

/// Replace a suite field with the content of an environment variable
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnvOverride {
    /// Suite field, camelCase (e.g. `baseUrl`)
    pub name: String,
    pub env_name: String,
}

/// A single API call and its expectations
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub name: Option<String>,

    /// Appended to the suite base URL
    #[serde(default)]
    pub path: String,

    #[serde(default = "default_method")]
    pub method: String,

    /// JSON request body
    pub payload: Option<Value>,

    /// Query string parameters
    pub params: Option<Map<String, Value>>,

    #[serde(default)]
    pub headers: IndexMap<String, HeaderConfig>,

    /// Path to a JSON file holding the expected response body
    pub expected: Option<String>,

    #[serde(rename = "expected_code", alias = "expectedCode", default = "default_expected_code")]
    pub expected_code: u16,

    #[serde(default)]
    pub response_check_exceptions: Vec<ExceptionRule>,

    #[serde(default)]
    pub extract: Vec<ExtractRule>,

    #[serde(default)]
    pub inject: Vec<InjectRule>,
}

impl TestConfig {
    /// A GET test with only its expected result file set
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            enabled: true,
            name: None,
            path: String::new(),
            method: default_method(),
            payload: None,
            params: None,
            headers: IndexMap::new(),
            expected: Some(expected.into()),
            expected_code: default_expected_code(),
            response_check_exceptions: Vec::new(),
            extract: Vec::new(),
            inject: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_expected_code() -> u16 {
    200
}

/// How a response field escapes strict comparison
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Field is not checked at all
    Ignore,
    /// Field must be present, any value
    Exist,
}

/// Per-field override of the response comparison
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExceptionRule {
    /// Dot path of the field in the expected body
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ExceptionKind,
}

impl ExceptionRule {
    pub fn new(key: impl Into<String>, kind: ExceptionKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// Take a value out of a successful response
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractRule {
    /// Name the value is stored under in the suite pool
    pub name: String,
    /// Dot path into the response body
    pub key: String,
}

/// Where an injected value lands in the request
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InjectTarget {
    /// Dot path inside the JSON payload
    Body,
    /// Query string parameter
    Query,
    /// Extra URL path segment
    Path,
    /// Header value (or its placeholder)
    Header,
}

/// Feed a pooled value into the request
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InjectRule {
    /// Name of the value in the suite pool
    pub name: String,
    /// Target key; unused for `path`
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub target: InjectTarget,
}

/// Configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from the file extension, JSON unless `.yaml`/`.yml`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

impl RunConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse configuration text
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Json => {
                serde_json::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
            }
            ConfigFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
            }
        }
    }
}
