//! Test suites
//!
//! A suite runs its tests in declaration order. Values extracted from a
//! successful test accumulate in the suite's value pool, and the whole pool
//! is offered to the next test before it runs.

use tracing::{debug, info, warn};

use crate::common::config::{EnvOverride, SuiteConfig};
use crate::common::{Error, Result};
use crate::header::{headers_from_config, merge_headers_lists, Header};
use crate::http::HttpClient;
use crate::status::TestStatus;

use super::case::{ApiTest, SharedConfig, TestOutput};
use super::ValuePool;

/// Outcome of one test inside a suite
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    /// `None` for skipped tests
    pub output: Option<TestOutput>,
}

/// Suite fields that can be replaced from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuiteField {
    Name,
    BaseUrl,
    VerifySsl,
    ExitOnFailure,
}

impl SuiteField {
    /// Look up a field by its snake_case attribute name
    fn from_attribute(attribute: &str) -> Option<Self> {
        match attribute {
            "name" => Some(SuiteField::Name),
            "base_url" => Some(SuiteField::BaseUrl),
            "verify_ssl" => Some(SuiteField::VerifySsl),
            "exit_on_failure" => Some(SuiteField::ExitOnFailure),
            _ => None,
        }
    }
}

/// Collection of tests sharing base URL, TLS policy and headers
#[derive(Debug)]
pub struct TestSuite {
    name: String,
    base_url: String,
    verify_ssl: bool,
    exit_on_failure: bool,
    headers: Vec<Header>,
    tests: Vec<ApiTest>,
    extracted_values: ValuePool,
    results: Vec<TestResult>,
}

impl TestSuite {
    /// Build a suite, reading environment overrides from the process environment
    pub fn new(config: &SuiteConfig, global_headers: &[Header]) -> Result<Self> {
        Self::with_env(config, global_headers, |name| std::env::var(name).ok())
    }

    /// Build a suite using `env` to resolve environment overrides
    ///
    /// Overrides are applied before the base URL is validated and before any
    /// test is built, so tests see the overridden values.
    pub fn with_env<F>(config: &SuiteConfig, global_headers: &[Header], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Initializing configuration");

        let suite_headers = headers_from_config(&config.headers);
        let mut suite = Self {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| format!("Unnamed Test Suite - {}", uuid::Uuid::new_v4())),
            base_url: config.base_url.clone(),
            verify_ssl: config.verify_ssl,
            exit_on_failure: config.exit_on_failure,
            headers: merge_headers_lists(global_headers, &suite_headers),
            tests: Vec::new(),
            extracted_values: ValuePool::new(),
            results: Vec::new(),
        };

        suite.apply_overrides(&config.env_override, env);

        if suite.base_url.is_empty() {
            return Err(Error::InvalidBaseUrl(suite.base_url));
        }

        let shared = suite.shared_config();
        suite.tests = config
            .tests
            .iter()
            .map(|data| ApiTest::new(&shared, data))
            .collect::<Result<_>>()?;

        Ok(suite)
    }

    /// Run every test in order
    ///
    /// Disabled tests are recorded as skipped. On the first failure the suite
    /// stops unless `exitOnFailure` is off; tests after that point get no
    /// result at all.
    pub async fn run(&mut self, client: &dyn HttpClient) {
        info!("----------------------------------------------------------------");
        info!("Running Test Suite: \"{}\"...", self.name);
        info!("----------------------------------------------------------------");

        let count = self.tests.len();
        for i in 0..count {
            let test = &mut self.tests[i];

            if !test.enabled() {
                test.skip();
                self.results.push(TestResult {
                    name: test.name().to_string(),
                    status: TestStatus::Skipped,
                    output: None,
                });
                continue;
            }

            let (status, output) = test.run(client).await;
            self.results.push(TestResult {
                name: test.name().to_string(),
                status,
                output: Some(output),
            });

            if status == TestStatus::Success {
                self.extracted_values.extend(test.extract_values());
                if i + 1 < count && !self.extracted_values.is_empty() {
                    self.tests[i + 1].inject_values(&self.extracted_values);
                }
            } else if self.exit_on_failure {
                info!(
                    "Exiting on test failure. To execute all tests set `\"exitOnFailure\": false` in the suite configuration."
                );
                break;
            }
        }
    }

    fn apply_overrides<F>(&mut self, overrides: &[EnvOverride], env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for rule in overrides {
            let value = env(&rule.env_name).unwrap_or_default();
            match SuiteField::from_attribute(&camel_to_snake(&rule.name)) {
                Some(field) => {
                    debug!(
                        "Overriding configuration entry {} with new value {}",
                        rule.name, value
                    );
                    match field {
                        SuiteField::Name => self.name = value,
                        SuiteField::BaseUrl => self.base_url = value,
                        SuiteField::VerifySsl => self.verify_ssl = parse_flag(&value),
                        SuiteField::ExitOnFailure => self.exit_on_failure = parse_flag(&value),
                    }
                }
                None => warn!("Variable {} cannot be overridden", rule.name),
            }
        }
    }

    fn shared_config(&self) -> SharedConfig {
        SharedConfig {
            base_url: self.base_url.clone(),
            verify_ssl: self.verify_ssl,
            headers: self.headers.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn exit_on_failure(&self) -> bool {
        self.exit_on_failure
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn tests(&self) -> &[ApiTest] {
        &self.tests
    }

    /// Values extracted so far
    pub fn extracted_values(&self) -> &ValuePool {
        &self.extracted_values
    }

    /// Results in execution order
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }
}

/// Convert a camelCase name to snake_case (`verifySsl` -> `verify_ssl`)
fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Boolean from an environment string; empty and the usual "no" words are false
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{ExtractRule, InjectRule, InjectTarget, TestConfig};
    use crate::http::mock::MockHttpClient;
    use serde_json::json;
    use tempfile::TempDir;

    const BASE: &str = "http://localhost:9093";

    fn expected_file(dir: &TempDir) -> String {
        let path = dir.path().join("status-expected.json");
        std::fs::write(&path, r#"{ "version": "0.3.1", "status": "OK" }"#).unwrap();
        path.display().to_string()
    }

    fn suite_config(tests: Vec<TestConfig>) -> SuiteConfig {
        SuiteConfig {
            name: Some("test test suite".to_string()),
            base_url: BASE.to_string(),
            verify_ssl: true,
            exit_on_failure: true,
            headers: Default::default(),
            env_override: Vec::new(),
            tests,
        }
    }

    fn status_test(dir: &TempDir, name: &str, path: &str) -> TestConfig {
        TestConfig {
            name: Some(name.to_string()),
            path: path.to_string(),
            ..TestConfig::new(expected_file(dir))
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn status_body() -> serde_json::Value {
        json!({ "version": "0.3.1", "status": "OK" })
    }

    #[test]
    fn test_empty_suite() {
        let suite = TestSuite::with_env(&suite_config(Vec::new()), &[], no_env).unwrap();
        assert_eq!(suite.name(), "test test suite");
        assert!(suite.tests().is_empty());
    }

    #[test]
    fn test_missing_base_url() {
        let mut config = suite_config(Vec::new());
        config.base_url = String::new();
        let err = TestSuite::with_env(&config, &[], no_env).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl(_)));
        assert!(err.to_string().to_lowercase().contains("non-valid baseurl"));
    }

    #[test]
    fn test_env_override_base_url() {
        let mut config = suite_config(Vec::new());
        config.env_override = vec![EnvOverride {
            name: "baseUrl".to_string(),
            env_name: "TEST_BASE_URL".to_string(),
        }];
        let suite = TestSuite::with_env(&config, &[], |name| {
            (name == "TEST_BASE_URL").then(|| "http://127.0.0.1:8888".to_string())
        })
        .unwrap();
        assert_eq!(suite.base_url(), "http://127.0.0.1:8888");
    }

    #[test]
    fn test_env_override_applies_before_validation() {
        let mut config = suite_config(Vec::new());
        config.base_url = String::new();
        config.env_override = vec![EnvOverride {
            name: "baseUrl".to_string(),
            env_name: "URL".to_string(),
        }];
        let suite =
            TestSuite::with_env(&config, &[], |_| Some("http://from-env".to_string())).unwrap();
        assert_eq!(suite.base_url(), "http://from-env");

        let err = TestSuite::with_env(&config, &[], no_env).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_env_override_unset_variable_blanks_field() {
        let mut config = suite_config(Vec::new());
        config.env_override = vec![EnvOverride {
            name: "baseUrl".to_string(),
            env_name: "UNSET".to_string(),
        }];
        assert!(TestSuite::with_env(&config, &[], no_env).is_err());
    }

    #[test]
    fn test_env_override_flags_and_unknown_fields() {
        let mut config = suite_config(Vec::new());
        config.env_override = vec![
            EnvOverride {
                name: "verifySsl".to_string(),
                env_name: "VERIFY".to_string(),
            },
            EnvOverride {
                name: "exitOnFailure".to_string(),
                env_name: "EXIT".to_string(),
            },
            EnvOverride {
                name: "timeout".to_string(),
                env_name: "TIMEOUT".to_string(),
            },
        ];
        let suite = TestSuite::with_env(&config, &[], |name| match name {
            "VERIFY" => Some("false".to_string()),
            "EXIT" => Some("0".to_string()),
            _ => Some("30".to_string()),
        })
        .unwrap();
        assert!(!suite.verify_ssl());
        assert!(!suite.exit_on_failure());
        assert_eq!(suite.base_url(), BASE);
    }

    #[test]
    fn test_env_override_reaches_tests() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = suite_config(vec![status_test(&dir, "Status", "/v1/status")]);
        config.env_override = vec![EnvOverride {
            name: "baseUrl".to_string(),
            env_name: "URL".to_string(),
        }];
        let suite =
            TestSuite::with_env(&config, &[], |_| Some("http://other:1".to_string())).unwrap();
        assert_eq!(suite.tests()[0].url(), "http://other:1/v1/status");
    }

    #[test]
    fn test_headers_layering() {
        let mut config = suite_config(Vec::new());
        config.headers.insert(
            "Accept".to_string(),
            crate::common::config::HeaderConfig {
                value: "text/plain".to_string(),
                ..Default::default()
            },
        );
        let global = vec![
            Header::new("Accept", "application/json"),
            Header::new("User-Agent", "apitest"),
        ];
        let suite = TestSuite::with_env(&config, &global, no_env).unwrap();
        let headers: Vec<(&str, &str)> =
            suite.headers().iter().map(|h| (h.key(), h.value())).collect();
        assert_eq!(headers, vec![("User-Agent", "apitest"), ("Accept", "text/plain")]);
    }

    #[test]
    fn test_bad_test_aborts_suite_construction() {
        let dir = tempfile::tempdir().unwrap();
        let config = suite_config(vec![
            status_test(&dir, "Status", "/v1/status"),
            TestConfig {
                name: Some("Broken".to_string()),
                ..TestConfig::new(dir.path().join("absent.json").display().to_string())
            },
        ]);
        let err = TestSuite::with_env(&config, &[], no_env).unwrap_err();
        assert!(matches!(err, Error::ExpectedFileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_single_test() {
        let dir = tempfile::tempdir().unwrap();
        let config = suite_config(vec![status_test(&dir, "Status", "/v1/status")]);
        let mut suite = TestSuite::with_env(&config, &[], no_env).unwrap();
        let client = MockHttpClient::new().json("GET", &format!("{}/v1/status", BASE), 200, status_body());

        suite.run(&client).await;

        assert_eq!(
            suite.results(),
            &[TestResult {
                name: "Status".to_string(),
                status: TestStatus::Success,
                output: Some(TestOutput::Json(status_body())),
            }]
        );
    }

    #[tokio::test]
    async fn test_disabled_test_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut test = status_test(&dir, "Status", "/v1/status");
        test.enabled = false;
        let mut suite = TestSuite::with_env(&suite_config(vec![test]), &[], no_env).unwrap();
        let client = MockHttpClient::new();

        suite.run(&client).await;

        assert_eq!(
            suite.results(),
            &[TestResult {
                name: "Status".to_string(),
                status: TestStatus::Skipped,
                output: None,
            }]
        );
        assert_eq!(suite.tests()[0].status(), TestStatus::Skipped);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_chaining_extract_into_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = status_test(&dir, "Status", "/v1/status");
        first.extract = vec![ExtractRule {
            name: "v".to_string(),
            key: "version".to_string(),
        }];
        let mut second = status_test(&dir, "StatusNext", "/v1/status");
        second.inject = vec![InjectRule {
            name: "v".to_string(),
            key: Some("X-Version".to_string()),
            target: InjectTarget::Header,
        }];
        let mut suite =
            TestSuite::with_env(&suite_config(vec![first, second]), &[], no_env).unwrap();
        let client = MockHttpClient::new().json("GET", &format!("{}/v1/status", BASE), 200, status_body());

        suite.run(&client).await;

        let requests = client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].header("X-Version"), None);
        assert_eq!(requests[1].header("X-Version"), Some("0.3.1"));
        assert_eq!(suite.extracted_values()["v"], "0.3.1");
        assert!(suite.results().iter().all(|r| r.status == TestStatus::Success));
    }

    #[tokio::test]
    async fn test_exit_on_failure_stops_suite() {
        let dir = tempfile::tempdir().unwrap();
        let config = suite_config(vec![
            status_test(&dir, "Broken", "/v1/broken"),
            status_test(&dir, "Status", "/v1/status"),
        ]);
        let mut suite = TestSuite::with_env(&config, &[], no_env).unwrap();
        let client = MockHttpClient::new()
            .json("GET", &format!("{}/v1/broken", BASE), 500, json!({ "error": "boom" }))
            .json("GET", &format!("{}/v1/status", BASE), 200, status_body());

        suite.run(&client).await;

        assert_eq!(suite.results().len(), 1);
        assert_eq!(suite.results()[0].status, TestStatus::Failure);
        assert_eq!(client.requests().len(), 1);
        assert_eq!(suite.tests()[1].status(), TestStatus::Pending);
    }

    #[tokio::test]
    async fn test_continue_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = suite_config(vec![
            status_test(&dir, "Broken", "/v1/broken"),
            status_test(&dir, "Status", "/v1/status"),
        ]);
        config.exit_on_failure = false;
        let mut suite = TestSuite::with_env(&config, &[], no_env).unwrap();
        let client = MockHttpClient::new()
            .route("GET", &format!("{}/v1/broken", BASE), 200, "<html>oops</html>")
            .json("GET", &format!("{}/v1/status", BASE), 200, status_body());

        suite.run(&client).await;

        let statuses: Vec<TestStatus> = suite.results().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![TestStatus::Failure, TestStatus::Success]);
        assert_eq!(
            suite.results()[0].output,
            Some(TestOutput::Text("<html>oops</html>".to_string()))
        );
    }

    #[tokio::test]
    async fn test_pool_persists_but_injection_is_one_hop() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = status_test(&dir, "First", "/v1/status");
        first.extract = vec![ExtractRule {
            name: "v".to_string(),
            key: "version".to_string(),
        }];
        let second = status_test(&dir, "Second", "/v1/status");
        let mut third = status_test(&dir, "Third", "/v1/items");
        third.inject = vec![InjectRule {
            name: "v".to_string(),
            key: None,
            target: InjectTarget::Path,
        }];
        let mut suite =
            TestSuite::with_env(&suite_config(vec![first, second, third]), &[], no_env).unwrap();
        let client = MockHttpClient::new()
            .json("GET", &format!("{}/v1/status", BASE), 200, status_body())
            .json("GET", &format!("{}/v1/items/0.3.1", BASE), 200, status_body());

        suite.run(&client).await;

        // The second test extracts nothing, yet the pooled value still reaches the third
        let requests = client.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2].url, format!("{}/v1/items/0.3.1", BASE));
        assert_eq!(suite.results()[2].status, TestStatus::Success);
    }

    #[tokio::test]
    async fn test_failed_test_does_not_feed_pool() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = status_test(&dir, "First", "/v1/status");
        first.extract = vec![ExtractRule {
            name: "v".to_string(),
            key: "version".to_string(),
        }];
        let mut config = suite_config(vec![first, status_test(&dir, "Second", "/v1/status")]);
        config.exit_on_failure = false;
        let mut suite = TestSuite::with_env(&config, &[], no_env).unwrap();
        let client = MockHttpClient::new().json(
            "GET",
            &format!("{}/v1/status", BASE),
            404,
            status_body(),
        );

        suite.run(&client).await;

        assert!(suite.extracted_values().is_empty());
        assert_eq!(suite.results().len(), 2);
    }

    fn path_inject() -> Vec<InjectRule> {
        vec![InjectRule {
            name: "v".to_string(),
            key: None,
            target: InjectTarget::Path,
        }]
    }

    fn extract_build() -> Vec<ExtractRule> {
        vec![ExtractRule {
            name: "v".to_string(),
            key: "build".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_later_extraction_overwrites_pooled_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = status_test(&dir, "First", "/a");
        first.extract = extract_build();
        let mut second = status_test(&dir, "Second", "/b");
        second.extract = extract_build();
        let mut third = status_test(&dir, "Third", "/c");
        third.inject = path_inject();
        let mut suite =
            TestSuite::with_env(&suite_config(vec![first, second, third]), &[], no_env).unwrap();
        let client = MockHttpClient::new()
            .json("GET", &format!("{}/a", BASE), 200, json!({ "version": "0.3.1", "status": "OK", "build": 1 }))
            .json("GET", &format!("{}/b", BASE), 200, json!({ "version": "0.3.1", "status": "OK", "build": 2 }))
            .json("GET", &format!("{}/c/2", BASE), 200, status_body());

        suite.run(&client).await;

        assert_eq!(suite.extracted_values().len(), 1);
        assert_eq!(suite.extracted_values()["v"], 2);
        assert_eq!(client.requests()[2].url, format!("{}/c/2", BASE));
        assert!(suite.results().iter().all(|r| r.status == TestStatus::Success));
    }

    #[tokio::test]
    async fn test_disabled_next_test_absorbs_injection() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = status_test(&dir, "First", "/a");
        first.extract = extract_build();
        let mut second = status_test(&dir, "Second", "/b");
        second.extract = extract_build();
        let mut disabled = status_test(&dir, "Disabled", "/c");
        disabled.enabled = false;
        disabled.inject = path_inject();
        let mut last = status_test(&dir, "Last", "/d");
        last.inject = path_inject();
        let config = suite_config(vec![first, second, disabled, last]);
        let mut suite = TestSuite::with_env(&config, &[], no_env).unwrap();
        let client = MockHttpClient::new()
            .json("GET", &format!("{}/a", BASE), 200, json!({ "version": "0.3.1", "status": "OK", "build": 1 }))
            .json("GET", &format!("{}/b", BASE), 200, json!({ "version": "0.3.1", "status": "OK", "build": 2 }))
            .json("GET", &format!("{}/d", BASE), 200, status_body());

        suite.run(&client).await;

        assert_eq!(suite.extracted_values()["v"], 2);
        let urls: Vec<String> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/a", BASE),
                format!("{}/b", BASE),
                format!("{}/d", BASE),
            ]
        );
        assert_eq!(suite.tests()[2].url(), format!("{}/c/2", BASE));
        let statuses: Vec<TestStatus> = suite.results().iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                TestStatus::Success,
                TestStatus::Success,
                TestStatus::Skipped,
                TestStatus::Success,
            ]
        );
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("baseUrl"), "base_url");
        assert_eq!(camel_to_snake("verifySsl"), "verify_ssl");
        assert_eq!(camel_to_snake("exitOnFailure"), "exit_on_failure");
        assert_eq!(camel_to_snake("name"), "name");
        assert_eq!(camel_to_snake("base_url"), "base_url");
        assert_eq!(camel_to_snake("HTTPResponse"), "http_response");
        assert_eq!(camel_to_snake("getHTTPResponseCode"), "get_http_response_code");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(parse_flag("YES"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("False"));
        assert!(!parse_flag("off"));
    }
}
