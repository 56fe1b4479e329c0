//! A single API test
//!
//! Built from a test definition plus the settings its suite shares with all
//! of its tests. Running it issues one HTTP call and checks the response
//! against the expected result file.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::common::config::{ExceptionRule, ExtractRule, InjectRule, InjectTarget, TestConfig};
use crate::common::{Error, Result};
use crate::header::{headers_from_config, merge_headers_lists, Header};
use crate::http::{HttpClient, HttpRequest};
use crate::keypath;
use crate::matcher::{check_content, check_status_code};
use crate::status::TestStatus;

use super::ValuePool;

/// Settings a suite hands down to each of its tests
#[derive(Debug, Clone)]
pub struct SharedConfig {
    pub base_url: String,
    pub verify_ssl: bool,
    pub headers: Vec<Header>,
}

/// What a test run produced
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutput {
    /// Parsed response body
    Json(Value),
    /// Response that was not JSON, or the transport error
    Text(String),
}

impl TestOutput {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            TestOutput::Json(value) => Some(value),
            TestOutput::Text(_) => None,
        }
    }
}

/// A test against an API
#[derive(Debug)]
pub struct ApiTest {
    name: String,
    enabled: bool,
    url: String,
    method: String,
    payload: Option<Value>,
    params: Option<Map<String, Value>>,
    headers: Vec<Header>,
    verify_ssl: bool,
    expected_file: PathBuf,
    expected: Value,
    expected_code: u16,
    exceptions: Vec<ExceptionRule>,
    extract: Vec<ExtractRule>,
    inject: Vec<InjectRule>,
    status: TestStatus,
    output: Option<TestOutput>,
}

impl ApiTest {
    /// Build a test, loading its expected result file
    ///
    /// Fails when the URL is empty, when no expected file is configured or
    /// when the file is missing. Relative paths are resolved against the
    /// working directory.
    pub fn new(shared: &SharedConfig, data: &TestConfig) -> Result<Self> {
        let name = data
            .name
            .clone()
            .unwrap_or_else(|| format!("Unnamed Test - {}", uuid::Uuid::new_v4()));

        let url = format!("{}{}", shared.base_url, data.path);
        if url.is_empty() {
            return Err(Error::MissingUrl { test: name });
        }

        let expected_file = match data.expected.as_deref() {
            Some(path) if !path.is_empty() => std::env::current_dir()?.join(path),
            _ => return Err(Error::MissingExpectedFile { test: name }),
        };
        let expected = load_expected(&name, &expected_file)?;

        let test_headers = headers_from_config(&data.headers);

        Ok(Self {
            enabled: data.enabled,
            url,
            method: data.method.to_uppercase(),
            payload: data.payload.clone(),
            params: data.params.clone(),
            headers: merge_headers_lists(&shared.headers, &test_headers),
            verify_ssl: shared.verify_ssl,
            expected_file,
            expected,
            expected_code: data.expected_code,
            exceptions: data.response_check_exceptions.clone(),
            extract: data.extract.clone(),
            inject: data.inject.clone(),
            status: TestStatus::Pending,
            output: None,
            name,
        })
    }

    /// Issue the call and check the response
    ///
    /// A body that is not JSON, or a transport error, fails the test and is
    /// returned as text. A test only runs once; later calls return the
    /// recorded outcome.
    pub async fn run(&mut self, client: &dyn HttpClient) -> (TestStatus, TestOutput) {
        if self.status.is_terminal() {
            warn!("Test \"{}\" already finished, reusing its result", self.name);
            let output = self
                .output
                .clone()
                .unwrap_or_else(|| TestOutput::Text(String::new()));
            return (self.status, output);
        }

        self.status = TestStatus::Running;
        let request = self.request();

        debug!("~~~~~~~~~~");
        info!("Running Test: \"{}\"...", self.name);
        debug!("URL :: {} {}", request.method, request.url);
        debug!("params :: {:?}", request.params);
        debug!("payload :: {:?}", request.body);
        debug!("headers :: {:?}", request.headers);

        let output = match client.execute(&request).await {
            Ok(response) => match serde_json::from_str::<Value>(&response.body) {
                Ok(body) => {
                    let content_ok = check_content(&body, &self.expected, &self.exceptions);
                    let code_ok = check_status_code(response.status, self.expected_code);
                    if !content_ok {
                        error!(
                            "Expected result (file {}) was :: {}",
                            self.expected_file.display(),
                            self.expected
                        );
                        error!("Actual result was :: {}", body);
                    }
                    self.status = if content_ok && code_ok {
                        TestStatus::Success
                    } else {
                        TestStatus::Failure
                    };
                    TestOutput::Json(body)
                }
                Err(e) => {
                    error!("Error while parsing JSON response: {}", response.body);
                    error!("{}", e);
                    self.status = TestStatus::Failure;
                    TestOutput::Text(response.body)
                }
            },
            Err(e) => {
                error!("Call failed: {}", e);
                self.status = TestStatus::Failure;
                TestOutput::Text(e.to_string())
            }
        };

        self.output = Some(output.clone());
        (self.status, output)
    }

    /// Values named by the extract rules, read from the last response
    ///
    /// Paths that do not resolve yield `null`. Empty until the test has run
    /// with a JSON response.
    pub fn extract_values(&self) -> ValuePool {
        let mut values = ValuePool::new();
        if let Some(body) = self.output.as_ref().and_then(TestOutput::as_json) {
            for rule in &self.extract {
                let value = keypath::get(body, &rule.key).cloned().unwrap_or(Value::Null);
                values.insert(rule.name.clone(), value);
            }
        }
        values
    }

    /// Apply the inject rules using values from `pool`
    ///
    /// Rules naming a value that is not pooled are skipped.
    pub fn inject_values(&mut self, pool: &ValuePool) {
        for rule in self.inject.clone() {
            let Some(value) = pool.get(&rule.name) else {
                warn!("Value {} not present in given values :: {:?}", rule.name, pool);
                continue;
            };

            match rule.target {
                InjectTarget::Body => self.inject_body(rule.key.as_deref(), value),
                InjectTarget::Query => self.inject_query(rule.key.as_deref(), value),
                InjectTarget::Path => self.inject_path(value),
                InjectTarget::Header => self.inject_header(rule.key.as_deref(), value),
            }
        }
    }

    /// Headers that go on the wire: every visible header's current value
    pub fn outgoing_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter(|h| !h.is_hidden())
            .map(|h| (h.key().to_string(), h.value().to_string()))
            .collect()
    }

    fn request(&self) -> HttpRequest {
        HttpRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.outgoing_headers(),
            body: self.payload.clone(),
            params: self.params.clone(),
            verify_ssl: self.verify_ssl,
        }
    }

    fn inject_body(&mut self, key: Option<&str>, value: &Value) {
        let (Some(key), Some(payload)) = (key, self.payload.as_mut()) else {
            warn!("[Test {}] Body injection needs a key and a payload", self.name);
            return;
        };
        if !keypath::set(payload, key, value.clone()) {
            debug!("[Test {}] Body key {} not reachable, payload unchanged", self.name, key);
        }
    }

    fn inject_query(&mut self, key: Option<&str>, value: &Value) {
        let Some(key) = key else {
            warn!("[Test {}] Query injection needs a key", self.name);
            return;
        };
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.clone());
    }

    fn inject_path(&mut self, value: &Value) {
        if self.url.ends_with('/') {
            self.url.pop();
        }
        self.url.push('/');
        self.url.push_str(&keypath::to_plain_string(value));
    }

    fn inject_header(&mut self, key: Option<&str>, value: &Value) {
        let Some(key) = key else {
            warn!("[Test {}] Header injection needs a key", self.name);
            return;
        };
        let value = keypath::to_plain_string(value);
        match self.headers.iter_mut().find(|h| h.key() == key) {
            Some(header) => header.set_value(&value),
            None => self.headers.push(Header::new(key, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Mark a disabled test as skipped without running it
    pub(crate) fn skip(&mut self) {
        if self.status == TestStatus::Pending {
            self.status = TestStatus::Skipped;
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.params.as_ref()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn expected_code(&self) -> u16 {
        self.expected_code
    }

    /// Last response body or error text
    pub fn output(&self) -> Option<&TestOutput> {
        self.output.as_ref()
    }
}

fn load_expected(test: &str, path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::ExpectedFileNotFound {
            test: test.to_string(),
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        Error::ConfigParse(format!(
            "[Test {}] Expected result file {} is not valid JSON: {}",
            test,
            path.display(),
            e
        ))
    })
}
