//! HTTP transport
//!
//! Tests talk to the network through the [`HttpClient`] trait so suites can
//! be driven by a scripted client in unit tests and by reqwest in the CLI.

mod reqwest_client;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::common::Result;

pub use reqwest_client::ReqwestHttpClient;

/// An outgoing API call
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Upper-case HTTP method
    pub method: String,
    pub url: String,
    /// Header name/value pairs in send order
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Query string parameters
    pub params: Option<Map<String, Value>>,
    /// Reject invalid TLS certificates
    pub verify_ssl: bool,
}

impl HttpRequest {
    /// Value of the first header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response of an API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Body text, not yet parsed
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs HTTP calls on behalf of tests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue `request` and return the status code and body text
    ///
    /// Errors are reserved for transport failures (connection refused, TLS
    /// errors, ...). Any HTTP status is a successful call.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
