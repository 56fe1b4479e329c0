//! HTTP client implementation using reqwest

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use tracing::trace;

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::common::{Error, Result};
use crate::keypath::to_plain_string;

const USER_AGENT: &str = concat!("apitest/", env!("CARGO_PKG_VERSION"));

/// Production HTTP client
///
/// Keeps one client that validates certificates and one that does not, and
/// picks between them per request.
pub struct ReqwestHttpClient {
    verifying: Client,
    insecure: Client,
}

impl ReqwestHttpClient {
    /// Create the client pair
    pub fn new() -> Result<Self> {
        let verifying = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let insecure = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            verifying,
            insecure,
        })
    }

    fn client_for(&self, verify_ssl: bool) -> &Client {
        if verify_ssl {
            &self.verifying
        } else {
            &self.insecure
        }
    }

    fn to_reqwest_method(method: &str) -> Result<Method> {
        Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| Error::Http(format!("Invalid HTTP method: {}", method)))
    }

    /// Flatten query parameters to string pairs; arrays repeat the key
    fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(params.len());
        for (key, value) in params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        pairs.push((key.clone(), to_plain_string(item)));
                    }
                }
                other => pairs.push((key.clone(), to_plain_string(other))),
            }
        }
        pairs
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method = Self::to_reqwest_method(&request.method)?;
        let mut builder = self
            .client_for(request.verify_ssl)
            .request(method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(params) = &request.params {
            builder = builder.query(&Self::query_pairs(params));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read body: {}", e)))?;

        trace!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(HttpResponse { status, body })
    }
}
