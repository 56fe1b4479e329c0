//! Scripted HTTP client for unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::{HttpClient, HttpRequest, HttpResponse};
use crate::common::{Error, Result};

/// Answers requests from a route table and records everything it receives
#[derive(Default)]
pub struct MockHttpClient {
    routes: Vec<(String, String, HttpResponse)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with `status` and a raw body
    pub fn route(mut self, method: &str, url: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            method.to_string(),
            url.to_string(),
            HttpResponse::new(status, body),
        ));
        self
    }

    /// Answer `method url` with `status` and a JSON body
    pub fn json(self, method: &str, url: &str, status: u16, body: serde_json::Value) -> Self {
        let text = body.to_string();
        self.route(method, url, status, &text)
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.routes
            .iter()
            .find(|(method, url, _)| *method == request.method && *url == request.url)
            .map(|(_, _, response)| response.clone())
            .ok_or_else(|| {
                Error::Http(format!(
                    "connection refused: {} {}",
                    request.method, request.url
                ))
            })
    }
}
