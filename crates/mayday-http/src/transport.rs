//! Generic HTTP request executor
//!
//! Executes exactly one HTTP exchange per call and classifies the outcome:
//!
//! | Status      | Outcome                                   |
//! |-------------|-------------------------------------------|
//! | 200-299     | `Ok(Outcome::Delivered(body))`            |
//! | 400-599     | `Err(NetworkError { code, description })` |
//! | other       | `Ok(Outcome::Ignored(status))`            |
//! | no response | `Err(NetworkError { code: 0, .. })`       |
//!
//! POST and PUT carry a body: a multipart upload when the request has
//! attachments, otherwise the JSON-encoded parameters. GET and DELETE never
//! carry a body.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use mayday_core::config::HttpMethod;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::multipart::MultipartBody;
use crate::{NetworkError, NO_JSON_MESSAGE};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Request / outcome types
// ============================================================================

/// Files uploaded as one multipart field
#[derive(Debug, Clone)]
pub struct Attachments {
    /// Field name shared by every file part (e.g. `reports[]`)
    pub key: String,
    pub files: Vec<Vec<u8>>,
}

/// A single request to execute
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Sent verbatim, before any content headers
    pub headers: BTreeMap<String, String>,
    pub parameters: Option<Map<String, Value>>,
    pub attachments: Option<Attachments>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: BTreeMap::new(),
            parameters: None,
            attachments: None,
        }
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn attachments(mut self, key: impl Into<String>, files: Vec<Vec<u8>>) -> Self {
        self.attachments = Some(Attachments {
            key: key.into(),
            files,
        });
        self
    }
}

/// A response that was not an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx, with the response body
    Delivered(Bytes),
    /// A status outside both the success and error ranges
    Ignored(u16),
}

// ============================================================================
// HttpTransport
// ============================================================================

/// HTTP executor for collector requests
///
/// Wraps a `reqwest::Client` configured with the request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Creates a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Executes `request`, collapsing ignored statuses to `None`
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] for 400-599 responses and for exchanges that
    /// produced no response.
    pub async fn execute(&self, request: TransportRequest) -> Result<Option<Bytes>, NetworkError> {
        match self.send(request).await? {
            Outcome::Delivered(body) => Ok(Some(body)),
            Outcome::Ignored(_) => Ok(None),
        }
    }

    /// Executes `request` and classifies the response status
    ///
    /// # Errors
    ///
    /// Same as [`HttpTransport::execute`].
    pub async fn send(&self, request: TransportRequest) -> Result<Outcome, NetworkError> {
        let method = request.method;
        let url = request.url.clone();

        let response = match self.build(request).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%method, %url, error = %e, "Request produced no response");
                return Err(NetworkError::unreachable(&e));
            }
        };

        let status = response.status().as_u16();
        match status {
            200..=299 => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| NetworkError::unreachable(&e))?;
                debug!(%method, %url, status, bytes = body.len(), "Request succeeded");
                Ok(Outcome::Delivered(body))
            }
            400..=599 => {
                // An unreadable error body is treated as empty
                let body = response.bytes().await.unwrap_or_default();
                let description = extract_message(&body);
                debug!(%method, %url, status, %description, "Request failed");
                Err(NetworkError::new(status, description))
            }
            _ => {
                warn!(%method, %url, status, "Ignoring response with unclassified status");
                Ok(Outcome::Ignored(status))
            }
        }
    }

    fn build(&self, request: TransportRequest) -> RequestBuilder {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if !request.method.has_body() {
            return builder;
        }

        match request.attachments {
            Some(attachments) => {
                let body = MultipartBody::build(
                    &attachments.key,
                    &attachments.files,
                    request.parameters.as_ref(),
                );
                builder
                    .header(CONTENT_TYPE, body.content_type())
                    .body(body.into_bytes())
            }
            None => {
                builder = builder
                    .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                    .header(ACCEPT, JSON_CONTENT_TYPE);
                match request.parameters {
                    Some(parameters) => builder.body(Value::Object(parameters).to_string()),
                    None => builder,
                }
            }
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Pulls a human-readable message out of an error response body
///
/// For a JSON object: its `reason` string, else the first member's value
/// when it is a string or an array whose first element is a string.
/// Otherwise the body as text, or [`NO_JSON_MESSAGE`] when it is empty.
pub fn extract_message(body: &[u8]) -> String {
    if let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) {
        if let Some(Value::String(reason)) = object.get("reason") {
            return reason.clone();
        }
        let first = object.values().next().and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        });
        if let Some(message) = first {
            return message;
        }
    }

    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        NO_JSON_MESSAGE.to_string()
    } else {
        text.into_owned()
    }
}
