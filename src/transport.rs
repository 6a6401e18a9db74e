//! The HTTP I/O seam.
//!
//! The dispatcher hands a fully prepared [`OutgoingRequest`] to a
//! [`Transport`] and gets back either a [`RawResponse`] (any status) or an
//! error for failures below HTTP. [`ReqwestTransport`] is the default.

use crate::config::{Params, RequestBody};
use crate::{Error, RawResponse, Result};
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, Method};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

/// A request ready to be put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    /// The HTTP method.
    pub method: Method,
    /// The fully resolved URL, without the query string.
    pub url: String,
    /// Headers to send.
    pub headers: HeaderMap,
    /// Query parameters or a JSON body.
    pub body: RequestBody,
    /// Per-request timeout, if configured.
    pub timeout: Option<Duration>,
}

/// Performs HTTP requests for the dispatcher.
///
/// Implementations return `Ok` for every response that reached the
/// server, whatever its status, and `Err` only when no response exists.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request. Exactly one attempt is made.
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse>;
}

/// A [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;
        Ok(Self { http_client })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse> {
        let start_time = Instant::now();
        let mut url = Url::parse(&request.url)?;

        let mut builder = match request.body {
            RequestBody::Params(params) => {
                append_query(&mut url, &params);
                self.http_client.request(request.method, url)
            }
            RequestBody::Json(json) => {
                let builder = self.http_client.request(request.method, url).body(json);
                if request.headers.contains_key(http::header::CONTENT_TYPE) {
                    builder
                } else {
                    builder.header(
                        http::header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )
                }
            }
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse::new(
            Some(status),
            body,
            headers,
            start_time.elapsed(),
        ))
    }
}

/// Encodes structured params as query pairs.
///
/// Arrays repeat the key once per element, `null` becomes an empty value
/// and nested objects are sent as JSON text.
fn append_query(url: &mut Url, params: &Params) {
    if params.is_empty() {
        return;
    }

    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.append_pair(key, &query_text(item));
                }
            }
            other => {
                pairs.append_pair(key, &query_text(other));
            }
        }
    }
}

fn query_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_query_scalars() {
        let mut url = Url::parse("https://bookie.example.com/api/v1/alice/ping").unwrap();
        let params = json!({"api_key": "secret", "count": 5, "flag": false})
            .as_object()
            .cloned()
            .unwrap();
        append_query(&mut url, &params);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("api_key".to_string(), "secret".to_string())));
        assert!(pairs.contains(&("count".to_string(), "5".to_string())));
        assert!(pairs.contains(&("flag".to_string(), "false".to_string())));
    }

    #[test]
    fn test_append_query_repeats_array_keys() {
        let mut url = Url::parse("https://bookie.example.com/alice/tags/complete").unwrap();
        let params = json!({"current": ["rust", "web"]})
            .as_object()
            .cloned()
            .unwrap();
        append_query(&mut url, &params);
        assert_eq!(url.query(), Some("current=rust&current=web"));
    }

    #[test]
    fn test_append_query_empty_leaves_url_untouched() {
        let mut url = Url::parse("https://bookie.example.com/alice/ping").unwrap();
        append_query(&mut url, &Params::new());
        assert_eq!(url.query(), None);
    }
}
