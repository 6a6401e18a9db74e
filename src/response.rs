//! Raw transport response handed to every lifecycle callback.
//!
//! [`RawResponse`] is what the transport produced before any decoding. The
//! decoded body travels alongside it as a [`crate::DecodedResponse`], so
//! callers can always fall back to the exact bytes the server sent.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// The undecoded outcome of a single dispatched request.
///
/// # Examples
///
/// ```
/// use bookie_client::RawResponse;
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// let response = RawResponse::new(
///     Some(StatusCode::NOT_FOUND),
///     "{\"error\":\"not found\"}".to_string(),
///     HeaderMap::new(),
///     Duration::from_millis(12),
/// );
///
/// assert_eq!(response.status_text, "Not Found");
/// assert!(!response.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code, or `None` when the request never got a
    /// response (connection refused, DNS failure, ...).
    pub status: Option<StatusCode>,

    /// The status text passed to `error` callbacks.
    ///
    /// For HTTP responses this is the canonical reason phrase
    /// (`"Not Found"`). For transport failures it is the error message.
    pub status_text: String,

    /// The raw response body as a string.
    pub body: String,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from dispatch until the response body was read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a `RawResponse` for a request that reached the server.
    pub fn new(
        status: Option<StatusCode>,
        body: String,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        let status_text = status
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();

        Self {
            status,
            status_text,
            body,
            headers,
            latency,
        }
    }

    /// Creates a `RawResponse` for a request that failed below HTTP.
    ///
    /// The body is empty and the status text carries the failure message.
    pub fn transport_failure(message: impl Into<String>, latency: Duration) -> Self {
        Self {
            status: None,
            status_text: message.into(),
            body: String::new(),
            headers: HeaderMap::new(),
            latency,
        }
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| s.is_success())
    }

    /// Returns a reference to a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bookie_client::RawResponse;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("application/json"));
    ///
    /// let response = RawResponse::new(
    ///     Some(StatusCode::OK),
    ///     String::new(),
    ///     headers,
    ///     Duration::from_millis(5),
    /// );
    ///
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_from_canonical_reason() {
        let response = RawResponse::new(
            Some(StatusCode::OK),
            "{}".to_string(),
            HeaderMap::new(),
            Duration::ZERO,
        );
        assert_eq!(response.status_text, "OK");
        assert!(response.is_success());
    }

    #[test]
    fn test_transport_failure_is_not_success() {
        let response = RawResponse::transport_failure("connection refused", Duration::ZERO);
        assert_eq!(response.status, None);
        assert_eq!(response.status_text, "connection refused");
        assert!(response.body.is_empty());
        assert!(!response.is_success());
    }
}
