//! Per-call request configuration and the layered merge that produces it.
//!
//! Three layers contribute to a [`RequestConfig`], weakest first:
//!
//! 1. the client's base configuration (GET, JSON headers, empty data),
//! 2. caller-supplied [`CallOptions`],
//! 3. the route's fixed [`RouteOverride`].
//!
//! Scalar fields are overwritten by the stronger layer. `data` is merged one
//! level deep, key by key, so no layer ever removes a key another layer set.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::{Map, Value};

/// Request parameters keyed by name.
pub type Params = Map<String, Value>;

/// Caller-supplied options for a single call.
///
/// # Examples
///
/// ```
/// use bookie_client::CallOptions;
/// use http::Method;
///
/// let options = CallOptions::new()
///     .with_method(Method::GET)
///     .with_data("count", 25)
///     .with_header("X-Requested-With", "bookie-client")
///     .unwrap();
///
/// assert_eq!(options.data["count"], 25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Method override. A route's own override still wins.
    pub method: Option<Method>,

    /// Extra request data.
    pub data: Params,

    /// Extra headers, layered over the base headers.
    pub headers: HeaderMap,
}

impl CallOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method override.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Adds one data entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// The layer a route contributes: an optional method and fixed data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOverride {
    /// Method the route forces, e.g. DELETE. `None` inherits.
    pub method: Option<Method>,

    /// Data the route always sends.
    pub data: Params,
}

/// The fully resolved configuration for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    /// The HTTP method.
    pub method: Method,

    /// Request data, sent as query parameters or as a JSON body.
    pub data: Params,

    /// Request headers.
    pub headers: HeaderMap,
}

impl Default for RequestConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Self {
            method: Method::GET,
            data: Params::new(),
            headers,
        }
    }
}

impl RequestConfig {
    /// Merges the three configuration layers into a new config.
    ///
    /// The route's method beats the caller's, which beats the base. Headers
    /// layer base then options. `data` is the key-wise union of all three
    /// layers with the route's entries winning.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookie_client::{CallOptions, RequestConfig, RouteOverride};
    /// use http::Method;
    /// use serde_json::json;
    ///
    /// let options = CallOptions::new()
    ///     .with_method(Method::POST)
    ///     .with_data("hash_id", "from-options")
    ///     .with_data("extra", true);
    /// let route = RouteOverride {
    ///     method: Some(Method::DELETE),
    ///     data: json!({"hash_id": "abc123"}).as_object().cloned().unwrap(),
    /// };
    ///
    /// let cfg = RequestConfig::default().merge(&options, &route);
    /// assert_eq!(cfg.method, Method::DELETE);
    /// assert_eq!(cfg.data["hash_id"], "abc123");
    /// assert_eq!(cfg.data["extra"], true);
    /// ```
    pub fn merge(&self, options: &CallOptions, route: &RouteOverride) -> RequestConfig {
        let method = route
            .method
            .clone()
            .or_else(|| options.method.clone())
            .unwrap_or_else(|| self.method.clone());

        let mut headers = self.headers.clone();
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut data = self.data.clone();
        data.extend(options.data.iter().map(|(k, v)| (k.clone(), v.clone())));
        data.extend(route.data.iter().map(|(k, v)| (k.clone(), v.clone())));

        RequestConfig {
            method,
            data,
            headers,
        }
    }

    /// Adds a header to the base layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// The payload attached to an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured parameters, encoded as a query string by the transport.
    Params(Params),

    /// A pre-serialized JSON body. Only POST requests carry one.
    Json(String),
}

impl RequestBody {
    /// Prepares `data` for `method`: POST data is serialized to a JSON
    /// string, every other method keeps the structured mapping.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SerializationFailed`] if the data cannot be
    /// serialized.
    pub fn for_method(method: &Method, data: Params) -> crate::Result<Self> {
        if *method == Method::POST {
            let json = serde_json::to_string(&data)
                .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
            Ok(RequestBody::Json(json))
        } else {
            Ok(RequestBody::Params(data))
        }
    }
}

pub(crate) fn parse_header(
    name: &str,
    value: &str,
) -> Result<(HeaderName, HeaderValue), crate::Error> {
    let name = HeaderName::try_from(name)
        .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}
