//! Response body decoding with a plain-text fallback.
//!
//! Bodies that parse as JSON are returned unchanged. Anything else becomes
//! `{"success": true, "message": <raw text>}`. Callers look at `success`
//! and `message`, so that shape is fixed.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::ops::Deref;

/// A decoded response body.
///
/// Wraps the parsed JSON value and dereferences to it, so indexing works
/// the same way it does on a [`serde_json::Value`].
///
/// # Examples
///
/// ```
/// use bookie_client::decode;
///
/// let data = decode("{\"success\": false, \"message\": \"bad key\"}");
/// assert_eq!(data.success(), Some(false));
/// assert_eq!(data.message(), Some("bad key"));
///
/// let data = decode("pong");
/// assert_eq!(data.success(), Some(true));
/// assert_eq!(data["message"], "pong");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedResponse(Value);

impl DecodedResponse {
    /// Builds the fallback shape for a body that was not JSON.
    pub fn plain_text(raw: &str) -> Self {
        Self(json!({
            "success": true,
            "message": raw,
        }))
    }

    /// The `success` field, if the body carried a boolean one.
    pub fn success(&self) -> Option<bool> {
        self.0.get("success").and_then(Value::as_bool)
    }

    /// The `message` field, if the body carried a string one.
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    /// Deserializes the decoded body into a typed payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookie_client::{decode, SyncPayload};
    ///
    /// let data = decode("{\"hash_list\": [\"a1\", \"b2\"]}");
    /// let payload: SyncPayload = data.parse().unwrap();
    /// assert_eq!(payload.hash_list, vec!["a1", "b2"]);
    /// ```
    pub fn parse<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.0)
    }

    /// Consumes the wrapper and returns the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Deref for DecodedResponse {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Value> for DecodedResponse {
    fn as_ref(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for DecodedResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Decodes a raw response body.
///
/// Never fails: a body that does not parse as JSON yields
/// [`DecodedResponse::plain_text`].
pub fn decode(raw: &str) -> DecodedResponse {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => DecodedResponse(value),
        Err(e) => {
            tracing::debug!(
                error = %e,
                body_len = raw.len(),
                "Response body is not JSON, using plain-text message"
            );
            DecodedResponse::plain_text(raw)
        }
    }
}
