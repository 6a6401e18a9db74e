//! URL templates with named `{placeholder}` segments.

use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fmt;

/// An immutable route path such as `/{username}/bmark/{hash_id}`.
///
/// Substituted values are percent-encoded so a parameter can never add a
/// path segment of its own.
///
/// # Examples
///
/// ```
/// use bookie_client::RouteTemplate;
/// use serde_json::{json, Map, Value};
///
/// let template = RouteTemplate::new("/{username}/bmark/{hash_id}");
/// let params: Map<String, Value> = json!({"username": "alice", "hash_id": "abc123"})
///     .as_object()
///     .cloned()
///     .unwrap();
///
/// assert_eq!(template.render(&params).unwrap(), "/alice/bmark/abc123");
/// assert_eq!(template.placeholders(), vec!["username", "hash_id"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTemplate(&'static str);

impl RouteTemplate {
    /// Wraps a static template string.
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    /// The template text.
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.0;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    names.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        names
    }

    /// The first placeholder with no usable value in `params`, if any.
    ///
    /// A value is usable under the same rules [`RouteTemplate::render`]
    /// applies.
    pub fn missing_placeholder(&self, params: &Map<String, Value>) -> Option<&'static str> {
        self.placeholders()
            .into_iter()
            .find(|name| params.get(*name).and_then(param_text).is_none())
    }

    /// Substitutes every placeholder from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedPlaceholder`] if a placeholder has no
    /// value, or its value is `null` or an empty string.
    pub fn render(&self, params: &Map<String, Value>) -> Result<String> {
        let mut out = String::with_capacity(self.0.len() + 32);
        let mut rest = self.0;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                // An unmatched brace is literal text.
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };

            let name = &after[..close];
            let value = params
                .get(name)
                .and_then(param_text)
                .ok_or_else(|| Error::UnresolvedPlaceholder {
                    template: self.0.to_string(),
                    placeholder: name.to_string(),
                })?;
            out.push_str(&urlencoding::encode(&value));
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

fn param_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_all_placeholders() {
        let template = RouteTemplate::new("/{username}/extension/sync");
        let url = template.render(&params(json!({"username": "alice"}))).unwrap();
        assert_eq!(url, "/alice/extension/sync");
    }

    #[test]
    fn test_render_ignores_extra_params() {
        let template = RouteTemplate::new("/{username}/ping");
        let url = template
            .render(&params(json!({"username": "bob", "api_key": "secret"})))
            .unwrap();
        assert_eq!(url, "/bob/ping");
    }

    #[test]
    fn test_render_missing_placeholder_fails() {
        let template = RouteTemplate::new("/{username}/bmark/{hash_id}");
        let err = template
            .render(&params(json!({"username": "alice"})))
            .unwrap_err();
        match err {
            Error::UnresolvedPlaceholder { placeholder, .. } => assert_eq!(placeholder, "hash_id"),
            other => panic!("Expected UnresolvedPlaceholder, got {:?}", other),
        }
    }

    #[test]
    fn test_render_null_or_empty_is_unresolved() {
        let template = RouteTemplate::new("/{username}/ping");
        assert!(template.render(&params(json!({"username": null}))).is_err());
        assert!(template.render(&params(json!({"username": ""}))).is_err());
    }

    #[test]
    fn test_missing_placeholder() {
        let template = RouteTemplate::new("/{username}/bmark/{hash_id}");
        assert_eq!(template.missing_placeholder(&params(json!({}))), Some("username"));
        assert_eq!(
            template.missing_placeholder(&params(json!({"username": "", "hash_id": "abc"}))),
            Some("username")
        );
        assert_eq!(
            template.missing_placeholder(&params(json!({"username": "alice"}))),
            Some("hash_id")
        );
        assert_eq!(
            template.missing_placeholder(&params(json!({"username": "alice", "hash_id": 7}))),
            None
        );
    }

    #[test]
    fn test_render_encodes_values() {
        let template = RouteTemplate::new("/{username}/ping");
        let url = template
            .render(&params(json!({"username": "a b/c"})))
            .unwrap();
        assert_eq!(url, "/a%20b%2Fc/ping");
    }

    #[test]
    fn test_render_non_string_values() {
        let template = RouteTemplate::new("/{resource}/{id}");
        let url = template
            .render(&params(json!({"resource": "bmark", "id": 42})))
            .unwrap();
        assert_eq!(url, "/bmark/42");
    }

    #[test]
    fn test_unmatched_brace_is_literal() {
        let template = RouteTemplate::new("/{username}/odd{");
        let url = template.render(&params(json!({"username": "x"}))).unwrap();
        assert_eq!(url, "/x/odd{");
        assert_eq!(template.placeholders(), vec!["username"]);
    }
}
