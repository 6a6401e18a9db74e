//! The fixed set of Bookie API endpoints.
//!
//! Each [`Route`] variant knows its URL template, the parameters it cannot
//! be built without, and the method/data layer it contributes to every
//! request. An [`crate::ApiClient`] binds one route to a set of credentials.

use crate::config::{Params, RouteOverride};
use crate::template::RouteTemplate;
use crate::{Error, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SYNC: RouteTemplate = RouteTemplate::new("/{username}/extension/sync");
const TAG_COMPLETE: RouteTemplate = RouteTemplate::new("/{username}/tags/complete");
const BMARK: RouteTemplate = RouteTemplate::new("/{username}/bmark/{hash_id}");
const USER_BMARK_SAVE: RouteTemplate = RouteTemplate::new("/{username}/bmark");
const PING: RouteTemplate = RouteTemplate::new("/{username}/ping");

/// A Bookie API endpoint together with its route-specific parameters.
///
/// # Examples
///
/// ```
/// use bookie_client::Route;
/// use http::Method;
///
/// let route = Route::user_bmark_delete("abc123");
/// assert_eq!(route.name(), "UserBmarkDelete");
/// assert_eq!(route.template().as_str(), "/{username}/bmark/{hash_id}");
/// assert_eq!(route.method(), Some(Method::DELETE));
/// assert_eq!(route.required_params(), &["hash_id"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Hash ids of every bookmark the user has stored.
    Sync,

    /// Tag suggestions for a partially typed tag. The stub and the current
    /// tags are supplied per call via [`crate::ApiClient::complete_tags`].
    TagComplete,

    /// Load a bookmark by the username of its owner and its hash id.
    Bmark {
        /// Hash id of the bookmarked url.
        hash_id: String,
        /// The page url, used for tag suggestions.
        url: String,
        /// The page title, or the url when the page has none.
        description: String,
        /// Ask for the tags of the last bookmark as a suggestion.
        last_bmark: bool,
    },

    /// Remove a bookmark. Only its owner may do this.
    UserBmarkDelete {
        /// Hash id of the bookmark to remove.
        hash_id: String,
    },

    /// Store a bookmark. The model carries url, description, tags, etc.
    UserBmarkSave {
        /// Bookmark fields, sent as the POST body.
        model: Params,
    },

    /// Check that the server is reachable with the given credentials.
    Ping,
}

impl Route {
    /// The `Sync` route.
    pub fn sync() -> Self {
        Route::Sync
    }

    /// The `TagComplete` route.
    pub fn tag_complete() -> Self {
        Route::TagComplete
    }

    /// The `Bmark` route with `last_bmark` off.
    pub fn bmark(
        hash_id: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Route::Bmark {
            hash_id: hash_id.into(),
            url: url.into(),
            description: description.into(),
            last_bmark: false,
        }
    }

    /// The `UserBmarkDelete` route.
    pub fn user_bmark_delete(hash_id: impl Into<String>) -> Self {
        Route::UserBmarkDelete {
            hash_id: hash_id.into(),
        }
    }

    /// The `UserBmarkSave` route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `model` does not serialize
    /// to a JSON object.
    pub fn user_bmark_save<T: Serialize>(model: &T) -> Result<Self> {
        match serde_json::to_value(model) {
            Ok(Value::Object(model)) => Ok(Route::UserBmarkSave { model }),
            Ok(other) => Err(Error::SerializationFailed(format!(
                "bookmark model must be a JSON object, got {}",
                other
            ))),
            Err(e) => Err(Error::SerializationFailed(e.to_string())),
        }
    }

    /// The `Ping` route.
    pub fn ping() -> Self {
        Route::Ping
    }

    /// The route name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Sync => "Sync",
            Route::TagComplete => "TagComplete",
            Route::Bmark { .. } => "Bmark",
            Route::UserBmarkDelete { .. } => "UserBmarkDelete",
            Route::UserBmarkSave { .. } => "UserBmarkSave",
            Route::Ping => "Ping",
        }
    }

    /// The URL template appended to the base URL.
    pub fn template(&self) -> RouteTemplate {
        match self {
            Route::Sync => SYNC,
            Route::TagComplete => TAG_COMPLETE,
            Route::Bmark { .. } | Route::UserBmarkDelete { .. } => BMARK,
            Route::UserBmarkSave { .. } => USER_BMARK_SAVE,
            Route::Ping => PING,
        }
    }

    /// The method this route forces, or `None` to inherit GET.
    pub fn method(&self) -> Option<Method> {
        match self {
            Route::UserBmarkDelete { .. } => Some(Method::DELETE),
            Route::UserBmarkSave { .. } => Some(Method::POST),
            _ => None,
        }
    }

    /// Parameters that must be present and non-empty at construction.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Route::Sync | Route::TagComplete | Route::Ping => &["username"],
            Route::Bmark { .. } => &["username", "hash_id", "url", "description"],
            Route::UserBmarkDelete { .. } => &["hash_id"],
            Route::UserBmarkSave { .. } => &["model"],
        }
    }

    /// Checks every required parameter against this route and `username`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] naming the first absent one.
    pub fn validate(&self, username: &str) -> Result<()> {
        for &param in self.required_params() {
            if !self.has_param(param, username) {
                return Err(Error::MissingParameter {
                    route: self.name(),
                    param,
                });
            }
        }
        Ok(())
    }

    fn has_param(&self, param: &str, username: &str) -> bool {
        match (self, param) {
            (_, "username") => !username.is_empty(),
            (Route::Bmark { hash_id, .. }, "hash_id")
            | (Route::UserBmarkDelete { hash_id }, "hash_id") => !hash_id.is_empty(),
            (Route::Bmark { url, .. }, "url") => !url.is_empty(),
            (Route::Bmark { description, .. }, "description") => !description.is_empty(),
            (Route::UserBmarkSave { model }, "model") => !model.is_empty(),
            _ => false,
        }
    }

    /// The method and data layer this route contributes to the merge.
    ///
    /// `username` is the owner name the client was built with. Only `Bmark`
    /// sends it as data.
    pub fn overrides(&self, username: &str) -> RouteOverride {
        let mut data = Params::new();
        match self {
            Route::Sync | Route::TagComplete | Route::Ping => {}
            Route::Bmark {
                hash_id,
                url,
                description,
                last_bmark,
            } => {
                data.insert("hash_id".to_string(), Value::from(hash_id.as_str()));
                data.insert("username".to_string(), Value::from(username));
                data.insert("last_bmark".to_string(), Value::Bool(*last_bmark));
                data.insert("url".to_string(), Value::from(url.as_str()));
                data.insert("description".to_string(), Value::from(description.as_str()));
            }
            Route::UserBmarkDelete { hash_id } => {
                data.insert("hash_id".to_string(), Value::from(hash_id.as_str()));
            }
            Route::UserBmarkSave { model } => {
                data = model.clone();
            }
        }

        RouteOverride {
            method: self.method(),
            data,
        }
    }
}

/// The `Sync` route's response body.
///
/// # Examples
///
/// ```
/// use bookie_client::{decode, SyncPayload};
///
/// let payload: SyncPayload = decode("{\"hash_list\": []}").parse().unwrap();
/// assert!(payload.hash_list.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Hash ids of every stored bookmark.
    #[serde(default)]
    pub hash_list: Vec<String>,
}
