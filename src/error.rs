//! Error types for building and dispatching route calls.
//!
//! Only failures that happen before a request leaves the process are
//! reported through [`Error`]. Anything that happens afterwards (a non-2xx
//! status, an unreachable host) is delivered to the caller's `error`
//! callback instead. See [`crate::CallbackSet`].

/// The main error type for route construction and request preparation.
///
/// # Examples
///
/// ```
/// use bookie_client::{ApiClient, Error, Route};
///
/// let result = ApiClient::builder()
///     .base_url("https://bookie.example.com/api/v1")
///     .username("alice")
///     .route(Route::user_bmark_delete(""))
///     .build();
///
/// match result {
///     Err(Error::MissingParameter { route, param }) => {
///         assert_eq!(route, "UserBmarkDelete");
///         assert_eq!(param, "hash_id");
///     }
///     other => panic!("expected MissingParameter, got {:?}", other.err()),
/// }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// The dispatcher converts this into an `error` callback. It only
    /// surfaces as an `Err` from a [`crate::Transport`] implementation.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A route was constructed without one of its required parameters.
    ///
    /// Raised by [`crate::ApiClientBuilder::build`] before any request is
    /// attempted.
    #[error("Route {route} is missing required parameter `{param}`")]
    MissingParameter {
        /// The route name, e.g. `"Bmark"`
        route: &'static str,
        /// The name of the missing parameter
        param: &'static str,
    },

    /// A URL template still had an unbound `{placeholder}` after substitution.
    #[error("Template `{template}` has no value for `{{{placeholder}}}`")]
    UnresolvedPlaceholder {
        /// The template being rendered
        template: String,
        /// The placeholder name without braces
        placeholder: String,
    },

    /// Invalid configuration was provided.
    ///
    /// This covers invalid header names or values, a missing base URL, and
    /// call-time overrides used on the wrong route.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    ///
    /// POST bodies are serialized to a JSON string before dispatch.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid base URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error was raised while constructing a route
    /// client, as opposed to while preparing or sending a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookie_client::Error;
    ///
    /// let err = Error::MissingParameter { route: "Ping", param: "username" };
    /// assert!(err.is_construction_error());
    ///
    /// let err = Error::SerializationFailed("boom".to_string());
    /// assert!(!err.is_construction_error());
    /// ```
    pub fn is_construction_error(&self) -> bool {
        match self {
            Error::MissingParameter { .. } => true,
            Error::ConfigurationError(_) => true,
            Error::InvalidUrl(_) => true,
            Error::Network(_) => false,
            Error::UnresolvedPlaceholder { .. } => false,
            Error::SerializationFailed(_) => false,
        }
    }
}

/// A specialized `Result` type for this crate.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
