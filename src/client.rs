//! Route-bound API client.
//!
//! An [`ApiClient`] is built for one logical action: credentials, one
//! [`Route`], and optional per-call options. [`ApiClient::call`] consumes
//! the client, so a finished client cannot be reused by accident.

use crate::config::{parse_header, CallOptions, Params, RequestConfig};
use crate::dispatch::{dispatch, CallArgs, CallbackSet};
use crate::events::{self, EventBus};
use crate::route::Route;
use crate::transport::{ReqwestTransport, Transport};
use crate::{Error, Result};
use http::HeaderMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// API keys this many characters or fewer are treated as unset.
const MIN_API_KEY_LEN: usize = 2;

/// Where and as whom to talk to the Bookie API.
///
/// The `Debug` output never shows the API key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The API root, e.g. `https://bookie.example.com/api/v1`.
    pub base_url: String,
    /// The account name substituted for `{username}`.
    pub username: String,
    /// The account's API key. May be empty.
    pub api_key: String,
}

impl Credentials {
    /// Creates credentials from their three parts.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// A client bound to a single route call.
///
/// # Examples
///
/// ```no_run
/// use bookie_client::{ApiClient, CallbackSet, Credentials, Route};
///
/// # async fn example() -> Result<(), bookie_client::Error> {
/// let client = ApiClient::builder()
///     .credentials(Credentials::new(
///         "https://bookie.example.com/api/v1",
///         "alice",
///         "a1b2c3d4",
///     ))
///     .route(Route::ping())
///     .build()?;
///
/// client
///     .call(CallbackSet::new().on_success(|data, _raw, _ctx| {
///         println!("ping: {:?}", data.message());
///     }))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    base_url: String,
    username: String,
    api_key: String,
    resource: Option<String>,
    route: Route,
    options: CallOptions,
    base_cfg: RequestConfig,
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
    events: EventBus,
}

impl ApiClient {
    /// Creates a new `ApiClientBuilder`.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// The base URL, fixed at construction.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The username substituted into every template.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The route this client calls.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Builds the full request URL.
    ///
    /// `username` (and `resource`, when configured) are written into `data`
    /// before the route template is rendered against it. Without `data` a
    /// scratch mapping is used instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedPlaceholder`] if the template references a
    /// parameter that is absent or empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookie_client::{ApiClient, Route};
    ///
    /// let client = ApiClient::builder()
    ///     .base_url("https://api.example.com")
    ///     .username("alice")
    ///     .route(Route::ping())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(client.build_url(None).unwrap(), "https://api.example.com/alice/ping");
    /// ```
    pub fn build_url(&self, data: Option<&mut Params>) -> Result<String> {
        let mut scratch = Params::new();
        let params = data.unwrap_or(&mut scratch);

        params.insert("username".to_string(), Value::from(self.username.as_str()));
        if let Some(resource) = &self.resource {
            params.insert("resource".to_string(), Value::from(resource.as_str()));
        }

        let path = self.route.template().render(params)?;
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Builds this call's request configuration.
    ///
    /// The base config, the caller's options and the route's own layer are
    /// merged (see [`RequestConfig::merge`]). An API key longer than two
    /// characters is then added to `data`.
    pub fn build_cfg(&self) -> RequestConfig {
        let route_layer = self.route.overrides(&self.username);
        let mut cfg = self.base_cfg.merge(&self.options, &route_layer);

        if self.api_key.chars().count() > MIN_API_KEY_LEN {
            cfg.data
                .insert("api_key".to_string(), Value::from(self.api_key.as_str()));
        }

        cfg
    }

    /// Sends the request and waits until the callbacks have run.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or body could not be built. HTTP and
    /// network failures go to the `error` callback instead.
    pub async fn call(self, callbacks: CallbackSet) -> Result<()> {
        let mut cfg = self.build_cfg();
        let url = self.build_url(Some(&mut cfg.data))?;

        let args = CallArgs {
            route: self.route.name(),
            timeout: self.timeout,
            callbacks,
        };
        dispatch(self.transport.as_ref(), &self.events, url, cfg, args).await
    }

    /// Sends the request on the current Tokio runtime without waiting.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(self, callbacks: CallbackSet) -> JoinHandle<Result<()>> {
        tokio::spawn(self.call(callbacks))
    }

    /// Requests tag completions for `tag_stub`, excluding `current_tags`.
    ///
    /// Only valid on a [`Route::TagComplete`] client. The stub is sent as
    /// `tag` and the current tags as `current`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] on any other route, plus the
    /// errors of [`ApiClient::call`].
    pub async fn complete_tags(
        mut self,
        tag_stub: impl Into<String>,
        current_tags: Vec<String>,
        callbacks: CallbackSet,
    ) -> Result<()> {
        if self.route != Route::TagComplete {
            return Err(Error::ConfigurationError(format!(
                "complete_tags is only available on TagComplete, not {}",
                self.route.name()
            )));
        }

        self.options
            .data
            .insert("tag".to_string(), Value::from(tag_stub.into()));
        self.options
            .data
            .insert("current".to_string(), Value::from(current_tags));
        self.call(callbacks).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("route", &self.route.name())
            .field("resource", &self.resource)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating an [`ApiClient`].
///
/// # Examples
///
/// ```no_run
/// use bookie_client::{ApiClientBuilder, CallOptions, Route};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), bookie_client::Error> {
/// let client = ApiClientBuilder::new()
///     .base_url("https://bookie.example.com/api/v1")
///     .username("alice")
///     .api_key("a1b2c3d4")
///     .route(Route::sync())
///     .options(CallOptions::new().with_data("with_content", false))
///     .timeout(Duration::from_secs(10))
///     .default_header("User-Agent", "bookie-client/0.1")?
///     .build()?;
/// # let _ = client;
/// # Ok(())
/// # }
/// ```
pub struct ApiClientBuilder {
    credentials: Credentials,
    resource: Option<String>,
    route: Option<Route>,
    options: CallOptions,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
    events: Option<EventBus>,
}

impl ApiClientBuilder {
    /// Creates a new builder with no credentials and no route.
    pub fn new() -> Self {
        Self {
            credentials: Credentials::default(),
            resource: None,
            route: None,
            options: CallOptions::default(),
            default_headers: HeaderMap::new(),
            timeout: None,
            transport: None,
            events: None,
        }
    }

    /// Sets base URL, username and API key at once.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the API root every route path is appended to.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.credentials.base_url = url.into();
        self
    }

    /// Sets the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.credentials.username = username.into();
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credentials.api_key = api_key.into();
        self
    }

    /// Sets the optional `{resource}` template parameter.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Sets the route to call.
    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    /// Sets caller options merged between the base config and the route.
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds a header to the base configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Publishes `api:loaded` events to `events` instead of the global bus.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the configured `ApiClient`.
    ///
    /// # Errors
    ///
    /// Fails before any request is made if the base URL is missing or
    /// invalid, no route was set, the route lacks a required parameter, or
    /// a placeholder of the route's template would be left empty.
    pub fn build(self) -> Result<ApiClient> {
        let Credentials {
            base_url,
            username,
            api_key,
        } = self.credentials;

        if base_url.is_empty() {
            return Err(Error::ConfigurationError("Base URL is required".to_string()));
        }
        Url::parse(&base_url)?;

        let route = self
            .route
            .ok_or_else(|| Error::ConfigurationError("Route is required".to_string()))?;
        route.validate(&username)?;

        let mut params = self.options.data.clone();
        params.extend(route.overrides(&username).data);
        params.insert("username".to_string(), Value::from(username.as_str()));
        if let Some(resource) = &self.resource {
            params.insert("resource".to_string(), Value::from(resource.as_str()));
        }
        if let Some(param) = route.template().missing_placeholder(&params) {
            return Err(Error::MissingParameter {
                route: route.name(),
                param,
            });
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let mut base_cfg = RequestConfig::default();
        for (name, value) in &self.default_headers {
            base_cfg.headers.insert(name.clone(), value.clone());
        }

        tracing::debug!(
            route = route.name(),
            base_url = %base_url,
            username = %username,
            "Built API client"
        );

        Ok(ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            api_key,
            resource: self.resource,
            route,
            options: self.options,
            base_cfg,
            timeout: self.timeout,
            transport,
            events: self.events.unwrap_or_else(|| events::global().clone()),
        })
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
