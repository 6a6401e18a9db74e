//! Request dispatch and lifecycle callbacks.
//!
//! [`dispatch`] sends one request and turns its outcome into callback
//! invocations. For every call, in order:
//!
//! 1. `complete` fires with the decoded body, whatever the outcome;
//! 2. then exactly one of `success` (2xx) or `error` (anything else,
//!    including transport failures) fires.
//!
//! Missing callbacks are skipped silently.

use crate::config::{RequestBody, RequestConfig};
use crate::decode::{decode, DecodedResponse};
use crate::events::{ApiEvent, EventBus};
use crate::transport::{OutgoingRequest, Transport};
use crate::{RawResponse, Result};
use http::Method;
use std::fmt;
use std::time::{Duration, Instant};

type ResponseFn = Box<dyn FnOnce(&DecodedResponse, &RawResponse, &CallContext) + Send>;
type ErrorFn = Box<dyn FnOnce(&DecodedResponse, &str, &RawResponse, &CallContext) + Send>;

/// The caller's callbacks for one call.
///
/// # Examples
///
/// ```
/// use bookie_client::CallbackSet;
///
/// let callbacks = CallbackSet::new()
///     .on_success(|data, _raw, ctx| {
///         println!("{} answered: {:?}", ctx.url, data.message());
///     })
///     .on_error(|data, status_text, _raw, _ctx| {
///         eprintln!("failed ({}): {:?}", status_text, data.message());
///     });
/// # let _ = callbacks;
/// ```
#[derive(Default)]
pub struct CallbackSet {
    success: Option<ResponseFn>,
    error: Option<ErrorFn>,
    complete: Option<ResponseFn>,
}

impl CallbackSet {
    /// Creates an empty set. Every outcome is dropped until a callback is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the decoded body on a 2xx response.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&DecodedResponse, &RawResponse, &CallContext) + Send + 'static,
    {
        self.success = Some(Box::new(f));
        self
    }

    /// Called with the decoded body and status text on any other outcome.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&DecodedResponse, &str, &RawResponse, &CallContext) + Send + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    /// Called before `success`/`error`, for every outcome.
    ///
    /// Do not branch on success here; the status is not interpreted.
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&DecodedResponse, &RawResponse, &CallContext) + Send + 'static,
    {
        self.complete = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// What was sent, handed back to every callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    /// Name of the route that issued the call.
    pub route: &'static str,
    /// The HTTP method used.
    pub method: Method,
    /// The resolved URL.
    pub url: String,
    /// The params or JSON body that was sent.
    pub body: RequestBody,
}

/// Per-call arguments travelling with the request.
#[derive(Debug)]
pub struct CallArgs {
    /// Name of the issuing route, for logs and [`CallContext`].
    pub route: &'static str,
    /// Per-request timeout passed to the transport.
    pub timeout: Option<Duration>,
    /// The caller's callbacks.
    pub callbacks: CallbackSet,
}

/// Sends one request and delivers its outcome to `args.callbacks`.
///
/// POST data is serialized to a JSON string first. Other methods send the
/// data as structured params. A successful response is also published on
/// `events` as [`ApiEvent::Loaded`].
///
/// # Errors
///
/// Returns an error only if the request could not be prepared. Once the
/// request is handed to the transport every outcome goes to the callbacks.
pub async fn dispatch(
    transport: &dyn Transport,
    events: &EventBus,
    url: String,
    config: RequestConfig,
    args: CallArgs,
) -> Result<()> {
    let CallArgs {
        route,
        timeout,
        callbacks,
    } = args;
    let body = RequestBody::for_method(&config.method, config.data)?;

    let context = CallContext {
        route,
        method: config.method.clone(),
        url: url.clone(),
        body: body.clone(),
    };
    let request = OutgoingRequest {
        method: config.method,
        url,
        headers: config.headers,
        body,
        timeout,
    };

    tracing::debug!(
        route = route,
        method = %context.method,
        url = %context.url,
        "Dispatching API request"
    );

    let start_time = Instant::now();
    let response = match transport.send(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                error = %e,
                route = route,
                url = %context.url,
                "Transport failure"
            );
            RawResponse::transport_failure(e.to_string(), start_time.elapsed())
        }
    };

    deliver(events, response, &context, callbacks);
    Ok(())
}

fn deliver(events: &EventBus, response: RawResponse, context: &CallContext, callbacks: CallbackSet) {
    let data = decode(&response.body);

    if let Some(complete) = callbacks.complete {
        complete(&data, &response, context);
    }

    if response.status.is_some() {
        tracing::info!(
            route = context.route,
            status = response.status.map(|s| s.as_u16()),
            latency_ms = response.latency.as_millis() as u64,
            "Received API response"
        );
    }

    if response.is_success() {
        events.publish(ApiEvent::Loaded {
            url: context.url.clone(),
            response: response.clone(),
        });

        if let Some(success) = callbacks.success {
            success(&data, &response, context);
        }
    } else {
        if let Some(status) = response.status {
            tracing::warn!(
                route = context.route,
                status = status.as_u16(),
                response = %response.body,
                "API request failed"
            );
        }

        if let Some(error) = callbacks.error {
            error(&data, &response.status_text, &response, context);
        }
    }
}
