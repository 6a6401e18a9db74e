//! # bookie-client - declarative routes for the Bookie bookmarking API
//!
//! Each Bookie endpoint is a [`Route`]: a URL template, the parameters it
//! cannot do without, and the method and data it always sends. An
//! [`ApiClient`] binds one route to a set of [`Credentials`], merges the
//! request configuration, and dispatches the call. Outcomes arrive through
//! the callbacks in a [`CallbackSet`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookie_client::{ApiClient, CallbackSet, Credentials, Route, SyncPayload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bookie_client::Error> {
//!     let credentials = Credentials::new(
//!         "https://bookie.example.com/api/v1",
//!         "alice",
//!         "a1b2c3d4",
//!     );
//!
//!     let client = ApiClient::builder()
//!         .credentials(credentials)
//!         .route(Route::sync())
//!         .build()?;
//!
//!     client
//!         .call(
//!             CallbackSet::new()
//!                 .on_success(|data, _raw, _ctx| {
//!                     if let Ok(payload) = data.parse::<SyncPayload>() {
//!                         println!("{} bookmarks", payload.hash_list.len());
//!                     }
//!                 })
//!                 .on_error(|data, status_text, _raw, _ctx| {
//!                     eprintln!("sync failed ({}): {:?}", status_text, data.message());
//!                 }),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Request configuration
//!
//! Every call merges three layers, weakest first: the client's base
//! configuration (GET, JSON headers), the caller's [`CallOptions`], and the
//! route's own method and data. `data` is merged key by key, so a route can
//! add `hash_id` without dropping the caller's extra parameters. An API key
//! longer than two characters is always sent as `api_key`.
//!
//! POST bodies are sent as JSON text. Other methods send `data` as query
//! parameters.
//!
//! ## Response decoding
//!
//! Bodies are decoded with [`decode`]. A body that is not JSON is not an
//! error: it becomes `{"success": true, "message": <body>}`.
//!
//! ## Notifications
//!
//! Every 2xx response is announced on the process-wide [`EventBus`]
//! (see [`events::global`]) as [`ApiEvent::Loaded`]:
//!
//! ```no_run
//! # async fn example() {
//! let mut rx = bookie_client::events::global().subscribe();
//! while let Ok(event) = rx.recv().await {
//!     println!("{}", event.name());
//! }
//! # }
//! ```

mod client;
mod config;
mod decode;
mod dispatch;
mod error;
pub mod events;
mod response;
mod route;
mod settings;
mod template;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder, Credentials};
pub use config::{CallOptions, Params, RequestBody, RequestConfig, RouteOverride};
pub use decode::{decode, DecodedResponse};
pub use dispatch::{dispatch, CallArgs, CallContext, CallbackSet};
pub use error::{Error, Result};
pub use events::{ApiEvent, EventBus};
pub use response::RawResponse;
pub use route::{Route, SyncPayload};
pub use settings::{check_connection, ConnectionCheck, Settings};
pub use template::RouteTemplate;
pub use transport::{OutgoingRequest, ReqwestTransport, Transport};
